use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENV_VARS: [&str; 4] = [
    "ACCESS_PLANIT_USER",
    "ACCESS_PLANIT_PASS",
    "ACCESS_PLANIT_BASE_URL",
    "ACCESS_PLANIT_OUTPUT_DIR",
];

fn planit(base_url: &str, output_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("planit-fetch").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .env("ACCESS_PLANIT_BASE_URL", base_url)
        .env("ACCESS_PLANIT_OUTPUT_DIR", output_dir);
    cmd
}

fn with_credentials(mut cmd: Command) -> Command {
    cmd.env("ACCESS_PLANIT_USER", "jo")
        .env("ACCESS_PLANIT_PASS", "secret");
    cmd
}

async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_credentials_exit_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let tmp = tempfile::tempdir().unwrap();

    let mut cmd = planit(&server.uri(), tmp.path());
    cmd.arg("data");
    run_blocking(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("ACCESS_PLANIT_USER"));

    let mut cmd = planit(&server.uri(), tmp.path());
    cmd.env("ACCESS_PLANIT_USER", "jo").arg("api-help");
    run_blocking(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("ACCESS_PLANIT_PASS"));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_limit_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = with_credentials(planit("http://127.0.0.1:9", tmp.path()));
    cmd.args(["data", "--limit", "ten"]);

    run_blocking(cmd)
        .await
        .code(2)
        .stderr(predicate::str::contains("not a whole number"));
}

#[tokio::test(flavor = "multi_thread")]
async fn token_rejection_exits_with_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output");

    let mut cmd = with_credentials(planit(&server.uri(), &out));
    cmd.arg("data");
    run_blocking(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("401"));

    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn partial_failure_still_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/coursetemplate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [1, 2, 3]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/coursedate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let tmp = tempfile::tempdir().unwrap();

    let mut cmd = with_credentials(planit(&server.uri(), tmp.path()));
    cmd.args(["data", "--limit", "3"]);
    run_blocking(cmd)
        .await
        .success()
        .stderr(predicate::str::contains("Retrieved 3 course templates"))
        .stderr(predicate::str::contains("1 succeeded, 1 failed"));

    let files: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}
