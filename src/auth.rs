use crate::api_client::check_status;
use crate::config::Config;
use crate::error::AuthError;
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token held in memory for a single run.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

pub struct Authenticator<'a> {
    config: &'a Config,
    client: Client,
}

impl<'a> Authenticator<'a> {
    pub fn new(config: &'a Config, client: Client) -> Self {
        Self { config, client }
    }

    /// Exchange the configured username/password for a bearer token.
    pub async fn get_token(&self) -> Result<Token> {
        self.exchange()
            .await
            .context("failed to obtain access token")
    }

    async fn exchange(&self) -> Result<Token> {
        let url = self.config.url(&self.config.endpoints.token);
        let request_body = TokenRequest {
            grant_type: "password",
            username: &self.config.credentials.username,
            password: &self.config.credentials.password,
        };

        log::info!("Requesting access token from {url}");

        let response = self
            .client
            .post(&url)
            .form(&request_body)
            .send()
            .await
            .inspect_err(|err| log::error!("POST {url} failed: {err}"))?;

        let response = check_status(Method::POST, &url, response).await?;
        let token: TokenResponse = response.json().await?;

        if token.access_token.trim().is_empty() {
            log::error!("Token response from {url} had no access_token");
            return Err(AuthError::EmptyToken.into());
        }

        crate::success!("Access token acquired");
        Ok(Token(token.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, Endpoints};
    use crate::error::HttpError;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::path::PathBuf;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> Config {
        Config {
            base_url,
            endpoints: Endpoints::default(),
            credentials: Credentials {
                username: "jo@example.com".into(),
                password: "p&ss word".into(),
            },
            output_dir: PathBuf::from("output"),
        }
    }

    #[tokio::test]
    async fn posts_password_grant_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=jo%40example.com"))
            .and(body_string_contains("password=p%26ss+word"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-1", "token_type": "bearer"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = config(server.uri());
        let token = Authenticator::new(&config, Client::new())
            .get_token()
            .await
            .unwrap();

        assert_eq!(token.as_str(), "tok-1");
    }

    #[tokio::test]
    async fn rejected_credentials_surface_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let config = config(server.uri());
        let err = Authenticator::new(&config, Client::new())
            .get_token()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "failed to obtain access token");
        let http = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_access_token_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ""})))
            .mount(&server)
            .await;

        let config = config(server.uri());
        let err = Authenticator::new(&config, Client::new())
            .get_token()
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::EmptyToken)
        ));
    }

    #[test]
    fn token_debug_is_redacted() {
        assert_eq!(format!("{:?}", Token::new("abc")), "Token(<redacted>)");
    }
}
