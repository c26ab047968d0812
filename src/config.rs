use crate::args::Args;
use crate::error::ConfigError;
use std::{fmt, path::PathBuf};

pub const USER_ENV: &str = "ACCESS_PLANIT_USER";
pub const PASS_ENV: &str = "ACCESS_PLANIT_PASS";

/// Remote paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token: String,
    pub course_templates: String,
    pub course_dates: String,
    pub course_date_help: String,
    pub course_template_help: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token: "/api/v2/token".into(),
            course_templates: "/api/v2/coursetemplate".into(),
            course_dates: "/api/v2/coursedate".into(),
            course_date_help: "/apihelp/v2/modules/courseDate".into(),
            course_template_help: "/apihelp/v2/modules/courseTemplate".into(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub credentials: Credentials,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn new(args: &Args) -> Result<Self, ConfigError> {
        let username = required(args.user.as_deref(), USER_ENV)?.to_string();
        let password = Args::parse_secret(required(args.pass.as_deref(), PASS_ENV)?)
            .map_err(|err| ConfigError::SecretFile(format!("{err:#}")))?;
        if password.trim().is_empty() {
            return Err(ConfigError::MissingCredential(PASS_ENV));
        }

        let base_url = args
            .base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?
            .to_string();

        Ok(Self {
            base_url,
            endpoints: Endpoints::default(),
            credentials: Credentials { username, password },
            output_dir: args.output_dir.clone(),
        })
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingCredential(name))
}
