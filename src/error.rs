use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    #[error("missing API base URL (set ACCESS_PLANIT_BASE_URL or pass --base-url)")]
    MissingBaseUrl,

    #[error("failed to read password file: {0}")]
    SecretFile(String),
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Status { status, .. } => *status,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token response did not contain an access_token")]
    EmptyToken,
}
