use crate::auth::Token;
use crate::config::Config;
use crate::error::HttpError;
use anyhow::Result;
use reqwest::{header, Client, Method, Response};
use serde_json::Value;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::build_client()?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// GET `endpoint` with bearer auth and return the parsed JSON body.
    pub async fn request(
        &self,
        endpoint: &str,
        token: &Token,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let url = self.config.url(endpoint);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, bearer(token)?)
            .query(params)
            .send()
            .await
            .inspect_err(|err| log::error!("GET {url} failed: {err}"))?;

        let response = check_status(Method::GET, &url, response).await?;

        response.json::<Value>().await.map_err(Into::into)
    }

    fn build_client() -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Into::into)
    }
}

fn bearer(token: &Token) -> Result<header::HeaderValue> {
    let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))?;
    auth_value.set_sensitive(true);
    Ok(auth_value)
}

/// Pass 2xx responses through; log and convert anything else into [`HttpError::Status`].
pub(crate) async fn check_status(method: Method, url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::error!("{method} {url} returned status {status}, body: {body}");

    Err(HttpError::Status {
        method,
        url: url.to_string(),
        status,
        body,
    }
    .into())
}
