//! HTTP collaborators: resource creation and the webhook authorization handshake

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Path of the CLI session endpoint used to obtain a webhook signing secret
pub const SESSIONS_PATH: &str = "/v1/stripecli/sessions";

/// Executes authenticated form POSTs against the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// POST `data` (ordered `key=value` pairs) to `path` and return the raw body.
    /// Non-success statuses are errors.
    async fn post_form(&self, api_key: &str, path: &str, data: &[String]) -> Result<Vec<u8>>;
}

/// Result of an authorization handshake
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Signing secret for the authorized capability
    pub secret: String,

    #[serde(default)]
    pub websocket_id: Option<String>,

    #[serde(default)]
    pub websocket_url: Option<String>,
}

/// Obtains a session scoped to one capability (e.g. `webhooks`).
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(
        &self,
        api_key: &str,
        device_name: &str,
        capability: &str,
    ) -> Result<AuthSession>;
}

/// Encode ordered `key=value` strings as a form body.
/// Entries without `=` are sent with an empty value.
pub fn encode_form(data: &[String]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for item in data {
        let (key, value) = item.split_once('=').unwrap_or((item.as_str(), ""));
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// reqwest-backed implementation of [`ApiClient`] and [`Authorizer`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new client with a custom user agent
    pub fn new(base_url: Url, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Configuration(format!("Invalid API path '{}': {}", path, e)))
    }
}

#[async_trait]
impl ApiClient for HttpClient {
    async fn post_form(&self, api_key: &str, path: &str, data: &[String]) -> Result<Vec<u8>> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_form(data))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            return Err(Error::Network(format!(
                "Request failed, status={}, body={}",
                status.as_u16(),
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl Authorizer for HttpClient {
    async fn authorize(
        &self,
        api_key: &str,
        device_name: &str,
        capability: &str,
    ) -> Result<AuthSession> {
        let data = vec![
            format!("device_name={}", device_name),
            format!("websocket_features[]={}", capability),
        ];
        let body = self.post_form(api_key, SESSIONS_PATH, &data).await?;

        serde_json::from_slice(&body).map_err(|e| {
            Error::Data(format!(
                "Unexpected response when authorizing {}: {}",
                capability, e
            ))
        })
    }
}
