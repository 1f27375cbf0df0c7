use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::debug;

use super::config::{ClientConfig, ConfigError};
use super::{SettingsRequest, SettingsResponse};
use crate::adapters::remote::{RemoteSettingsClient, TransportError};

const JSON_API: &str = "application/vnd.api+json";

/// HTTP client for the organization settings endpoint.
pub struct HttpSettingsClient {
    config: ClientConfig,
    headers: HeaderMap,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for HttpSettingsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSettingsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpSettingsClient {
    /// Create a client authenticated with `token`.
    pub fn new(config: ClientConfig, token: impl Into<String>) -> Result<Self, TransportError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::MissingToken.into());
        }
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            headers,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(
        &self,
        method: Method,
        id: &str,
        body: Option<Vec<u8>>,
    ) -> Result<SettingsResponse, TransportError> {
        let url = self.config.settings_url(id)?;
        debug!(method = method.as_str(), url = url.as_str(), "sending settings request");

        let mut request = self
            .http_client
            .request(method, url)
            .headers(self.headers.clone())
            .query(&[("version", self.config.api_version.as_str())]);

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static(JSON_API))
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, text));
        }

        Ok(SettingsResponse::from_slice(text.as_bytes())?)
    }
}

fn status_error(status: StatusCode, body: String) -> TransportError {
    let body = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body
    };

    TransportError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl RemoteSettingsClient for HttpSettingsClient {
    async fn upsert(
        &self,
        id: &str,
        request: &SettingsRequest,
    ) -> Result<SettingsResponse, TransportError> {
        let body = serde_json::to_vec(request).map_err(TransportError::Encode)?;
        self.send(Method::PATCH, id, Some(body)).await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<SettingsResponse, TransportError> {
        self.send(Method::GET, id, None).await
    }
}
