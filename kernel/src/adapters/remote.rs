// Remote Settings Client Abstraction
//
// The narrow contract the reconciler needs from the remote API.
// Authentication, timeouts and connection handling belong to the
// implementation, not to callers.
//
// This module defines *interfaces only*.

use async_trait::async_trait;

use super::cloudapi::config::ConfigError;
use super::cloudapi::{SettingsRequest, SettingsResponse};

/// Failures raised by a remote settings client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, timeout or other request-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the settings envelope.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The outgoing request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The client or request URL could not be built from configuration.
    #[error("invalid client configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Remote API operations on organization settings.
///
/// Properties required from implementations:
/// - `upsert` creates or fully replaces the settings keyed by `id`
/// - one request/response round trip per call, no retries
/// - a body that is not a valid envelope is reported as `Decode`
#[async_trait]
pub trait RemoteSettingsClient: Send + Sync {
    async fn upsert(
        &self,
        id: &str,
        request: &SettingsRequest,
    ) -> Result<SettingsResponse, TransportError>;

    async fn fetch_by_id(&self, id: &str) -> Result<SettingsResponse, TransportError>;
}
