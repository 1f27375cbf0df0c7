// Cloud API Client Configuration
//
// Where the settings endpoint lives and which API version to ask for.
// Loaded from JSON; every field has a built-in default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.snyk.io/rest";
pub const DEFAULT_API_VERSION: &str = "2024-10-15";
pub const DEFAULT_SETTINGS_PATH: &str = "/orgs/{id}/settings/sast";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings_path must contain an `{{id}}` placeholder, got `{0}`")]
    MissingIdPlaceholder(String),

    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("endpoint `{0}` cannot carry a path")]
    EndpointCannotBeBase(String),

    #[error("`{0}` cannot be used as a settings identifier in a URL path")]
    UnusableId(String),

    #[error("API token cannot be empty")]
    MissingToken,

    #[error("API token contains characters not allowed in a header")]
    InvalidToken,
}

/// Client configuration loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API; any path it carries is kept.
    pub endpoint: String,

    /// Value of the `version` query parameter.
    pub api_version: String,

    /// Path template appended to `endpoint`; `{id}` is replaced per call.
    pub settings_path: String,

    /// Per-request timeout enforced by the HTTP client.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_version: DEFAULT_API_VERSION.into(),
            settings_path: DEFAULT_SETTINGS_PATH.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.settings_path.split('/').any(|segment| segment == "{id}") {
            return Err(ConfigError::MissingIdPlaceholder(self.settings_path.clone()));
        }
        self.base_url()?;
        Ok(())
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint)?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::EndpointCannotBeBase(self.endpoint.clone()));
        }
        Ok(url)
    }

    /// Full URL (without query) of the settings resource for `id`.
    ///
    /// `id` always lands in exactly one path segment, percent-encoded.
    pub fn settings_url(&self, id: &str) -> Result<Url, ConfigError> {
        // Dot segments would be dropped or resolved by the URL parser.
        if id.is_empty() || id == "." || id == ".." {
            return Err(ConfigError::UnusableId(id.to_string()));
        }

        let mut url = self.base_url()?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ConfigError::EndpointCannotBeBase(self.endpoint.clone()))?;
            segments.pop_if_empty();

            for segment in self.settings_path.split('/').filter(|s| !s.is_empty()) {
                if segment == "{id}" {
                    segments.push(id);
                } else {
                    segments.push(segment);
                }
            }
        }
        Ok(url)
    }
}
