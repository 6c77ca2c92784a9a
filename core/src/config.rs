//! Client configuration.
//!
//! # Design
//! There is no process-wide state: a `LyftConfiguration` is handed to
//! `LyftApi` at construction. Leaving `developer` empty is allowed, but every
//! API call then fails with `LyftApiError::not_configured()` without touching
//! the network.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Credentials issued to the developer integrating the SDK.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Developer {
    pub token: String,
    pub client_id: String,
}

impl Developer {
    pub fn new(token: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client_id: client_id.into(),
        }
    }
}

impl fmt::Debug for Developer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Developer")
            .field("token", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LyftConfiguration {
    /// Must be set before any API call can succeed.
    #[serde(default)]
    pub developer: Option<Developer>,
    /// Partner-specific sign-up identifier. Leave at the default unless told
    /// otherwise.
    #[serde(default = "LyftConfiguration::default_sign_up_identifier")]
    pub sign_up_identifier: String,
    #[serde(default = "LyftConfiguration::default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 20)
    #[serde(default = "LyftConfiguration::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LyftConfiguration {
    fn default() -> Self {
        Self {
            developer: None,
            sign_up_identifier: Self::default_sign_up_identifier(),
            base_url: Self::default_base_url(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl LyftConfiguration {
    fn default_sign_up_identifier() -> String {
        "SDKSIGNUP".to_string()
    }
    fn default_base_url() -> String {
        "https://api.lyft.com".to_string()
    }
    fn default_request_timeout_secs() -> u64 {
        20
    }

    pub fn new(developer: Developer) -> Self {
        Self {
            developer: Some(developer),
            ..Self::default()
        }
    }

    /// Read the configuration from `LYFT_*` environment variables, falling
    /// back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let developer = match (lookup("LYFT_DEVELOPER_TOKEN"), lookup("LYFT_CLIENT_ID")) {
            (Some(token), Some(client_id)) => Some(Developer { token, client_id }),
            _ => None,
        };

        Self {
            developer,
            sign_up_identifier: lookup("LYFT_SIGN_UP_IDENTIFIER").unwrap_or(defaults.sign_up_identifier),
            base_url: lookup("LYFT_API_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout_secs: lookup("LYFT_REQUEST_TIMEOUT_SECS")
                .and_then(|secs| secs.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.developer.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate `base_url`.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}
