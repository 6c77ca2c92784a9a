//! Error types for the ride API client.
//!
//! # Design
//! `LyftApiError` is what callers see: the server's `error` reason and
//! `error_description` message when the body carries them, otherwise the
//! `"unknown"` sentinel. Transport failures and configuration problems have
//! their own types because they arise before any response exists.

use serde_json::Value;
use thiserror::Error;

use crate::http::ResponseType;
use crate::json::JsonObject;

/// Outcome of every facade operation.
pub type LyftResult<T> = Result<T, LyftApiError>;

/// An error reported by the ride API, or synthesized when none was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {}", .message.as_deref().unwrap_or("no description"))]
pub struct LyftApiError {
    /// Machine-readable reason, e.g. `"generic_error"`.
    pub reason: String,
    /// Human-readable message from the server.
    pub message: Option<String>,
    /// Classification of the response that produced this error.
    pub status: Option<ResponseType>,
}

impl LyftApiError {
    /// Reason used when the response carried no structured error.
    pub const UNKNOWN_REASON: &'static str = "unknown";

    /// Reason used when no developer credential is configured.
    pub const NOT_CONFIGURED_REASON: &'static str = "not_configured";

    pub fn new(reason: impl Into<String>, message: Option<String>) -> Self {
        Self {
            reason: reason.into(),
            message,
            status: None,
        }
    }

    /// The generic error used when nothing more specific is known.
    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN_REASON, None)
    }

    pub fn not_configured() -> Self {
        Self::new(
            Self::NOT_CONFIGURED_REASON,
            Some("developer credentials must be configured before calling the API".to_string()),
        )
    }

    pub fn is_not_configured(&self) -> bool {
        self.reason == Self::NOT_CONFIGURED_REASON && self.status.is_none()
    }

    /// Extract the error from a response body. Returns `None` when the status
    /// is a success.
    pub fn from_response(response: Option<&JsonObject>, status: ResponseType) -> Option<Self> {
        if status.is_success() {
            return None;
        }

        let field = |key: &str| response.and_then(|body| body.get(key)).and_then(Value::as_str);
        Some(Self {
            reason: field("error").unwrap_or(Self::UNKNOWN_REASON).to_string(),
            message: field("error_description").map(str::to_string),
            status: Some(status),
        })
    }
}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    TimedOut,

    #[error("not connected to the network")]
    NotConnected,

    #[error("transport failure: {0}")]
    Other(String),
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base url must use http or https, got {0:?}")]
    UnsupportedScheme(String),
}
