//! Error taxonomy for configuration and collaborator calls.

use serde::Deserialize;

/// Shown when the service gave no usable message.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Grepable error code and retryable flag for structured logging.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Errors produced while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    Missing { var: String },

    /// An environment variable is set but cannot be parsed.
    #[error("invalid config: {var}={value:?}")]
    Invalid { var: String, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Errors produced by floor and table collaborator operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("service responded with status {status}: {message}")]
    Response { status: u16, message: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The operation names a floor or table the store does not know.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ServiceError {
    /// Build a [`ServiceError::Response`] from a non-success status and body.
    ///
    /// The backend reports failures as `{"detail": "..."}`. Any other body
    /// (validation arrays, HTML error pages, nothing at all) leaves the
    /// message empty.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { detail: serde_json::Value::String(s) }) => s,
            _ => String::new(),
        };
        Self::Response { status, message }
    }

    /// Text suitable for showing to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Response { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_MESSAGE.to_owned(),
        }
    }
}

impl ErrorCode for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_REQUEST",
            Self::Response { .. } => "E_RESPONSE",
            Self::Parse(_) => "E_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::NotFound { .. } => "E_NOT_FOUND",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 429 | 500..=599, .. })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
