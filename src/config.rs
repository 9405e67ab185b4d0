//! Service configuration parsed from environment variables.

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the POS backend, without a trailing `/`.
    pub base_url: String,
    pub tenant_id: i64,
    /// Bearer token attached to every request, when set.
    pub api_token: Option<String>,
    pub timeouts: ServiceTimeouts,
}

impl ServiceConfig {
    /// Build typed service config from environment variables.
    ///
    /// Required:
    /// - `FLOORPLAN_TENANT_ID`: integer tenant id
    ///
    /// Optional:
    /// - `FLOORPLAN_API_URL`: default `http://localhost:8000`
    /// - `FLOORPLAN_API_TOKEN_ENV`: names the env var containing the bearer token
    /// - `FLOORPLAN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FLOORPLAN_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the tenant id is missing or not an integer,
    /// or if `FLOORPLAN_API_TOKEN_ENV` names a variable that is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tenant_raw = std::env::var("FLOORPLAN_TENANT_ID")
            .map_err(|_| ConfigError::Missing { var: "FLOORPLAN_TENANT_ID".into() })?;
        let tenant_id = tenant_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::Invalid { var: "FLOORPLAN_TENANT_ID".into(), value: tenant_raw.clone() })?;

        let base_url = std::env::var("FLOORPLAN_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_token = match std::env::var("FLOORPLAN_API_TOKEN_ENV") {
            Ok(token_var) => {
                let token = std::env::var(&token_var).map_err(|_| ConfigError::Missing { var: token_var.clone() })?;
                Some(token)
            }
            Err(_) => None,
        };

        let timeouts = ServiceTimeouts {
            request_secs: env_parse_u64("FLOORPLAN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("FLOORPLAN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, tenant_id, api_token, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).map_or(default, |v| v.trim().parse::<u64>().unwrap_or(default))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
