//! Client configuration read from the environment
//!
//!   FINANCE_API_URL            base URL of the backend (default http://localhost:8000)
//!   FINANCE_API_TIMEOUT_SECS   optional per-request timeout; unset means none
//!   FINANCE_API_LIST_LIMIT     rows requested from /transactions (default 100)

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Connection settings for [`crate::client::HttpFinanceApi`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,

    /// Per-request timeout. The enrichment core imposes none of its own, so a
    /// hung request stays `loading` unless this is set.
    pub timeout: Option<Duration>,

    pub list_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FINANCE_API_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        if let Some(raw) = lookup("FINANCE_API_TIMEOUT_SECS").filter(|v| !v.trim().is_empty()) {
            let secs = raw.trim().parse::<f64>().unwrap_or(f64::NAN);
            config.timeout = Some(timeout_from_secs("FINANCE_API_TIMEOUT_SECS", secs, &raw)?);
        }

        if let Some(raw) = lookup("FINANCE_API_LIST_LIMIT").filter(|v| !v.trim().is_empty()) {
            config.list_limit = raw.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or(ConfigError::Invalid {
                var: "FINANCE_API_LIST_LIMIT",
                expected: "a positive integer",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    /// Apply explicitly given settings (e.g. command-line flags) on top
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        timeout_secs: Option<f64>,
        list_limit: Option<u32>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = base_url {
            if url.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "--api-url",
                    expected: "a non-empty URL",
                    value: url,
                });
            }
            self.base_url = url.trim().to_string();
        }

        if let Some(secs) = timeout_secs {
            self.timeout = Some(timeout_from_secs("--timeout-secs", secs, &secs.to_string())?);
        }

        if let Some(limit) = list_limit {
            if limit == 0 {
                return Err(ConfigError::Invalid {
                    var: "--list-limit",
                    expected: "a positive integer",
                    value: limit.to_string(),
                });
            }
            self.list_limit = limit;
        }

        Ok(self)
    }
}

/// Positive, finite and small enough for a `Duration`
fn timeout_from_secs(var: &'static str, secs: f64, raw: &str) -> Result<Duration, ConfigError> {
    Some(secs)
        .filter(|s| *s > 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .ok_or_else(|| ConfigError::Invalid {
            var,
            expected: "a positive number of seconds",
            value: raw.to_string(),
        })
}
