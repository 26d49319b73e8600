//! Client configuration, read once at startup.

use std::time::Duration;

use anyhow::{Context, Result};

/// Backend base URL. Empty means same origin.
pub const API_URL_ENV: &str = "VOC_API_URL";
/// Optional per-request timeout in seconds.
pub const TIMEOUT_ENV: &str = "VOC_API_TIMEOUT_SECS";
/// Admin password for the settings commands.
pub const ADMIN_PASSWORD_ENV: &str = "VOC_ADMIN_PASSWORD";

/// Where "same origin" points for a terminal client: the backend's dev address.
const SAME_ORIGIN: &str = "http://127.0.0.1:8000";

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: SAME_ORIGIN.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from CLI overrides, then the process environment.
    pub fn resolve(api_url: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        Self::resolve_with(api_url, timeout_secs, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let base_url = api_url
            .or_else(|| lookup(API_URL_ENV))
            .unwrap_or_default();

        let timeout_secs = match timeout_secs {
            Some(secs) => Some(secs),
            None => lookup(TIMEOUT_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{TIMEOUT_ENV} must be a number of seconds, got {v:?}"))
                })
                .transpose()?,
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
        })
    }

    /// Absolute URL for an API path such as `/api/chat`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        SAME_ORIGIN.to_string()
    } else {
        trimmed.to_string()
    }
}
