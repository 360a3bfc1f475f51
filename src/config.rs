//! Client configuration and environment validation
//!
//! The DonorLink client reads its configuration from environment variables
//! at startup and fails fast with a typed error naming the offending
//! variable, instead of surfacing a broken base URL at the first fetch.

use std::time::Duration;

use thiserror::Error;

/// Required: absolute http(s) base URL of the DonorLink API
pub const API_URL_VAR: &str = "DONORLINK_API_URL";
/// Optional: default cache TTL in whole seconds
pub const CACHE_TTL_VAR: &str = "DONORLINK_CACHE_TTL_SECS";
/// Optional: `true`/`false` (or `1`/`0`); false bypasses the cache
pub const CACHE_ENABLED_VAR: &str = "DONORLINK_CACHE_ENABLED";

const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Error types for configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// A variable is present but its value is unusable
    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Validated configuration for [`DonorLinkApi`](crate::client::DonorLinkApi)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub api_base_url: String,
    /// TTL applied to cached resources
    pub default_ttl: Duration,
    /// When false, the cache is bypassed: every read fetches from the
    /// network and never serves a previously stored value
    pub cache_enabled: bool,
}

impl ClientConfig {
    /// Creates a configuration with the default TTL and caching enabled
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when `api_base_url` is not an
    /// absolute http(s) URL.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let api_base_url = validate_base_url(api_base_url.into())?;
        Ok(Self {
            api_base_url,
            default_ttl: DEFAULT_TTL,
            cache_enabled: true,
        })
    }

    /// Overrides the default cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Enables or disables caching
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Builds the configuration from the process environment
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` when `DONORLINK_API_URL` is set and every
    ///   present optional variable validates
    /// * `Err(ConfigError)` naming the first variable that failed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var(API_URL_VAR).ok(),
            std::env::var(CACHE_TTL_VAR).ok(),
            std::env::var(CACHE_ENABLED_VAR).ok(),
        )
    }

    /// Builds the configuration from raw variable values
    ///
    /// Split out of [`from_env`](Self::from_env) so validation is testable
    /// without mutating process-wide environment state.
    fn from_values(
        api_url: Option<String>,
        ttl_secs: Option<String>,
        cache_enabled: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::new(api_url.ok_or(ConfigError::Missing(API_URL_VAR))?)?;

        if let Some(raw) = ttl_secs {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: CACHE_TTL_VAR,
                reason: format!("'{raw}' is not a whole number of seconds"),
            })?;
            config.default_ttl = Duration::from_secs(secs);
        }

        if let Some(raw) = cache_enabled {
            config.cache_enabled = match raw.trim().to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: CACHE_ENABLED_VAR,
                        reason: format!("'{raw}' is not a boolean (expected true/false or 1/0)"),
                    })
                }
            };
        }

        Ok(config)
    }
}

/// Checks that the base URL is absolute http(s) and strips a trailing slash
fn validate_base_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        // The remainder must begin with a host segment; an empty host or a
        // bare path like `https:///api` is rejected.
        Some(host) if !host.is_empty() && !host.starts_with('/') => {
            Ok(trimmed.trim_end_matches('/').to_string())
        }
        _ => Err(ConfigError::Invalid {
            var: API_URL_VAR,
            reason: format!("'{trimmed}' is not an absolute http(s) URL"),
        }),
    }
}
