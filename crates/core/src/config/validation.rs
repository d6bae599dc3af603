//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `probe_timeout_ms` is less than 100ms or exceeds 1 minute
    /// - `redirect_delay_ms` exceeds 10 seconds
    /// - `user_agent` or `cache_name` is empty
    /// - `origin` is not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if !(100..=60_000).contains(&self.probe_timeout_ms) {
            return Err(ConfigError::Invalid {
                field: "probe_timeout_ms".into(),
                reason: "must be between 100ms and 60000ms".into(),
            });
        }
        if self.redirect_delay_ms > 10_000 {
            return Err(ConfigError::Invalid {
                field: "redirect_delay_ms".into(),
                reason: "must not exceed 10000ms".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        let origin = self.origin_url()?;
        if !origin.path().ends_with('/') {
            tracing::warn!(
                origin = %origin,
                "origin path does not end with '/'; precache paths resolve against its parent directory"
            );
        }

        if self.precache.is_empty() {
            tracing::warn!("precache manifest is empty; nothing will be available offline until fetched once");
        }

        Ok(())
    }
}
