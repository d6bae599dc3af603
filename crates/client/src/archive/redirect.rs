//! Submission flow: validate, build the archive link, optionally probe it.
//!
//! Only input errors stop a submission. A probe that times out or fails only
//! adds a warning and a short delay before the navigation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use paper_core::AppConfig;
use paper_core::config::{LinkStyle, RedirectMode};

use super::link::build_link;
use super::validate::{UrlPolicy, ValidationResult, policy_for, validate};

pub const SLOW_ARCHIVE_WARNING: &str = "Archive service is taking too long to respond. Redirecting anyway...";
pub const BUSY_ARCHIVE_WARNING: &str = "Archive service may be busy. Redirecting anyway...";

/// Why a probe did not succeed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,

    #[error("probe failed: {0}")]
    Failed(String),
}

/// Reachability check against an archive link.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Any response counts as reachable; only transport failures are errors.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<(), ProbeError>;
}

/// How a validated submission is turned into a navigation.
#[derive(Clone)]
pub enum RedirectPolicy {
    Direct,
    Probe { prober: Arc<dyn Probe>, timeout: Duration, fallback_delay: Duration },
}

impl std::fmt::Debug for RedirectPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedirectPolicy::Direct => f.write_str("Direct"),
            RedirectPolicy::Probe { timeout, fallback_delay, .. } => f
                .debug_struct("Probe")
                .field("timeout", timeout)
                .field("fallback_delay", fallback_delay)
                .finish_non_exhaustive(),
        }
    }
}

/// Where to send the user, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub target: String,
    /// Shown to the user before navigating when the probe did not succeed.
    pub warning: Option<String>,
    /// How long to leave the warning up before navigating.
    #[serde(rename = "delay_ms", serialize_with = "as_millis")]
    pub delay: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Input error; nothing to navigate to.
    Rejected(ValidationResult),
    Navigate(Navigation),
}

/// Validator policy, link template and redirect policy, chosen once.
pub struct ArchiveFlow {
    policy: Box<dyn UrlPolicy>,
    style: LinkStyle,
    redirect: RedirectPolicy,
}

impl ArchiveFlow {
    pub fn new(policy: Box<dyn UrlPolicy>, style: LinkStyle, redirect: RedirectPolicy) -> Self {
        Self { policy, style, redirect }
    }

    /// Assemble the flow selected by configuration.
    ///
    /// `prober` is only used when `config.redirect` is `probe`.
    pub fn from_config(config: &AppConfig, prober: Arc<dyn Probe>) -> Self {
        let redirect = match config.redirect {
            RedirectMode::Direct => RedirectPolicy::Direct,
            RedirectMode::Probe => RedirectPolicy::Probe {
                prober,
                timeout: config.probe_timeout(),
                fallback_delay: config.redirect_delay(),
            },
        };
        Self::new(policy_for(config.url_policy), config.archive_link_style, redirect)
    }

    /// Validate only, without building anything.
    pub fn check(&self, input: &str) -> ValidationResult {
        validate(input.trim(), self.policy.as_ref())
    }

    /// Handle one submission of free-text input.
    pub async fn submit(&self, input: &str) -> Submission {
        let url = input.trim();
        let validation = validate(url, self.policy.as_ref());
        if !validation.is_valid {
            return Submission::Rejected(validation);
        }

        let target = build_link(self.style, url);

        let navigation = match &self.redirect {
            RedirectPolicy::Direct => Navigation { target, warning: None, delay: Duration::ZERO },
            RedirectPolicy::Probe { prober, timeout, fallback_delay } => match prober.probe(&target, *timeout).await {
                Ok(()) => Navigation { target, warning: None, delay: Duration::ZERO },
                Err(e) => {
                    tracing::warn!(
                        target_url = %target,
                        error = %e,
                        "archive probe did not succeed, redirecting anyway"
                    );
                    let warning = match e {
                        ProbeError::Timeout => SLOW_ARCHIVE_WARNING,
                        ProbeError::Failed(_) => BUSY_ARCHIVE_WARNING,
                    };
                    Navigation { target, warning: Some(warning.to_string()), delay: *fallback_delay }
                }
            },
        };

        Submission::Navigate(navigation)
    }
}
