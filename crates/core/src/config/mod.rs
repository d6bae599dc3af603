//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAPER_*)
//! 2. TOML config file (if PAPER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Version key naming the current asset cache bucket.
pub const DEFAULT_CACHE_NAME: &str = "paper-cache-v1";

/// Assets pre-populated into the bucket at install time, relative to the origin.
pub const DEFAULT_PRECACHE: &[&str] = &[
    ".",
    "index.html",
    "style.css",
    "app.js",
    "manifest.json",
    "icons/icon-192.png",
    "icons/icon-512.png",
    "icons/apple-touch-icon.png",
];

/// Which archive lookup template to build links with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `https://archive.is/latest/<encoded>`
    #[default]
    Latest,
    /// `https://archive.is/<encoded>`
    Plain,
}

impl LinkStyle {
    pub fn prefix(self) -> &'static str {
        match self {
            LinkStyle::Latest => "https://archive.is/latest/",
            LinkStyle::Plain => "https://archive.is/",
        }
    }
}

/// Which validator policy runs after URL parsing succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlPolicyKind {
    /// Any parseable absolute URL.
    #[default]
    Any,
    /// Only URLs that look like news articles.
    News,
}

/// How a validated submission turns into a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    /// Navigate straight to the archive link.
    #[default]
    Direct,
    /// Probe the archive link first; navigate regardless of the outcome.
    Probe,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAPER_*)
/// 2. TOML config file (if PAPER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache storage.
    ///
    /// Set via PAPER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PAPER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per asset response.
    ///
    /// Set via PAPER_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Asset request timeout in milliseconds.
    ///
    /// Set via PAPER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Version key of the current cache bucket.
    ///
    /// Set via PAPER_CACHE_NAME environment variable. Changing it makes the
    /// next activation delete every bucket with a different name.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Base URL the tool's own assets are served from.
    ///
    /// Set via PAPER_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Asset paths pre-populated at install, relative to `origin`.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Archive link template.
    ///
    /// Set via PAPER_ARCHIVE_LINK_STYLE (`latest` or `plain`).
    #[serde(default)]
    pub archive_link_style: LinkStyle,

    /// Validator policy.
    ///
    /// Set via PAPER_URL_POLICY (`any` or `news`).
    #[serde(default)]
    pub url_policy: UrlPolicyKind,

    /// Redirect policy.
    ///
    /// Set via PAPER_REDIRECT (`direct` or `probe`).
    #[serde(default)]
    pub redirect: RedirectMode,

    /// Bounded wait for the archive probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Delay before navigating after a failed probe, in milliseconds.
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./paper-cache.sqlite")
}

fn default_user_agent() -> String {
    "paper/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.into()
}

fn default_origin() -> String {
    "http://127.0.0.1:8080/".into()
}

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect()
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_redirect_delay_ms() -> u64 {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            cache_name: default_cache_name(),
            origin: default_origin(),
            precache: default_precache(),
            archive_link_style: LinkStyle::default(),
            url_policy: UrlPolicyKind::default(),
            redirect: RedirectMode::default(),
            probe_timeout_ms: default_probe_timeout_ms(),
            redirect_delay_ms: default_redirect_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// The parsed origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAPER_`
    /// 2. TOML file from `PAPER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAPER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAPER_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
