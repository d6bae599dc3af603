//! URL validation with a pluggable acceptance policy.
//!
//! Syntax is delegated entirely to [`url::Url::parse`]; a [`UrlPolicy`] may
//! then reject URLs that parse but are not wanted.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use paper_core::config::UrlPolicyKind;

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";
pub const NOT_NEWS_MESSAGE: &str = "URL does not appear to be a news article";

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Empty when valid.
    pub message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, message: String::new() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, message: message.into() }
    }
}

/// Extra acceptance rule applied to URLs that parsed successfully.
pub trait UrlPolicy: Send + Sync {
    /// `Err` carries the user-facing rejection message.
    fn check(&self, url: &Url) -> Result<(), String>;
}

/// Accepts every absolute URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyUrl;

impl UrlPolicy for AnyUrl {
    fn check(&self, _url: &Url) -> Result<(), String> {
        Ok(())
    }
}

/// Section markers that identify article pages on most news sites.
const NEWS_SECTIONS: &[&str] = &[
    "/news/",
    "/article/",
    "/articles/",
    "/story/",
    "/stories/",
    "/blog/",
    "/blogs/",
    "/post/",
    "/posts/",
    "/opinion/",
    "/politics/",
    "/world/",
    "/business/",
    "/technology/",
    "/science/",
    "/health/",
    "/sport/",
    "/sports/",
];

static DATED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(19|20)\d{2}/(0?[1-9]|1[0-2])(/|$)|(19|20)\d{2}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])")
        .expect("date pattern is valid")
});

static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6,}").expect("id pattern is valid"));

/// Accepts URLs whose path or query looks like a news article.
///
/// A URL qualifies if its lower-cased path or query contains a known section
/// marker, or its path carries a date (`/2024/05/`, `2024-05-17`) or a long
/// numeric story id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsArticle;

impl UrlPolicy for NewsArticle {
    fn check(&self, url: &Url) -> Result<(), String> {
        let path = url.path().to_lowercase();
        let query = url.query().unwrap_or("").to_lowercase();

        let has_section = NEWS_SECTIONS
            .iter()
            .any(|section| path.contains(section) || query.contains(section));

        if has_section || DATED_PATH.is_match(&path) || NUMERIC_ID.is_match(&path) {
            Ok(())
        } else {
            Err(NOT_NEWS_MESSAGE.to_string())
        }
    }
}

/// Build the policy selected by configuration.
pub fn policy_for(kind: UrlPolicyKind) -> Box<dyn UrlPolicy> {
    match kind {
        UrlPolicyKind::Any => Box::new(AnyUrl),
        UrlPolicyKind::News => Box::new(NewsArticle),
    }
}

/// Validate `input` as an absolute URL, then apply `policy`.
pub fn validate(input: &str, policy: &dyn UrlPolicy) -> ValidationResult {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "rejected unparseable URL");
            return ValidationResult::invalid(INVALID_URL_MESSAGE);
        }
    };

    match policy.check(&url) {
        Ok(()) => ValidationResult::valid(),
        Err(message) => ValidationResult::invalid(message),
    }
}

/// Validate with the default policy (any absolute URL).
pub fn validate_url(input: &str) -> ValidationResult {
    validate(input, &AnyUrl)
}
