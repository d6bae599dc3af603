//! archive_open tool implementation.
//!
//! Validates a URL and returns the archive lookup to navigate to.

use paper_client::{ArchiveFlow, Submission};
use paper_core::Error;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for archive_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArchiveOpenParams {
    /// The URL to look up in the archive. Surrounding whitespace is ignored.
    pub url: String,
}

/// Output structure for archive_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArchiveOpenOutput {
    /// Whether the input passed validation.
    pub valid: bool,
    /// User-facing validation message; empty when valid.
    pub message: String,
    /// Navigation target, present when valid.
    pub archive_url: Option<String>,
    /// Warning to show before navigating (probe timed out or failed).
    pub warning: Option<String>,
    /// Milliseconds to wait before navigating.
    pub redirect_delay_ms: u64,
}

impl From<Submission> for ArchiveOpenOutput {
    fn from(submission: Submission) -> Self {
        match submission {
            Submission::Rejected(result) => Self {
                valid: false,
                message: result.message,
                archive_url: None,
                warning: None,
                redirect_delay_ms: 0,
            },
            Submission::Navigate(nav) => Self {
                valid: true,
                message: String::new(),
                archive_url: Some(nav.target),
                warning: nav.warning,
                redirect_delay_ms: nav.delay.as_millis() as u64,
            },
        }
    }
}

/// Implementation of the archive_open tool.
///
/// Input errors are reported in the output, not as a tool error.
pub async fn open_impl(flow: &ArchiveFlow, params: ArchiveOpenParams) -> Result<CallToolResult, McpError> {
    let output = ArchiveOpenOutput::from(flow.submit(&params.url).await);

    if output.valid {
        tracing::info!(archive_url = output.archive_url.as_deref().unwrap_or_default(), "archive lookup ready");
    } else {
        tracing::debug!(message = %output.message, "archive lookup rejected");
    }

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_client::archive::{AnyUrl, NewsArticle, RedirectPolicy};
    use paper_core::config::LinkStyle;

    fn output_of(result: CallToolResult) -> ArchiveOpenOutput {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_open_valid_url() {
        let flow = ArchiveFlow::new(Box::new(AnyUrl), LinkStyle::Latest, RedirectPolicy::Direct);
        let params = ArchiveOpenParams { url: "https://example.com/any/path".into() };

        let output = output_of(open_impl(&flow, params).await.unwrap());
        assert!(output.valid);
        assert_eq!(output.message, "");
        assert_eq!(
            output.archive_url.as_deref(),
            Some("https://archive.is/latest/https%3A%2F%2Fexample.com%2Fany%2Fpath")
        );
        assert_eq!(output.warning, None);
        assert_eq!(output.redirect_delay_ms, 0);
    }

    #[tokio::test]
    async fn test_open_invalid_url() {
        let flow = ArchiveFlow::new(Box::new(AnyUrl), LinkStyle::Latest, RedirectPolicy::Direct);
        let params = ArchiveOpenParams { url: "not-a-url".into() };

        let output = output_of(open_impl(&flow, params).await.unwrap());
        assert!(!output.valid);
        assert_eq!(output.message, "Please enter a valid URL");
        assert!(output.archive_url.is_none());
    }

    #[tokio::test]
    async fn test_open_news_policy() {
        let flow = ArchiveFlow::new(Box::new(NewsArticle), LinkStyle::Latest, RedirectPolicy::Direct);

        let output =
            output_of(open_impl(&flow, ArchiveOpenParams { url: "https://example.com/shop".into() }).await.unwrap());
        assert_eq!(output.message, "URL does not appear to be a news article");

        let output = output_of(
            open_impl(&flow, ArchiveOpenParams { url: "https://example.com/news/article123".into() })
                .await
                .unwrap(),
        );
        assert!(output.valid);
    }
}
