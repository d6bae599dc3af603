//! asset_fetch tool implementation.
//!
//! Requests one of the tool's own assets the way the page would, through the
//! active worker's cache-first handler.

use paper_client::{Registration, within_scope};
use paper_core::{AssetRequest, Error};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Input parameters for asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchParams {
    /// Asset path relative to the configured origin (e.g. "style.css").
    pub path: String,

    /// HTTP method (default: GET). Only GET requests are cached.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchOutput {
    /// Absolute URL that was requested.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    /// Body length in bytes.
    pub bytes: usize,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

/// HTTP token characters allowed in a method name.
fn is_method(method: &str) -> bool {
    !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}

/// Implementation of the asset_fetch tool.
///
/// Only paths under `origin` are served; anything that resolves elsewhere is
/// rejected before a request is made.
pub async fn fetch_impl(
    registration: &Registration, origin: &Url, params: AssetFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.path.trim().is_empty() {
        return Err(Error::InvalidInput("path cannot be empty".into()).into());
    }
    if !is_method(&params.method) {
        return Err(Error::InvalidInput(format!("invalid method: {:?}", params.method)).into());
    }

    let url = origin
        .join(params.path.trim())
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.path)))?;
    if !within_scope(origin, &url) {
        return Err(Error::InvalidInput(format!("{url} is outside {origin}")).into());
    }
    let request = AssetRequest::new(&params.method, url);

    let response = registration.fetch(&request).await?;

    let output = AssetFetchOutput {
        url: request.url.to_string(),
        status: response.status,
        status_text: response.status_text.clone(),
        content_type: response.content_type().map(str::to_string),
        bytes: response.body.len(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
