//! cache_buckets tool implementation.
//!
//! Lists every cache bucket with the URLs stored in it.

use paper_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One bucket in the listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BucketSummary {
    pub name: String,
    /// Whether this bucket belongs to the active worker.
    pub current: bool,
    pub entries: u64,
    pub urls: Vec<String>,
}

/// Output from the cache_buckets tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheBucketsOutput {
    /// Version key of the active worker, if one is active.
    pub current: Option<String>,
    pub buckets: Vec<BucketSummary>,
}

/// Implementation of the cache_buckets tool.
pub async fn buckets_impl(cache: &CacheDb, current: Option<&str>) -> Result<CallToolResult, McpError> {
    let mut buckets = Vec::new();
    for name in cache.bucket_names().await? {
        let entries = cache.entry_count(&name).await?;
        let urls = cache.entry_urls(&name).await?;
        buckets.push(BucketSummary { current: Some(name.as_str()) == current, name, entries, urls });
    }

    let output = CacheBucketsOutput { current: current.map(str::to_string), buckets };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_core::{AssetRequest, AssetResponse};
    use url::Url;

    fn output_of(result: CallToolResult) -> CacheBucketsOutput {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_buckets_empty() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let output = output_of(buckets_impl(&cache, None).await.unwrap());
        assert!(output.current.is_none());
        assert!(output.buckets.is_empty());
    }

    #[tokio::test]
    async fn test_buckets_listing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.open_bucket("paper-cache-v1").await.unwrap();
        let request = AssetRequest::get(Url::parse("https://paper.example/index.html").unwrap());
        let response = AssetResponse {
            status: 200,
            status_text: "OK".into(),
            headers: Vec::new(),
            body: bytes::Bytes::from_static(b"<html>"),
        };
        cache.put_entry("paper-cache-v1", &request, &response).await.unwrap();

        let output = output_of(buckets_impl(&cache, Some("paper-cache-v1")).await.unwrap());
        assert_eq!(output.current.as_deref(), Some("paper-cache-v1"));
        assert_eq!(output.buckets.len(), 1);
        assert!(output.buckets[0].current);
        assert_eq!(output.buckets[0].entries, 1);
        assert_eq!(output.buckets[0].urls, vec!["https://paper.example/index.html".to_string()]);
    }
}
