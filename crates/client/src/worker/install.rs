//! Install-time pre-population of the current bucket.

use paper_core::{AssetRequest, CacheDb, Error};

use super::Fetcher;

/// What happened to one manifest asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Cached,
    /// Fetched, but the status was not 200.
    Skipped { status: u16 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResult {
    pub url: String,
    pub outcome: AssetOutcome,
}

/// Per-asset results of one install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub assets: Vec<AssetResult>,
}

impl InstallReport {
    pub fn cached(&self) -> usize {
        self.assets.iter().filter(|a| a.outcome == AssetOutcome::Cached).count()
    }

    pub fn failed(&self) -> usize {
        self.assets.len() - self.cached()
    }
}

/// Fetch and store every request, recording each outcome.
///
/// Individual failures never abort the fold.
pub(crate) async fn precache(
    db: &CacheDb, network: &dyn Fetcher, bucket: &str, requests: &[AssetRequest],
) -> InstallReport {
    let mut report = InstallReport::default();

    for request in requests {
        let outcome = match cache_one(db, network, bucket, request).await {
            Ok(outcome) => outcome,
            Err(e) => AssetOutcome::Failed { reason: e.to_string() },
        };

        match &outcome {
            AssetOutcome::Cached => tracing::debug!("precached {}", request.url),
            AssetOutcome::Skipped { status } => {
                tracing::warn!(url = %request.url, status, "precache skipped non-200 response")
            }
            AssetOutcome::Failed { reason } => tracing::warn!(url = %request.url, %reason, "precache failed"),
        }

        report.assets.push(AssetResult { url: request.url.to_string(), outcome });
    }

    report
}

async fn cache_one(
    db: &CacheDb, network: &dyn Fetcher, bucket: &str, request: &AssetRequest,
) -> Result<AssetOutcome, Error> {
    let response = network.fetch(request).await?;
    if !response.is_cacheable() {
        return Ok(AssetOutcome::Skipped { status: response.status });
    }
    if !db.put_entry(bucket, request, &response).await? {
        return Ok(AssetOutcome::Failed { reason: format!("bucket {bucket} does not exist") });
    }
    Ok(AssetOutcome::Cached)
}
