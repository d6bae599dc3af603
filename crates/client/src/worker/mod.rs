//! Offline asset worker: cache-first serving of the tool's own assets.
//!
//! ### Lifecycle
//! - `Uninstalled → Installing → Installed → Activating → Active`
//! - `Redundant` after a failed install or once superseded
//!
//! ### Install
//! - Open the bucket named by the version key
//! - Pre-populate it from the manifest; per-asset failures are swallowed
//!
//! ### Activate
//! - Delete every bucket whose name differs from the version key
//!
//! ### Fetch
//! - Cache hit → stored response, no network
//! - Miss → network; 200 responses are stored before returning
//! - Network unreachable → synthetic 503; other fetch errors are returned

pub mod event;
pub mod install;
pub mod registration;

use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, oneshot};
use url::Url;

use paper_core::{AppConfig, AssetRequest, AssetResponse, CacheDb, Error};

use crate::fetch::Fetcher;

pub use event::{ExtendableEvent, Step, WorkToken};
pub use install::{AssetOutcome, AssetResult, InstallReport};
pub use registration::Registration;

/// Lifecycle state of one worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninstalled,
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Static description of a worker generation.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Version key; also the name of the bucket this generation owns.
    pub cache_name: String,
    /// Base URL of the tool. Only requests under it are intercepted.
    pub origin: Url,
    /// Manifest paths, relative to `origin`.
    pub precache: Vec<String>,
}

impl WorkerConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { cache_name: config.cache_name.clone(), origin, precache: config.precache.clone() })
    }

    /// Manifest entries resolved against the origin.
    pub fn precache_requests(&self) -> Result<Vec<AssetRequest>, Error> {
        self.precache
            .iter()
            .map(|path| {
                self.origin
                    .join(path)
                    .map(AssetRequest::get)
                    .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
            })
            .collect()
    }

    /// Whether `url` belongs to the tool's own origin and path.
    pub fn in_scope(&self, url: &Url) -> bool {
        within_scope(&self.origin, url)
    }
}

/// Whether `url` shares `base`'s origin and sits under its path.
pub fn within_scope(base: &Url, url: &Url) -> bool {
    url.origin() == base.origin() && url.path().starts_with(base.path())
}

/// One generation of the asset worker.
pub struct AssetWorker {
    config: WorkerConfig,
    db: CacheDb,
    network: Arc<dyn Fetcher>,
    state: RwLock<WorkerState>,
}

impl AssetWorker {
    pub fn new(config: WorkerConfig, db: CacheDb, network: Arc<dyn Fetcher>) -> Self {
        Self { config, db, network, state: RwLock::new(WorkerState::Uninstalled) }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::WorkerState(format!("cannot enter {to} from {}; expected {from}", *state)));
        }
        *state = to;
        tracing::info!(cache = %self.config.cache_name, %from, %to, "worker state changed");
        Ok(())
    }

    async fn set_state(&self, to: WorkerState) {
        *self.state.write().await = to;
    }

    /// Install: open the bucket and pre-populate it.
    ///
    /// Only a storage failure opening the bucket fails the install; per-asset
    /// problems end up in the report.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(WorkerState::Uninstalled, WorkerState::Installing).await?;

        let requests = match self.config.precache_requests() {
            Ok(requests) => requests,
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                return Err(e);
            }
        };

        let event = ExtendableEvent::new(Step::Install);
        let (report_tx, report_rx) = oneshot::channel();
        let db = self.db.clone();
        let network = Arc::clone(&self.network);
        let bucket = self.config.cache_name.clone();

        event.wait_until(async move {
            db.open_bucket(&bucket).await?;
            let report = install::precache(&db, network.as_ref(), &bucket, &requests).await;
            let _ = report_tx.send(report);
            Ok(())
        });

        if let Err(e) = event.settle().await {
            self.set_state(WorkerState::Redundant).await;
            return Err(e);
        }

        let report = report_rx.await.unwrap_or_default();
        tracing::info!(
            cache = %self.config.cache_name,
            cached = report.cached(),
            failed = report.failed(),
            "install complete"
        );

        self.transition(WorkerState::Installing, WorkerState::Installed).await?;
        Ok(report)
    }

    /// Activate: delete every bucket that is not this generation's.
    ///
    /// Returns the names of the deleted buckets.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating).await?;

        let event = ExtendableEvent::new(Step::Activate);
        let (purged_tx, purged_rx) = oneshot::channel();
        let db = self.db.clone();
        let current = self.config.cache_name.clone();

        event.wait_until(async move {
            let mut purged = Vec::new();
            for name in db.bucket_names().await? {
                if name != current && db.delete_bucket(&name).await? {
                    tracing::info!(bucket = %name, "deleted stale cache bucket");
                    purged.push(name);
                }
            }
            let _ = purged_tx.send(purged);
            Ok(())
        });

        if let Err(e) = event.settle().await {
            // Stays installed so activation can be retried.
            self.set_state(WorkerState::Installed).await;
            return Err(e);
        }

        self.transition(WorkerState::Activating, WorkerState::Active).await?;
        Ok(purged_rx.await.unwrap_or_default())
    }

    /// Mark this generation as superseded.
    pub async fn retire(&self) {
        self.set_state(WorkerState::Redundant).await;
        tracing::info!(cache = %self.config.cache_name, "worker retired");
    }

    /// Fetch handler: cache first, then network, then the offline response.
    ///
    /// # Errors
    ///
    /// Returns `Error::WorkerState` if the worker is not active. When the
    /// network cannot be reached (`HttpError`, `FetchTimeout`) the offline
    /// response is served instead of an error; any other fetch error, such as
    /// an oversized body, is returned as-is.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<AssetResponse, Error> {
        let state = self.state().await;
        if state != WorkerState::Active {
            return Err(Error::WorkerState(format!("fetch handled by worker in state {state}")));
        }
        self.respond(request).await
    }

    async fn respond(&self, request: &AssetRequest) -> Result<AssetResponse, Error> {
        let bucket = &self.config.cache_name;

        if request.is_get() {
            match self.db.match_entry(bucket, request).await {
                Ok(Some(hit)) => {
                    tracing::debug!("cache hit for {}", request.url);
                    return Ok(hit);
                }
                Ok(None) => tracing::debug!("cache miss for {}", request.url),
                Err(e) => tracing::warn!(url = %request.url, error = %e, "cache lookup failed, using network"),
            }
        }

        let response = match self.network.fetch(request).await {
            Ok(response) => response,
            Err(e @ (Error::HttpError(_) | Error::FetchTimeout(_))) => {
                tracing::warn!(url = %request.url, error = %e, "network failed, serving offline response");
                return Ok(AssetResponse::offline());
            }
            Err(e) => return Err(e),
        };

        if request.is_get() && response.is_cacheable() {
            match self.db.put_entry(bucket, request, &response).await {
                Ok(true) => {}
                Ok(false) => tracing::debug!(bucket = %bucket, "bucket gone, not storing {}", request.url),
                Err(e) => tracing::warn!(url = %request.url, error = %e, "failed to store response"),
            }
        }

        Ok(response)
    }
}
