//! Controller bookkeeping for one origin.

use std::sync::Arc;

use tokio::sync::RwLock;

use paper_core::{AssetRequest, AssetResponse, Error};

use super::{AssetWorker, InstallReport};
use crate::fetch::Fetcher;

/// Holds the active worker for an origin and routes requests through it.
///
/// At most one worker controls the origin. Registering a new generation
/// installs and activates it immediately, then retires the previous one.
pub struct Registration {
    controller: RwLock<Option<Arc<AssetWorker>>>,
    network: Arc<dyn Fetcher>,
}

impl Registration {
    /// `network` serves requests that no worker intercepts.
    pub fn new(network: Arc<dyn Fetcher>) -> Self {
        Self { controller: RwLock::new(None), network }
    }

    /// Install and activate `worker`, then make it the controller.
    ///
    /// On failure the previous controller, if any, stays in place.
    pub async fn register(&self, worker: Arc<AssetWorker>) -> Result<InstallReport, Error> {
        let report = worker.install().await?;
        worker.activate().await?;

        let previous = self.controller.write().await.replace(Arc::clone(&worker));
        tracing::info!(cache = worker.cache_name(), "worker claimed clients");

        if let Some(previous) = previous
            && !Arc::ptr_eq(&previous, &worker)
        {
            previous.retire().await;
        }

        Ok(report)
    }

    pub async fn controller(&self) -> Option<Arc<AssetWorker>> {
        self.controller.read().await.clone()
    }

    /// Route a request the way a controlled page would issue it.
    ///
    /// In-scope requests go through the active worker's fetch handler and
    /// always produce a response. Everything else goes straight to the
    /// network and may fail.
    pub async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, Error> {
        let controller = self.controller().await;
        match controller {
            Some(worker) if worker.config().in_scope(&request.url) => worker.handle_fetch(request).await,
            _ => {
                tracing::debug!("uncontrolled request for {}", request.url);
                self.network.fetch(request).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNetwork;
    use crate::worker::{WorkerConfig, WorkerState};
    use paper_core::CacheDb;
    use url::Url;

    fn worker(cache_name: &str, db: &CacheDb, network: Arc<FakeNetwork>) -> Arc<AssetWorker> {
        let config = WorkerConfig {
            cache_name: cache_name.into(),
            origin: Url::parse("https://paper.example/").unwrap(),
            precache: vec!["index.html".into()],
        };
        Arc::new(AssetWorker::new(config, db.clone(), network))
    }

    fn site() -> Arc<FakeNetwork> {
        Arc::new(
            FakeNetwork::new()
                .serve("https://paper.example/index.html", 200, "<html>")
                .serve("https://cdn.example/lib.js", 200, "lib()"),
        )
    }

    #[tokio::test]
    async fn test_uncontrolled_requests_pass_through() {
        let network = site();
        let registration = Registration::new(network.clone());

        let request = AssetRequest::get(Url::parse("https://paper.example/index.html").unwrap());
        let response = registration.fetch(&request).await.unwrap();
        assert_eq!(response.status, 200);

        network.go_offline();
        assert!(registration.fetch(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_register_takes_control() {
        let network = site();
        let db = CacheDb::open_in_memory().await.unwrap();
        let registration = Registration::new(network.clone());

        let v1 = worker("paper-cache-v1", &db, network.clone());
        let report = registration.register(v1.clone()).await.unwrap();
        assert_eq!(report.cached(), 1);
        assert_eq!(v1.state().await, WorkerState::Active);

        network.go_offline();
        let request = AssetRequest::get(Url::parse("https://paper.example/index.html").unwrap());
        let response = registration.fetch(&request).await.unwrap();
        assert_eq!(&response.body[..], b"<html>");

        let offline = registration
            .fetch(&AssetRequest::get(Url::parse("https://paper.example/app.js").unwrap()))
            .await
            .unwrap();
        assert_eq!(offline.status, 503);
    }

    #[tokio::test]
    async fn test_out_of_scope_not_intercepted() {
        let network = site();
        let db = CacheDb::open_in_memory().await.unwrap();
        let registration = Registration::new(network.clone());
        registration.register(worker("paper-cache-v1", &db, network.clone())).await.unwrap();

        let request = AssetRequest::get(Url::parse("https://cdn.example/lib.js").unwrap());
        registration.fetch(&request).await.unwrap();
        assert_eq!(db.entry_count("paper-cache-v1").await.unwrap(), 1);

        network.go_offline();
        assert!(registration.fetch(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_new_version_replaces_controller() {
        let network = site();
        let db = CacheDb::open_in_memory().await.unwrap();
        let registration = Registration::new(network.clone());

        let v1 = worker("paper-cache-v1", &db, network.clone());
        let v2 = worker("paper-cache-v2", &db, network.clone());
        registration.register(v1.clone()).await.unwrap();
        registration.register(v2.clone()).await.unwrap();

        assert_eq!(v1.state().await, WorkerState::Redundant);
        assert_eq!(v2.state().await, WorkerState::Active);
        assert_eq!(registration.controller().await.unwrap().cache_name(), "paper-cache-v2");
        assert_eq!(db.bucket_names().await.unwrap(), vec!["paper-cache-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_register_keeps_previous_controller() {
        let network = site();
        let db = CacheDb::open_in_memory().await.unwrap();
        let registration = Registration::new(network.clone());

        let v1 = worker("paper-cache-v1", &db, network.clone());
        registration.register(v1.clone()).await.unwrap();

        // Registering the same generation twice fails: it is already active.
        assert!(registration.register(v1.clone()).await.is_err());
        assert_eq!(v1.state().await, WorkerState::Active);
        assert_eq!(registration.controller().await.unwrap().cache_name(), "paper-cache-v1");
    }
}
