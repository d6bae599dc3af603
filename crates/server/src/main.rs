//! paper server entry point.
//!
//! Loads configuration, brings the offline asset worker up, then serves the
//! MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use paper_client::{ArchiveFlow, AssetWorker, FetchClient, FetchConfig, Registration, WorkerConfig};
use paper_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        cache = %config.cache_name,
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "Starting paper server on stdio transport"
    );

    let cache = CacheDb::open(&config.db_path).await?;
    let client = Arc::new(FetchClient::new(FetchConfig::from(&config))?);

    let worker_config = WorkerConfig::from_app_config(&config)?;
    let origin = worker_config.origin.clone();
    let registration = Arc::new(Registration::new(client.clone()));
    let worker = Arc::new(AssetWorker::new(worker_config, cache.clone(), client.clone()));

    // Requests still reach the network uncontrolled if this fails.
    match registration.register(worker).await {
        Ok(report) => tracing::info!(cached = report.cached(), failed = report.failed(), "asset worker active"),
        Err(e) => tracing::warn!(error = %e, "asset worker failed to start"),
    }

    let flow = Arc::new(ArchiveFlow::from_config(&config, client));

    let handler = handler::PaperServer::new(flow, registration, cache, origin);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
