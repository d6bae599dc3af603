//! In-process network double for worker tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use paper_core::{AssetRequest, AssetResponse, Error};

use crate::fetch::Fetcher;

/// Serves canned responses by URL and counts every request it sees.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (u16, &'static str)>>,
    oversized: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, url: &str, status: u16, body: &'static str) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), (status, body));
        self
    }

    /// Answer `url` with a body over the size limit.
    pub fn oversized(self, url: &str) -> Self {
        self.oversized.lock().unwrap().insert(url.to_string());
        self
    }

    /// Make every subsequent request fail as if the network were down.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::HttpError("network error: offline".into()));
        }

        if self.oversized.lock().unwrap().contains(request.url.as_str()) {
            return Err(Error::FetchTooLarge(format!("{} exceeds limit", request.url)));
        }

        let route = self.routes.lock().unwrap().get(request.url.as_str()).copied();
        match route {
            Some((status, body)) => Ok(AssetResponse {
                status,
                status_text: if status == 200 { "OK".into() } else { "Not Found".into() },
                headers: vec![("content-type".into(), "text/plain".into())],
                body: Bytes::from_static(body.as_bytes()),
            }),
            None => Err(Error::HttpError(format!("network error: no route to {}", request.url))),
        }
    }
}
