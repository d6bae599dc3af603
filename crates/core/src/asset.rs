//! Request and response types for intercepted asset traffic.

use bytes::Bytes;
use url::Url;

use crate::cache::hash::compute_request_key;

/// Body of the synthetic response served when neither cache nor network can answer.
pub const OFFLINE_BODY: &str = "Offline - Content not available";

/// Identity of an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: String,
    pub url: Url,
}

impl AssetRequest {
    pub fn new(method: impl AsRef<str>, url: Url) -> Self {
        Self { method: method.as_ref().to_ascii_uppercase(), url }
    }

    /// A GET request, the only kind the asset cache stores or matches.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Key under which the response to this request is stored in a bucket.
    pub fn cache_key(&self) -> String {
        compute_request_key(&self.method, self.url.as_str())
    }
}

/// A live or stored response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl AssetResponse {
    /// The 503 returned when a request cannot be served from cache or network.
    pub fn offline() -> Self {
        Self {
            status: 503,
            status_text: "Service Unavailable".into(),
            headers: vec![("content-type".into(), "text/plain".into())],
            body: Bytes::from_static(OFFLINE_BODY.as_bytes()),
        }
    }

    /// Only plain 200 responses are written to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_response() {
        let resp = AssetResponse::offline();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.status_text, "Service Unavailable");
        assert_eq!(resp.content_type(), Some("text/plain"));
        assert_eq!(&resp.body[..], b"Offline - Content not available");
        assert!(!resp.is_cacheable());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let resp = AssetResponse {
            status: 200,
            status_text: "OK".into(),
            headers: vec![("Content-Type".into(), "text/css".into())],
            body: Bytes::new(),
        };
        assert_eq!(resp.content_type(), Some("text/css"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn test_request_method_normalized() {
        let url = Url::parse("https://paper.example/app.js").unwrap();
        let req = AssetRequest::new("post", url.clone());
        assert_eq!(req.method, "POST");
        assert!(!req.is_get());
        assert!(AssetRequest::get(url).is_get());
    }

    #[test]
    fn test_cache_key_depends_on_method() {
        let url = Url::parse("https://paper.example/app.js").unwrap();
        let get = AssetRequest::get(url.clone());
        let head = AssetRequest::new("HEAD", url);
        assert_ne!(get.cache_key(), head.cache_key());
        assert_eq!(get.cache_key(), get.clone().cache_key());
    }
}
