//! MCP tool implementations.
//!
//! This module contains all tools exposed by the paper server.

pub mod archive_open;
pub mod asset_fetch;
pub mod cache;

pub use archive_open::{ArchiveOpenParams, open_impl};
pub use asset_fetch::{AssetFetchParams, fetch_impl};
pub use cache::buckets_impl;
