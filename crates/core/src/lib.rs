//! Core types and shared functionality for paper.
//!
//! This crate provides:
//! - Versioned cache bucket storage with SQLite backend
//! - Asset request/response types shared by the worker and the cache
//! - Unified error types
//! - Configuration structures

pub mod asset;
pub mod cache;
pub mod config;
pub mod error;

pub use asset::{AssetRequest, AssetResponse};
pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
