//! SQLite-backed storage for versioned cache buckets.
//!
//! This module provides named buckets of request→response entries using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Request-keyed entries using SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Bucket deletion cascading to all of its entries

pub mod buckets;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
