//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting the asset cache buckets.

pub mod buckets;

pub use buckets::buckets_impl;
