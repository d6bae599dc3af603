//! Client code for paper.
//!
//! This crate provides archive link validation and building, the redirect
//! flow, the HTTP fetch client, and the offline asset worker used by the
//! server.

pub mod archive;
pub mod fetch;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use archive::{
    ArchiveFlow, Navigation, Submission, ValidationResult, build_archive_link, validate, validate_url,
};

pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use worker::{AssetWorker, InstallReport, Registration, WorkerConfig, WorkerState, within_scope};
