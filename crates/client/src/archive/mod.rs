//! Archive lookup: validation, link building and the redirect flow.
//!
//! ### Validation
//! - Absolute URL per `url::Url::parse`, else "Please enter a valid URL"
//! - Optional news-article policy on top of the parse
//!
//! ### Link
//! - `https://archive.is/latest/` + URI-component encoding of the input
//! - `plain` style drops the `latest/` segment
//!
//! ### Redirect
//! - Direct, or probe-then-redirect with a bounded wait

pub mod link;
pub mod redirect;
pub mod validate;

pub use link::{build_archive_link, build_link, encode_component};
pub use redirect::{ArchiveFlow, Navigation, Probe, ProbeError, RedirectPolicy, Submission};
pub use validate::{AnyUrl, NewsArticle, UrlPolicy, ValidationResult, validate, validate_url};
