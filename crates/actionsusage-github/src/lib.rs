//! GitHub Actions source for actionsusage.
//!
//! Lists workflow runs and jobs over the REST API and reports the
//! remaining rate-limit quota with each page.

pub mod client;
pub mod error;
mod source;

pub use client::GitHubClient;
pub use error::GitHubError;
