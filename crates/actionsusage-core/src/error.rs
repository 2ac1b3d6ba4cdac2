//! Error types for actionsusage.

use thiserror::Error;

use crate::JobId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid interval for job {job}: start {start} is not before end {end}")]
    InvalidInterval { job: JobId, start: i64, end: i64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("source request failed: {0}")]
    Source(String),

    #[error("rate limited: {0}")]
    RateLimited(String),
}

pub type Result<T> = std::result::Result<T, Error>;
