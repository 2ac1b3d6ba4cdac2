//! Analyzer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Source(#[from] actionsusage_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to keep temporary file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;
