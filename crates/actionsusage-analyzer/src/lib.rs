//! Workflow usage analysis for actionsusage.
//!
//! Walks repositories, their workflow runs and the jobs of each run,
//! feeding every completed job into a single region engine and usage
//! accumulator, then writes the resulting regions out as JSON.

pub mod analyzer;
pub mod error;
pub mod report;

pub use analyzer::Analyzer;
pub use error::{AnalyzerError, AnalyzerResult};
pub use report::{AnalysisReport, Summary};
