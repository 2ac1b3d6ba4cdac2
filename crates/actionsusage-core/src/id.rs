//! Job identifiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identity of a single CI job.
///
/// Serialized as `{"repo": ..., "workflow_run_id": ..., "job_id": ...}`,
/// which is the shape consumers of the region file expect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{repository}/runs/{workflow_run_id}/jobs/{job_id}")]
pub struct JobId {
    /// Repository in `owner/name` form.
    #[serde(rename = "repo")]
    pub repository: String,
    /// Workflow run the job belongs to.
    pub workflow_run_id: i64,
    /// Job identifier, unique within the provider.
    pub job_id: i64,
}

impl JobId {
    pub fn new(repository: impl Into<String>, workflow_run_id: i64, job_id: i64) -> Self {
        Self {
            repository: repository.into(),
            workflow_run_id,
            job_id,
        }
    }
}
