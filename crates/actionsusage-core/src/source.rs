//! CI provider abstraction.
//!
//! Sources list workflow runs and the jobs inside them, one page at a time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Interval, JobId, RepoSlug, Result};

/// A workflow run discovered in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: i64,
    /// Repository the run belongs to.
    pub repository: RepoSlug,
    pub created_at: DateTime<Utc>,
}

/// A job within a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowJob {
    pub id: i64,
    /// Missing while the job is queued.
    pub started_at: Option<DateTime<Utc>>,
    /// Missing until the job finishes.
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowJob {
    /// The job's execution interval, if it has both started and completed.
    pub fn interval(&self, run: &WorkflowRun) -> Option<Interval> {
        let (started_at, completed_at) = (self.started_at?, self.completed_at?);
        Some(Interval::from_times(
            started_at,
            completed_at,
            JobId::new(run.repository.to_string(), run.id, self.id),
        ))
    }
}

/// API quota reported alongside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub remaining: u64,
    pub limit: u64,
}

impl std::fmt::Display for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.remaining, self.limit)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages, when the provider reports it.
    pub total_count: Option<u64>,
    pub rate_limit: Option<RateLimit>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Trait for CI providers that can enumerate historical runs and jobs.
///
/// Pages are 1-based. An empty page marks the end of the listing.
#[async_trait]
pub trait ActionsSource: Send + Sync {
    /// Name of this source.
    fn name(&self) -> &'static str;

    /// List workflow runs of a repository, most recent first.
    async fn list_workflow_runs(
        &self,
        repo: &RepoSlug,
        page: u32,
        per_page: u32,
    ) -> Result<Page<WorkflowRun>>;

    /// List the jobs of a workflow run.
    async fn list_workflow_jobs(
        &self,
        run: &WorkflowRun,
        page: u32,
        per_page: u32,
    ) -> Result<Page<WorkflowJob>>;
}
