use actionsusage_core::source::{ActionsSource, Page, WorkflowJob, WorkflowRun};
use actionsusage_core::{RepoSlug, Result};
use async_trait::async_trait;

use crate::GitHubClient;

#[async_trait]
impl ActionsSource for GitHubClient {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_workflow_runs(
        &self,
        repo: &RepoSlug,
        page: u32,
        per_page: u32,
    ) -> Result<Page<WorkflowRun>> {
        Ok(self.workflow_runs(repo, page, per_page).await?)
    }

    async fn list_workflow_jobs(
        &self,
        run: &WorkflowRun,
        page: u32,
        per_page: u32,
    ) -> Result<Page<WorkflowJob>> {
        Ok(self.workflow_jobs(run, page, per_page).await?)
    }
}
