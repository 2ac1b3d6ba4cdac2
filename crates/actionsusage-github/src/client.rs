//! GitHub Actions REST client.

use actionsusage_core::RepoSlug;
use actionsusage_core::source::{Page, RateLimit, WorkflowJob, WorkflowRun};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::GitHubError;

const USER_AGENT: &str = "actionsusage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// List workflow runs of a repository, most recent first.
    pub async fn workflow_runs(
        &self,
        repo: &RepoSlug,
        page: u32,
        per_page: u32,
    ) -> Result<Page<WorkflowRun>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs",
            self.api_url, repo.owner, repo.name
        );

        let (body, rate_limit): (RunsResponse, _) = self.get_page(&url, page, per_page).await?;

        let items = body
            .workflow_runs
            .into_iter()
            .map(|run| run.into_workflow_run(repo))
            .collect();

        Ok(Page {
            items,
            total_count: body.total_count,
            rate_limit,
        })
    }

    /// List the jobs of a workflow run.
    pub async fn workflow_jobs(
        &self,
        run: &WorkflowRun,
        page: u32,
        per_page: u32,
    ) -> Result<Page<WorkflowJob>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/actions/runs/{}/jobs",
            self.api_url, run.repository.owner, run.repository.name, run.id
        );

        let (body, rate_limit): (JobsResponse, _) = self.get_page(&url, page, per_page).await?;

        let items = body
            .jobs
            .into_iter()
            .map(|job| WorkflowJob {
                id: job.id,
                started_at: job.started_at,
                completed_at: job.completed_at,
            })
            .collect();

        Ok(Page {
            items,
            total_count: body.total_count,
            rate_limit,
        })
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        page: u32,
        per_page: u32,
    ) -> Result<(T, Option<RateLimit>), GitHubError> {
        debug!(url, page, per_page, "GET");

        let response = self
            .client
            .get(url)
            .query(&[("page", page), ("per_page", per_page)])
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        let rate_limit = parse_rate_limit(response.headers());
        let response = check_status(response, rate_limit).await?;

        let body = response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))?;

        Ok((body, rate_limit))
    }
}

async fn check_status(
    response: Response,
    rate_limit: Option<RateLimit>,
) -> Result<Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let exhausted = rate_limit.is_some_and(|r| r.remaining == 0);
    if exhausted && matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
        return Err(GitHubError::RateLimited {
            reset_at: parse_reset(response.headers()),
        });
    }

    let text = response.text().await.unwrap_or_default();
    Err(GitHubError::Api(format!("request failed ({}): {}", status, text)))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Read `x-ratelimit-remaining` / `x-ratelimit-limit`.
pub(crate) fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimit> {
    Some(RateLimit {
        remaining: header_u64(headers, "x-ratelimit-remaining")?,
        limit: header_u64(headers, "x-ratelimit-limit")?,
    })
}

pub(crate) fn parse_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let epoch = header_u64(headers, "x-ratelimit-reset")?;
    Utc.timestamp_opt(i64::try_from(epoch).ok()?, 0).single()
}

/// `GET /repos/{owner}/{repo}/actions/runs` response.
#[derive(Debug, Deserialize)]
struct RunsResponse {
    total_count: Option<u64>,
    #[serde(default)]
    workflow_runs: Vec<RunPayload>,
}

#[derive(Debug, Deserialize)]
struct RunPayload {
    id: i64,
    created_at: DateTime<Utc>,
    repository: Option<RunRepository>,
}

impl RunPayload {
    /// Falls back to the requested repository when the payload does not
    /// name a valid one.
    fn into_workflow_run(self, requested: &RepoSlug) -> WorkflowRun {
        WorkflowRun {
            id: self.id,
            repository: self
                .repository
                .and_then(|r| r.full_name.parse().ok())
                .unwrap_or_else(|| requested.clone()),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunRepository {
    full_name: String,
}

/// `GET /repos/{owner}/{repo}/actions/runs/{run_id}/jobs` response.
#[derive(Debug, Deserialize)]
struct JobsResponse {
    total_count: Option<u64>,
    #[serde(default)]
    jobs: Vec<JobPayload>,
}

#[derive(Debug, Deserialize)]
struct JobPayload {
    id: i64,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}
