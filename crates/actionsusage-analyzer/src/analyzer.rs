//! Discovery loop: repositories, then workflow runs, then job pages.
//!
//! Every completed job is billed to the usage accumulator and inserted into
//! one region engine, strictly one at a time and in discovery order.

use actionsusage_config::AnalysisConfig;
use actionsusage_core::source::{ActionsSource, RateLimit, WorkflowRun};
use actionsusage_core::{Interval, RegionEngine, UsageAccumulator};
use chrono::TimeDelta;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::AnalyzerResult;
use crate::report::{self, AnalysisReport};

/// Largest page size the Actions API accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Walks a source and accumulates concurrency regions and usage.
pub struct Analyzer {
    source: Arc<dyn ActionsSource>,
    config: AnalysisConfig,
    stop: Arc<AtomicBool>,
}

/// Running state of one analysis. Owned by a single `run` call.
#[derive(Default)]
struct Tally {
    engine: RegionEngine,
    usage: UsageAccumulator,
    runs: usize,
    skipped: u64,
    rejected: u64,
}

impl Tally {
    fn record(&mut self, interval: Interval) {
        let minutes = self
            .usage
            .record(TimeDelta::milliseconds(interval.duration_millis()));
        debug!(job = %interval.job, minutes, "Billed job");

        let before = self.engine.max_concurrency();
        match self.engine.insert(interval) {
            Ok(()) => {
                if self.engine.max_concurrency() > before {
                    info!(
                        max_concurrency = self.engine.max_concurrency(),
                        "new max concurrency"
                    );
                }
            }
            Err(e) => {
                debug!(error = %e, "Rejected job interval");
                self.rejected += 1;
            }
        }
    }

    fn into_report(self, interrupted: bool) -> AnalysisReport {
        AnalysisReport {
            max_concurrency: self.engine.max_concurrency(),
            total_minutes: self.usage.total_minutes(),
            runs_analyzed: self.runs,
            jobs_analyzed: self.usage.jobs(),
            jobs_skipped: self.skipped,
            jobs_rejected: self.rejected,
            interrupted,
            regions: self.engine.into_regions(),
        }
    }
}

impl Analyzer {
    pub fn new(source: Arc<dyn ActionsSource>, config: AnalysisConfig) -> Self {
        Self {
            source,
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that, once set, stops the analysis before the next page request.
    /// Whatever has been gathered so far is still reported.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Run the full analysis.
    pub async fn run(&self) -> AnalyzerResult<AnalysisReport> {
        info!(
            source = self.source.name(),
            repos = self.config.repos.len(),
            run_count = self.config.run_count,
            max_jobs = self.config.max_jobs,
            "Starting analysis"
        );

        let runs = self.collect_runs().await?;

        let mut tally = Tally::default();
        for run in &runs {
            if self.stopped() {
                break;
            }
            self.analyze_run(run, &mut tally).await?;
        }

        Ok(tally.into_report(self.stopped()))
    }

    /// Collect up to `run_count` workflow runs from each repository.
    pub async fn collect_runs(&self) -> AnalyzerResult<Vec<WorkflowRun>> {
        let limit = self.config.run_count as usize;
        let per_page = self.config.run_count.min(MAX_PAGE_SIZE);
        let mut runs = Vec::new();

        for repo in &self.config.repos {
            let mut repo_runs: Vec<WorkflowRun> = Vec::new();

            for page_no in 1.. {
                if self.stopped() {
                    break;
                }

                let page = self
                    .source
                    .list_workflow_runs(repo, page_no, per_page)
                    .await?;
                if page.is_empty() {
                    break;
                }

                let received = page.items.len();
                let room = limit - repo_runs.len();
                repo_runs.extend(page.items.into_iter().take(room));

                info!(
                    repo = %repo,
                    runs = received,
                    total = repo_runs.len(),
                    rate_limit = %describe_rate_limit(page.rate_limit),
                    from = %repo_runs.first().map(|r| r.created_at.to_rfc3339()).unwrap_or_default(),
                    to = %repo_runs.last().map(|r| r.created_at.to_rfc3339()).unwrap_or_default(),
                    "Got runs"
                );

                if repo_runs.len() >= limit {
                    break;
                }
            }

            runs.extend(repo_runs);
        }

        Ok(runs)
    }

    /// Page through the jobs of one run.
    async fn analyze_run(&self, run: &WorkflowRun, tally: &mut Tally) -> AnalyzerResult<()> {
        let max_jobs = u64::from(self.config.max_jobs);
        let mut seen: u64 = 0;
        let mut page_no = 1;

        while seen < max_jobs {
            if self.stopped() {
                return Ok(());
            }

            let page = self
                .source
                .list_workflow_jobs(run, page_no, MAX_PAGE_SIZE)
                .await?;
            if page.is_empty() {
                break;
            }

            for job in &page.items {
                match job.interval(run) {
                    Some(interval) => tally.record(interval),
                    None => {
                        info!(
                            run_id = run.id,
                            job_id = job.id,
                            started_at = ?job.started_at,
                            completed_at = ?job.completed_at,
                            "Skipped job"
                        );
                        tally.skipped += 1;
                    }
                }
            }

            seen += page.items.len() as u64;

            info!(
                repo = %run.repository,
                run_id = run.id,
                jobs = page.items.len(),
                total_minutes = tally.usage.total_minutes(),
                max_concurrency = tally.engine.max_concurrency(),
                range = %report::describe_range(tally.engine.regions()),
                region_count = tally.engine.len(),
                rate_limit = %describe_rate_limit(page.rate_limit),
                "Got jobs"
            );

            if page.total_count == Some(seen) {
                break;
            }
            page_no += 1;
        }

        tally.runs += 1;
        Ok(())
    }
}

fn describe_rate_limit(rate_limit: Option<RateLimit>) -> String {
    rate_limit
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalyzerError;
    use actionsusage_core::source::{Page, WorkflowJob};
    use actionsusage_core::{JobId, RepoSlug};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: i64 = 1_700_000_000;
    const FAILING_RUN: i64 = 666;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(BASE + seconds, 0).unwrap()
    }

    fn slug(s: &str) -> RepoSlug {
        s.parse().unwrap()
    }

    fn run(repo: &str, id: i64) -> WorkflowRun {
        WorkflowRun {
            id,
            repository: slug(repo),
            created_at: at(id),
        }
    }

    fn job(id: i64, start: i64, end: i64) -> WorkflowJob {
        WorkflowJob {
            id,
            started_at: Some(at(start)),
            completed_at: Some(at(end)),
        }
    }

    #[derive(Default)]
    struct MockSource {
        runs: HashMap<RepoSlug, Vec<WorkflowRun>>,
        jobs: HashMap<i64, Vec<WorkflowJob>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn with_run(mut self, run: WorkflowRun, jobs: Vec<WorkflowJob>) -> Self {
            self.jobs.insert(run.id, jobs);
            self.runs
                .entry(run.repository.clone())
                .or_default()
                .push(run);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
        let start = ((page - 1) * per_page) as usize;
        Page {
            items: items
                .iter()
                .skip(start)
                .take(per_page as usize)
                .cloned()
                .collect(),
            total_count: Some(items.len() as u64),
            rate_limit: Some(RateLimit {
                remaining: 4999,
                limit: 5000,
            }),
        }
    }

    #[async_trait]
    impl ActionsSource for MockSource {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn list_workflow_runs(
            &self,
            repo: &RepoSlug,
            page: u32,
            per_page: u32,
        ) -> actionsusage_core::Result<Page<WorkflowRun>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("runs {repo} page={page} per_page={per_page}"));
            let all = self.runs.get(repo).map(Vec::as_slice).unwrap_or_default();
            Ok(paginate(all, page, per_page))
        }

        async fn list_workflow_jobs(
            &self,
            run: &WorkflowRun,
            page: u32,
            per_page: u32,
        ) -> actionsusage_core::Result<Page<WorkflowJob>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("jobs {} page={page}", run.id));
            if run.id == FAILING_RUN {
                return Err(actionsusage_core::Error::Source("boom".to_string()));
            }
            let all = self.jobs.get(&run.id).map(Vec::as_slice).unwrap_or_default();
            Ok(paginate(all, page, per_page))
        }
    }

    fn config(repos: &[&str], run_count: u32, max_jobs: u32) -> AnalysisConfig {
        AnalysisConfig {
            repos: repos.iter().map(|r| slug(r)).collect(),
            run_count,
            max_jobs,
            output: None,
            api_url: "http://localhost".to_string(),
        }
    }

    fn analyzer(source: &Arc<MockSource>, config: AnalysisConfig) -> Analyzer {
        Analyzer::new(source.clone(), config)
    }

    #[tokio::test]
    async fn test_overlapping_jobs_across_runs() {
        let source = Arc::new(
            MockSource::default()
                .with_run(run("acme/api", 1), vec![job(10, 0, 600)])
                .with_run(
                    run("acme/api", 2),
                    vec![
                        job(20, 300, 900),
                        WorkflowJob {
                            id: 21,
                            started_at: Some(at(400)),
                            completed_at: None,
                        },
                    ],
                ),
        );

        let report = analyzer(&source, config(&["acme/api"], 10, 10))
            .run()
            .await
            .unwrap();

        assert_eq!(report.max_concurrency, 2);
        assert_eq!(report.total_minutes, 20);
        assert_eq!(report.runs_analyzed, 2);
        assert_eq!(report.jobs_analyzed, 2);
        assert_eq!(report.jobs_skipped, 1);
        assert!(!report.interrupted);

        let ms = |s: i64| (BASE + s) * 1000;
        assert_eq!(report.regions.len(), 2);
        assert_eq!(
            (report.regions[0].start, report.regions[0].end),
            (ms(0), ms(300))
        );
        assert_eq!(
            report.regions[1].jobs,
            vec![JobId::new("acme/api", 2, 20), JobId::new("acme/api", 1, 10)]
        );
    }

    #[tokio::test]
    async fn test_run_count_caps_each_repository() {
        let mut source = MockSource::default();
        for id in 1..=5 {
            source = source.with_run(run("acme/api", id), vec![]);
            source = source.with_run(run("acme/web", 100 + id), vec![]);
        }
        let source = Arc::new(source);

        let runs = analyzer(&source, config(&["acme/api", "acme/web"], 3, 10))
            .collect_runs()
            .await
            .unwrap();

        let ids: Vec<i64> = runs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 101, 102, 103]);
        assert_eq!(
            source.calls(),
            vec![
                "runs acme/api page=1 per_page=3",
                "runs acme/web page=1 per_page=3"
            ]
        );
    }

    #[tokio::test]
    async fn test_runs_paged_until_empty() {
        let mut source = MockSource::default();
        for id in 1..=150 {
            source = source.with_run(run("acme/api", id), vec![]);
        }
        let source = Arc::new(source);

        let runs = analyzer(&source, config(&["acme/api"], 1000, 10))
            .collect_runs()
            .await
            .unwrap();

        assert_eq!(runs.len(), 150);
        assert_eq!(
            source.calls(),
            vec![
                "runs acme/api page=1 per_page=100",
                "runs acme/api page=2 per_page=100",
                "runs acme/api page=3 per_page=100",
            ]
        );
    }

    #[tokio::test]
    async fn test_job_pages_stop_at_total_count() {
        let jobs = (0..150).map(|n| job(n, n * 60, n * 60 + 30)).collect();
        let source = Arc::new(MockSource::default().with_run(run("acme/api", 1), jobs));

        let report = analyzer(&source, config(&["acme/api"], 10, 1000))
            .run()
            .await
            .unwrap();

        assert_eq!(report.jobs_analyzed, 150);
        assert_eq!(report.total_minutes, 150);
        assert_eq!(report.max_concurrency, 1);
        let job_calls = source.calls().into_iter().filter(|c| c.starts_with("jobs")).count();
        assert_eq!(job_calls, 2);
    }

    #[tokio::test]
    async fn test_max_jobs_limits_pages() {
        let jobs = (0..150).map(|n| job(n, n * 60, n * 60 + 30)).collect();
        let source = Arc::new(MockSource::default().with_run(run("acme/api", 1), jobs));

        let report = analyzer(&source, config(&["acme/api"], 10, 50))
            .run()
            .await
            .unwrap();

        // A page is always requested whole; the cap only stops further pages.
        assert_eq!(report.jobs_analyzed, 100);
        assert_eq!(
            source.calls(),
            vec![
                "runs acme/api page=1 per_page=10",
                "runs acme/api page=2 per_page=10",
                "jobs 1 page=1",
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_length_job_billed_but_not_inserted() {
        let source = Arc::new(
            MockSource::default().with_run(run("acme/api", 1), vec![job(1, 30, 30)]),
        );

        let report = analyzer(&source, config(&["acme/api"], 10, 10))
            .run()
            .await
            .unwrap();

        assert_eq!(report.jobs_analyzed, 1);
        assert_eq!(report.jobs_rejected, 1);
        assert_eq!(report.total_minutes, 0);
        assert!(report.regions.is_empty());
        assert_eq!(report.max_concurrency, 0);
    }

    #[tokio::test]
    async fn test_source_error_aborts() {
        let source = Arc::new(
            MockSource::default()
                .with_run(run("acme/api", 1), vec![job(1, 0, 60)])
                .with_run(run("acme/api", FAILING_RUN), vec![]),
        );

        let result = analyzer(&source, config(&["acme/api"], 10, 10)).run().await;

        assert!(matches!(
            result.unwrap_err(),
            AnalyzerError::Source(actionsusage_core::Error::Source(_))
        ));
    }

    #[tokio::test]
    async fn test_stop_before_start_reports_nothing() {
        let source = Arc::new(
            MockSource::default().with_run(run("acme/api", 1), vec![job(1, 0, 60)]),
        );

        let analyzer = analyzer(&source, config(&["acme/api"], 10, 10));
        analyzer.stop_handle().store(true, Ordering::Relaxed);
        let report = analyzer.run().await.unwrap();

        assert!(report.interrupted);
        assert!(report.regions.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_order_discovery() {
        // Newer runs are listed first, so the later job arrives first.
        let source = Arc::new(
            MockSource::default()
                .with_run(run("acme/api", 2), vec![job(20, 1000, 1600)])
                .with_run(run("acme/api", 1), vec![job(10, 0, 600)]),
        );

        let report = analyzer(&source, config(&["acme/api"], 10, 10))
            .run()
            .await
            .unwrap();

        let starts: Vec<i64> = report.regions.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![BASE * 1000, (BASE + 1000) * 1000]);
        assert_eq!(report.max_concurrency, 1);
    }
}
