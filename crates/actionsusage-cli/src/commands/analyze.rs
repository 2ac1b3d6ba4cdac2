//! Analyze command.

use actionsusage_analyzer::Analyzer;
use actionsusage_config::{AnalysisConfig, Overrides, load_config};
use actionsusage_github::GitHubClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use crate::AnalyzeArgs;

/// Fetch runs and jobs from GitHub and write the concurrency regions.
pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let token = args
        .token
        .filter(|t| !t.is_empty())
        .context("GITHUB_TOKEN is required")?;

    let file = match &args.config {
        Some(path) => Some(
            load_config(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?,
        ),
        None => None,
    };

    let config = AnalysisConfig::resolve(
        file,
        Overrides {
            repos: args.repos,
            run_count: args.run_count,
            max_jobs: args.max_jobs,
            output: args.output,
            api_url: args.api_url,
        },
    )
    .context("Invalid configuration")?;

    let client =
        GitHubClient::new(config.api_url.clone(), token).context("Failed to build HTTP client")?;
    let analyzer = Analyzer::new(Arc::new(client), config.clone());

    // First Ctrl-C stops fetching and keeps partial results; a second one exits.
    let stop = analyzer.stop_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt(&stop) {
                warn!("Interrupted again, exiting");
                std::process::exit(130);
            }
            warn!("Interrupted, finishing with partial results (Ctrl-C again to exit)");
        }
    });

    let report = analyzer.run().await.context("Analysis failed")?;
    let path = report
        .write(config.output.as_deref())
        .context("Failed to write region data")?;

    println!("Region data:      {}", path.display());
    if report.interrupted {
        println!("(interrupted, results are partial)");
    }
    println!("runs analyzed:    {}", report.runs_analyzed);
    println!(
        "jobs analyzed:    {} ({} skipped, {} rejected)",
        report.jobs_analyzed, report.jobs_skipped, report.jobs_rejected
    );
    println!("worker-minutes:   {}", report.total_minutes);
    println!("max concurrency:  {}", report.max_concurrency);
    println!("{}", report.summary());

    Ok(())
}

/// Raise the stop flag. Returns true if it was already raised.
fn interrupt(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::Relaxed)
}
