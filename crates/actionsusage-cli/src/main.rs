//! actionsusage CLI tool.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "actionsusage")]
#[command(about = "Measure CI job concurrency and worker-minutes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch workflow jobs and compute concurrency regions
    Analyze(AnalyzeArgs),
    /// Summarize a previously written region file
    Summarize {
        /// Path to the region file
        path: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "actionsusage.kdl")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Repositories separated by commas, e.g. namespacelabs/foundation
    #[arg(long)]
    repos: Option<String>,
    /// Maximum number of runs to consider per repository [default: 1000]
    #[arg(long)]
    run_count: Option<u32>,
    /// Maximum number of jobs per run [default: 1000]
    #[arg(long)]
    max_jobs: Option<u32>,
    /// Where to write region data (defaults to a temporary file)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,
    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the summary.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            commands::analyze::run(args).await?;
        }
        Commands::Summarize { path } => {
            commands::summarize(&path)?;
        }
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
    }

    Ok(())
}
