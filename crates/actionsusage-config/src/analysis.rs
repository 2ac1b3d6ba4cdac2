//! Analysis configuration parsing.
//!
//! A configuration file looks like:
//!
//! ```kdl
//! repos "namespacelabs/foundation" "namespacelabs/integrations"
//! run-count 500
//! max-jobs 200
//! output "regions.json"
//! api-url "https://api.github.com"
//! ```

use actionsusage_core::RepoSlug;
use kdl::{KdlDocument, KdlNode};
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult};

pub const DEFAULT_RUN_COUNT: u32 = 1000;
pub const DEFAULT_MAX_JOBS: u32 = 1000;
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Settings read from a configuration file. Unset fields fall back to
/// command-line values or defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub repos: Vec<RepoSlug>,
    pub run_count: Option<u32>,
    pub max_jobs: Option<u32>,
    pub output: Option<PathBuf>,
    pub api_url: Option<String>,
}

/// Values given on the command line. These win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Comma-separated `owner/name` list.
    pub repos: Option<String>,
    pub run_count: Option<u32>,
    pub max_jobs: Option<u32>,
    pub output: Option<PathBuf>,
    pub api_url: Option<String>,
}

/// Fully resolved settings for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub repos: Vec<RepoSlug>,
    /// Maximum number of workflow runs to consider.
    pub run_count: u32,
    /// Maximum number of jobs to page through per run.
    pub max_jobs: u32,
    /// Where to write the region file. A temporary file is used when unset.
    pub output: Option<PathBuf>,
    pub api_url: String,
}

impl AnalysisConfig {
    /// Merge an optional file config with command-line overrides.
    pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> ConfigResult<Self> {
        let file = file.unwrap_or_default();

        let repos = match overrides.repos.as_deref() {
            Some(list) if !list.trim().is_empty() => {
                RepoSlug::parse_list(list).map_err(|e| ConfigError::InvalidValue {
                    field: "repos".to_string(),
                    message: e.to_string(),
                })?
            }
            _ => file.repos,
        };

        if repos.is_empty() {
            return Err(ConfigError::MissingField("repos".to_string()));
        }

        let run_count = overrides
            .run_count
            .or(file.run_count)
            .unwrap_or(DEFAULT_RUN_COUNT);
        let max_jobs = overrides
            .max_jobs
            .or(file.max_jobs)
            .unwrap_or(DEFAULT_MAX_JOBS);

        require_positive("run-count", run_count)?;
        require_positive("max-jobs", max_jobs)?;

        Ok(Self {
            repos,
            run_count,
            max_jobs,
            output: overrides.output.or(file.output),
            api_url: overrides
                .api_url
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }
}

/// Read and parse a configuration file.
pub fn load_config(path: &Path) -> ConfigResult<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a configuration from KDL text.
pub fn parse_config(kdl: &str) -> ConfigResult<FileConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut config = FileConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "repos" | "repo" => {
                for slug in get_all_string_args(node) {
                    let repo = slug
                        .parse::<RepoSlug>()
                        .map_err(|e| ConfigError::InvalidValue {
                            field: "repos".to_string(),
                            message: e.to_string(),
                        })?;
                    config.repos.push(repo);
                }
            }
            "run-count" | "run_count" => {
                config.run_count = Some(get_u32_arg(node, "run-count")?);
            }
            "max-jobs" | "max_jobs" => {
                config.max_jobs = Some(get_u32_arg(node, "max-jobs")?);
            }
            "output" => {
                let path = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("output path".to_string()))?;
                config.output = Some(PathBuf::from(path));
            }
            "api-url" | "api_url" => {
                config.api_url = Some(
                    get_first_string_arg(node)
                        .ok_or_else(|| ConfigError::MissingField("api-url".to_string()))?,
                );
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn require_positive(field: &str, value: u32) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_u32_arg(node: &KdlNode, field: &str) -> ConfigResult<u32> {
    let value = node
        .entries()
        .iter()
        .find(|e| e.name().is_none())
        .ok_or_else(|| ConfigError::MissingField(field.to_string()))?
        .value();

    value
        .as_integer()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("expected a non-negative integer, got {}", value),
        })
}
