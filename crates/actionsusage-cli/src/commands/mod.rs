//! CLI command implementations.

pub mod analyze;

use actionsusage_analyzer::Summary;
use actionsusage_analyzer::report::load_regions;
use actionsusage_config::load_config;
use anyhow::{Context, Result};
use std::path::Path;

pub fn summarize(path: &Path) -> Result<()> {
    let regions = load_regions(path)
        .with_context(|| format!("Failed to read region file: {}", path.display()))?;

    println!("{}", Summary::from_regions(&regions));
    Ok(())
}

pub fn validate(path: &Path) -> Result<()> {
    let config = load_config(path)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    println!(
        "Configuration is valid ({} repositories)",
        config.repos.len()
    );
    Ok(())
}
