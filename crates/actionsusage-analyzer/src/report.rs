//! Region file output and summaries.

use actionsusage_core::{JobId, Region};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::AnalyzerResult;

/// Outcome of one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub regions: Vec<Region>,
    /// Sum of per-job durations, each rounded up to a minute.
    pub total_minutes: i64,
    pub max_concurrency: usize,
    pub runs_analyzed: usize,
    /// Completed jobs billed to `total_minutes`.
    pub jobs_analyzed: u64,
    /// Jobs without both a start and a completion time.
    pub jobs_skipped: u64,
    /// Completed jobs whose interval was empty or inverted.
    pub jobs_rejected: u64,
    /// Whether the analysis was stopped before finishing.
    pub interrupted: bool,
}

impl AnalysisReport {
    pub fn summary(&self) -> Summary {
        Summary::from_regions(&self.regions)
    }

    /// Write the regions to `path`, or to a fresh temporary file when no path
    /// is given. Returns where they were written.
    pub fn write(&self, path: Option<&Path>) -> AnalyzerResult<PathBuf> {
        let path = match path {
            Some(path) => {
                write_regions(path, &self.regions)?;
                path.to_path_buf()
            }
            None => write_regions_temp(&self.regions)?,
        };

        info!(path = %path.display(), "Computed region data");
        Ok(path)
    }
}

/// Write regions as a pretty-printed JSON array.
pub fn write_regions(path: &Path, regions: &[Region]) -> AnalyzerResult<()> {
    let file = File::create(path)?;
    encode(file, regions)
}

/// Write regions to a new `regionoutput*.json` file in the temp directory.
/// The file is kept after the process exits.
pub fn write_regions_temp(regions: &[Region]) -> AnalyzerResult<PathBuf> {
    let (file, path) = tempfile::Builder::new()
        .prefix("regionoutput")
        .suffix(".json")
        .tempfile()?
        .keep()?;
    encode(file, regions)?;
    Ok(path)
}

fn encode(file: File, regions: &[Region]) -> AnalyzerResult<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, regions)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Read back a region file.
pub fn load_regions(path: &Path) -> AnalyzerResult<Vec<Region>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// `<first region start>..<last region end>` in RFC 3339, or `-` when empty.
pub fn describe_range(regions: &[Region]) -> String {
    let (Some(first), Some(last)) = (regions.first(), regions.last()) else {
        return "-".to_string();
    };
    format!(
        "{}..{}",
        format_millis(first.start),
        format_millis(last.end)
    )
}

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

/// Aggregate view of a region list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub region_count: usize,
    pub distinct_jobs: usize,
    /// Largest membership of any single region.
    pub peak_concurrency: usize,
    /// Sum of region durations in milliseconds. Overlapping regions are
    /// counted once each.
    pub covered_millis: i64,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn from_regions(regions: &[Region]) -> Self {
        let jobs: HashSet<&JobId> = regions.iter().flat_map(|r| r.jobs.iter()).collect();

        Self {
            region_count: regions.len(),
            distinct_jobs: jobs.len(),
            peak_concurrency: regions.iter().map(Region::concurrency).max().unwrap_or(0),
            covered_millis: regions.iter().map(Region::duration_millis).sum(),
            earliest: regions
                .iter()
                .min_by_key(|r| r.start)
                .and_then(Region::start_time),
            latest: regions
                .iter()
                .max_by_key(|r| r.end)
                .and_then(Region::end_time),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "regions:          {}", self.region_count)?;
        writeln!(f, "distinct jobs:    {}", self.distinct_jobs)?;
        writeln!(f, "peak concurrency: {}", self.peak_concurrency)?;
        writeln!(
            f,
            "covered time:     {:.1} minutes",
            self.covered_millis as f64 / 60_000.0
        )?;
        match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => write!(
                f,
                "range:            {} .. {}",
                earliest.to_rfc3339(),
                latest.to_rfc3339()
            ),
            _ => write!(f, "range:            -"),
        }
    }
}
