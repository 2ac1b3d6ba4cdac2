//! Intervals and concurrency regions.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::JobId;

/// The half-open time range `[start, end)` during which a job executed.
///
/// Times are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
    pub job: JobId,
}

impl Interval {
    pub fn new(start: i64, end: i64, job: JobId) -> Self {
        Self { start, end, job }
    }

    /// Build an interval from a job's start and completion timestamps.
    pub fn from_times(started_at: DateTime<Utc>, completed_at: DateTime<Utc>, job: JobId) -> Self {
        Self::new(
            started_at.timestamp_millis(),
            completed_at.timestamp_millis(),
            job,
        )
    }

    pub fn duration_millis(&self) -> i64 {
        self.end - self.start
    }
}

/// A time range annotated with every job active throughout it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Unix milliseconds.
    pub start: i64,
    /// Unix milliseconds.
    pub end: i64,
    /// Active jobs. Named `count` on the wire for compatibility with
    /// existing region files.
    #[serde(rename = "count")]
    pub jobs: Vec<JobId>,
}

impl Region {
    pub fn new(start: i64, end: i64, jobs: Vec<JobId>) -> Self {
        Self { start, end, jobs }
    }

    /// Number of jobs active in this region.
    pub fn concurrency(&self) -> usize {
        self.jobs.len()
    }

    pub fn duration_millis(&self) -> i64 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_job(&self, job: &JobId) -> bool {
        self.jobs.contains(job)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.start).single()
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.end).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_wire_format() {
        let region = Region::new(1_000, 2_000, vec![JobId::new("a/b", 1, 2)]);
        let json = serde_json::to_value(&region).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "start": 1000,
                "end": 2000,
                "count": [{"repo": "a/b", "workflow_run_id": 1, "job_id": 2}]
            })
        );
    }

    #[test]
    fn test_interval_from_times() {
        let start = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let end = Utc.timestamp_millis_opt(1_700_000_090_500).unwrap();
        let interval = Interval::from_times(start, end, JobId::new("a/b", 1, 2));

        assert_eq!(interval.start, 1_700_000_000_000);
        assert_eq!(interval.duration_millis(), 90_500);
    }

    #[test]
    fn test_overlaps_is_half_open() {
        let a = Region::new(0, 10, vec![JobId::new("a/b", 1, 1)]);
        let b = Region::new(10, 20, vec![JobId::new("a/b", 1, 2)]);
        let c = Region::new(9, 12, vec![JobId::new("a/b", 1, 3)]);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }
}
