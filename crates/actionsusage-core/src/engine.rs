//! Concurrency region engine.
//!
//! Ingests job intervals one at a time, in whatever order they are
//! discovered, and maintains a start-ordered list of regions annotated with
//! the jobs active in each. Every insertion touches at most one existing
//! region: the first region that ends after the new interval starts. An
//! interval that starts before that region is placed in front of it as a
//! standalone region; an interval that starts inside it splits it in two.
//! Overlap with any later region, or past the end of the split region, is
//! not reconciled.

use crate::{Error, Interval, Region, Result};

/// Owns the region list and the running maximum concurrency.
#[derive(Debug, Default, Clone)]
pub struct RegionEngine {
    regions: Vec<Region>,
    max_concurrency: usize,
}

impl RegionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job interval.
    ///
    /// Intervals with `start >= end` are rejected and leave the engine
    /// unchanged.
    pub fn insert(&mut self, interval: Interval) -> Result<()> {
        if interval.start >= interval.end {
            return Err(Error::InvalidInterval {
                job: interval.job,
                start: interval.start,
                end: interval.end,
            });
        }

        let Interval { start, end, job } = interval;

        let Some(idx) = self.regions.iter().position(|r| start < r.end) else {
            self.regions.push(Region::new(start, end, vec![job]));
            self.observe(1);
            return Ok(());
        };

        if start < self.regions[idx].start {
            self.regions.insert(idx, Region::new(start, end, vec![job]));
            self.observe(1);
            return Ok(());
        }

        // Split: the existing region keeps [r.start, start) and its members,
        // the new region [start, end) holds the new job followed by them.
        let existing = &mut self.regions[idx];
        let mut jobs = Vec::with_capacity(existing.jobs.len() + 1);
        jobs.push(job);
        jobs.extend(existing.jobs.iter().cloned());
        existing.end = start;

        let concurrency = jobs.len();
        self.regions.insert(idx + 1, Region::new(start, end, jobs));
        self.observe(concurrency);
        Ok(())
    }

    /// Largest membership produced by any insertion so far.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Regions in stored (start-ascending) order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Consume the engine, yielding its regions.
    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }

    fn observe(&mut self, concurrency: usize) {
        self.max_concurrency = self.max_concurrency.max(concurrency);
    }
}
