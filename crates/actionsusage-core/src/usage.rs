//! Worker-minute accounting.

use chrono::TimeDelta;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Sums job durations, each rounded up to a whole minute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UsageAccumulator {
    total_minutes: i64,
    jobs: u64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one job and return the minutes it was billed.
    ///
    /// Negative durations bill nothing.
    pub fn record(&mut self, elapsed: TimeDelta) -> i64 {
        let minutes = billed_minutes(elapsed);
        self.total_minutes += minutes;
        self.jobs += 1;
        minutes
    }

    pub fn total_minutes(&self) -> i64 {
        self.total_minutes
    }

    pub fn jobs(&self) -> u64 {
        self.jobs
    }
}

/// `ceil(elapsed / 1 minute)`, floored at zero.
pub fn billed_minutes(elapsed: TimeDelta) -> i64 {
    let millis = elapsed.num_milliseconds().max(0);
    (millis + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE
}
