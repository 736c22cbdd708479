//! Outcome tally and the final summary line.

use std::time::{Duration, Instant};

use crate::job::JobOutcome;
use crate::resolver::Operation;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Jobs observed as completed (succeeded or failed).
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// e.g. `Download of 2 songs finished in 3.142 seconds (2 succeeded, 0 failed)`.
    pub fn message(&self, operation: Operation) -> String {
        format!(
            "{} of {} song{} finished in {} seconds ({} succeeded, {} failed)",
            operation.noun(),
            self.processed,
            if self.processed == 1 { "" } else { "s" },
            format_seconds(self.elapsed),
            self.succeeded,
            self.failed
        )
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Millisecond precision, never shown as zero.
fn format_seconds(elapsed: Duration) -> String {
    format!("{:.3}", elapsed.as_secs_f64().max(0.001))
}

/// Running count of observed outcomes. Owned by a single reporter, so no locking.
#[derive(Debug)]
pub struct Tally {
    total: usize,
    succeeded: usize,
    failed: usize,
    started: Instant,
}

impl Tally {
    /// Start timing a run of `total` dispatched jobs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            started: Instant::now(),
        }
    }

    pub fn observe(&mut self, outcome: &JobOutcome) {
        if outcome.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// True once every dispatched job has been observed exactly once.
    pub fn is_clean(&self) -> bool {
        self.processed() == self.total
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            processed: self.processed(),
            succeeded: self.succeeded,
            failed: self.failed,
            elapsed: self.started.elapsed(),
        }
    }
}
