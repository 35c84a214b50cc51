//! Queue counters.
//!
//! Updated from worker threads and the coordinating context with relaxed atomics; a
//! [`StatsSnapshot`] is a consistent-enough copy for logging and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use beehive_task::FailureKind;
use serde::{Deserialize, Serialize};

/// Live counters shared by a queue and its worker jobs.
#[derive(Debug, Default)]
pub struct QueueStats {
    submitted: AtomicU64,
    rejected: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    delivered: AtomicU64,
    background_micros: AtomicU64,
}

impl QueueStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished background step. `None` means success.
    pub fn record_outcome(&self, failure: Option<FailureKind>, elapsed: Duration) {
        match failure {
            None => self.succeeded.fetch_add(1, Ordering::Relaxed),
            Some(FailureKind::Cancelled) => self.cancelled.fetch_add(1, Ordering::Relaxed),
            Some(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.background_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let cancelled = self.cancelled.load(Ordering::Relaxed);
        let finished = succeeded + failed + cancelled;
        let total_micros = self.background_micros.load(Ordering::Relaxed);

        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            succeeded,
            failed,
            cancelled,
            delivered: self.delivered.load(Ordering::Relaxed),
            avg_background_micros: if finished > 0 {
                total_micros / finished
            } else {
                0
            },
        }
    }
}

/// Point-in-time copy of [`QueueStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub rejected: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub delivered: u64,
    pub avg_background_micros: u64,
}

impl StatsSnapshot {
    /// Submitted tasks not yet delivered.
    pub fn outstanding(&self) -> u64 {
        self.submitted.saturating_sub(self.delivered)
    }

    /// Every accepted task has been delivered.
    pub fn is_drained(&self) -> bool {
        self.outstanding() == 0
    }

    pub fn success_rate(&self) -> f64 {
        let finished = self.succeeded + self.failed + self.cancelled;
        if finished == 0 {
            return 1.0;
        }
        self.succeeded as f64 / finished as f64
    }

    /// Format for logging.
    pub fn format_summary(&self) -> String {
        format!(
            "Submitted: {} | Rejected: {} | Delivered: {} | Success: {:.1}% | Failed: {} | Cancelled: {} | Avg Background: {:.2}ms",
            self.submitted,
            self.rejected,
            self.delivered,
            self.success_rate() * 100.0,
            self.failed,
            self.cancelled,
            self.avg_background_micros as f64 / 1000.0
        )
    }
}
