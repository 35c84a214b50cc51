//! Pre-start cancellation for queued tasks.
//!
//! A task can be cancelled only while it waits for a worker. The handle is a three-way
//! latch (`pending`, `started`, `cancelled`) decided by a single compare-and-swap, so
//! the caller and the worker thread always agree on who won.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared cancellation latch between the coordinating context and a worker thread.
///
/// The task and the queue both hold clones.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    state: Arc<AtomicU8>,
}

impl CancellationHandle {
    /// Create a new (not-yet-started, not-cancelled) handle.
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Request cancellation.
    ///
    /// Returns `true` if the task had not started and is now cancelled. Idempotent:
    /// cancelling twice returns `true` both times. Returns `false` once the background
    /// step has begun.
    pub fn cancel(&self) -> bool {
        match self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == CANCELLED,
        }
    }

    /// Claim the task for execution. Returns `false` if it was cancelled first.
    pub fn begin(&self) -> bool {
        match self
            .state
            .compare_exchange(PENDING, STARTED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == STARTED,
        }
    }

    /// Check if cancellation won the race.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Check if the background step claimed the task.
    pub fn is_started(&self) -> bool {
        self.state.load(Ordering::Acquire) == STARTED
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}
