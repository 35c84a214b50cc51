//! # Beehive Work Queue
//!
//! **Run [`AsyncTask`](beehive_task::AsyncTask)s on a bounded worker pool and deliver
//! their outcomes back on the thread that submitted them.**
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beehive_queue::prelude::*;
//! use beehive_task::prelude::*;
//!
//! # fn main() -> Result<(), QueueError> {
//! let mut queue = WorkQueue::new(WorkQueueConfig::from_env())?;
//!
//! let task = AsyncTask::new(FnWork::new("greet", || Ok::<_, WorkError>("hello world")));
//! queue.submit_callback(task, |err, value| match (err, value) {
//!     (None, Some(value)) => println!("{value}"),
//!     (Some(failure), _) => eprintln!("{failure}"),
//!     _ => unreachable!(),
//! })?;
//!
//! let mut promise = queue.submit_promise(AsyncTask::new(FnWork::new("answer", || {
//!     Ok::<_, WorkError>(42)
//! })))?;
//!
//! queue.run()?;
//! assert_eq!(promise.try_take(), Some(Ok(42)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`ThreadPool`**: `pool_size` worker threads, admission capped at
//!   `pool_size + queue_capacity`; a full pool is an error, never a wait
//! - **`WorkQueue`**: the coordinating context (`!Send`); owns handlers and delivers
//! - **`TaskRegistry`**: live per-task state, validated against the task state machine
//! - **`QueueStats`**: counters for submitted, rejected and delivered work

pub mod config;
pub mod error;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod registry;
pub mod stats;

// Re-exports for convenience
pub use config::WorkQueueConfig;
pub use error::QueueError;
pub use pool::{Reservation, Slot, ThreadPool};
pub use queue::WorkQueue;
pub use registry::{TaskRecord, TaskRegistry};
pub use stats::{QueueStats, StatsSnapshot};
