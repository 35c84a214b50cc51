//! Prelude module for convenient imports.
//!
//! ```rust
//! use beehive_queue::prelude::*;
//! ```

pub use crate::config::WorkQueueConfig;
pub use crate::error::QueueError;
pub use crate::queue::WorkQueue;
pub use crate::registry::{TaskRecord, TaskRegistry};
pub use crate::stats::StatsSnapshot;
