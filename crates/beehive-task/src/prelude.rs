//! Common imports for building and delivering tasks.
//!
//! ```rust
//! use beehive_task::prelude::*;
//! ```

pub use crate::cancellation::CancellationHandle;
pub use crate::delivery::{Callback, Delivery};
pub use crate::error::{TaskError, WorkError};
pub use crate::outcome::{FailureKind, TaskFailure, TaskOutcome};
pub use crate::payload::{Payload, ResultFormat};
pub use crate::promise::{Deferred, Promise};
pub use crate::state_machine::TaskState;
pub use crate::task::{AsyncTask, TaskId};
pub use crate::work::{FnWork, Work};
