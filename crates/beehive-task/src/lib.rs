//! # Deferred Task Abstraction
//!
//! **One unit of background work with a guaranteed, exactly-once completion.**
//!
//! An [`AsyncTask`] owns its inputs (a [`Work`] value) and a private result slot. It is
//! split into two phases that run on different threads:
//!
//! - **Background step** ([`AsyncTask::run_background`]): runs on a worker thread, touches
//!   only the task's own inputs, and converts every error or panic into a
//!   [`TaskFailure`]. Nothing escapes this call.
//! - **Delivery** ([`AsyncTask::deliver`]): runs on the coordinating context and hands the
//!   outcome to a [`Delivery`], either a two-argument callback or a [`Deferred`] promise.
//!   It consumes the task, so a second delivery cannot be expressed.
//!
//! ## Quick Start
//!
//! ```rust
//! use beehive_task::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut task = AsyncTask::new(FnWork::new("double", || Ok::<_, WorkError>(21 * 2)));
//! task.mark_queued().unwrap();
//! task.run_background().unwrap();
//!
//! let seen = Rc::new(RefCell::new(None));
//! let sink = Rc::clone(&seen);
//! task.deliver(Delivery::callback(move |err, value| {
//!     *sink.borrow_mut() = Some((err, value));
//! }))
//! .unwrap();
//! assert_eq!(*seen.borrow(), Some((None, Some(42))));
//! ```
//!
//! ## Architecture
//!
//! - **`Work` trait**: the computation; the crate treats it as an external collaborator
//! - **`TaskOutcome`**: success value OR failure, never both
//! - **State machine**: `Created → Queued → Running → AwaitingDelivery → Delivered`
//! - **`Delivery`**: callback and promise strategies over the same task
//! - **`Payload`**: text or buffer view of one computed string

pub mod cancellation;
pub mod delivery;
pub mod error;
pub mod outcome;
pub mod payload;
pub mod prelude;
pub mod promise;
pub mod state_machine;
pub mod task;
pub mod work;

// Re-exports for convenience
pub use cancellation::CancellationHandle;
pub use delivery::{Callback, Delivery};
pub use error::{TaskError, WorkError};
pub use outcome::{FailureKind, TaskFailure, TaskOutcome};
pub use payload::{Payload, ResultFormat};
pub use promise::{Deferred, Promise};
pub use state_machine::{TaskState, is_terminal, validate_transition};
pub use task::{AsyncTask, TaskId};
pub use work::{FnWork, Work};
