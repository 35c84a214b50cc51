//! Task state machine enforcement.
//!
//! Every task walks the same linear lifecycle:
//!
//! ```text
//! Created -> Queued -> Running -> AwaitingDelivery -> Delivered
//! Delivered -> ERROR (terminal, no further transitions)
//! ```
//!
//! No transition skips a state. A failed or cancelled computation still passes through
//! `Running` and `AwaitingDelivery`; the failure lives in the result slot, not the state.

use crate::error::TaskError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an [`AsyncTask`](crate::AsyncTask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Built by the caller, not yet accepted by a queue
    Created,
    /// Accepted by a queue, waiting for a worker thread
    Queued,
    /// Background step executing on a worker thread
    Running,
    /// Background step finished; outcome recorded, waiting for the coordinating context
    AwaitingDelivery,
    /// Handler invoked or promise settled
    Delivered,
}

impl TaskState {
    /// The only state this one may move to, or `None` for the terminal state.
    pub fn successor(self) -> Option<TaskState> {
        match self {
            TaskState::Created => Some(TaskState::Queued),
            TaskState::Queued => Some(TaskState::Running),
            TaskState::Running => Some(TaskState::AwaitingDelivery),
            TaskState::AwaitingDelivery => Some(TaskState::Delivered),
            TaskState::Delivered => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Created => "created",
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::AwaitingDelivery => "awaiting_delivery",
            TaskState::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a task state transition.
///
/// Returns `Ok(())` if `to` is the direct successor of `from`.
pub fn validate_transition(from: TaskState, to: TaskState) -> Result<(), TaskError> {
    match from.successor() {
        Some(next) if next == to => Ok(()),
        Some(_) => Err(TaskError::InvalidTransition {
            current: from,
            requested: to,
        }),
        None => Err(TaskError::TerminalState(from)),
    }
}

/// Returns `true` if the state is terminal (no further transitions allowed).
pub fn is_terminal(state: TaskState) -> bool {
    matches!(state, TaskState::Delivered)
}
