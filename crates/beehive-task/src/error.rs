//! Error types for task lifecycle misuse and background computations.

use crate::state_machine::TaskState;

/// Errors raised when a task is driven through its lifecycle incorrectly.
///
/// These never describe the outcome of the computation itself; that is a
/// [`TaskFailure`](crate::TaskFailure) carried inside the task's result slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid state transition: {current:?} -> {requested:?}")]
    InvalidTransition {
        current: TaskState,
        requested: TaskState,
    },

    #[error("Task is in terminal state: {0:?}")]
    TerminalState(TaskState),

    #[error("Task finished its background step without recording an outcome")]
    MissingOutcome,
}

/// Failure returned by a [`Work`](crate::Work) computation.
///
/// Converted into a [`TaskFailure`](crate::TaskFailure) of kind
/// [`Computation`](crate::FailureKind::Computation) by the background step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct WorkError {
    message: String,
}

impl WorkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for WorkError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for WorkError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<std::fmt::Error> for WorkError {
    fn from(err: std::fmt::Error) -> Self {
        Self::new(err.to_string())
    }
}
