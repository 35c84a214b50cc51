//! The outcome stored in a task's result slot.

use serde::{Deserialize, Serialize};

/// Why a task failed to produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The computation returned an error
    Computation,
    /// The computation panicked; the panic was caught on the worker thread
    Panicked,
    /// The task was cancelled before its background step started
    Cancelled,
    /// The settling side of a promise went away without settling it
    Abandoned,
}

/// Error half of a [`TaskOutcome`]: what the caller's handler receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Computation, message)
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "Task cancelled before it started")
    }

    pub fn abandoned() -> Self {
        Self::new(
            FailureKind::Abandoned,
            "Promise abandoned before it was settled",
        )
    }

    /// Build a failure from a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "background task panicked".to_string()
        };
        Self::new(FailureKind::Panicked, message)
    }
}

/// The outcome of a task's background step.
///
/// Exactly one of the two variants is recorded, exactly once, by
/// [`AsyncTask::run_background`](crate::AsyncTask::run_background).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    /// The computation produced a value
    Success(T),
    /// The computation failed, panicked or was cancelled
    Failure(TaskFailure),
}

impl<T> TaskOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TaskOutcome<U> {
        match self {
            TaskOutcome::Success(value) => TaskOutcome::Success(f(value)),
            TaskOutcome::Failure(failure) => TaskOutcome::Failure(failure),
        }
    }

    /// Split into the node-style `(error, result)` pair; exactly one side is `Some`.
    pub fn into_parts(self) -> (Option<TaskFailure>, Option<T>) {
        match self {
            TaskOutcome::Success(value) => (None, Some(value)),
            TaskOutcome::Failure(failure) => (Some(failure), None),
        }
    }

    pub fn into_result(self) -> Result<T, TaskFailure> {
        match self {
            TaskOutcome::Success(value) => Ok(value),
            TaskOutcome::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, TaskFailure>> for TaskOutcome<T> {
    fn from(result: Result<T, TaskFailure>) -> Self {
        match result {
            Ok(value) => TaskOutcome::Success(value),
            Err(failure) => TaskOutcome::Failure(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_parts_is_mutually_exclusive() {
        let (err, value) = TaskOutcome::Success("rawr!").into_parts();
        assert!(err.is_none());
        assert_eq!(value, Some("rawr!"));

        let (err, value) =
            TaskOutcome::<&str>::Failure(TaskFailure::computation("boom")).into_parts();
        assert_eq!(err.map(|e| e.message), Some("boom".to_string()));
        assert!(value.is_none());
    }

    #[test]
    fn test_from_panic_extracts_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static message");
        let failure = TaskFailure::from_panic(payload.as_ref());
        assert_eq!(failure.kind, FailureKind::Panicked);
        assert_eq!(failure.message, "static message");

        let payload: Box<dyn std::any::Any + Send> = Box::new(format!("formatted {}", 7));
        assert_eq!(
            TaskFailure::from_panic(payload.as_ref()).message,
            "formatted 7"
        );

        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(
            TaskFailure::from_panic(payload.as_ref()).message,
            "background task panicked"
        );
    }

    #[test]
    fn test_map_keeps_failure() {
        let outcome: TaskOutcome<u32> = TaskOutcome::Failure(TaskFailure::cancelled());
        let mapped = outcome.map(|v| v * 2);
        assert_eq!(mapped.failure().map(|f| f.kind), Some(FailureKind::Cancelled));
    }

    #[test]
    fn test_failure_serializes_kind() {
        let json = serde_json::to_value(TaskFailure::computation("nope")).unwrap();
        assert_eq!(json["kind"], "computation");
        assert_eq!(json["message"], "nope");
    }
}
