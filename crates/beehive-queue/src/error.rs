//! Error types for scheduling and queue configuration.

use beehive_task::{TaskError, TaskId};

/// Errors returned synchronously by the queue.
///
/// None of these describe a task's computation; a computation failure always reaches
/// the caller through its delivery as a [`TaskFailure`](beehive_task::TaskFailure).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Work queue is full: {capacity} tasks already in flight")]
    QueueFull { capacity: usize },

    #[error("Work queue is shut down")]
    ShutDown,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start worker pool: {0}")]
    Runtime(String),

    #[error("Completion for task {0} does not match its pending delivery")]
    CompletionMismatch(TaskId),

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl From<toml::de::Error> for QueueError {
    fn from(err: toml::de::Error) -> Self {
        QueueError::InvalidConfig(err.to_string())
    }
}

impl From<std::io::Error> for QueueError {
    fn from(err: std::io::Error) -> Self {
        QueueError::Runtime(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beehive_task::TaskState;

    #[test]
    fn test_queue_full_display() {
        let err = QueueError::QueueFull { capacity: 8 };
        assert_eq!(err.to_string(), "Work queue is full: 8 tasks already in flight");
    }

    #[test]
    fn test_task_error_is_transparent() {
        let err: QueueError = TaskError::TerminalState(TaskState::Delivered).into();
        assert_eq!(err.to_string(), "Task is in terminal state: Delivered");
    }
}
