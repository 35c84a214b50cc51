//! Errors surfaced to add-on callers.
//!
//! Validation messages are kept verbatim so host-side assertions can match them.

use beehive_queue::QueueError;
use beehive_task::TaskFailure;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddonError {
    /// Bad argument or option value, detected before any task exists
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Unknown export: {0}")]
    UnknownExport(String),

    /// The queue refused the task
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The background computation failed
    #[error(transparent)]
    Failed(#[from] TaskFailure),
}

impl AddonError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AddonError::InvalidArgument(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AddonError::InvalidArgument(_))
    }
}
