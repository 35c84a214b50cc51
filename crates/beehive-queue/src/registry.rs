//! Live view of tasks owned by a queue.
//!
//! Workers and the coordinating context both update records, so the map sits behind a
//! `parking_lot` lock. Every state change goes through the task state machine. Records
//! are removed when their task is delivered.

use std::collections::HashMap;
use std::sync::Arc;

use beehive_task::{TaskId, TaskState, validate_transition};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::QueueError;

/// Snapshot of one in-flight task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub name: String,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Shared registry of in-flight tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task in the `Created` state.
    pub fn register(&self, task_id: TaskId, name: impl Into<String>) -> TaskRecord {
        let now = Utc::now();
        let record = TaskRecord {
            task_id,
            name: name.into(),
            state: TaskState::Created,
            created_at: now,
            last_updated_at: now,
        };
        self.tasks.write().insert(task_id, record.clone());
        record
    }

    /// Move a task to `to`, validated against the state machine.
    pub fn transition(&self, task_id: TaskId, to: TaskState) -> Result<(), QueueError> {
        let mut tasks = self.tasks.write();
        let record = tasks
            .get_mut(&task_id)
            .ok_or(QueueError::TaskNotFound(task_id))?;
        validate_transition(record.state, to)?;
        record.state = to;
        record.last_updated_at = Utc::now();
        Ok(())
    }

    /// Mark a task `Delivered` and drop it from the registry.
    pub fn complete(&self, task_id: TaskId) -> Result<TaskRecord, QueueError> {
        let mut tasks = self.tasks.write();
        let state = tasks
            .get(&task_id)
            .map(|record| record.state)
            .ok_or(QueueError::TaskNotFound(task_id))?;
        validate_transition(state, TaskState::Delivered)?;
        let mut record = tasks
            .remove(&task_id)
            .ok_or(QueueError::TaskNotFound(task_id))?;
        record.state = TaskState::Delivered;
        record.last_updated_at = Utc::now();
        Ok(record)
    }

    pub fn get(&self, task_id: TaskId) -> Option<TaskRecord> {
        self.tasks.read().get(&task_id).cloned()
    }

    pub fn state(&self, task_id: TaskId) -> Option<TaskState> {
        self.tasks.read().get(&task_id).map(|record| record.state)
    }

    /// All records, ordered by `(created_at, task_id)`.
    pub fn list(&self) -> Vec<TaskRecord> {
        let mut records: Vec<TaskRecord> = self.tasks.read().values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.task_id.cmp(&b.task_id))
        });
        records
    }

    pub fn count(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn count_in(&self, state: TaskState) -> usize {
        self.tasks
            .read()
            .values()
            .filter(|record| record.state == state)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beehive_task::TaskError;

    #[test]
    fn test_register_and_get() {
        let registry = TaskRegistry::new();
        let id = TaskId::new();
        let record = registry.register(id, "hello_async");
        assert_eq!(record.state, TaskState::Created);
        assert_eq!(registry.get(id), Some(record));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_lifecycle_then_complete_removes() {
        let registry = TaskRegistry::new();
        let id = TaskId::new();
        registry.register(id, "shout");
        registry.transition(id, TaskState::Queued).unwrap();
        registry.transition(id, TaskState::Running).unwrap();
        registry.transition(id, TaskState::AwaitingDelivery).unwrap();
        assert_eq!(registry.count_in(TaskState::AwaitingDelivery), 1);

        let record = registry.complete(id).unwrap();
        assert_eq!(record.state, TaskState::Delivered);
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.state(id), None);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let registry = TaskRegistry::new();
        let id = TaskId::new();
        registry.register(id, "shout");
        let err = registry.transition(id, TaskState::Running).unwrap_err();
        assert_eq!(
            err,
            QueueError::Task(TaskError::InvalidTransition {
                current: TaskState::Created,
                requested: TaskState::Running,
            })
        );
        assert_eq!(registry.state(id), Some(TaskState::Created));
    }

    #[test]
    fn test_complete_requires_awaiting_delivery() {
        let registry = TaskRegistry::new();
        let id = TaskId::new();
        registry.register(id, "early");
        registry.transition(id, TaskState::Queued).unwrap();
        assert!(registry.complete(id).is_err());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_unknown_task() {
        let registry = TaskRegistry::new();
        let id = TaskId::new();
        assert_eq!(
            registry.transition(id, TaskState::Queued),
            Err(QueueError::TaskNotFound(id))
        );
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_list_is_ordered_by_creation() {
        let registry = TaskRegistry::new();
        let ids: Vec<TaskId> = (0..5).map(|_| TaskId::new()).collect();
        for id in ids.iter().rev() {
            registry.register(*id, "ordered");
        }
        let listed = registry.list();
        assert_eq!(listed.len(), 5);
        for pair in listed.windows(2) {
            assert!(
                (pair[0].created_at, pair[0].task_id) <= (pair[1].created_at, pair[1].task_id)
            );
        }
    }

    #[test]
    fn test_clones_share_state() {
        let registry = TaskRegistry::new();
        let clone = registry.clone();
        let id = TaskId::new();
        registry.register(id, "shared");
        assert_eq!(clone.state(id), Some(TaskState::Created));
    }
}
