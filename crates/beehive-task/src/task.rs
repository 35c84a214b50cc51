//! The deferred task: owned inputs, a result slot and a linear lifecycle.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cancellation::CancellationHandle;
use crate::delivery::Delivery;
use crate::error::TaskError;
use crate::outcome::{TaskFailure, TaskOutcome};
use crate::state_machine::{TaskState, validate_transition};
use crate::work::Work;

/// Unique task identifier (UUID v7, so ids sort by creation time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// One unit of deferred work.
///
/// The background step ([`run_background`](AsyncTask::run_background)) is the only code
/// that touches the task off the coordinating context, and it only reads the task's own
/// inputs. [`deliver`](AsyncTask::deliver) consumes the task: once delivered, it is gone.
pub struct AsyncTask<W: Work> {
    id: TaskId,
    work: W,
    state: TaskState,
    slot: Option<TaskOutcome<W::Output>>,
    cancellation: CancellationHandle,
    elapsed: Option<Duration>,
}

impl<W: Work> AsyncTask<W> {
    pub fn new(work: W) -> Self {
        Self {
            id: TaskId::new(),
            work,
            state: TaskState::Created,
            slot: None,
            cancellation: CancellationHandle::new(),
            elapsed: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn name(&self) -> &str {
        self.work.name()
    }

    pub fn work(&self) -> &W {
        &self.work
    }

    /// A handle that can cancel this task until its background step starts.
    pub fn cancellation(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// The recorded outcome, once the background step has finished.
    pub fn outcome(&self) -> Option<&TaskOutcome<W::Output>> {
        self.slot.as_ref()
    }

    /// Wall time spent in the background step.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Accept the task into a queue: `Created -> Queued`.
    pub fn mark_queued(&mut self) -> Result<(), TaskError> {
        self.transition(TaskState::Queued)
    }

    /// Execute the computation and record its outcome.
    ///
    /// Walks `Queued -> Running -> AwaitingDelivery`. A returned error, a panic inside
    /// the computation, or a cancellation that won the race are all recorded as a
    /// [`TaskFailure`]; none of them escape. The only `Err` is lifecycle misuse.
    pub fn run_background(&mut self) -> Result<(), TaskError> {
        self.transition(TaskState::Running)?;
        let started = Instant::now();

        let outcome = if !self.cancellation.begin() {
            debug!(task_id = %self.id, "Task cancelled before start, skipping computation");
            TaskOutcome::Failure(TaskFailure::cancelled())
        } else {
            match catch_unwind(AssertUnwindSafe(|| self.work.run())) {
                Ok(Ok(value)) => TaskOutcome::Success(value),
                Ok(Err(err)) => {
                    debug!(task_id = %self.id, error = %err, "Task computation failed");
                    TaskOutcome::Failure(TaskFailure::computation(err.message()))
                }
                Err(panic) => {
                    let failure = TaskFailure::from_panic(panic.as_ref());
                    warn!(task_id = %self.id, message = %failure.message, "Task computation panicked");
                    TaskOutcome::Failure(failure)
                }
            }
        };

        self.slot = Some(outcome);
        self.elapsed = Some(started.elapsed());
        self.transition(TaskState::AwaitingDelivery)
    }

    /// Hand the recorded outcome to `delivery`: `AwaitingDelivery -> Delivered`.
    ///
    /// Must run on the coordinating context. Consumes the task.
    pub fn deliver(mut self, delivery: Delivery<W::Output>) -> Result<(), TaskError> {
        validate_transition(self.state, TaskState::Delivered)?;
        let outcome = self.slot.take().ok_or(TaskError::MissingOutcome)?;
        self.transition(TaskState::Delivered)?;
        debug!(task_id = %self.id, via = delivery.kind(), success = outcome.is_success(), "Delivering task outcome");
        delivery.settle(outcome);
        Ok(())
    }

    /// Take the outcome without a delivery strategy, leaving the task `Delivered`.
    pub fn into_outcome(mut self) -> Result<TaskOutcome<W::Output>, TaskError> {
        validate_transition(self.state, TaskState::Delivered)?;
        let outcome = self.slot.take().ok_or(TaskError::MissingOutcome)?;
        self.transition(TaskState::Delivered)?;
        Ok(outcome)
    }

    fn transition(&mut self, to: TaskState) -> Result<(), TaskError> {
        validate_transition(self.state, to)?;
        debug!(task_id = %self.id, from = %self.state, to = %to, "Task state transition");
        self.state = to;
        Ok(())
    }
}

impl<W: Work> std::fmt::Debug for AsyncTask<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTask")
            .field("id", &self.id)
            .field("name", &self.work.name())
            .field("state", &self.state)
            .field("has_outcome", &self.slot.is_some())
            .finish()
    }
}
