//! The coordinating context.
//!
//! A [`WorkQueue`] lives on the thread that owns it. Background steps run on the
//! [`ThreadPool`]; a worker that finishes a task sends the whole task back over an
//! unbounded channel, and the queue's owner delivers it during [`turn`](WorkQueue::turn),
//! [`run`](WorkQueue::run) or [`run_async`](WorkQueue::run_async).
//!
//! Delivery strategies stay in the queue's pending map and never leave the owning
//! thread, so handlers may capture `Rc`/`RefCell` state. Deliveries run one at a time,
//! in completion order.
//!
//! A task keeps its pool slot until it has been delivered, so a queue whose owner stops
//! turning fills up and rejects instead of buffering finished tasks without bound.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use beehive_task::{
    AsyncTask, CancellationHandle, Deferred, Delivery, Promise, TaskFailure, TaskId, TaskState,
    Work,
};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::config::WorkQueueConfig;
use crate::error::QueueError;
use crate::pool::{Reservation, ThreadPool};
use crate::registry::TaskRegistry;
use crate::stats::{QueueStats, StatsSnapshot};

/// A finished task on its way back to the coordinating context.
type FinishedTask = Box<dyn Any + Send>;

/// Delivers a finished task; knows its concrete type.
type Finisher = Box<dyn FnOnce(FinishedTask) -> Result<(), QueueError>>;

struct Completion {
    task_id: TaskId,
    task: FinishedTask,
    /// Held until the owner has delivered the task.
    reservation: Reservation,
}

struct PendingDelivery {
    finish: Finisher,
    cancellation: CancellationHandle,
}

/// Bounded work queue bound to the thread that created it.
///
/// `WorkQueue` is `!Send`: it holds caller-side handlers that must only ever run on
/// the coordinating context.
pub struct WorkQueue {
    config: WorkQueueConfig,
    pool: ThreadPool,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    pending: HashMap<TaskId, PendingDelivery>,
    registry: TaskRegistry,
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    pub fn new(config: WorkQueueConfig) -> Result<Self, QueueError> {
        let pool = ThreadPool::new(&config)?;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            pool,
            completions_tx,
            completions_rx,
            pending: HashMap::new(),
            registry: TaskRegistry::new(),
            stats: Arc::new(QueueStats::new()),
        })
    }

    /// Queue configured from `BEEHIVE_*` environment variables.
    pub fn from_env() -> Result<Self, QueueError> {
        Self::new(WorkQueueConfig::from_env())
    }

    /// Schedule `task` and remember how to deliver its outcome.
    ///
    /// Returns immediately. On `Err` nothing was scheduled and `delivery` is dropped
    /// without being invoked (a dropped [`Deferred`] rejects its promise as abandoned).
    pub fn submit<W: Work>(
        &mut self,
        mut task: AsyncTask<W>,
        delivery: Delivery<W::Output>,
    ) -> Result<TaskId, QueueError> {
        let task_id = task.id();
        let slot = match self.pool.reserve() {
            Ok(slot) => slot,
            Err(err) => {
                self.stats.record_rejected();
                warn!(task_id = %task_id, error = %err, "Task rejected");
                return Err(err);
            }
        };

        task.mark_queued()?;
        self.registry.register(task_id, task.name());
        self.registry.transition(task_id, TaskState::Queued)?;

        let finish: Finisher = Box::new(move |finished: FinishedTask| {
            let task = finished
                .downcast::<AsyncTask<W>>()
                .map_err(|_| QueueError::CompletionMismatch(task_id))?;
            (*task).deliver(delivery)?;
            Ok(())
        });
        self.pending.insert(
            task_id,
            PendingDelivery {
                finish,
                cancellation: task.cancellation(),
            },
        );
        self.stats.record_submitted();
        debug!(task_id = %task_id, name = task.name(), "Task queued");

        let registry = self.registry.clone();
        let stats = Arc::clone(&self.stats);
        let completions = self.completions_tx.clone();
        slot.spawn(move |reservation| {
            if let Err(err) = registry.transition(task_id, TaskState::Running) {
                warn!(task_id = %task_id, error = %err, "Registry out of sync");
            }
            if let Err(err) = task.run_background() {
                warn!(task_id = %task_id, error = %err, "Background step rejected");
            }
            if let Err(err) = registry.transition(task_id, TaskState::AwaitingDelivery) {
                warn!(task_id = %task_id, error = %err, "Registry out of sync");
            }
            stats.record_outcome(
                task.outcome().and_then(|o| o.failure()).map(|f| f.kind),
                task.elapsed().unwrap_or_default(),
            );
            let completion = Completion {
                task_id,
                task: Box::new(task),
                reservation,
            };
            if completions.send(completion).is_err() {
                debug!(task_id = %task_id, "Work queue dropped before delivery");
            }
        });

        Ok(task_id)
    }

    /// Schedule `task` with a node-style `(error, result)` handler.
    pub fn submit_callback<W, F>(
        &mut self,
        task: AsyncTask<W>,
        handler: F,
    ) -> Result<TaskId, QueueError>
    where
        W: Work,
        F: FnOnce(Option<TaskFailure>, Option<W::Output>) + 'static,
    {
        self.submit(task, Delivery::callback(handler))
    }

    /// Schedule `task` and get a promise for its outcome.
    pub fn submit_promise<W: Work>(
        &mut self,
        task: AsyncTask<W>,
    ) -> Result<Promise<W::Output>, QueueError> {
        let (deferred, promise) = Deferred::pair();
        self.submit(task, Delivery::deferred(deferred))?;
        Ok(promise)
    }

    /// Deliver every task that has already finished, without blocking.
    ///
    /// Returns the number of deliveries made.
    pub fn turn(&mut self) -> Result<usize, QueueError> {
        let mut delivered = 0;
        loop {
            match self.completions_rx.try_recv() {
                Ok(completion) => {
                    self.complete(completion)?;
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => return Ok(delivered),
                Err(TryRecvError::Disconnected) => return Err(QueueError::ShutDown),
            }
        }
    }

    /// Block until at least one delivery happens, then deliver whatever else is ready.
    ///
    /// Returns `Ok(0)` immediately when nothing is pending.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn run_once(&mut self) -> Result<usize, QueueError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let completion = self
            .completions_rx
            .blocking_recv()
            .ok_or(QueueError::ShutDown)?;
        self.complete(completion)?;
        Ok(1 + self.turn()?)
    }

    /// Block until every submitted task has been delivered.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context; use
    /// [`run_async`](WorkQueue::run_async) there.
    pub fn run(&mut self) -> Result<usize, QueueError> {
        let mut delivered = self.turn()?;
        while !self.pending.is_empty() {
            let completion = self
                .completions_rx
                .blocking_recv()
                .ok_or(QueueError::ShutDown)?;
            self.complete(completion)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Wait until every submitted task has been delivered.
    pub async fn run_async(&mut self) -> Result<usize, QueueError> {
        let mut delivered = self.turn()?;
        while !self.pending.is_empty() {
            let completion = self
                .completions_rx
                .recv()
                .await
                .ok_or(QueueError::ShutDown)?;
            self.complete(completion)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Cancel a task that has not started its background step.
    ///
    /// Returns `Ok(false)` if the task is already running or finished; it will deliver
    /// its real outcome. A cancelled task still delivers once, with a `Cancelled` failure.
    pub fn cancel(&self, task_id: TaskId) -> Result<bool, QueueError> {
        let pending = self
            .pending
            .get(&task_id)
            .ok_or(QueueError::TaskNotFound(task_id))?;
        let cancelled = pending.cancellation.cancel();
        debug!(task_id = %task_id, cancelled, "Cancellation requested");
        Ok(cancelled)
    }

    /// Current lifecycle state of an undelivered task.
    pub fn state(&self, task_id: TaskId) -> Option<TaskState> {
        self.registry.state(task_id)
    }

    /// Tasks accepted but not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &WorkQueueConfig {
        &self.config
    }

    /// Stop accepting tasks. Already accepted tasks still run and deliver.
    pub fn close(&mut self) {
        self.pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Close, deliver everything outstanding and stop the pool.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context; use
    /// [`shutdown_async`](WorkQueue::shutdown_async) there.
    pub fn shutdown(mut self) -> Result<StatsSnapshot, QueueError> {
        self.close();
        self.run()?;
        Ok(self.finish())
    }

    pub async fn shutdown_async(mut self) -> Result<StatsSnapshot, QueueError> {
        self.close();
        self.run_async().await?;
        Ok(self.finish())
    }

    fn finish(&self) -> StatsSnapshot {
        let snapshot = self.stats.snapshot();
        info!(summary = %snapshot.format_summary(), "Work queue shut down");
        snapshot
    }

    fn complete(&mut self, completion: Completion) -> Result<(), QueueError> {
        let Completion {
            task_id,
            task,
            reservation,
        } = completion;
        let pending = self
            .pending
            .remove(&task_id)
            .ok_or(QueueError::TaskNotFound(task_id))?;
        if let Err(err) = self.registry.complete(task_id) {
            warn!(task_id = %task_id, error = %err, "Registry out of sync");
        }
        let delivered = (pending.finish)(task);
        reservation.release();
        delivered?;
        self.stats.record_delivered();
        debug!(task_id = %task_id, "Task delivered");
        Ok(())
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                pending = self.pending.len(),
                "Work queue dropped with undelivered tasks"
            );
        }
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .field("pending", &self.pending.len())
            .finish()
    }
}
