//! Promise-style delivery.
//!
//! A [`Deferred`] is the settling side, handed to the task's delivery step. A
//! [`Promise`] is the caller's side and resolves to `Result<T, TaskFailure>`. Dropping a
//! `Deferred` without settling it rejects the promise with an
//! [`Abandoned`](crate::FailureKind::Abandoned) failure, so a promise never hangs forever.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::debug;

use crate::outcome::{TaskFailure, TaskOutcome};

/// Settling side of a promise. Consumed by the first (and only) settle.
#[derive(Debug)]
pub struct Deferred<T> {
    tx: oneshot::Sender<TaskOutcome<T>>,
}

impl<T> Deferred<T> {
    /// Create a connected `(Deferred, Promise)` pair.
    pub fn pair() -> (Deferred<T>, Promise<T>) {
        let (tx, rx) = oneshot::channel();
        (Deferred { tx }, Promise { rx: Some(rx) })
    }

    /// Settle with a task outcome. Returns `false` if the promise was already dropped.
    pub fn settle(self, outcome: TaskOutcome<T>) -> bool {
        let delivered = self.tx.send(outcome).is_ok();
        if !delivered {
            debug!("Promise dropped before settle; outcome discarded");
        }
        delivered
    }

    pub fn resolve(self, value: T) -> bool {
        self.settle(TaskOutcome::Success(value))
    }

    pub fn reject(self, failure: TaskFailure) -> bool {
        self.settle(TaskOutcome::Failure(failure))
    }

    /// Whether the caller still holds the promise.
    pub fn is_observed(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Caller's side of a promise.
///
/// Await it from async code, poll it with [`try_take`](Promise::try_take) from an event
/// loop, or block on it with [`blocking_wait`](Promise::blocking_wait) from a plain thread.
#[derive(Debug)]
pub struct Promise<T> {
    rx: Option<oneshot::Receiver<TaskOutcome<T>>>,
}

impl<T> Promise<T> {
    /// Take the settled result without blocking.
    ///
    /// Returns `None` while pending, and again on every call after the result has been
    /// taken.
    pub fn try_take(&mut self) -> Option<Result<T, TaskFailure>> {
        let rx = self.rx.as_mut()?;
        let result = match rx.try_recv() {
            Ok(outcome) => outcome.into_result(),
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(TaskFailure::abandoned()),
        };
        self.rx = None;
        Some(result)
    }

    /// Block the current thread until settled.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_wait(self) -> Result<T, TaskFailure> {
        let Some(rx) = self.rx else {
            return Err(TaskFailure::abandoned());
        };
        match rx.blocking_recv() {
            Ok(outcome) => outcome.into_result(),
            Err(_) => Err(TaskFailure::abandoned()),
        }
    }

    pub fn is_taken(&self) -> bool {
        self.rx.is_none()
    }
}

impl<T> Future for Promise<T> {
    type Output = Result<T, TaskFailure>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(Err(TaskFailure::abandoned()));
        };
        let result = match Pin::new(rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(outcome)) => outcome.into_result(),
            Poll::Ready(Err(_)) => Err(TaskFailure::abandoned()),
        };
        self.rx = None;
        Poll::Ready(result)
    }
}
