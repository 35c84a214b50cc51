//! Bounded worker pool.
//!
//! A private multi-thread runtime whose blocking pool is capped at `pool_size` threads.
//! Admission is a semaphore with `pool_size + queue_capacity` permits. A job is handed
//! its [`Reservation`] and the permit stays taken until that reservation is released or
//! dropped, which may be after the job itself returns. A full pool is reported instead
//! of waited on.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::{debug, info};

use crate::config::WorkQueueConfig;
use crate::error::QueueError;

/// Fixed-size pool of worker threads.
pub struct ThreadPool {
    runtime: Option<Runtime>,
    permits: Arc<Semaphore>,
    pool_size: usize,
    capacity: usize,
}

impl ThreadPool {
    pub fn new(config: &WorkQueueConfig) -> Result<Self, QueueError> {
        config.validate()?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.pool_size)
            .thread_name(config.thread_name.clone())
            .build()?;

        info!(
            pool_size = config.pool_size,
            capacity = config.capacity(),
            thread_name = %config.thread_name,
            "Worker pool started"
        );

        Ok(Self {
            runtime: Some(runtime),
            permits: Arc::new(Semaphore::new(config.capacity())),
            pool_size: config.pool_size,
            capacity: config.capacity(),
        })
    }

    /// Reserve room for one job without blocking.
    pub fn reserve(&self) -> Result<Slot<'_>, QueueError> {
        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|err| match err {
                TryAcquireError::NoPermits => QueueError::QueueFull {
                    capacity: self.capacity,
                },
                TryAcquireError::Closed => QueueError::ShutDown,
            })?;
        Ok(Slot { pool: self, permit })
    }

    /// Reservations currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stop admitting new jobs. Jobs already reserved still run.
    pub fn close(&self) {
        if !self.permits.is_closed() {
            debug!("Worker pool closed to new jobs");
            self.permits.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            // Safe inside or outside an async context.
            runtime.shutdown_background();
            debug!("Worker pool stopped");
        }
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("pool_size", &self.pool_size)
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// A reserved place in the pool. Dropping it unused releases the reservation.
pub struct Slot<'a> {
    pool: &'a ThreadPool,
    permit: OwnedSemaphorePermit,
}

impl Slot<'_> {
    /// Run `job` on a worker thread, handing it the reservation.
    ///
    /// The job may release the reservation, drop it, or pass it on to outlive the job.
    pub fn spawn(self, job: impl FnOnce(Reservation) + Send + 'static) {
        let Slot { pool, permit } = self;
        match pool.runtime.as_ref() {
            Some(runtime) => {
                runtime.spawn_blocking(move || job(Reservation { _permit: permit }));
            }
            None => drop(permit),
        }
    }
}

/// A running job's hold on its place in the pool.
pub struct Reservation {
    _permit: OwnedSemaphorePermit,
}

impl Reservation {
    pub fn release(self) {}
}
