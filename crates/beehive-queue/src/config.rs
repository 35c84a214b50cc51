//! Work queue configuration.
//!
//! Loaded from defaults, environment variables or a TOML document:
//!
//! ```toml
//! pool_size = 8
//! queue_capacity = 256
//! thread_name = "beehive-worker"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Environment variable overriding [`WorkQueueConfig::pool_size`].
pub const ENV_POOL_SIZE: &str = "BEEHIVE_THREADPOOL_SIZE";
/// Environment variable overriding [`WorkQueueConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "BEEHIVE_QUEUE_CAPACITY";
/// Environment variable overriding [`WorkQueueConfig::thread_name`].
pub const ENV_THREAD_NAME: &str = "BEEHIVE_THREAD_NAME";

/// Configuration for a [`WorkQueue`](crate::WorkQueue) and its worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkQueueConfig {
    /// Worker threads executing background steps in parallel
    pub pool_size: usize,
    /// Tasks allowed to wait for a worker beyond those already running
    pub queue_capacity: usize,
    /// Name given to worker threads
    pub thread_name: String,
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            queue_capacity: 1024,
            thread_name: "beehive-worker".to_string(),
        }
    }
}

impl WorkQueueConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let pool_size = lookup(ENV_POOL_SIZE)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.pool_size);

        let queue_capacity = lookup(ENV_QUEUE_CAPACITY)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.queue_capacity);

        let thread_name = lookup(ENV_THREAD_NAME)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.thread_name);

        Self {
            pool_size,
            queue_capacity,
            thread_name,
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, QueueError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Maximum number of tasks in flight at once (running plus waiting).
    pub fn capacity(&self) -> usize {
        self.pool_size.saturating_add(self.queue_capacity)
    }

    pub fn validate(&self) -> Result<(), QueueError> {
        if self.pool_size == 0 {
            return Err(QueueError::InvalidConfig(
                "pool_size must be at least 1".to_string(),
            ));
        }
        if self.capacity() > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(QueueError::InvalidConfig(format!(
                "pool_size + queue_capacity must not exceed {}",
                tokio::sync::Semaphore::MAX_PERMITS
            )));
        }
        if self.thread_name.trim().is_empty() {
            return Err(QueueError::InvalidConfig(
                "thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
