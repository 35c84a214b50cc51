//! Module registration.
//!
//! An [`Addon`] is the loaded module: it owns the work queue and a [`ClassRegistry`] of
//! constructible classes. It is created by [`Addon::init`] and torn down explicitly with
//! [`Addon::teardown`], which drains outstanding deliveries before stopping the pool.

use std::collections::BTreeMap;

use beehive_queue::{StatsSnapshot, WorkQueue, WorkQueueConfig};
use beehive_task::{Payload, Promise, TaskId};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::AddonError;
use crate::object::{HelloObject, HelloObjectAsync};
use crate::standalone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Function,
    Class,
}

/// One name visible to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Export {
    pub name: &'static str,
    pub kind: ExportKind,
}

const FUNCTIONS: [&str; 4] = ["hello", "helloAsync", "helloPromise", "shout"];

/// An object built through the class registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instance {
    HelloObject(HelloObject),
    HelloObjectAsync(HelloObjectAsync),
}

impl Instance {
    pub fn class_name(&self) -> &'static str {
        match self {
            Instance::HelloObject(_) => "HelloObject",
            Instance::HelloObjectAsync(_) => "HelloObjectAsync",
        }
    }
}

/// Builds an [`Instance`] from a host constructor argument.
pub type Constructor = fn(Option<&Value>) -> Result<Instance, AddonError>;

/// Constructors by class name, owned by one [`Addon`].
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<&'static str, Constructor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in classes.
    pub fn with_builtin_classes() -> Self {
        let mut registry = Self::new();
        registry.register("HelloObject", construct_hello_object);
        registry.register("HelloObjectAsync", construct_hello_object_async);
        registry
    }

    /// Register a class. Returns `false` if the name was already taken (the old
    /// constructor is replaced).
    pub fn register(&mut self, name: &'static str, constructor: Constructor) -> bool {
        self.classes.insert(name, constructor).is_none()
    }

    pub fn construct(&self, name: &str, arg: Option<&Value>) -> Result<Instance, AddonError> {
        let constructor = self
            .classes
            .get(name)
            .ok_or_else(|| AddonError::UnknownExport(name.to_string()))?;
        constructor(arg)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.keys().copied()
    }
}

fn construct_hello_object(arg: Option<&Value>) -> Result<Instance, AddonError> {
    HelloObject::construct(arg).map(Instance::HelloObject)
}

fn construct_hello_object_async(arg: Option<&Value>) -> Result<Instance, AddonError> {
    HelloObjectAsync::construct(arg).map(Instance::HelloObjectAsync)
}

/// The loaded module.
pub struct Addon {
    queue: WorkQueue,
    classes: ClassRegistry,
}

impl Addon {
    pub fn init(config: WorkQueueConfig) -> Result<Self, AddonError> {
        let queue = WorkQueue::new(config)?;
        let classes = ClassRegistry::with_builtin_classes();
        let addon = Self { queue, classes };
        info!(
            exports = addon.exports().len(),
            pool_size = addon.queue.config().pool_size,
            "Addon initialized"
        );
        Ok(addon)
    }

    /// Everything the module exposes, functions first.
    pub fn exports(&self) -> Vec<Export> {
        FUNCTIONS
            .into_iter()
            .map(|name| Export {
                name,
                kind: ExportKind::Function,
            })
            .chain(self.classes.names().map(|name| Export {
                name,
                kind: ExportKind::Class,
            }))
            .collect()
    }

    pub fn construct(&self, class: &str, arg: Option<&Value>) -> Result<Instance, AddonError> {
        self.classes.construct(class, arg)
    }

    pub fn classes_mut(&mut self) -> &mut ClassRegistry {
        &mut self.classes
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut WorkQueue {
        &mut self.queue
    }

    pub fn hello(&self) -> &'static str {
        standalone::hello()
    }

    pub fn hello_async<F>(
        &mut self,
        options: &Value,
        callback: F,
    ) -> Result<Option<TaskId>, AddonError>
    where
        F: FnOnce(Option<AddonError>, Option<Payload>) + 'static,
    {
        standalone::hello_async(&mut self.queue, options, callback)
    }

    pub fn hello_promise(
        &mut self,
        options: Option<&Value>,
    ) -> Result<Promise<String>, AddonError> {
        standalone::hello_promise(&mut self.queue, options)
    }

    pub fn shout<F>(&mut self, options: &Value, callback: F) -> Result<Option<TaskId>, AddonError>
    where
        F: FnOnce(Option<AddonError>, Option<String>) + 'static,
    {
        standalone::shout(&mut self.queue, options, callback)
    }

    /// Deliver everything outstanding. See [`WorkQueue::run`].
    pub fn run(&mut self) -> Result<usize, AddonError> {
        Ok(self.queue.run()?)
    }

    pub async fn run_async(&mut self) -> Result<usize, AddonError> {
        Ok(self.queue.run_async().await?)
    }

    /// Drain outstanding deliveries, stop the pool and return the final counters.
    pub fn teardown(self) -> Result<StatsSnapshot, AddonError> {
        let snapshot = self.queue.shutdown()?;
        info!(delivered = snapshot.delivered, "Addon torn down");
        Ok(snapshot)
    }

    pub async fn teardown_async(self) -> Result<StatsSnapshot, AddonError> {
        let snapshot = self.queue.shutdown_async().await?;
        info!(delivered = snapshot.delivered, "Addon torn down");
        Ok(snapshot)
    }
}

impl std::fmt::Debug for Addon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Addon")
            .field("queue", &self.queue)
            .field("classes", &self.classes.names().collect::<Vec<_>>())
            .finish()
    }
}
