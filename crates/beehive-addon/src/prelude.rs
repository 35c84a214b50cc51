//! Prelude module for convenient imports.

pub use crate::error::AddonError;
pub use crate::module::{Addon, Export, ExportKind, Instance};
pub use crate::object::{HelloObject, HelloObjectAsync};
pub use beehive_queue::WorkQueueConfig;
pub use beehive_task::{Payload, TaskFailure};
