//! # Beehive Add-on
//!
//! The hello-world module surface on top of [`beehive_queue`]: option parsing for
//! host-supplied values, synchronous and asynchronous hello functions, host-constructible
//! objects, and an [`Addon`] that registers them all.
//!
//! ```rust,no_run
//! use beehive_addon::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), AddonError> {
//! let mut addon = Addon::init(WorkQueueConfig::from_env())?;
//! addon.hello_async(&json!({"louder": true}), |err, payload| {
//!     if let Some(err) = err {
//!         eprintln!("{err}");
//!     } else if let Some(text) = payload.as_ref().and_then(Payload::as_str) {
//!         println!("{text}");
//!     }
//! })?;
//! addon.teardown()?;
//! # Ok(())
//! # }
//! ```

pub mod busywork;
pub mod error;
pub mod module;
pub mod object;
pub mod options;
pub mod prelude;
pub mod standalone;

// Re-exports for convenience
pub use error::AddonError;
pub use module::{Addon, ClassRegistry, Constructor, Export, ExportKind, Instance};
pub use object::{HelloObject, HelloObjectAsync};
pub use options::{HelloAsyncOptions, PromiseOptions, ShoutOptions};
