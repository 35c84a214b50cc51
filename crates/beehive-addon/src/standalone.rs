//! Module-level functions.
//!
//! The callback-style functions follow one convention: invalid options invoke the
//! callback immediately with the validation error and schedule nothing (`Ok(None)`);
//! otherwise the task is queued and its id returned. A queue that refuses the task is
//! reported synchronously as `Err` and the callback is never invoked.

use beehive_queue::WorkQueue;
use beehive_task::{AsyncTask, Payload, Promise, TaskId, Work};
use serde_json::Value;
use tracing::debug;

use crate::busywork::{HelloWork, RepeatWork, ShoutWork};
use crate::error::AddonError;
use crate::options::{HelloAsyncOptions, PromiseOptions, ShoutOptions};

/// Synchronous hello.
pub fn hello() -> &'static str {
    "hello world"
}

/// Queue the map-based busywork and hand back `"...threads are busy bees...world"`.
pub fn hello_async<F>(
    queue: &mut WorkQueue,
    options: &Value,
    callback: F,
) -> Result<Option<TaskId>, AddonError>
where
    F: FnOnce(Option<AddonError>, Option<Payload>) + 'static,
{
    let options = match HelloAsyncOptions::parse(options) {
        Ok(options) => options,
        Err(err) => return reject(err, callback),
    };
    let work = HelloWork::new(options.louder, options.format).with_sleep(options.sleep);
    schedule(queue, work, callback).map(Some)
}

/// Queue the phrase repeater and return a promise for its output.
///
/// Invalid options are returned as `Err`; no promise is created for them.
pub fn hello_promise(
    queue: &mut WorkQueue,
    options: Option<&Value>,
) -> Result<Promise<String>, AddonError> {
    let PromiseOptions { phrase, multiply } = PromiseOptions::parse(options)?;
    let promise = queue.submit_promise(AsyncTask::new(RepeatWork { phrase, multiply }))?;
    Ok(promise)
}

/// Queue `phrase + "!"` (or `"!!!!!"` when louder).
pub fn shout<F>(
    queue: &mut WorkQueue,
    options: &Value,
    callback: F,
) -> Result<Option<TaskId>, AddonError>
where
    F: FnOnce(Option<AddonError>, Option<String>) + 'static,
{
    shout_with(queue, options, false, callback)
}

/// Like [`shout`], but the background step fails for any phrase other than `"rawr"`.
pub fn shout_rawr<F>(
    queue: &mut WorkQueue,
    options: &Value,
    callback: F,
) -> Result<Option<TaskId>, AddonError>
where
    F: FnOnce(Option<AddonError>, Option<String>) + 'static,
{
    shout_with(queue, options, true, callback)
}

fn shout_with<F>(
    queue: &mut WorkQueue,
    options: &Value,
    strict: bool,
    callback: F,
) -> Result<Option<TaskId>, AddonError>
where
    F: FnOnce(Option<AddonError>, Option<String>) + 'static,
{
    let ShoutOptions { phrase, louder } = match ShoutOptions::parse(options) {
        Ok(options) => options,
        Err(err) => return reject(err, callback),
    };
    let work = ShoutWork {
        phrase,
        louder,
        strict,
    };
    schedule(queue, work, callback).map(Some)
}

/// Invoke `callback` once with a validation error.
pub(crate) fn reject<T, F>(err: AddonError, callback: F) -> Result<Option<TaskId>, AddonError>
where
    F: FnOnce(Option<AddonError>, Option<T>),
{
    debug!(error = %err, "Rejected options");
    callback(Some(err), None);
    Ok(None)
}

/// Submit `work` with a callback that sees task failures as [`AddonError::Failed`].
pub(crate) fn schedule<W, F>(
    queue: &mut WorkQueue,
    work: W,
    callback: F,
) -> Result<TaskId, AddonError>
where
    W: Work,
    F: FnOnce(Option<AddonError>, Option<W::Output>) + 'static,
{
    let task_id = queue.submit_callback(AsyncTask::new(work), move |err, value| {
        callback(err.map(AddonError::from), value)
    })?;
    Ok(task_id)
}
