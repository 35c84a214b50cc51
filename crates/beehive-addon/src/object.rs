//! Host-constructible objects.

use beehive_queue::WorkQueue;
use beehive_task::{Payload, TaskId};
use serde_json::Value;

use crate::busywork::HelloObjectWork;
use crate::error::AddonError;
use crate::options::HelloAsyncOptions;
use crate::standalone::{reject, schedule};

/// Validate a constructor argument: a present, non-empty string.
fn name_from_arg(arg: Option<&Value>) -> Result<String, AddonError> {
    let arg = match arg {
        None | Some(Value::Null) => return Err(AddonError::invalid("must provide string arg")),
        Some(arg) => arg,
    };
    let name = arg
        .as_str()
        .ok_or_else(|| AddonError::invalid("arg must be a string"))?;
    if name.is_empty() {
        return Err(AddonError::invalid("arg must be a non-empty string"));
    }
    Ok(name.to_string())
}

/// Object with a synchronous `hello`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloObject {
    name: String,
}

impl HelloObject {
    pub fn construct(arg: Option<&Value>) -> Result<Self, AddonError> {
        Ok(Self {
            name: name_from_arg(arg)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hello(&self) -> String {
        format!("...initialized an object...hello {}", self.name)
    }
}

/// Object whose `hello_async` runs on the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloObjectAsync {
    name: String,
}

impl HelloObjectAsync {
    pub fn construct(arg: Option<&Value>) -> Result<Self, AddonError> {
        Ok(Self {
            name: name_from_arg(arg)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue `"...threads are busy async bees...hello {name}"`.
    ///
    /// The task gets its own copy of the name, so the object may be dropped or
    /// mutated before delivery.
    pub fn hello_async<F>(
        &self,
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
        let mut work = HelloObjectWork::new(self.name.clone(), options.louder);
        work.format = options.format;
        work.sleep = options.sleep;
        schedule(queue, work, callback).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beehive_queue::WorkQueueConfig;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_constructor_validation() {
        assert_eq!(
            HelloObject::construct(None).unwrap_err().to_string(),
            "must provide string arg"
        );
        assert_eq!(
            HelloObject::construct(Some(&json!(24))).unwrap_err().to_string(),
            "arg must be a string"
        );
        assert_eq!(
            HelloObjectAsync::construct(Some(&json!(""))).unwrap_err().to_string(),
            "arg must be a non-empty string"
        );
    }

    #[test]
    fn test_hello_object_sync() {
        let object = HelloObject::construct(Some(&json!("leafy"))).unwrap();
        assert_eq!(object.name(), "leafy");
        assert_eq!(object.hello(), "...initialized an object...hello leafy");
    }

    #[test]
    fn test_hello_object_async_outlives_object() {
        let mut queue = WorkQueue::new(WorkQueueConfig::default().with_pool_size(1)).unwrap();
        let object = HelloObjectAsync::construct(Some(&json!("world"))).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        object
            .hello_async(&mut queue, &json!({"louder": true}), move |err, value| {
                *sink.borrow_mut() = Some((err, value));
            })
            .unwrap();
        drop(object);
        queue.run().unwrap();

        let (err, value) = seen.borrow_mut().take().unwrap();
        assert!(err.is_none());
        assert_eq!(
            value.as_ref().and_then(Payload::as_str),
            Some("...threads are busy async bees...hello world!!!!")
        );
    }

    #[test]
    fn test_hello_object_async_rejects_bad_options() {
        let mut queue = WorkQueue::new(WorkQueueConfig::default().with_pool_size(1)).unwrap();
        let object = HelloObjectAsync::construct(Some(&json!("world"))).unwrap();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let id = object
            .hello_async(&mut queue, &json!(null), move |err, value: Option<Payload>| {
                sink.borrow_mut().push((err.map(|e| e.to_string()), value.is_some()));
            })
            .unwrap();
        assert!(id.is_none());
        assert_eq!(
            *calls.borrow(),
            vec![(Some("first arg 'options' must be an object".to_string()), false)]
        );
    }
}
