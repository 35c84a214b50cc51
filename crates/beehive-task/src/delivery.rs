//! Delivery strategies: how an outcome reaches the caller.
//!
//! Both strategies run on the coordinating context and neither needs to be `Send`;
//! a callback may freely capture `Rc` state owned by that context.

use tracing::debug;

use crate::outcome::{TaskFailure, TaskOutcome};
use crate::promise::Deferred;

/// Node-style handler: `(error, result)` with exactly one side present.
pub type Callback<T> = Box<dyn FnOnce(Option<TaskFailure>, Option<T>)>;

/// How a task's outcome is handed back to the caller.
pub enum Delivery<T> {
    /// Invoke a two-argument handler
    Callback(Callback<T>),
    /// Settle a promise
    Deferred(Deferred<T>),
}

impl<T> Delivery<T> {
    pub fn callback(f: impl FnOnce(Option<TaskFailure>, Option<T>) + 'static) -> Self {
        Delivery::Callback(Box::new(f))
    }

    pub fn deferred(deferred: Deferred<T>) -> Self {
        Delivery::Deferred(deferred)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Delivery::Callback(_) => "callback",
            Delivery::Deferred(_) => "promise",
        }
    }

    /// Hand the outcome over. Consumes the delivery, so it happens at most once.
    pub fn settle(self, outcome: TaskOutcome<T>) {
        match self {
            Delivery::Callback(handler) => {
                let (err, value) = outcome.into_parts();
                handler(err, value);
            }
            Delivery::Deferred(deferred) => {
                if !deferred.settle(outcome) {
                    debug!("Promise had no observer at delivery time");
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for Delivery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Delivery").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_callback_receives_success_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        Delivery::callback(move |err, value| sink.borrow_mut().push((err, value)))
            .settle(TaskOutcome::Success("hello world"));
        assert_eq!(*seen.borrow(), vec![(None, Some("hello world"))]);
    }

    #[test]
    fn test_callback_receives_failure_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        Delivery::<String>::callback(move |err, value| sink.borrow_mut().push((err, value)))
            .settle(TaskOutcome::Failure(TaskFailure::computation("boom")));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_ref().map(|e| e.message.as_str()), Some("boom"));
        assert!(seen[0].1.is_none());
    }

    #[test]
    fn test_deferred_delivery_settles_promise() {
        let (deferred, mut promise) = Deferred::pair();
        let delivery = Delivery::deferred(deferred);
        assert_eq!(delivery.kind(), "promise");
        delivery.settle(TaskOutcome::Success(3u8));
        assert_eq!(promise.try_take(), Some(Ok(3)));
    }
}
