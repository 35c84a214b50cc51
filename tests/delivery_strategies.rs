//! # Delivery Strategy Tests
//!
//! Callbacks and promises backed by the same queue, plus the two result formats.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use beehive_queue::{WorkQueue, WorkQueueConfig};
use beehive_task::{
    AsyncTask, Deferred, Delivery, FailureKind, FnWork, Payload, ResultFormat, TaskFailure,
    WorkError,
};

fn queue(pool_size: usize) -> WorkQueue {
    WorkQueue::new(
        WorkQueueConfig::default()
            .with_pool_size(pool_size)
            .with_queue_capacity(64),
    )
    .unwrap()
}

#[tokio::test]
async fn test_promises_resolve_after_run_async() {
    let mut queue = queue(4);
    let promises: Vec<_> = (1..=10u32)
        .map(|n| {
            queue
                .submit_promise(AsyncTask::new(FnWork::new("square", move || Ok(n * n))))
                .unwrap()
        })
        .collect();

    assert_eq!(queue.run_async().await.unwrap(), 10);

    let mut values = Vec::new();
    for promise in promises {
        values.push(promise.await.unwrap());
    }
    assert_eq!(values, (1..=10u32).map(|n| n * n).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_promise_rejects_with_failure() {
    let mut queue = queue(1);
    let promise = queue
        .submit_promise(AsyncTask::new(FnWork::new("refuses", || -> Result<u8, WorkError> {
            Err(WorkError::new("no thanks"))
        })))
        .unwrap();
    queue.run_async().await.unwrap();

    let failure = promise.await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Computation);
    assert_eq!(failure.message, "no thanks");
}

#[test]
fn test_promise_pending_until_turn() {
    let mut queue = queue(1);
    let mut promise = queue
        .submit_promise(AsyncTask::new(FnWork::new("slow", || {
            std::thread::sleep(Duration::from_millis(5));
            Ok("done".to_string())
        })))
        .unwrap();

    std::thread::sleep(Duration::from_millis(30));
    assert!(promise.try_take().is_none());

    queue.run().unwrap();
    assert_eq!(promise.try_take(), Some(Ok("done".to_string())));
    assert!(promise.is_taken());
}

#[test]
fn test_blocking_wait_after_run() {
    let mut queue = queue(2);
    let promise = queue
        .submit_promise(AsyncTask::new(FnWork::new("answer", || Ok(42u64))))
        .unwrap();
    queue.run().unwrap();
    assert_eq!(promise.blocking_wait(), Ok(42));
}

#[test]
fn test_dropped_deferred_abandons_promise() {
    let (deferred, promise) = Deferred::<u8>::pair();
    drop(deferred);
    let failure = promise.blocking_wait().unwrap_err();
    assert_eq!(failure.kind, FailureKind::Abandoned);
}

#[test]
fn test_explicit_delivery_values_route_through_submit() {
    let mut queue = queue(2);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let (deferred, mut promise) = Deferred::pair();
    queue
        .submit(
            AsyncTask::new(FnWork::new("via_promise", || Ok(1u8))),
            Delivery::deferred(deferred),
        )
        .unwrap();
    queue
        .submit(
            AsyncTask::new(FnWork::new("via_callback", || Ok(2u8))),
            Delivery::callback(move |err: Option<TaskFailure>, value| {
                sink.borrow_mut().push((err, value))
            }),
        )
        .unwrap();
    queue.run().unwrap();

    assert_eq!(promise.try_take(), Some(Ok(1)));
    assert_eq!(*seen.borrow(), vec![(None, Some(2u8))]);
}

#[test]
fn test_text_and_buffer_payloads_carry_same_bytes() {
    let mut queue = queue(2);
    let seen = Rc::new(RefCell::new(Vec::new()));

    for format in [ResultFormat::Text, ResultFormat::Buffer] {
        let sink = Rc::clone(&seen);
        let work = FnWork::new("format", move || {
            Ok(Payload::from_string("...threads are busy bees...world".to_string(), format))
        });
        queue
            .submit_callback(AsyncTask::new(work), move |_, value: Option<Payload>| {
                sink.borrow_mut().push(value.unwrap())
            })
            .unwrap();
    }
    queue.run().unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    let text = seen.iter().find(|p| p.format() == ResultFormat::Text).unwrap();
    let buffer = seen.iter().find(|p| p.format() == ResultFormat::Buffer).unwrap();
    assert_eq!(text.as_bytes(), buffer.as_bytes());
    assert_eq!(text.len(), buffer.len());
    assert_eq!(text.as_str(), Some("...threads are busy bees...world"));
    assert_eq!(buffer.as_str(), None);
}

#[tokio::test]
async fn test_callbacks_and_promises_share_one_queue() {
    let mut queue = queue(3);
    let callback_values = Rc::new(RefCell::new(Vec::new()));
    let mut promises = Vec::new();

    for n in 0..8u32 {
        let task = AsyncTask::new(FnWork::new("mixed", move || Ok(n)));
        if n % 2 == 0 {
            let sink = Rc::clone(&callback_values);
            queue
                .submit_callback(task, move |_, value| sink.borrow_mut().push(value.unwrap()))
                .unwrap();
        } else {
            promises.push(queue.submit_promise(task).unwrap());
        }
    }
    queue.run_async().await.unwrap();

    let mut evens = callback_values.borrow().clone();
    evens.sort();
    assert_eq!(evens, vec![0, 2, 4, 6]);

    let mut odds = Vec::new();
    for promise in promises {
        odds.push(promise.await.unwrap());
    }
    assert_eq!(odds, vec![1, 3, 5, 7]);
}
