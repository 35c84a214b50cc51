//! # Environment Configuration Tests
//!
//! These mutate process environment variables, so every test runs serially.

use beehive_queue::config::{ENV_POOL_SIZE, ENV_QUEUE_CAPACITY, ENV_THREAD_NAME};
use beehive_queue::{QueueError, WorkQueue, WorkQueueConfig};
use beehive_task::{AsyncTask, FnWork};
use serial_test::serial;

fn clear_env() {
    // SAFETY: all tests touching these variables are #[serial].
    unsafe {
        std::env::remove_var(ENV_POOL_SIZE);
        std::env::remove_var(ENV_QUEUE_CAPACITY);
        std::env::remove_var(ENV_THREAD_NAME);
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: all tests touching these variables are #[serial].
    unsafe { std::env::set_var(key, value) }
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    clear_env();
    assert_eq!(WorkQueueConfig::from_env(), WorkQueueConfig::default());
}

#[test]
#[serial]
fn test_from_env_sizes_the_pool() {
    clear_env();
    set_env(ENV_POOL_SIZE, "3");
    set_env(ENV_QUEUE_CAPACITY, "5");
    set_env(ENV_THREAD_NAME, "env-bee");

    let queue = WorkQueue::from_env().unwrap();
    assert_eq!(queue.config().pool_size, 3);
    assert_eq!(queue.config().queue_capacity, 5);
    assert_eq!(queue.config().capacity(), 8);
    assert_eq!(queue.config().thread_name, "env-bee");
    clear_env();
}

#[test]
#[serial]
fn test_from_env_zero_pool_is_rejected() {
    clear_env();
    set_env(ENV_POOL_SIZE, "0");
    assert!(matches!(
        WorkQueue::from_env(),
        Err(QueueError::InvalidConfig(_))
    ));
    clear_env();
}

#[test]
#[serial]
fn test_from_env_queue_runs_work() {
    clear_env();
    set_env(ENV_POOL_SIZE, "1");
    set_env(ENV_QUEUE_CAPACITY, "0");

    let mut queue = WorkQueue::from_env().unwrap();
    let promise = queue
        .submit_promise(AsyncTask::new(FnWork::new("env", || Ok(5u8))))
        .unwrap();
    queue.run().unwrap();
    assert_eq!(promise.blocking_wait(), Ok(5));
    clear_env();
}

#[test]
fn test_toml_config_matches_builder() {
    let parsed = WorkQueueConfig::from_toml_str(
        r#"
        pool_size = 6
        queue_capacity = 12
        thread_name = "toml-bee"
        "#,
    )
    .unwrap();
    let built = WorkQueueConfig::default()
        .with_pool_size(6)
        .with_queue_capacity(12)
        .with_thread_name("toml-bee");
    assert_eq!(parsed, built);
}
