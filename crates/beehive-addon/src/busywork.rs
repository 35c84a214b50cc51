//! CPU- and sleep-bound computations run on worker threads.
//!
//! Each type owns copies of its inputs and implements [`Work`]. None of them touch
//! anything owned by the coordinating context.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use beehive_task::{Payload, ResultFormat, Work, WorkError};
use parking_lot::Mutex;

/// Default number of map entries built and verified by the busy computations.
pub const BUSYWORK_ENTRIES: usize = 100_000;

/// Longest string, in bytes, a host string can hold.
pub const MAX_STRING_BYTES: usize = (1 << 29) - 24;

/// Fill an ordered map with `entries` stringified integers, then read every one back.
pub fn busy_bees(entries: usize) -> Result<(), WorkError> {
    let mut container = BTreeMap::new();
    for i in 0..entries {
        container.insert(i, i.to_string());
    }
    for i in 0..entries {
        match container.get(&i) {
            Some(item) if *item == i.to_string() => {}
            _ => return Err(WorkError::new("Uh oh, this should never happen")),
        }
    }
    Ok(())
}

fn louder(mut phrase: String, louder: bool) -> String {
    if louder {
        phrase.push_str("!!!!");
    }
    phrase
}

/// Background step of the standalone `helloAsync`.
#[derive(Debug, Clone)]
pub struct HelloWork {
    pub louder: bool,
    pub format: ResultFormat,
    pub sleep: Duration,
    pub entries: usize,
}

impl HelloWork {
    pub fn new(louder: bool, format: ResultFormat) -> Self {
        Self {
            louder,
            format,
            sleep: Duration::ZERO,
            entries: BUSYWORK_ENTRIES,
        }
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_entries(mut self, entries: usize) -> Self {
        self.entries = entries;
        self
    }
}

impl Work for HelloWork {
    type Output = Payload;

    fn name(&self) -> &str {
        "hello_async"
    }

    fn run(&self) -> Result<Payload, WorkError> {
        if !self.sleep.is_zero() {
            thread::sleep(self.sleep);
        }
        busy_bees(self.entries)?;
        let result = louder("...threads are busy bees...world".to_string(), self.louder);
        Ok(Payload::from_string(result, self.format))
    }
}

/// Background step of `HelloObjectAsync.helloAsync`; carries its own copy of the name.
#[derive(Debug, Clone)]
pub struct HelloObjectWork {
    pub name: String,
    pub louder: bool,
    pub format: ResultFormat,
    pub sleep: Duration,
    pub entries: usize,
}

impl HelloObjectWork {
    pub fn new(name: impl Into<String>, louder: bool) -> Self {
        Self {
            name: name.into(),
            louder,
            format: ResultFormat::Text,
            sleep: Duration::ZERO,
            entries: BUSYWORK_ENTRIES,
        }
    }
}

impl Work for HelloObjectWork {
    type Output = Payload;

    fn name(&self) -> &str {
        "hello_object_async"
    }

    fn run(&self) -> Result<Payload, WorkError> {
        if !self.sleep.is_zero() {
            thread::sleep(self.sleep);
        }
        busy_bees(self.entries)?;
        let result = louder(
            format!("...threads are busy async bees...hello {}", self.name),
            self.louder,
        );
        Ok(Payload::from_string(result, self.format))
    }
}

/// Background step of `helloPromise`: the phrase repeated `multiply` times.
#[derive(Debug, Clone)]
pub struct RepeatWork {
    pub phrase: String,
    pub multiply: u32,
}

impl Work for RepeatWork {
    type Output = String;

    fn name(&self) -> &str {
        "hello_promise"
    }

    fn run(&self) -> Result<String, WorkError> {
        let times = self.multiply as usize;
        let len = self
            .phrase
            .len()
            .checked_mul(times)
            .filter(|len| *len <= MAX_STRING_BYTES)
            .ok_or_else(|| WorkError::new("Invalid string length"))?;
        if len == 0 {
            return Ok(String::new());
        }
        let mut result = String::new();
        result
            .try_reserve_exact(len)
            .map_err(|err| WorkError::new(format!("Failed to allocate result: {err}")))?;
        for _ in 0..times {
            result.push_str(&self.phrase);
        }
        Ok(result)
    }
}

/// Background step of `shout`. The strict variant only accepts `"rawr"`.
#[derive(Debug, Clone)]
pub struct ShoutWork {
    pub phrase: String,
    pub louder: bool,
    pub strict: bool,
}

impl Work for ShoutWork {
    type Output = String;

    fn name(&self) -> &str {
        if self.strict { "shout_rawr" } else { "shout" }
    }

    fn run(&self) -> Result<String, WorkError> {
        if self.strict && self.phrase != "rawr" {
            return Err(WorkError::new("phrase must be 'rawr'"));
        }
        let mut result = format!("{}!", self.phrase);
        if self.louder {
            result.push_str("!!!!");
        }
        Ok(result)
    }
}

/// Holds a worker thread without using CPU.
#[derive(Debug, Clone)]
pub struct SleepyWork {
    pub phrase: String,
    pub sleep: Duration,
}

impl Work for SleepyWork {
    type Output = String;

    fn name(&self) -> &str {
        "sleepy"
    }

    fn run(&self) -> Result<String, WorkError> {
        thread::sleep(self.sleep);
        Ok(format!("{} zzzZZZ", self.phrase))
    }
}

/// Keeps a worker thread busy on the map computation.
#[derive(Debug, Clone)]
pub struct BusyWork {
    pub phrase: String,
    pub entries: usize,
}

impl Work for BusyWork {
    type Output = String;

    fn name(&self) -> &str {
        "busy"
    }

    fn run(&self) -> Result<String, WorkError> {
        busy_bees(self.entries)?;
        Ok(format!("{}...threads are busy bees", self.phrase))
    }
}

/// Busy work performed while holding a lock shared by every task of a batch.
#[derive(Debug, Clone)]
pub struct ContentiousWork {
    pub phrase: String,
    pub entries: usize,
    pub lock: Arc<Mutex<u64>>,
}

impl ContentiousWork {
    pub fn new(phrase: impl Into<String>, entries: usize, lock: Arc<Mutex<u64>>) -> Self {
        Self {
            phrase: phrase.into(),
            entries,
            lock,
        }
    }
}

impl Work for ContentiousWork {
    type Output = String;

    fn name(&self) -> &str {
        "contentious"
    }

    fn run(&self) -> Result<String, WorkError> {
        let mut turns = self.lock.lock();
        busy_bees(self.entries)?;
        *turns += 1;
        Ok(format!("{}...threads took turn {}", self.phrase, *turns))
    }
}
