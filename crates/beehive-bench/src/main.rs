//! Batch Bench - Load Driver for the Work Queue
//!
//! Submits a fixed number of tasks while keeping at most `--concurrency` of them
//! outstanding, waits for every delivery and reports the throughput.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::bail;
use beehive_addon::busywork::{BUSYWORK_ENTRIES, BusyWork, ContentiousWork, ShoutWork, SleepyWork};
use beehive_queue::{WorkQueue, WorkQueueConfig};
use beehive_task::{AsyncTask, TaskFailure, Work};
use clap::{Parser, ValueEnum};
use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bench-batch")]
#[command(about = "Drive a batch of tasks through the work queue and report runs/s")]
struct Cli {
    #[arg(long, default_value = "100")]
    iterations: usize,

    #[arg(long, default_value = "4")]
    concurrency: usize,

    #[arg(long, value_enum, default_value_t = Mode::Shout)]
    mode: Mode,

    /// Map entries per task for `busy` and `contentious`
    #[arg(long, default_value_t = BUSYWORK_ENTRIES)]
    entries: usize,

    /// Sleep per task for `sleepy`
    #[arg(long, default_value = "10")]
    sleep_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Trivial string work
    Shout,
    /// Map-based busywork
    Busy,
    /// Workers sleep without using CPU
    Sleepy,
    /// Busywork serialized behind one shared lock
    Contentious,
}

/// Caller-side tallies, touched only by handlers on this thread.
#[derive(Default)]
struct Tally {
    runs: Cell<usize>,
    failures: RefCell<Vec<TaskFailure>>,
}

struct Batch {
    mode: Mode,
    entries: usize,
    sleep: Duration,
    lock: Arc<Mutex<u64>>,
    tally: Rc<Tally>,
}

impl Batch {
    fn submit(&self, queue: &mut WorkQueue, index: usize) -> anyhow::Result<()> {
        let phrase = format!("rawr-{index}");
        match self.mode {
            Mode::Shout => self.submit_work(
                queue,
                ShoutWork {
                    phrase,
                    louder: false,
                    strict: false,
                },
            ),
            Mode::Busy => self.submit_work(
                queue,
                BusyWork {
                    phrase,
                    entries: self.entries,
                },
            ),
            Mode::Sleepy => self.submit_work(
                queue,
                SleepyWork {
                    phrase,
                    sleep: self.sleep,
                },
            ),
            Mode::Contentious => self.submit_work(
                queue,
                ContentiousWork::new(phrase, self.entries, Arc::clone(&self.lock)),
            ),
        }
    }

    fn submit_work<W: Work>(&self, queue: &mut WorkQueue, work: W) -> anyhow::Result<()> {
        let tally = Rc::clone(&self.tally);
        queue.submit_callback(AsyncTask::new(work), move |err, value| match (err, value) {
            (None, Some(_)) => tally.runs.set(tally.runs.get() + 1),
            (Some(failure), _) => tally.failures.borrow_mut().push(failure),
            (None, None) => {}
        })?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.iterations == 0 {
        bail!("--iterations must be at least 1");
    }

    let config = WorkQueueConfig::default()
        .with_pool_size(cli.concurrency)
        .with_queue_capacity(0);
    let mut queue = WorkQueue::new(config)?;

    let batch = Batch {
        mode: cli.mode,
        entries: cli.entries,
        sleep: Duration::from_millis(cli.sleep_ms),
        lock: Arc::new(Mutex::new(0)),
        tally: Rc::new(Tally::default()),
    };

    info!(
        iterations = cli.iterations,
        concurrency = cli.concurrency,
        mode = ?cli.mode,
        "Starting batch"
    );

    let started = Instant::now();
    let mut submitted = 0;
    while submitted < cli.iterations || !queue.is_idle() {
        while submitted < cli.iterations && queue.pending() < cli.concurrency {
            batch.submit(&mut queue, submitted)?;
            submitted += 1;
        }
        queue.run_once()?;
    }
    let elapsed = started.elapsed();

    let stats = queue.shutdown()?;
    info!("{}", stats.format_summary());

    let runs = batch.tally.runs.get();
    let failures = batch.tally.failures.borrow();
    for failure in failures.iter() {
        warn!(error = %failure, "Task failed");
    }

    let ms = elapsed.as_secs_f64() * 1000.0;
    let rate = runs as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    println!("Benchmark speed: {rate:.0} runs/s (runs:{runs} ms:{ms:.0})");

    if !failures.is_empty() {
        bail!("{} of {} runs failed", failures.len(), cli.iterations);
    }
    if runs != cli.iterations {
        bail!(
            "Expected {} runs, saw {} (missing deliveries)",
            cli.iterations,
            runs
        );
    }
    Ok(())
}
