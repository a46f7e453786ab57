//! Producer workers that fill a [`LabeledCollection`] with random records.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::info;

use crate::{LabeledCollection, Record, StateError};

pub const MAX_LABEL_LEN: usize = 10;

// Longest single sleep between cancellation checks.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Random lowercase ASCII label, 1 to [`MAX_LABEL_LEN`] characters long.
pub fn random_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(1..=MAX_LABEL_LEN);
    (0..len).map(|_| rng.gen_range('a'..='z')).collect()
}

/// Uniform delay in `1ms..=max`, or zero when `max` is zero.
pub fn random_delay<R: Rng + ?Sized>(rng: &mut R, max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.gen_range(1..=max_ms))
}

// ---Cancellation-------------------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    // Returns false if cancelled before `duration` elapsed. A deadline past what
    // `Instant` can represent only ends on cancellation.
    fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.is_cancelled() {
                return false;
            }
            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    deadline - now
                }
                None => SLEEP_SLICE,
            };
            thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }
}

// ---Generator----------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub thread_id: u32,
    pub records: usize,
    pub max_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorReport {
    pub thread_id: u32,
    pub produced: usize,
    /// Stopped by a [`CancelToken`] before producing every record.
    pub interrupted: bool,
}

#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Generator {
        Generator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Inserts `config.records` random records, sleeping a random delay after each.
    ///
    /// Cancellation ends the run early with `interrupted` set; it is not an error.
    /// A rejected insert stops the worker and is returned.
    pub fn run<R: Rng + ?Sized>(
        &self,
        collection: &LabeledCollection,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<GeneratorReport, StateError> {
        let id = self.config.thread_id;
        let mut report = GeneratorReport {
            thread_id: id,
            produced: 0,
            interrupted: false,
        };

        for _ in 0..self.config.records {
            if cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }
            let record = Record::new(random_label(rng), random_label(rng), id);
            info!(
                "Register {} ({}, thread #{})",
                record.key(),
                record.payload(),
                id
            );
            collection.insert_record(record)?;
            report.produced += 1;

            let delay = random_delay(rng, self.config.max_delay);
            if !cancel.sleep(delay) {
                report.interrupted = report.produced < self.config.records;
                break;
            }
        }

        if report.interrupted {
            info!(
                thread = id,
                produced = report.produced,
                "generator interrupted early"
            );
        }
        Ok(report)
    }

    /// Runs the generator on its own named thread with a thread-local RNG.
    pub fn spawn(
        self,
        collection: Arc<LabeledCollection>,
        cancel: CancelToken,
    ) -> io::Result<JoinHandle<Result<GeneratorReport, StateError>>> {
        thread::Builder::new()
            .name(format!("generator-{}", self.config.thread_id))
            .spawn(move || self.run(&collection, &mut rand::thread_rng(), &cancel))
    }
}
