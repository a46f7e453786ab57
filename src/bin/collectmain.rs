use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use labeledcollection::generator::{CancelToken, Generator, GeneratorConfig, GeneratorReport};
use labeledcollection::{LabeledCollection, StateError};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Spawn random record generators into one collection, then print it sorted by key.
#[derive(Parser, Debug)]
#[command(name = "collectmain", version)]
struct Cli {
    /// Number of generator threads
    #[arg(long, env = "COLLECT_THREADS", default_value_t = 10)]
    threads: u32,

    /// Records created by each generator
    #[arg(long, env = "COLLECT_RECORDS", default_value_t = 10)]
    records: usize,

    /// Upper bound of the random pause after each insert
    #[arg(long, env = "COLLECT_MAX_DELAY_MS", default_value_t = 100)]
    max_delay_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn total_records(threads: u32, records: usize) -> Result<usize> {
    (threads as usize)
        .checked_mul(records)
        .ok_or_else(|| anyhow!("{} threads x {} records overflows usize", threads, records))
}

// The first failing generator cancels the rest; all of them are still joined.
fn join_generators(
    handles: Vec<JoinHandle<Result<GeneratorReport, StateError>>>,
    cancel: &CancelToken,
) -> Result<Vec<GeneratorReport>> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut failure = None;
    for (thread_id, handle) in handles.into_iter().enumerate() {
        let joined = handle
            .join()
            .map_err(|_| anyhow!("generator {} panicked", thread_id))
            .and_then(|r| r.with_context(|| format!("generator {} failed", thread_id)));
        match joined {
            Ok(report) => reports.push(report),
            Err(err) => {
                cancel.cancel();
                failure.get_or_insert(err);
            }
        }
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(reports),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("labeledcollection=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let collection = Arc::new(LabeledCollection::new());
    collection
        .init_with_capacity(total_records(cli.threads, cli.records)?)
        .context("Failed to initialize collection")?;

    let cancel = CancelToken::new();
    let spawned = (0..cli.threads)
        .map(|thread_id| {
            Generator::new(GeneratorConfig {
                thread_id,
                records: cli.records,
                max_delay: Duration::from_millis(cli.max_delay_ms),
            })
            .spawn(collection.clone(), cancel.clone())
            .with_context(|| format!("Failed to spawn generator {}", thread_id))
        })
        .collect::<Result<Vec<_>>>();
    let handles = match spawned {
        Ok(handles) => handles,
        Err(err) => {
            cancel.cancel();
            return Err(err);
        }
    };

    let reports = join_generators(handles, &cancel);
    let reports = match reports {
        Ok(reports) => reports,
        Err(err) => {
            collection.cleanup();
            return Err(err);
        }
    };
    for report in &reports {
        info!(
            thread = report.thread_id,
            produced = report.produced,
            interrupted = report.interrupted,
            "generator finished"
        );
    }

    let records = collection
        .drain_sorted()
        .context("Failed to drain collection")?;
    println!("{}", "-".repeat(50));
    for record in &records {
        println!("{}", record);
    }

    collection.cleanup();
    Ok(())
}
