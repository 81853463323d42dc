use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tempscope_core::config::resolve_workers;
use tempscope_core::Dataset;

use crate::error::{AnalysisError, BenchmarkError};
use crate::pipeline::{process_city, AnalysisConfig, CityReport};

/// Per-city pipeline outcomes keyed by city name.
pub type CityTable = BTreeMap<String, Result<CityReport, AnalysisError>>;

/// A way of running the per-city pipeline over a whole dataset.
///
/// Implementations must return one entry per city, keyed by city name,
/// regardless of the order in which cities finish.
pub trait ExecutionStrategy: Send + Sync {
    /// Human-readable name for logging and reports.
    fn name(&self) -> &str;

    /// Number of cities that can be processed at once.
    fn worker_count(&self) -> usize;

    /// Run the pipeline for every city in `dataset`.
    fn run(&self, dataset: &Dataset, config: &AnalysisConfig) -> CityTable;
}

/// One city at a time on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialStrategy;

impl ExecutionStrategy for SequentialStrategy {
    fn name(&self) -> &str {
        "sequential"
    }

    fn worker_count(&self) -> usize {
        1
    }

    fn run(&self, dataset: &Dataset, config: &AnalysisConfig) -> CityTable {
        dataset
            .series()
            .iter()
            .map(|series| (series.city().to_string(), process_city(series, config)))
            .collect()
    }
}

/// One task per city on a fixed-size OS thread pool.
///
/// Each task owns a copy of its city's series and sends only its final
/// result back over a channel; nothing is shared between workers.
pub struct ParallelStrategy {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl ParallelStrategy {
    /// Build the pool. `workers == 0` uses the available hardware concurrency.
    pub fn new(workers: usize) -> Result<Self, BenchmarkError> {
        let workers = resolve_workers(workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tempscope-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }
}

impl ExecutionStrategy for ParallelStrategy {
    fn name(&self) -> &str {
        "parallel"
    }

    fn worker_count(&self) -> usize {
        self.workers
    }

    fn run(&self, dataset: &Dataset, config: &AnalysisConfig) -> CityTable {
        let (tx, rx) = mpsc::channel();

        for series in dataset.series().iter().cloned() {
            let tx = tx.clone();
            let config = *config;
            self.pool.spawn(move || {
                let city = series.city().to_string();
                let outcome = process_city(&series, &config);
                if tx.send((city, outcome)).is_err() {
                    warn!(city = series.city(), "result collector dropped before task finished");
                }
            });
        }
        drop(tx);

        // Completes once every task has sent (or dropped) its sender.
        let table: CityTable = rx.into_iter().collect();
        debug!(cities = table.len(), workers = self.workers, "parallel run collected");
        table
    }
}

/// Strategy selector used by callers that pick a strategy from a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Sequential,
    Parallel,
}

impl FromStr for StrategyKind {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(StrategyKind::Sequential),
            "parallel" | "par" => Ok(StrategyKind::Parallel),
            other => Err(BenchmarkError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Build the strategy named by `kind`.
pub fn build_strategy(kind: StrategyKind, workers: usize) -> Result<Box<dyn ExecutionStrategy>, BenchmarkError> {
    Ok(match kind {
        StrategyKind::Sequential => Box::new(SequentialStrategy),
        StrategyKind::Parallel => Box::new(ParallelStrategy::new(workers)?),
    })
}
