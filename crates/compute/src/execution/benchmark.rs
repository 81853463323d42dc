use std::time::{Duration, Instant};

use tracing::info;

use tempscope_core::{BenchmarkResult, Dataset};

use crate::error::BenchmarkError;
use crate::pipeline::AnalysisConfig;

use super::strategy::{CityTable, ExecutionStrategy, ParallelStrategy, SequentialStrategy};

/// Run `strategy` once over the whole dataset and return its wall-clock time.
pub fn timed_run(
    strategy: &dyn ExecutionStrategy,
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> (CityTable, Duration) {
    let start = Instant::now();
    let table = strategy.run(dataset, config);
    (table, start.elapsed())
}

/// Compare sequential and pooled execution of the per-city pipeline.
///
/// Each trial runs the sequential strategy first, then the parallel one.
/// Trials never overlap, so timings are not contaminated by each other.
pub fn benchmark_execution(
    dataset: &Dataset,
    runs: usize,
    workers: usize,
    config: &AnalysisConfig,
) -> Result<BenchmarkResult, BenchmarkError> {
    if runs == 0 {
        return Err(BenchmarkError::NoRuns);
    }

    let sequential = SequentialStrategy;
    let parallel = ParallelStrategy::new(workers)?;
    let cities = dataset.city_count();

    info!(
        runs,
        cities,
        workers = parallel.worker_count(),
        "starting execution benchmark"
    );

    let mut timings_a = Vec::with_capacity(runs);
    let mut timings_b = Vec::with_capacity(runs);

    for trial in 1..=runs {
        let (_, seq_time) = timed_run(&sequential, dataset, config);
        let (_, par_time) = timed_run(&parallel, dataset, config);

        info!(
            trial,
            sequential_s = seq_time.as_secs_f64(),
            parallel_s = par_time.as_secs_f64(),
            "benchmark trial finished"
        );

        timings_a.push(seq_time);
        timings_b.push(par_time);
    }

    let result = BenchmarkResult::from_timings(
        sequential.name(),
        parallel.name(),
        &timings_a,
        &timings_b,
        cities,
        parallel.worker_count(),
    );

    info!(
        avg_sequential_s = result.avg_a,
        avg_parallel_s = result.avg_b,
        speedup = result.speedup,
        "execution benchmark completed"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use tempscope_core::{Season, TemperatureRecord};

    fn dataset() -> Dataset {
        let start = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let records = ["Oslo", "Lima", "Pune"]
            .iter()
            .flat_map(|city| {
                (0..60).map(move |d| {
                    TemperatureRecord::new(*city, start + ChronoDuration::days(d), (d % 11) as f64, Season::Winter)
                })
            })
            .collect();
        Dataset::from_records(records)
    }

    #[test]
    fn zero_runs_is_rejected() {
        let err = benchmark_execution(&dataset(), 0, 2, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, BenchmarkError::NoRuns));
    }

    #[test]
    fn records_one_timing_per_run() {
        let result = benchmark_execution(&dataset(), 3, 2, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.strategy_a, "sequential");
        assert_eq!(result.strategy_b, "parallel");
        assert_eq!(result.timings_a.len(), 3);
        assert_eq!(result.timings_b.len(), 3);
        assert_eq!(result.unit_count, 3);
        assert_eq!(result.worker_count, 2);
        assert!(result.timings_a.iter().chain(&result.timings_b).all(|t| *t >= 0.0));
        if result.avg_b > 0.0 {
            assert!((result.speedup - result.avg_a / result.avg_b).abs() < 1e-9);
        } else {
            assert_eq!(result.speedup, 0.0);
        }
    }

    #[test]
    fn timed_run_returns_every_city() {
        let (table, _) = timed_run(&SequentialStrategy, &dataset(), &AnalysisConfig::default());
        assert_eq!(table.len(), 3);
        assert!(table.values().all(Result::is_ok));
    }
}
