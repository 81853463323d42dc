use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing comparison of two execution strategies over the same workload.
///
/// `a` is the baseline (sequential / blocking) strategy and `b` the
/// concurrent one; `speedup = avg_a / avg_b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub strategy_a: String,
    pub strategy_b: String,
    /// Per-trial wall-clock seconds for strategy A.
    pub timings_a: Vec<f64>,
    /// Per-trial wall-clock seconds for strategy B.
    pub timings_b: Vec<f64>,
    pub avg_a: f64,
    pub avg_b: f64,
    pub speedup: f64,
    /// Cities processed per trial.
    pub unit_count: usize,
    /// Concurrency available to strategy B.
    pub worker_count: usize,
}

impl BenchmarkResult {
    pub fn from_timings(
        strategy_a: &str,
        strategy_b: &str,
        timings_a: &[Duration],
        timings_b: &[Duration],
        unit_count: usize,
        worker_count: usize,
    ) -> Self {
        let timings_a: Vec<f64> = timings_a.iter().map(Duration::as_secs_f64).collect();
        let timings_b: Vec<f64> = timings_b.iter().map(Duration::as_secs_f64).collect();
        let avg_a = average(&timings_a);
        let avg_b = average(&timings_b);

        Self {
            strategy_a: strategy_a.to_string(),
            strategy_b: strategy_b.to_string(),
            timings_a,
            timings_b,
            avg_a,
            avg_b,
            speedup: speedup(avg_a, avg_b),
            unit_count,
            worker_count,
        }
    }
}

/// `avg_a / avg_b`, or 0 when `avg_b` is not positive.
pub fn speedup(avg_a: f64, avg_b: f64) -> f64 {
    if avg_b > 0.0 {
        avg_a / avg_b
    } else {
        0.0
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
