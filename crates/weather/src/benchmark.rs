use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use tempscope_core::config::WeatherConfig;
use tempscope_core::BenchmarkResult;

use crate::client::{BlockingWeatherClient, WeatherClient};
use crate::error::WeatherError;

/// Speedup above which the concurrent form is recommended.
pub const RECOMMEND_THRESHOLD: f64 = 1.5;

/// Qualitative reading of a fetch benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    /// One city: nothing to overlap.
    Negligible,
    ConcurrentRecommended,
    Insignificant,
}

impl Conclusion {
    pub fn select(speedup: f64, cities: usize) -> Self {
        if cities <= 1 {
            Conclusion::Negligible
        } else if speedup > RECOMMEND_THRESHOLD {
            Conclusion::ConcurrentRecommended
        } else {
            Conclusion::Insignificant
        }
    }

    pub fn describe(&self, speedup: f64, cities: usize) -> String {
        match self {
            Conclusion::Negligible => {
                "For a single city the difference is negligible; the blocking form is simpler to use.".to_string()
            }
            Conclusion::ConcurrentRecommended => format!(
                "The concurrent form is {speedup:.2}x faster; it is recommended for {cities} cities."
            ),
            Conclusion::Insignificant => {
                "The difference is insignificant; either form is acceptable.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchBenchmarkReport {
    #[serde(flatten)]
    pub result: BenchmarkResult,
    pub conclusion: Conclusion,
    pub summary: String,
}

/// Compare sequential blocking fetches with one concurrent batch.
///
/// Every trial of each strategy is followed by `cooldown`. The concurrent
/// batch runs on a single-threaded runtime, so overlap comes only from
/// waiting on the network. Must be called outside any async runtime.
pub fn benchmark_fetch(
    config: &WeatherConfig,
    cities: &[String],
    runs: usize,
    cooldown: Duration,
) -> Result<FetchBenchmarkReport, WeatherError> {
    if runs == 0 {
        return Err(WeatherError::NoRuns);
    }

    let blocking = BlockingWeatherClient::new(config)?;
    let concurrent = WeatherClient::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| WeatherError::Runtime(e.to_string()))?;

    info!(runs, cities = cities.len(), "starting fetch benchmark");

    let mut timings_sync = Vec::with_capacity(runs);
    let mut timings_async = Vec::with_capacity(runs);

    for trial in 1..=runs {
        let start = Instant::now();
        blocking.fetch_many(cities)?;
        let sync_time = start.elapsed();
        thread::sleep(cooldown);

        let start = Instant::now();
        runtime.block_on(concurrent.fetch_many(cities))?;
        let async_time = start.elapsed();
        thread::sleep(cooldown);

        info!(
            trial,
            sync_s = sync_time.as_secs_f64(),
            async_s = async_time.as_secs_f64(),
            "fetch trial finished"
        );
        timings_sync.push(sync_time);
        timings_async.push(async_time);
    }

    let result = BenchmarkResult::from_timings("sync", "async", &timings_sync, &timings_async, cities.len(), 1);
    let conclusion = Conclusion::select(result.speedup, cities.len());
    let summary = conclusion.describe(result.speedup, cities.len());

    info!(
        avg_sync_s = result.avg_a,
        avg_async_s = result.avg_b,
        speedup = result.speedup,
        ?conclusion,
        "fetch benchmark completed"
    );

    Ok(FetchBenchmarkReport {
        result,
        conclusion,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;

    #[test]
    fn conclusion_thresholds() {
        assert_eq!(Conclusion::select(10.0, 1), Conclusion::Negligible);
        assert_eq!(Conclusion::select(1.51, 5), Conclusion::ConcurrentRecommended);
        assert_eq!(Conclusion::select(1.5, 5), Conclusion::Insignificant);
        assert_eq!(Conclusion::select(0.0, 3), Conclusion::Insignificant);
        assert!(Conclusion::ConcurrentRecommended.describe(2.0, 4).contains("4 cities"));
    }

    #[test]
    fn runs_every_trial_against_mock() {
        let config = mock::config(&mock::spawn());
        let cities = vec!["Paris".to_string(), mock::MISSING_CITY.to_string()];

        let report = benchmark_fetch(&config, &cities, 2, Duration::ZERO).unwrap();
        assert_eq!(report.result.timings_a.len(), 2);
        assert_eq!(report.result.timings_b.len(), 2);
        assert_eq!(report.result.unit_count, 2);
        assert_eq!(report.conclusion, Conclusion::select(report.result.speedup, 2));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy_a"], "sync");
        assert!(json["conclusion"].is_string());
    }

    #[test]
    fn single_city_is_negligible() {
        let config = mock::config(&mock::spawn());
        let report = benchmark_fetch(&config, &["Kyiv".to_string()], 1, Duration::ZERO).unwrap();
        assert_eq!(report.conclusion, Conclusion::Negligible);
    }

    #[test]
    fn rejects_zero_runs_and_bad_keys() {
        let base = mock::spawn();
        let cities = vec!["Paris".to_string()];
        assert_eq!(
            benchmark_fetch(&mock::config(&base), &cities, 0, Duration::ZERO).unwrap_err(),
            WeatherError::NoRuns
        );

        let mut config = mock::config(&base);
        config.api_key = Some(mock::BAD_KEY.to_string());
        assert_eq!(
            benchmark_fetch(&config, &cities, 1, Duration::ZERO).unwrap_err(),
            WeatherError::InvalidApiKey
        );
    }
}
