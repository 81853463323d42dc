//! Command handlers. Each returns a JSON value for `main` to print.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use tempscope_compute::execution::{benchmark_execution, build_strategy, timed_run, StrategyKind};
use tempscope_compute::pipeline::forecast::forecast;
use tempscope_compute::{
    analyze_city, city_correlations, classify_temperature, describe_by_season, process_city, seasonal_stats,
    summarize_cities, AnalysisConfig,
};
use tempscope_core::{load_dataset, CityTimeSeries, Config, Dataset, Season};
use tempscope_weather::{
    benchmark_fetch, lookup_temperature, validate_api_key, BlockingWeatherClient, WeatherClient,
};

fn load(config: &Config) -> Result<Dataset> {
    let path = &config.data.dataset_path;
    load_dataset(path).with_context(|| format!("failed to load dataset from {}", path.display()))
}

fn city_series<'a>(dataset: &'a Dataset, city: &str) -> Result<&'a CityTimeSeries> {
    match dataset.city(city) {
        Some(series) => Ok(series),
        None => bail!("city '{}' not found in dataset (known: {})", city, dataset.cities().join(", ")),
    }
}

fn current_thread_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

// ── Analysis ──────────────────────────────────────────────────

pub fn analyze(config: &Config, city: &str, window: Option<usize>, horizon: Option<usize>) -> Result<Value> {
    let dataset = load(config)?;
    let series = city_series(&dataset, city)?;

    let mut analysis = AnalysisConfig::from(&config.data);
    if let Some(w) = window {
        analysis.rolling_window = w;
    }
    if let Some(h) = horizon {
        analysis.forecast_horizon_days = h;
    }

    if analysis.forecast_horizon_days == 0 {
        let result = analyze_city(series, &analysis).with_context(|| format!("analysis of '{city}' failed"))?;
        return Ok(serde_json::to_value(result)?);
    }

    let report = process_city(series, &analysis).with_context(|| format!("analysis of '{city}' failed"))?;
    Ok(serde_json::to_value(report)?)
}

pub fn forecast_city(config: &Config, city: &str, horizon: Option<usize>) -> Result<Value> {
    let dataset = load(config)?;
    let series = city_series(&dataset, city)?;
    let horizon = horizon.unwrap_or(config.data.forecast_horizon_days);

    let model = forecast(series, horizon).with_context(|| format!("cannot forecast '{city}'"))?;
    Ok(serde_json::to_value(model)?)
}

pub fn describe(config: &Config, city: &str) -> Result<Value> {
    let dataset = load(config)?;
    let series = city_series(&dataset, city)?;
    Ok(serde_json::to_value(describe_by_season(series.records()))?)
}

pub fn correlate(config: &Config) -> Result<Value> {
    let dataset = load(config)?;
    Ok(serde_json::to_value(city_correlations(&dataset))?)
}

pub fn clusters(config: &Config) -> Result<Value> {
    let dataset = load(config)?;
    Ok(serde_json::to_value(summarize_cities(&dataset))?)
}

pub fn bench_analysis(config: &Config, runs: Option<usize>, workers: Option<usize>, strategy: &str) -> Result<Value> {
    let dataset = load(config)?;
    let analysis = AnalysisConfig::from(&config.data);
    let runs = runs.unwrap_or(config.benchmark.runs);
    let workers = workers.unwrap_or(config.benchmark.workers);

    if strategy.eq_ignore_ascii_case("both") {
        let result = benchmark_execution(&dataset, runs, workers, &analysis).context("execution benchmark failed")?;
        return Ok(serde_json::to_value(result)?);
    }

    let kind: StrategyKind = strategy.parse()?;
    let strategy = build_strategy(kind, workers)?;
    let (table, elapsed) = timed_run(strategy.as_ref(), &dataset, &analysis);
    let failures: Vec<Value> = table
        .iter()
        .filter_map(|(city, outcome)| {
            outcome
                .as_ref()
                .err()
                .map(|e| json!({ "city": city, "error": e.to_string() }))
        })
        .collect();

    info!(strategy = strategy.name(), elapsed_s = elapsed.as_secs_f64(), "single strategy run finished");

    Ok(json!({
        "strategy": strategy.name(),
        "worker_count": strategy.worker_count(),
        "unit_count": table.len(),
        "elapsed_s": elapsed.as_secs_f64(),
        "failures": failures,
    }))
}

// ── Weather ───────────────────────────────────────────────────

pub fn weather(config: &Config, cities: &[String], concurrent: bool) -> Result<Value> {
    let entries = if concurrent {
        let client = WeatherClient::new(&config.weather)?;
        current_thread_runtime()?.block_on(client.fetch_many(cities))?
    } else {
        BlockingWeatherClient::new(&config.weather)?.fetch_many(cities)?
    };
    Ok(serde_json::to_value(entries)?)
}

pub fn bench_fetch(config: &Config, cities: &[String], runs: Option<usize>, cooldown_ms: Option<u64>) -> Result<Value> {
    let runs = runs.unwrap_or(config.benchmark.runs);
    let cooldown = cooldown_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.benchmark.fetch_cooldown());

    let report = benchmark_fetch(&config.weather, cities, runs, cooldown).context("fetch benchmark failed")?;
    Ok(serde_json::to_value(report)?)
}

pub fn check(config: &Config, city: &str) -> Result<Value> {
    let dataset = load(config)?;
    let series = city_series(&dataset, city)?;
    let table = seasonal_stats(series.records());
    let season = Season::current();

    let client = WeatherClient::new(&config.weather)?;
    let outcome = current_thread_runtime()?.block_on(lookup_temperature(
        &client,
        city,
        config.weather.lookup_attempts,
    ));

    let classification = outcome.temperature().map(|temp| {
        let (status, lower, upper) = classify_temperature(temp, season, &table);
        json!({ "status": status, "lower": lower, "upper": upper })
    });

    Ok(json!({
        "city": city,
        "season": season,
        "lookup": outcome,
        "classification": classification,
    }))
}

pub fn validate_key(config: &Config, key: Option<&str>) -> Result<Value> {
    let key = match key.or(config.weather.api_key.as_deref()) {
        Some(k) => k,
        None => bail!("no API key given and OPENWEATHER_API_KEY is not set"),
    };
    Ok(serde_json::to_value(validate_api_key(&config.weather, key))?)
}
