//! Per-city analysis pipeline.
//!
//! Wires the individual stages into one pass over a city's series:
//!
//! 1. Centered rolling mean/std ([`rolling`]).
//! 2. Seasonal profiles ([`seasonal`]).
//! 3. Seasonal ±2σ anomaly classification ([`anomaly`]).
//! 4. OLS trend over elapsed days ([`trend`]).
//! 5. Yearly aggregates ([`yearly`]).
//!
//! [`process_city`] additionally runs the linear [`forecast`]. Every result
//! is recomputed from the source series on each call.

pub mod anomaly;
pub mod forecast;
pub mod rolling;
pub mod seasonal;
pub mod trend;
pub mod yearly;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tempscope_core::config::DataConfig;
use tempscope_core::{CityTimeSeries, TemperatureRecord};

use crate::error::AnalysisError;

use self::anomaly::{detect_anomalies, AnomalyFlag};
use self::forecast::{forecast, ForecastModel, DEFAULT_HORIZON_DAYS};
use self::rolling::{rolling_stats, DEFAULT_WINDOW};
use self::seasonal::{seasonal_stats, SeasonalTable};
use self::trend::{estimate_trend, TrendModel};
use self::yearly::{yearly_stats, YearlyAggregate};

/// Tunables for one pipeline pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub rolling_window: usize,
    pub forecast_horizon_days: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_WINDOW,
            forecast_horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl From<&DataConfig> for AnalysisConfig {
    fn from(config: &DataConfig) -> Self {
        Self {
            rolling_window: config.rolling_window,
            forecast_horizon_days: config.forecast_horizon_days,
        }
    }
}

/// A source record with its rolling statistics and anomaly flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: TemperatureRecord,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    #[serde(flatten)]
    pub anomaly: AnomalyFlag,
}

/// Trend stage outcome. Too little data only disables the trend, not the
/// rest of the city's analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendOutcome {
    Fitted(TrendModel),
    InsufficientData { points: usize, distinct_days: usize },
}

impl TrendOutcome {
    pub fn model(&self) -> Option<&TrendModel> {
        match self {
            TrendOutcome::Fitted(model) => Some(model),
            TrendOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Full analysis bundle for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAnalysisResult {
    pub city: String,
    pub records: Vec<AnnotatedRecord>,
    pub seasonal: SeasonalTable,
    pub yearly: Vec<YearlyAggregate>,
    pub trend: TrendOutcome,
    pub anomaly_count: usize,
    /// Share of records flagged as anomalies, in [0, 100].
    pub anomaly_percent: f64,
}

/// Run rolling stats, seasonal profiles, anomaly detection, trend and yearly
/// aggregation over one city's series.
pub fn analyze_city(series: &CityTimeSeries, config: &AnalysisConfig) -> Result<CityAnalysisResult, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::EmptySeries(series.city().to_string()));
    }

    let start = Instant::now();
    let records = series.records();
    let temperatures = series.temperatures();

    let rolling = rolling_stats(&temperatures, config.rolling_window)?;
    let seasonal = seasonal_stats(records);
    let anomalies = detect_anomalies(records, &seasonal);

    let trend = match estimate_trend(series) {
        Ok(model) => TrendOutcome::Fitted(model),
        Err(AnalysisError::InsufficientData { points, distinct_days, .. }) => {
            warn!(city = series.city(), points, distinct_days, "trend skipped: insufficient data");
            TrendOutcome::InsufficientData { points, distinct_days }
        }
        Err(e) => return Err(e),
    };

    let yearly = yearly_stats(records);

    let annotated: Vec<AnnotatedRecord> = records
        .iter()
        .zip(&rolling)
        .enumerate()
        .filter_map(|(i, (record, point))| {
            anomalies.flag(i).map(|anomaly| AnnotatedRecord {
                record: record.clone(),
                rolling_mean: point.rolling_mean,
                rolling_std: point.rolling_std,
                anomaly,
            })
        })
        .collect();

    let anomaly_count = anomalies.anomaly_count();
    let anomaly_percent = anomaly_count as f64 / records.len() as f64 * 100.0;

    debug!(
        city = series.city(),
        records = records.len(),
        anomalies = anomaly_count,
        elapsed_us = start.elapsed().as_micros(),
        "city analysis completed"
    );

    Ok(CityAnalysisResult {
        city: series.city().to_string(),
        records: annotated,
        seasonal,
        yearly,
        trend,
        anomaly_count,
        anomaly_percent,
    })
}

/// Analysis plus forecast for one city: the unit of work benchmarked by
/// the execution strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub analysis: CityAnalysisResult,
    /// `None` when the series is too short to fit a line.
    pub forecast: Option<ForecastModel>,
}

/// Full per-city pipeline: [`analyze_city`] followed by [`forecast`].
pub fn process_city(series: &CityTimeSeries, config: &AnalysisConfig) -> Result<CityReport, AnalysisError> {
    let analysis = analyze_city(series, config)?;

    let forecast = match forecast(series, config.forecast_horizon_days) {
        Ok(model) => Some(model),
        Err(AnalysisError::InsufficientData { .. }) => None,
        Err(e) => return Err(e),
    };

    Ok(CityReport { analysis, forecast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempscope_core::{Dataset, Season};

    use crate::pipeline::anomaly::AnomalyStatus;

    /// Deterministic pseudo-noise in [-1, 1).
    fn jitter(i: usize) -> f64 {
        ((i * 7919 + 13) % 200) as f64 / 100.0 - 1.0
    }

    fn two_city_dataset() -> Dataset {
        let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let seasons = [(Season::Winter, -5.0), (Season::Spring, 10.0), (Season::Summer, 25.0)];
        let mut records = Vec::new();
        for (c, city) in ["Minsk", "Baku"].iter().enumerate() {
            let mut day = 0i64;
            for (season, base) in seasons {
                for i in 0..100 {
                    let temp = base + c as f64 * 3.0 + 4.0 * jitter(i + day as usize);
                    records.push(TemperatureRecord::new(*city, start + Duration::days(day), temp, season));
                    day += 1;
                }
            }
        }
        Dataset::from_records(records)
    }

    #[test]
    fn two_cities_three_seasons() {
        let dataset = two_city_dataset();
        for series in dataset.series() {
            let result = analyze_city(series, &AnalysisConfig::default()).unwrap();
            assert!(result.anomaly_percent >= 0.0 && result.anomaly_percent <= 100.0);
            assert!(result.seasonal.len() <= 3);
            assert_eq!(result.records.len(), 300);
            assert!(result.trend.model().is_some());
            assert_eq!(result.yearly.iter().map(|y| y.count).sum::<usize>(), 300);
        }
    }

    #[test]
    fn identical_temperatures_have_zero_std_and_no_anomalies() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let records: Vec<_> = (0..30)
            .map(|i| TemperatureRecord::new("Quito", start + Duration::days(i), 0.1, Season::Spring))
            .collect();
        let series = CityTimeSeries::new("Quito", records);
        let result = analyze_city(&series, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.anomaly_count, 0);
        assert_eq!(result.anomaly_percent, 0.0);
        let defined: Vec<_> = result.records.iter().filter_map(|r| r.rolling_std).collect();
        assert_eq!(defined, vec![0.0]);
        assert!(result
            .records
            .iter()
            .all(|r| r.anomaly.status == AnomalyStatus::Normal));
    }

    #[test]
    fn single_day_city_keeps_analysis_without_trend() {
        let ts = Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap();
        let series = CityTimeSeries::new(
            "Dubai",
            vec![
                TemperatureRecord::new("Dubai", ts, 40.0, Season::Summer),
                TemperatureRecord::new("Dubai", ts, 41.0, Season::Summer),
            ],
        );
        let report = process_city(&series, &AnalysisConfig::default()).unwrap();

        assert_eq!(
            report.analysis.trend,
            TrendOutcome::InsufficientData { points: 2, distinct_days: 1 }
        );
        assert!(report.forecast.is_none());
        assert_eq!(report.analysis.seasonal.len(), 1);
    }

    #[test]
    fn empty_series_is_an_error() {
        let series = CityTimeSeries::new("Nowhere", Vec::new());
        assert_eq!(
            analyze_city(&series, &AnalysisConfig::default()),
            Err(AnalysisError::EmptySeries("Nowhere".to_string()))
        );
    }

    #[test]
    fn process_city_includes_forecast() {
        let dataset = two_city_dataset();
        let config = AnalysisConfig {
            rolling_window: 30,
            forecast_horizon_days: 30,
        };
        let report = process_city(&dataset.series()[0], &config).unwrap();
        let forecast = report.forecast.unwrap();
        assert_eq!(forecast.future_values.len(), 30);
        assert_eq!(forecast.fitted_values.len(), 300);
    }

    #[test]
    fn result_serializes_flat_records() {
        let dataset = two_city_dataset();
        let result = analyze_city(&dataset.series()[1], &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["city"], "Baku");
        assert_eq!(json["records"][0]["season"], "winter");
        assert!(json["records"][0]["rolling_mean"].is_null());
        assert!(json["records"][50]["rolling_mean"].is_number());
        assert!(json["records"][0]["status"].is_string());
        assert_eq!(json["trend"]["status"], "fitted");
    }
}
