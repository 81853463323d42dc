use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tempscope_core::CityTimeSeries;

use crate::error::AnalysisError;
use crate::stats;

use super::trend::fit_series;

/// Default forecast horizon in days.
pub const DEFAULT_HORIZON_DAYS: usize = 365;

/// Which data the fit metrics were computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsScope {
    /// Metrics use the same points the line was fitted to.
    InSample,
}

/// Linear extrapolation of a city's history.
///
/// `rmse` and `r2` are in-sample: they measure how well the line fits the
/// training history and say nothing about accuracy on unseen days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    pub slope: f64,
    pub intercept: f64,
    pub rmse: f64,
    pub r2: f64,
    pub metrics_scope: MetricsScope,
    /// Fitted value for every historical record, index-aligned with the series.
    pub fitted_values: Vec<f64>,
    pub future_values: Vec<f64>,
    pub future_timestamps: Vec<DateTime<Utc>>,
}

/// Coefficient of determination. With zero total variance it is 1.0 for a
/// perfect fit and 0.0 otherwise.
///
/// Sums of squares below `EPSILON * n * max(y²)` are rounding noise and
/// count as zero.
fn r_squared(actual: &[f64], fitted: &[f64], mean: f64) -> f64 {
    let ss_res: f64 = actual.iter().zip(fitted).map(|(y, f)| (y - f).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();

    let scale = actual.iter().map(|y| y * y).fold(0.0, f64::max);
    let noise = f64::EPSILON * actual.len() as f64 * scale;

    if stats::is_constant(actual) || ss_tot <= noise {
        return if ss_res <= noise { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Fit OLS over the history and extrapolate `horizon_days` daily steps.
///
/// Future day offsets continue from the last historical offset; future
/// timestamps step one day at a time from the last observation.
pub fn forecast(series: &CityTimeSeries, horizon_days: usize) -> Result<ForecastModel, AnalysisError> {
    let (x, fit) = fit_series(series)?;
    let y = series.temperatures();

    let fitted_values: Vec<f64> = x.iter().map(|&xi| fit.predict(xi)).collect();

    let n = y.len() as f64;
    let mse = y
        .iter()
        .zip(&fitted_values)
        .map(|(a, f)| (a - f).powi(2))
        .sum::<f64>()
        / n;
    let rmse = mse.sqrt();
    let r2 = r_squared(&y, &fitted_values, stats::mean(&y));

    let last_day = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let last_ts = series
        .last_timestamp()
        .ok_or_else(|| AnalysisError::EmptySeries(series.city().to_string()))?;

    let mut future_values = Vec::with_capacity(horizon_days);
    let mut future_timestamps = Vec::with_capacity(horizon_days);
    for step in 1..=horizon_days {
        future_values.push(fit.predict(last_day + step as f64));
        future_timestamps.push(last_ts + Duration::days(step as i64));
    }

    debug!(
        city = series.city(),
        rmse,
        r2,
        horizon_days,
        "forecast fitted"
    );

    Ok(ForecastModel {
        slope: fit.slope,
        intercept: fit.intercept,
        rmse,
        r2,
        metrics_scope: MetricsScope::InSample,
        fitted_values,
        future_values,
        future_timestamps,
    })
}
