use serde::{Deserialize, Serialize};
use tracing::debug;

use tempscope_core::{CityTimeSeries, TemperatureRecord};

use crate::error::AnalysisError;
use crate::stats;

/// Slopes smaller than this (°C/day) are reported as stable.
const STABLE_SLOPE: f64 = 1e-9;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

/// Ordinary least squares fit of y on x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlsFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson r of (x, y); 0.0 when y has no variance.
    pub r: f64,
}

impl OlsFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Linear temperature trend over elapsed days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendModel {
    /// °C per day.
    pub slope: f64,
    pub intercept: f64,
    pub correlation_r: f64,
    /// °C per year (`slope * 365`).
    pub slope_per_year: f64,
}

impl TrendModel {
    fn from_fit(fit: OlsFit) -> Self {
        Self {
            slope: fit.slope,
            intercept: fit.intercept,
            correlation_r: fit.r,
            slope_per_year: fit.slope * 365.0,
        }
    }

    pub fn yearly_slope(&self) -> f64 {
        self.slope * 365.0
    }

    pub fn direction(&self) -> TrendDirection {
        if self.slope > STABLE_SLOPE {
            TrendDirection::Rising
        } else if self.slope < -STABLE_SLOPE {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        }
    }
}

/// Whole days elapsed since the earliest record (fractional days truncated).
pub fn day_offsets(records: &[TemperatureRecord]) -> Vec<f64> {
    let Some(start) = records.iter().map(|r| r.timestamp).min() else {
        return Vec::new();
    };
    records
        .iter()
        .map(|r| (r.timestamp - start).num_days() as f64)
        .collect()
}

fn distinct_count(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// Fit `y = intercept + slope * x`. `None` if x has fewer than two distinct values.
pub fn fit_ols(x: &[f64], y: &[f64]) -> Option<OlsFit> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);

    let mx = stats::mean(x);
    let my = stats::mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for i in 0..n {
        let dx = x[i] - mx;
        sxy += dx * (y[i] - my);
        sxx += dx * dx;
    }

    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let r = stats::pearson(x, y).unwrap_or(0.0);

    Some(OlsFit { slope, intercept, r })
}

/// Fit the series' day offsets, or explain why there is too little data.
pub(crate) fn fit_series(series: &CityTimeSeries) -> Result<(Vec<f64>, OlsFit), AnalysisError> {
    let x = day_offsets(series.records());
    let y = series.temperatures();

    match fit_ols(&x, &y) {
        Some(fit) => Ok((x, fit)),
        None => Err(AnalysisError::InsufficientData {
            city: series.city().to_string(),
            points: series.len(),
            distinct_days: distinct_count(&x),
        }),
    }
}

/// OLS trend of temperature against whole days since the series start.
pub fn estimate_trend(series: &CityTimeSeries) -> Result<TrendModel, AnalysisError> {
    let (_, fit) = fit_series(series)?;
    let model = TrendModel::from_fit(fit);

    debug!(
        city = series.city(),
        slope = model.slope,
        r = model.correlation_r,
        "trend estimated"
    );

    Ok(model)
}
