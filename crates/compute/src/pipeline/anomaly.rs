//! Seasonal anomaly classification.
//!
//! Each observation is compared against the mean ± 2σ band of its own
//! season only. The seasonal table is passed in explicitly and classification
//! is a single pass producing index-aligned columns.

use serde::{Deserialize, Serialize};

use tempscope_core::{Season, TemperatureRecord};

use super::seasonal::{SeasonStats, SeasonalTable};

/// Width of the normal band in standard deviations.
pub const SIGMA_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Normal,
    ColdAnomaly,
    HotAnomaly,
    /// The season has no profile to compare against.
    Unknown,
}

impl AnomalyStatus {
    /// `None` when the status is [`AnomalyStatus::Unknown`].
    pub fn is_anomaly(&self) -> Option<bool> {
        match self {
            AnomalyStatus::Normal => Some(false),
            AnomalyStatus::ColdAnomaly | AnomalyStatus::HotAnomaly => Some(true),
            AnomalyStatus::Unknown => None,
        }
    }
}

/// Normal band of one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonBounds {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl From<&SeasonStats> for SeasonBounds {
    fn from(stats: &SeasonStats) -> Self {
        Self {
            mean: stats.mean,
            lower: stats.mean - SIGMA_MULTIPLIER * stats.std,
            upper: stats.mean + SIGMA_MULTIPLIER * stats.std,
        }
    }
}

fn classify_against(temperature: f64, bounds: &SeasonBounds) -> AnomalyStatus {
    if temperature < bounds.lower {
        AnomalyStatus::ColdAnomaly
    } else if temperature > bounds.upper {
        AnomalyStatus::HotAnomaly
    } else {
        AnomalyStatus::Normal
    }
}

/// Classify a single temperature against `season`'s band.
///
/// Returns `(status, lower, upper)`; a season without a profile yields
/// `(Unknown, 0.0, 0.0)`.
pub fn classify_temperature(temperature: f64, season: Season, table: &SeasonalTable) -> (AnomalyStatus, f64, f64) {
    match table.get(season) {
        Some(stats) => {
            let bounds = SeasonBounds::from(stats);
            (classify_against(temperature, &bounds), bounds.lower, bounds.upper)
        }
        None => (AnomalyStatus::Unknown, 0.0, 0.0),
    }
}

/// Per-record view of one row of [`AnomalyColumns`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub status: AnomalyStatus,
    pub season_mean: f64,
    pub season_lower: f64,
    pub season_upper: f64,
}

/// Index-aligned classification output, one entry per input record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyColumns {
    pub temperature: Vec<f64>,
    pub season_mean: Vec<f64>,
    pub season_lower: Vec<f64>,
    pub season_upper: Vec<f64>,
    pub status: Vec<AnomalyStatus>,
}

impl AnomalyColumns {
    pub fn len(&self) -> usize {
        self.status.len()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    pub fn flag(&self, idx: usize) -> Option<AnomalyFlag> {
        Some(AnomalyFlag {
            status: *self.status.get(idx)?,
            season_mean: self.season_mean[idx],
            season_lower: self.season_lower[idx],
            season_upper: self.season_upper[idx],
        })
    }

    /// Records classified as cold or hot anomalies.
    pub fn anomaly_count(&self) -> usize {
        self.status
            .iter()
            .filter(|s| s.is_anomaly() == Some(true))
            .count()
    }

    pub fn unknown_count(&self) -> usize {
        self.status
            .iter()
            .filter(|s| **s == AnomalyStatus::Unknown)
            .count()
    }
}

/// Classify every record against its own season's band.
pub fn detect_anomalies(records: &[TemperatureRecord], table: &SeasonalTable) -> AnomalyColumns {
    let n = records.len();
    let mut columns = AnomalyColumns {
        temperature: Vec::with_capacity(n),
        season_mean: Vec::with_capacity(n),
        season_lower: Vec::with_capacity(n),
        season_upper: Vec::with_capacity(n),
        status: Vec::with_capacity(n),
    };

    for record in records {
        let (status, mean, lower, upper) = match table.get(record.season) {
            Some(stats) => {
                let bounds = SeasonBounds::from(stats);
                (
                    classify_against(record.temperature, &bounds),
                    bounds.mean,
                    bounds.lower,
                    bounds.upper,
                )
            }
            None => (AnomalyStatus::Unknown, 0.0, 0.0, 0.0),
        };

        columns.temperature.push(record.temperature);
        columns.season_mean.push(mean);
        columns.season_lower.push(lower);
        columns.season_upper.push(upper);
        columns.status.push(status);
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::seasonal::seasonal_stats;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[(f64, Season)]) -> Vec<TemperatureRecord> {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, (t, s))| TemperatureRecord::new("Oslo", start + Duration::days(i as i64), *t, *s))
            .collect()
    }

    #[test]
    fn classify_uses_two_sigma_band() {
        let table: SeasonalTable = [SeasonStats {
            season: Season::Winter,
            count: 10,
            mean: 0.0,
            std: 5.0,
            min: -10.0,
            max: 10.0,
        }]
        .into_iter()
        .collect();

        assert_eq!(classify_temperature(-10.5, Season::Winter, &table), (AnomalyStatus::ColdAnomaly, -10.0, 10.0));
        assert_eq!(classify_temperature(10.5, Season::Winter, &table).0, AnomalyStatus::HotAnomaly);
        assert_eq!(classify_temperature(10.0, Season::Winter, &table).0, AnomalyStatus::Normal);
        assert_eq!(classify_temperature(3.0, Season::Summer, &table), (AnomalyStatus::Unknown, 0.0, 0.0));
    }

    #[test]
    fn seasons_do_not_leak_into_each_other() {
        // Winter is tightly clustered around 0, summer around 30.
        let mut values: Vec<(f64, Season)> = (0..20)
            .map(|i| (if i % 2 == 0 { -1.0 } else { 1.0 }, Season::Winter))
            .collect();
        values.extend((0..20).map(|i| (if i % 2 == 0 { 29.0 } else { 31.0 }, Season::Summer)));
        let records = series(&values);
        let table = seasonal_stats(&records);

        let columns = detect_anomalies(&records, &table);
        assert_eq!(columns.anomaly_count(), 0);

        // A 30°C winter day is anomalous for winter even though it is typical of summer.
        let (status, _, upper) = classify_temperature(30.0, Season::Winter, &table);
        assert_eq!(status, AnomalyStatus::HotAnomaly);
        assert!(upper < 5.0);
    }

    #[test]
    fn columns_are_index_aligned() {
        let mut values: Vec<(f64, Season)> = vec![(10.0, Season::Spring); 30];
        values.push((50.0, Season::Spring));
        let records = series(&values);
        let table = seasonal_stats(&records);
        let columns = detect_anomalies(&records, &table);

        assert_eq!(columns.len(), records.len());
        assert_eq!(columns.temperature[30], 50.0);
        assert_eq!(columns.status[30], AnomalyStatus::HotAnomaly);
        assert_eq!(columns.anomaly_count(), 1);

        let flag = columns.flag(30).unwrap();
        assert_eq!(flag.status.is_anomaly(), Some(true));
        assert!(flag.season_upper < 50.0);
        assert!(columns.flag(31).is_none());
    }

    #[test]
    fn missing_profile_is_unknown_with_zero_bounds() {
        let records = series(&[(5.0, Season::Autumn)]);
        let columns = detect_anomalies(&records, &SeasonalTable::default());
        assert_eq!(columns.status[0], AnomalyStatus::Unknown);
        assert_eq!(columns.status[0].is_anomaly(), None);
        assert_eq!(columns.season_lower[0], 0.0);
        assert_eq!(columns.season_upper[0], 0.0);
        assert_eq!(columns.unknown_count(), 1);
        assert_eq!(columns.anomaly_count(), 0);
    }
}
