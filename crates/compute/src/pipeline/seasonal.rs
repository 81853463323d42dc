use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tempscope_core::{Season, TemperatureRecord};

use crate::stats;

/// Temperature profile of one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub season: Season,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-season profiles. Seasons absent from the input have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonalTable {
    stats: BTreeMap<Season, SeasonStats>,
}

impl SeasonalTable {
    pub fn get(&self, season: Season) -> Option<&SeasonStats> {
        self.stats.get(&season)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeasonStats> {
        self.stats.values()
    }

    pub fn seasons(&self) -> Vec<Season> {
        self.stats.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl FromIterator<SeasonStats> for SeasonalTable {
    fn from_iter<I: IntoIterator<Item = SeasonStats>>(iter: I) -> Self {
        Self {
            stats: iter.into_iter().map(|s| (s.season, s)).collect(),
        }
    }
}

fn group_by_season(records: &[TemperatureRecord]) -> BTreeMap<Season, Vec<f64>> {
    let mut groups: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.season).or_default().push(r.temperature);
    }
    groups
}

/// Group records by season label and compute count/mean/std/min/max.
pub fn seasonal_stats(records: &[TemperatureRecord]) -> SeasonalTable {
    group_by_season(records)
        .into_iter()
        .map(|(season, temps)| SeasonStats {
            season,
            count: temps.len(),
            mean: stats::mean(&temps),
            std: stats::sample_std(&temps),
            min: stats::min(&temps),
            max: stats::max(&temps),
        })
        .collect()
}

/// Five-number-plus summary of one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonDescription {
    pub season: Season,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Descriptive statistics per season with interpolated quartiles.
pub fn describe_by_season(records: &[TemperatureRecord]) -> Vec<SeasonDescription> {
    group_by_season(records)
        .into_iter()
        .map(|(season, mut temps)| {
            temps.sort_by(f64::total_cmp);
            SeasonDescription {
                season,
                count: temps.len(),
                mean: stats::mean(&temps),
                std: stats::sample_std(&temps),
                min: temps[0],
                p25: stats::quantile_sorted(&temps, 0.25),
                p50: stats::quantile_sorted(&temps, 0.5),
                p75: stats::quantile_sorted(&temps, 0.75),
                max: temps[temps.len() - 1],
            }
        })
        .collect()
}
