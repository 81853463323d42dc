use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use tempscope_core::TemperatureRecord;

use crate::stats;

/// Temperature summary of one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Aggregate by calendar year (UTC), ascending.
pub fn yearly_stats(records: &[TemperatureRecord]) -> Vec<YearlyAggregate> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_year.entry(r.timestamp.year()).or_default().push(r.temperature);
    }

    by_year
        .into_iter()
        .map(|(year, temps)| YearlyAggregate {
            year,
            count: temps.len(),
            mean: stats::mean(&temps),
            std: stats::sample_std(&temps),
            min: stats::min(&temps),
            max: stats::max(&temps),
        })
        .collect()
}
