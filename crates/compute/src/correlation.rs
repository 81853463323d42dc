//! Cross-city Pearson correlation over shared timestamps.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tempscope_core::Dataset;

use crate::stats;

/// Symmetric city × city correlation matrix.
///
/// Off-diagonal entries are NaN (serialized as `null`) when two cities share
/// fewer than two timestamps or one of them is constant over the overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row/column labels, sorted by name.
    pub cities: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn index_of(&self, city: &str) -> Option<usize> {
        self.cities.iter().position(|c| c == city)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i][j])
    }
}

/// Wide alignment: timestamp → per-city mean temperature at that instant.
fn align(dataset: &Dataset, cities: &[String]) -> BTreeMap<DateTime<Utc>, Vec<Option<f64>>> {
    let mut sums: BTreeMap<DateTime<Utc>, Vec<(f64, usize)>> = BTreeMap::new();

    for (col, city) in cities.iter().enumerate() {
        let Some(series) = dataset.city(city) else {
            continue;
        };
        for r in series.records() {
            let row = sums
                .entry(r.timestamp)
                .or_insert_with(|| vec![(0.0, 0); cities.len()]);
            row[col].0 += r.temperature;
            row[col].1 += 1;
        }
    }

    sums.into_iter()
        .map(|(ts, row)| {
            let means = row
                .into_iter()
                .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                .collect();
            (ts, means)
        })
        .collect()
}

/// Pearson correlation between every pair of cities over the timestamps both observed.
///
/// Duplicate readings for the same city and timestamp are averaged first.
pub fn city_correlations(dataset: &Dataset) -> CorrelationMatrix {
    let mut cities: Vec<String> = dataset.cities().into_iter().map(str::to_string).collect();
    cities.sort();

    let aligned = align(dataset, &cities);
    let n = cities.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let (xs, ys): (Vec<f64>, Vec<f64>) = aligned
                .values()
                .filter_map(|row| Some((row[i]?, row[j]?)))
                .unzip();
            let r = stats::pearson(&xs, &ys).unwrap_or(f64::NAN);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    debug!(cities = n, timestamps = aligned.len(), "correlation matrix computed");

    CorrelationMatrix { cities, values }
}
