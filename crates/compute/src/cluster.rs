//! Per-city temperature moments for scatter-plot grouping.
//!
//! This is a summary statistic, not a clustering algorithm: no partitioning
//! is performed and no cluster labels are assigned.

use serde::{Deserialize, Serialize};

use tempscope_core::Dataset;

use crate::stats;

/// Mean and standard deviation of one city's full series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMoments {
    pub city: String,
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// One entry per city, sorted by city name.
    pub cities: Vec<CityMoments>,
}

impl ClusterSummary {
    pub fn get(&self, city: &str) -> Option<&CityMoments> {
        self.cities.iter().find(|m| m.city == city)
    }
}

pub fn summarize_cities(dataset: &Dataset) -> ClusterSummary {
    let mut cities: Vec<CityMoments> = dataset
        .series()
        .iter()
        .map(|series| {
            let temps = series.temperatures();
            CityMoments {
                city: series.city().to_string(),
                mean: stats::mean(&temps),
                std: stats::sample_std(&temps),
            }
        })
        .collect();
    cities.sort_by(|a, b| a.city.cmp(&b.city));

    ClusterSummary { cities }
}
