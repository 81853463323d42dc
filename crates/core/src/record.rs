use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Meteorological season label carried by every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }

    /// Calendar mapping: Dec-Feb winter, Mar-May spring, Jun-Aug summer, Sep-Nov autumn.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// Season of today's date (UTC).
    pub fn current() -> Self {
        Self::from_month(Utc::now().month())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            other => Err(format!("unknown season: {other}")),
        }
    }
}

/// A single temperature observation. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRecord {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    pub season: Season,
}

impl TemperatureRecord {
    pub fn new(city: impl Into<String>, timestamp: DateTime<Utc>, temperature: f64, season: Season) -> Self {
        Self {
            city: city.into(),
            timestamp,
            temperature,
            season,
        }
    }
}

/// All observations for one city, ascending by timestamp.
///
/// Ordering is established once at construction (stable sort, so
/// same-timestamp records keep their input order) and never changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityTimeSeries {
    city: String,
    records: Vec<TemperatureRecord>,
}

impl CityTimeSeries {
    /// Build a series from records that all belong to `city`.
    ///
    /// Records for other cities are dropped.
    pub fn new(city: impl Into<String>, records: Vec<TemperatureRecord>) -> Self {
        let city = city.into();
        let mut records: Vec<TemperatureRecord> =
            records.into_iter().filter(|r| r.city == city).collect();
        records.sort_by_key(|r| r.timestamp);
        Self { city, records }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn records(&self) -> &[TemperatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature).collect()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.last().map(|r| r.timestamp)
    }
}

/// A loaded multi-city dataset: one series per city, in first-appearance order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    series: Vec<CityTimeSeries>,
}

impl Dataset {
    /// Group flat records by city, preserving the order cities first appear.
    pub fn from_records(records: Vec<TemperatureRecord>) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<TemperatureRecord>> = HashMap::new();

        for record in records {
            if !grouped.contains_key(&record.city) {
                order.push(record.city.clone());
            }
            grouped.entry(record.city.clone()).or_default().push(record);
        }

        let series = order
            .into_iter()
            .map(|city| {
                let records = grouped.remove(&city).unwrap_or_default();
                CityTimeSeries::new(city, records)
            })
            .collect();

        Self { series }
    }

    pub fn series(&self) -> &[CityTimeSeries] {
        &self.series
    }

    pub fn city(&self, name: &str) -> Option<&CityTimeSeries> {
        self.series.iter().find(|s| s.city() == name)
    }

    pub fn cities(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.city()).collect()
    }

    pub fn city_count(&self) -> usize {
        self.series.len()
    }

    /// Total number of records across all cities.
    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &TemperatureRecord> {
        self.series.iter().flat_map(|s| s.records().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn season_parsing_is_case_insensitive() {
        assert_eq!("Winter".parse::<Season>().unwrap(), Season::Winter);
        assert_eq!(" AUTUMN ".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn season_from_month_boundaries() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Autumn);
    }

    #[test]
    fn series_sorts_by_timestamp() {
        let series = CityTimeSeries::new(
            "Berlin",
            vec![
                TemperatureRecord::new("Berlin", ts(3), 3.0, Season::Winter),
                TemperatureRecord::new("Berlin", ts(1), 1.0, Season::Winter),
                TemperatureRecord::new("Berlin", ts(2), 2.0, Season::Winter),
            ],
        );
        assert_eq!(series.temperatures(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_timestamp(), Some(ts(1)));
        assert_eq!(series.last_timestamp(), Some(ts(3)));
    }

    #[test]
    fn dataset_groups_in_first_appearance_order() {
        let dataset = Dataset::from_records(vec![
            TemperatureRecord::new("Tokyo", ts(1), 5.0, Season::Winter),
            TemperatureRecord::new("Cairo", ts(1), 20.0, Season::Winter),
            TemperatureRecord::new("Tokyo", ts(2), 6.0, Season::Winter),
        ]);
        assert_eq!(dataset.cities(), vec!["Tokyo", "Cairo"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.city("Tokyo").map(|s| s.len()), Some(2));
        assert!(dataset.city("Oslo").is_none());
    }
}
