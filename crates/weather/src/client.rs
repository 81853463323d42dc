//! Blocking and concurrent clients for the current-weather endpoint.

use futures::future::join_all;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use tempscope_core::config::WeatherConfig;

use crate::error::WeatherError;
use crate::snapshot::{interpret, WeatherSnapshot};

/// Result of fetching one city within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchEntry {
    pub city: String,
    pub outcome: Result<WeatherSnapshot, WeatherError>,
}

impl FetchEntry {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Serialized as the snapshot itself, or `{city, error}` on failure.
impl Serialize for FetchEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(untagged)]
        enum View<'a> {
            Ok(&'a WeatherSnapshot),
            Err { city: &'a str, error: String },
        }

        match &self.outcome {
            Ok(snapshot) => View::Ok(snapshot).serialize(serializer),
            Err(e) => View::Err {
                city: &self.city,
                error: e.to_string(),
            }
            .serialize(serializer),
        }
    }
}

/// Endpoint and query parameters shared by both client forms.
#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
    units: String,
    lang: String,
}

impl Endpoint {
    fn new(config: &WeatherConfig, api_key: String) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key,
            units: config.units.clone(),
            lang: config.lang.clone(),
        }
    }

    fn query<'a>(&'a self, city: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("q", city),
            ("appid", self.api_key.as_str()),
            ("units", self.units.as_str()),
            ("lang", self.lang.as_str()),
        ]
    }
}

fn require_key(config: &WeatherConfig) -> Result<String, WeatherError> {
    config.api_key.clone().ok_or(WeatherError::MissingApiKey)
}

/// Abort on the first unauthorized outcome; the key is shared by every request.
fn reject_unauthorized(entries: &[FetchEntry]) -> Result<(), WeatherError> {
    if entries
        .iter()
        .any(|e| matches!(e.outcome, Err(WeatherError::InvalidApiKey)))
    {
        return Err(WeatherError::InvalidApiKey);
    }
    Ok(())
}

// ── Concurrent form ───────────────────────────────────────────

/// Non-blocking client. All requests of a batch share one connection pool
/// and are awaited together.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl WeatherClient {
    /// Build from config; fails with [`WeatherError::MissingApiKey`] when no key is set.
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_key(config, require_key(config)?)
    }

    pub fn with_key(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            endpoint: Endpoint::new(config, api_key.into()),
        })
    }

    /// Single lookup. Never retried.
    pub async fn fetch(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let response = self
            .http
            .get(&self.endpoint.base_url)
            .query(&self.endpoint.query(city))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(city, status, "weather response received");
        interpret(status, &body)
    }

    /// Fetch every city concurrently and return entries in input order.
    ///
    /// Per-city failures become error entries; an unauthorized response
    /// aborts the batch.
    pub async fn fetch_many(&self, cities: &[String]) -> Result<Vec<FetchEntry>, WeatherError> {
        let outcomes = join_all(cities.iter().map(|city| self.fetch(city))).await;

        let entries: Vec<FetchEntry> = cities
            .iter()
            .zip(outcomes)
            .map(|(city, outcome)| {
                if let Err(e) = &outcome {
                    warn!(city = %city, error = %e, "concurrent fetch failed");
                }
                FetchEntry {
                    city: city.clone(),
                    outcome,
                }
            })
            .collect();

        reject_unauthorized(&entries)?;
        Ok(entries)
    }
}

// ── Blocking form ─────────────────────────────────────────────

/// Blocking client. Must not be constructed or used from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingWeatherClient {
    http: reqwest::blocking::Client,
    endpoint: Endpoint,
}

impl BlockingWeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_key(config, require_key(config)?)
    }

    pub fn with_key(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: Endpoint::new(config, api_key.into()),
        })
    }

    pub fn fetch(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let response = self
            .http
            .get(&self.endpoint.base_url)
            .query(&self.endpoint.query(city))
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(city, status, "weather response received");
        interpret(status, &body)
    }

    /// Fetch cities one after another. Stops at the first unauthorized response.
    pub fn fetch_many(&self, cities: &[String]) -> Result<Vec<FetchEntry>, WeatherError> {
        let mut entries = Vec::with_capacity(cities.len());
        for city in cities {
            let outcome = self.fetch(city);
            match &outcome {
                Err(WeatherError::InvalidApiKey) => return Err(WeatherError::InvalidApiKey),
                Err(e) => warn!(city = %city, error = %e, "blocking fetch failed"),
                Ok(_) => {}
            }
            entries.push(FetchEntry {
                city: city.clone(),
                outcome,
            });
        }
        Ok(entries)
    }
}
