//! Remote current-weather lookups in blocking and concurrent forms, and the
//! benchmark comparing them.

pub mod benchmark;
pub mod client;
pub mod error;
pub mod lookup;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod mock;

pub use benchmark::{benchmark_fetch, Conclusion, FetchBenchmarkReport};
pub use client::{BlockingWeatherClient, FetchEntry, WeatherClient};
pub use error::WeatherError;
pub use lookup::{lookup_temperature, validate_api_key, KeyValidation, LookupOutcome};
pub use snapshot::WeatherSnapshot;
