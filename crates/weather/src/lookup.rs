//! Internal lookup path and credential validation.
//!
//! Unlike the batch fetch forms, the lookup retries transport failures and
//! never fails: callers get [`LookupOutcome::Unavailable`] instead.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use tempscope_core::config::WeatherConfig;

use crate::client::{BlockingWeatherClient, WeatherClient};
use crate::error::{WeatherError, INVALID_KEY_MESSAGE};

/// Minimum plausible key length; shorter keys are rejected without a request.
pub const MIN_KEY_LEN: usize = 10;

/// City used to probe a credential.
pub const PROBE_CITY: &str = "London";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "temperature", rename_all = "snake_case")]
pub enum LookupOutcome {
    Available(f64),
    Unavailable,
}

impl LookupOutcome {
    pub fn temperature(&self) -> Option<f64> {
        match self {
            LookupOutcome::Available(t) => Some(*t),
            LookupOutcome::Unavailable => None,
        }
    }
}

/// Current temperature for `city`, making at most `attempts` requests.
///
/// Only transport failures are retried. HTTP failures, including 401, give
/// up immediately.
pub async fn lookup_temperature(client: &WeatherClient, city: &str, attempts: usize) -> LookupOutcome {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        match client.fetch(city).await {
            Ok(snapshot) => return LookupOutcome::Available(snapshot.temperature),
            Err(e) if e.is_transient() => {
                error!(city, attempt, attempts, error = %e, "weather lookup network failure");
            }
            Err(e) => {
                warn!(city, error = %e, "weather lookup rejected");
                return LookupOutcome::Unavailable;
            }
        }
    }

    LookupOutcome::Unavailable
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValidation {
    pub valid: bool,
    pub message: String,
}

/// Check a credential with one probe request.
///
/// Uses the blocking client, so it must not be called from inside an async runtime.
pub fn validate_api_key(config: &WeatherConfig, api_key: &str) -> KeyValidation {
    if api_key.len() < MIN_KEY_LEN {
        return KeyValidation {
            valid: false,
            message: "API key is too short".to_string(),
        };
    }

    let outcome = BlockingWeatherClient::with_key(config, api_key).and_then(|client| client.fetch(PROBE_CITY));
    match outcome {
        Ok(_) => {
            info!("API key accepted");
            KeyValidation {
                valid: true,
                message: "API key is valid".to_string(),
            }
        }
        Err(WeatherError::InvalidApiKey) => KeyValidation {
            valid: false,
            message: INVALID_KEY_MESSAGE.to_string(),
        },
        Err(e) => KeyValidation {
            valid: false,
            message: format!("key check failed: {e}"),
        },
    }
}
