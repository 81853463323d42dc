/// Message returned for HTTP 401, matching the service's own FAQ pointer.
pub const INVALID_KEY_MESSAGE: &str =
    "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeatherError {
    /// HTTP 401. Never retried; aborts whole batches.
    #[error("{}", INVALID_KEY_MESSAGE)]
    InvalidApiKey,
    #[error("weather API key is not configured (set OPENWEATHER_API_KEY)")]
    MissingApiKey,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode weather response: {0}")]
    Decode(String),
    #[error("async runtime error: {0}")]
    Runtime(String),
    #[error("benchmark needs at least one run")]
    NoRuns,
}

impl WeatherError {
    /// Whether a caller may reasonably carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WeatherError::Api { .. } | WeatherError::Network(_) | WeatherError::Decode(_)
        )
    }

    /// Transport failures only; these are the ones worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, WeatherError::Network(_))
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            WeatherError::Decode(e.to_string())
        } else {
            WeatherError::Network(e.to_string())
        }
    }
}
