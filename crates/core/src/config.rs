use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Default current-weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub data: DataConfig,
    pub benchmark: BenchmarkConfig,
    pub weather: WeatherConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TEMPSCOPE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TEMPSCOPE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            data: DataConfig::from_env_profiled(p),
            benchmark: BenchmarkConfig::from_env_profiled(p),
            weather: WeatherConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  data:       path={}, window={}, horizon={}",
            self.data.dataset_path.display(),
            self.data.rolling_window,
            self.data.forecast_horizon_days
        );
        tracing::info!(
            "  benchmark:  runs={}, workers={}, cooldown_ms={}",
            self.benchmark.runs,
            self.benchmark.resolved_workers(),
            self.benchmark.fetch_cooldown_ms
        );
        tracing::info!(
            "  weather:    url={}, key={}, timeout={}s",
            self.weather.base_url,
            if self.weather.is_configured() { "set" } else { "(none)" },
            self.weather.timeout_secs
        );
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "data": {
                "dataset_path": self.data.dataset_path,
                "rolling_window": self.data.rolling_window,
                "forecast_horizon_days": self.data.forecast_horizon_days,
            },
            "benchmark": {
                "runs": self.benchmark.runs,
                "workers": self.benchmark.resolved_workers(),
                "fetch_cooldown_ms": self.benchmark.fetch_cooldown_ms,
            },
            "weather": {
                "base_url": self.weather.base_url,
                "units": self.weather.units,
                "lang": self.weather.lang,
                "timeout_secs": self.weather.timeout_secs,
                "lookup_attempts": self.weather.lookup_attempts,
                "configured": self.weather.is_configured(),
            },
        })
    }
}

// ── Data ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub dataset_path: PathBuf,
    /// Centered rolling window size (records).
    pub rolling_window: usize,
    /// Days to extrapolate past the last observation.
    pub forecast_horizon_days: usize,
}

impl DataConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dataset_path: PathBuf::from(profiled_env_or(p, "TEMPSCOPE_DATA", "temperature_data.csv")),
            rolling_window: profiled_env_usize(p, "ROLLING_WINDOW", 30),
            forecast_horizon_days: profiled_env_usize(p, "FORECAST_HORIZON_DAYS", 365),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("temperature_data.csv"),
            rolling_window: 30,
            forecast_horizon_days: 365,
        }
    }
}

// ── Benchmarks ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub runs: usize,
    /// Worker pool size (0 = available parallelism).
    pub workers: usize,
    /// Pause between network benchmark trials.
    pub fetch_cooldown_ms: u64,
}

impl BenchmarkConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            runs: profiled_env_usize(p, "BENCH_RUNS", 3),
            workers: profiled_env_usize(p, "BENCH_WORKERS", 0),
            fetch_cooldown_ms: profiled_env_u64(p, "FETCH_COOLDOWN_MS", 500),
        }
    }

    /// Resolve worker count (0 means use available parallelism).
    pub fn resolved_workers(&self) -> usize {
        resolve_workers(self.workers)
    }

    pub fn fetch_cooldown(&self) -> Duration {
        Duration::from_millis(self.fetch_cooldown_ms)
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            runs: 3,
            workers: 0,
            fetch_cooldown_ms: 500,
        }
    }
}

/// Map a requested worker count to a concrete one; 0 means hardware concurrency.
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    } else {
        requested
    }
}

// ── Weather service ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub units: String,
    pub lang: String,
    /// Total attempts for the internal lookup path.
    pub lookup_attempts: usize,
}

impl WeatherConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            api_key: profiled_env_opt(p, "OPENWEATHER_API_KEY"),
            base_url: profiled_env_or(p, "OPENWEATHER_URL", DEFAULT_WEATHER_URL),
            timeout_secs: profiled_env_u64(p, "WEATHER_TIMEOUT_SECS", 10),
            units: profiled_env_or(p, "WEATHER_UNITS", "metric"),
            lang: profiled_env_or(p, "WEATHER_LANG", "ru"),
            lookup_attempts: profiled_env_usize(p, "WEATHER_LOOKUP_ATTEMPTS", 2),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_WEATHER_URL.to_string(),
            timeout_secs: 10,
            units: "metric".to_string(),
            lang: "ru".to_string(),
            lookup_attempts: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_workers_auto_and_explicit() {
        assert!(resolve_workers(0) > 0);
        assert_eq!(resolve_workers(6), 6);
    }

    #[test]
    fn defaults_match_documented_values() {
        let weather = WeatherConfig::default();
        assert_eq!(weather.timeout(), Duration::from_secs(10));
        assert_eq!(weather.units, "metric");
        assert_eq!(weather.lang, "ru");
        assert_eq!(weather.lookup_attempts, 2);
        assert!(!weather.is_configured());

        let bench = BenchmarkConfig::default();
        assert_eq!(bench.fetch_cooldown(), Duration::from_millis(500));
        assert_eq!(DataConfig::default().rolling_window, 30);
    }

    #[test]
    fn redacted_summary_hides_api_key() {
        let mut config = Config::for_profile("");
        config.weather.api_key = Some("super-secret-key".to_string());
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("super-secret-key"));
        assert_eq!(config.redacted_summary()["weather"]["configured"], true);
        assert_eq!(config.profile_label(), "default");
    }
}
