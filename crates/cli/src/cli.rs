use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Temperature time-series analytics and concurrency benchmarks.
///
/// Every command prints its result as pretty JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "tempscope", version, about = "Temperature analytics and concurrency benchmarks")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Dataset file (.csv or .parquet); overrides TEMPSCOPE_DATA
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Config profile; keys are looked up as {PROFILE}_{KEY} first
    #[arg(long, global = true, env = "TEMPSCOPE_PROFILE")]
    pub profile: Option<String>,

    /// Weather API key; overrides OPENWEATHER_API_KEY
    #[arg(long, global = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full analysis of one city (rolling stats, seasons, anomalies, trend)
    Analyze {
        #[arg(long)]
        city: String,
        /// Rolling window size in records
        #[arg(long)]
        window: Option<usize>,
        /// Forecast horizon in days; 0 skips the forecast
        #[arg(long)]
        horizon: Option<usize>,
    },
    /// Linear forecast past the last observation
    Forecast {
        #[arg(long)]
        city: String,
        #[arg(long)]
        horizon: Option<usize>,
    },
    /// Descriptive statistics per season
    Describe {
        #[arg(long)]
        city: String,
    },
    /// Cross-city Pearson correlation matrix
    Correlate,
    /// Per-city mean/std moments
    Clusters,
    /// Sequential vs. pooled execution of the per-city pipeline
    BenchAnalysis {
        #[arg(long)]
        runs: Option<usize>,
        /// Pool size (0 = available parallelism)
        #[arg(long)]
        workers: Option<usize>,
        /// sequential, parallel or both
        #[arg(long, default_value = "both")]
        strategy: String,
    },
    /// Current weather for one or more cities
    Weather {
        #[arg(required = true)]
        cities: Vec<String>,
        /// Fetch all cities concurrently instead of one by one
        #[arg(long)]
        concurrent: bool,
    },
    /// Blocking vs. concurrent fetch benchmark
    BenchFetch {
        #[arg(required = true)]
        cities: Vec<String>,
        #[arg(long)]
        runs: Option<usize>,
        /// Pause after each trial, in milliseconds
        #[arg(long)]
        cooldown_ms: Option<u64>,
    },
    /// Classify a city's live temperature against its seasonal profile
    Check {
        #[arg(long)]
        city: String,
    },
    /// Check whether a weather API key is accepted
    ValidateKey {
        /// Key to check (defaults to the configured key)
        key: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_bench_analysis_flags() {
        let args = CliArgs::try_parse_from([
            "tempscope",
            "bench-analysis",
            "--runs",
            "5",
            "--strategy",
            "parallel",
            "--data",
            "temps.parquet",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("temps.parquet")));
        match args.command {
            Command::BenchAnalysis { runs, workers, strategy } => {
                assert_eq!(runs, Some(5));
                assert_eq!(workers, None);
                assert_eq!(strategy, "parallel");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn weather_requires_a_city() {
        assert!(CliArgs::try_parse_from(["tempscope", "weather"]).is_err());

        let args = CliArgs::try_parse_from(["tempscope", "weather", "Paris", "Rome", "--concurrent"]).unwrap();
        match args.command {
            Command::Weather { cities, concurrent } => {
                assert_eq!(cities, vec!["Paris", "Rome"]);
                assert!(concurrent);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
