mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use tempscope_core::config::load_dotenv;
use tempscope_core::Config;

use crate::cli::{CliArgs, Command};

// Synchronous entry point: the blocking weather client cannot run inside an
// async runtime, so async work gets its own current-thread runtime per command.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(path) = args.data {
        config.data.dataset_path = path;
    }
    if let Some(key) = args.api_key {
        config.weather.api_key = Some(key);
    }
    config.log_summary();
    debug!(command = ?args.command, "dispatching");

    let output = match &args.command {
        Command::Analyze { city, window, horizon } => commands::analyze(&config, city, *window, *horizon)?,
        Command::Forecast { city, horizon } => commands::forecast_city(&config, city, *horizon)?,
        Command::Describe { city } => commands::describe(&config, city)?,
        Command::Correlate => commands::correlate(&config)?,
        Command::Clusters => commands::clusters(&config)?,
        Command::BenchAnalysis { runs, workers, strategy } => {
            commands::bench_analysis(&config, *runs, *workers, strategy)?
        }
        Command::Weather { cities, concurrent } => commands::weather(&config, cities, *concurrent)?,
        Command::BenchFetch { cities, runs, cooldown_ms } => {
            commands::bench_fetch(&config, cities, *runs, *cooldown_ms)?
        }
        Command::Check { city } => commands::check(&config, city)?,
        Command::ValidateKey { key } => commands::validate_key(&config, key.as_deref())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
