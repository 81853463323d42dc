pub mod benchmark;
pub mod config;
pub mod error;
pub mod loader;
pub mod record;

pub use benchmark::BenchmarkResult;
pub use config::Config;
pub use error::*;
pub use loader::load_dataset;
pub use record::*;
