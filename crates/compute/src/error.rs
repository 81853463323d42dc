/// Errors raised by the per-city analysis stages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("no observations for city '{0}'")]
    EmptySeries(String),
    #[error("insufficient data for regression on '{city}': {points} points over {distinct_days} distinct day(s), need at least 2 distinct days")]
    InsufficientData {
        city: String,
        points: usize,
        distinct_days: usize,
    },
    #[error("rolling window must be at least 1, got {0}")]
    InvalidWindow(usize),
}

/// Errors raised while setting up or running the execution benchmark.
#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    #[error("benchmark needs at least one run")]
    NoRuns,
    #[error("unknown execution strategy: {0}")]
    UnknownStrategy(String),
}

impl From<rayon::ThreadPoolBuildError> for BenchmarkError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        BenchmarkError::ThreadPool(e.to_string())
    }
}
