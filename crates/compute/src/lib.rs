pub mod cluster;
pub mod correlation;
pub mod error;
pub mod execution;
pub mod pipeline;
pub mod stats;

pub use cluster::{summarize_cities, CityMoments, ClusterSummary};
pub use correlation::{city_correlations, CorrelationMatrix};
pub use error::{AnalysisError, BenchmarkError};
pub use execution::{
    benchmark_execution, build_strategy, CityTable, ExecutionStrategy, ParallelStrategy, SequentialStrategy,
    StrategyKind,
};
pub use pipeline::anomaly::{classify_temperature, AnomalyStatus};
pub use pipeline::forecast::{forecast, ForecastModel};
pub use pipeline::seasonal::{describe_by_season, seasonal_stats, SeasonDescription, SeasonalTable};
pub use pipeline::trend::{estimate_trend, TrendDirection, TrendModel};
pub use pipeline::{analyze_city, process_city, AnalysisConfig, CityAnalysisResult, CityReport};
