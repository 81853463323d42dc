//! Sequential and pooled execution of the per-city pipeline, plus the
//! benchmark comparing them.

pub mod benchmark;
pub mod strategy;

pub use benchmark::{benchmark_execution, timed_run};
pub use strategy::{
    build_strategy, CityTable, ExecutionStrategy, ParallelStrategy, SequentialStrategy, StrategyKind,
};
