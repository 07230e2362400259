//! Infrastructure around the planning engine: data sources, configuration
//! loading, the report pipeline, and the scheduled runner.
//!
//! Failures here are isolated: a failing analyzer or data source never
//! takes sibling work down with it.

pub mod config;
pub mod pipeline;
pub mod runner;
pub mod source;

pub use config::{ConfigError, planning_config_from_env, planning_config_from_lookup};
pub use pipeline::{
    Analyzer, AnalyzerOutput, AnalyzerRecord, DemandProfileAnalyzer, PipelineReport,
    ReplenishmentAnalyzer, ReportPipeline,
};
pub use runner::{InMemoryPlanInsightSink, PlanInsightSink, PlanningRunner, PlanningRunnerHandle};
pub use source::{
    InMemoryPlanningDataSource, JsonFilePlanningDataSource, PlanningDataSource, SourceError,
};
