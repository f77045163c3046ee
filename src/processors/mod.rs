pub mod aggregation_engine;
pub mod partition_processor;
pub mod point_extractor;
pub mod run_orchestrator;

pub use aggregation_engine::{AggregationEngine, AggregationSettings, RunOutput};
pub use partition_processor::PartitionProcessor;
pub use point_extractor::PointExtractor;
pub use run_orchestrator::{
    summarize_reports, DiagnosticsSink, RunOrchestrator, RunReport, RunSpec, RunStatus,
};
