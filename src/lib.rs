// Export modules for library usage
pub mod aggregation;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod escalation;
pub mod io;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod scoring;
pub mod testkit;
pub mod timeline;

// Re-export commonly used types
pub use crate::core::{
    Device, DeviceId, DeviceRegistry, Error, EventRecord, LitigationMilestone, MilestoneKind,
    OutcomeCategory, ReporterType, Result, YearMonth,
};

pub use crate::aggregation::{aggregate_by_device, aggregate_monthly, MonthlyBucket, SeriesSummary};

pub use crate::normalize::{normalize_batch, normalize_report, NormalizeError, RawReport, RejectionTally};

pub use crate::escalation::{analyze_escalation, EscalationMetrics};

pub use crate::scoring::{Indicator, RiskAssessment, RiskScorer, RiskTier, TierOutcome};

pub use crate::timeline::{assessment_history, backtest, correlate, BacktestSummary, TimelineCorrelation};

pub use crate::pipeline::{run_pipeline, AnalysisReport, DeviceReport, PipelineInput, PipelineOptions};

pub use crate::config::EngineConfig;

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
