//! Cost estimation and reporting.
//!
//! [`estimator`] projects costs before a run; [`report`] aggregates what
//! actually happened and owns the persisted report text format.

pub mod estimator;
pub mod report;

pub use estimator::{CostEstimator, ESCALATION_BUFFER, FeatureEstimate, TaskEstimate};
pub use report::{
    FeatureCostReport, ParsedCostReport, ReportError, TaskExecution, format_delta,
    parse_cost_reports,
};
