//! Task routing and escalation core for Steer.
//!
//! Steer assigns units of work to the cheapest adequate combination of
//! coding-agent harness and model, escalates to more capable models on
//! failure, and falls back across harnesses when one is rate-limited or
//! unavailable. This crate is the control logic only: it classifies tasks,
//! resolves the fixed routing matrix, walks escalation
//! cascades through an injected executor, selects available harnesses, and
//! produces cost estimates and reports. Spawning harness processes,
//! parsing their output and persisting task state belong to the
//! surrounding layers.

pub mod cascade;
pub mod classify;
pub mod config;
pub mod cost;
pub mod fallback;
pub mod routing;
pub mod task;

pub use cascade::{
    AttemptResult, CascadeExecutor, EscalationResult, EscalationStep, ExecutionOutcome,
    TaskExecutor,
};
pub use classify::{
    CONFIDENCE_THRESHOLD, ClassificationResult, Classifier, ClassifierStrategy,
    ExternalModelClassifier, HeuristicClassifier,
};
pub use config::{ConfigError, EscalationConfig, RoutingConfig, RoutingConfigLoader};
pub use cost::{
    CostEstimator, ESCALATION_BUFFER, FeatureCostReport, FeatureEstimate, ParsedCostReport,
    ReportError, TaskEstimate, TaskExecution, format_delta, parse_cost_reports,
};
pub use fallback::{
    AvailabilityStore, CandidateRejection, DEFAULT_COOLDOWN, HarnessSelection, HarnessSelector,
    InMemoryAvailabilityStore, InstallProbe, RejectionReason, SelectorOptions,
};
pub use routing::{
    Complexity, Mode, RoutingDecision, TaskRouter, estimate_cost, estimate_tokens,
};
pub use task::{Task, TaskStatus};
