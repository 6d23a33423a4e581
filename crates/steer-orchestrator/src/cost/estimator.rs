//! Pre-run cost projection for tasks and features.

use crate::config::RoutingConfig;
use crate::routing::router::{TaskRouter, estimate_tokens};
use crate::routing::types::{Mode, RoutingDecision};
use crate::task::{Task, TaskStatus};
use serde::Serialize;
use std::sync::Arc;
use steer_models::ModelRegistry;
use tracing::debug;

/// Buffer applied to feature estimates to absorb expected escalation
/// retries.
pub const ESCALATION_BUFFER: f64 = 0.12;

/// Projected cost for one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskEstimate {
    /// Task this estimate is for.
    pub task_id: String,
    /// The routing decision the estimate is based on.
    pub decision: RoutingDecision,
    /// Token estimate for the task.
    pub tokens: u64,
    /// Projected cost in USD.
    pub cost: f64,
}

/// Projected cost for a whole feature (a set of tasks).
#[derive(Debug, Clone, Serialize)]
pub struct FeatureEstimate {
    /// Mode the estimate was computed under.
    pub mode: Mode,
    /// Per-task estimates for incomplete tasks.
    pub tasks: Vec<TaskEstimate>,
    /// Sum of per-task costs before buffering.
    pub subtotal: f64,
    /// Subtotal with the escalation buffer applied.
    pub buffered_total: f64,
    /// What the same tasks would cost in genius mode, also buffered.
    pub genius_baseline: f64,
    /// Rounded savings versus the genius baseline. 0 in genius mode.
    pub savings_percent: i64,
}

/// Computes pre-run estimates by classifying and routing each task.
pub struct CostEstimator {
    router: TaskRouter,
}

impl CostEstimator {
    /// Creates an estimator over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            router: TaskRouter::new(registry),
        }
    }

    /// Estimates a single task under the given mode.
    #[must_use]
    pub fn estimate_task(
        &self,
        task: &Task,
        config: &RoutingConfig,
        mode_override: Option<Mode>,
    ) -> TaskEstimate {
        let decision = self.router.route_task(task, config, mode_override);
        let tokens = estimate_tokens(task);
        TaskEstimate {
            task_id: task.id.clone(),
            cost: decision.estimated_cost,
            tokens,
            decision,
        }
    }

    /// Estimates a feature: sums incomplete tasks, applies the escalation
    /// buffer, and derives savings against a genius-mode baseline.
    #[must_use]
    pub fn estimate_feature(
        &self,
        tasks: &[Task],
        config: &RoutingConfig,
        mode_override: Option<Mode>,
    ) -> FeatureEstimate {
        let mode = mode_override.unwrap_or(config.default_mode);
        let incomplete: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .collect();

        let estimates: Vec<TaskEstimate> = incomplete
            .iter()
            .map(|t| self.estimate_task(t, config, Some(mode)))
            .collect();
        let subtotal: f64 = estimates.iter().map(|e| e.cost).sum();
        let buffered_total = subtotal * (1.0 + ESCALATION_BUFFER);

        let baseline_subtotal: f64 = incomplete
            .iter()
            .map(|t| self.estimate_task(t, config, Some(Mode::Genius)).cost)
            .sum();
        let genius_baseline = baseline_subtotal * (1.0 + ESCALATION_BUFFER);

        let savings_percent = if mode == Mode::Genius || genius_baseline <= 0.0 {
            0
        } else {
            ((genius_baseline - buffered_total) / genius_baseline * 100.0).round() as i64
        };

        debug!(
            mode = %mode,
            tasks = estimates.len(),
            subtotal,
            buffered_total,
            genius_baseline,
            savings_percent,
            "Estimated feature cost"
        );

        FeatureEstimate {
            mode,
            tasks: estimates,
            subtotal,
            buffered_total,
            genius_baseline,
            savings_percent,
        }
    }
}
