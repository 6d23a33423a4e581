//! Task router: classify, consult the matrix, apply bounded overrides, and
//! project token/cost figures.

use super::matrix::matrix_rule;
use super::types::{Mode, RoutingDecision};
use crate::classify::Classifier;
use crate::config::RoutingConfig;
use crate::task::Task;
use std::sync::Arc;
use steer_models::ModelRegistry;
use tracing::{debug, info, warn};

/// Average characters per token across the task text.
const CHARS_PER_TOKEN: f64 = 4.0;

/// Multiplier accounting for expected response volume.
const RESPONSE_MULTIPLIER: f64 = 1.5;

/// Estimates the token volume a task will consume.
///
/// Monotonic in the total input text length.
#[must_use]
pub fn estimate_tokens(task: &Task) -> u64 {
    ((task.text_len() as f64 / CHARS_PER_TOKEN) * RESPONSE_MULTIPLIER).ceil() as u64
}

/// Projects the USD cost of running `tokens` through a model.
///
/// Free-tier and unknown model ids cost 0.
#[must_use]
pub fn estimate_cost(registry: &ModelRegistry, model_id: &str, tokens: u64) -> f64 {
    let Some(model) = registry.model(model_id) else {
        return 0.0;
    };
    if model.is_free() {
        return 0.0;
    }
    let input = tokens as f64;
    let output = (tokens as f64 * RESPONSE_MULTIPLIER).ceil();
    (input * model.input_cost_per_million + output * model.output_cost_per_million) / 1e6
}

/// Routes tasks to a (harness, model) pair via the fixed matrix.
pub struct TaskRouter {
    registry: Arc<ModelRegistry>,
    classifier: Classifier,
}

impl TaskRouter {
    /// Creates a router over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            classifier: Classifier::new(),
        }
    }

    /// Routes one task. Never fails; uncertain inputs degrade to a
    /// low-confidence decision.
    ///
    /// A configured per-complexity override is applied only when its model
    /// belongs to the matrix-selected harness, and never when it would
    /// defeat the free-mode cost guarantee. Ignored overrides are logged
    /// and named in the decision reasoning.
    #[must_use]
    pub fn route_task(
        &self,
        task: &Task,
        config: &RoutingConfig,
        mode_override: Option<Mode>,
    ) -> RoutingDecision {
        let mode = mode_override.unwrap_or(config.default_mode);
        let classification = self.classifier.classify(task);

        let rule = matrix_rule(mode, classification.complexity);
        let harness = rule.harness.to_string();
        let mut model = rule.model.to_string();
        let mut override_note = String::new();

        if let Some(override_id) = config.model_overrides.get(&classification.complexity) {
            match self.registry.model(override_id) {
                Some(profile) if profile.harness != harness => {
                    warn!(
                        task_id = %task.id,
                        override_model = %override_id,
                        override_harness = %profile.harness,
                        selected_harness = %harness,
                        "Ignoring model override: harness does not match matrix selection"
                    );
                    override_note = format!(
                        "; override '{override_id}' ignored (belongs to {}, not {harness})",
                        profile.harness
                    );
                }
                Some(profile) if mode == Mode::Free && !profile.is_free() => {
                    warn!(
                        task_id = %task.id,
                        override_model = %override_id,
                        "Ignoring model override: free mode requires a free-tier model"
                    );
                    override_note =
                        format!("; override '{override_id}' ignored (not free-tier)");
                }
                Some(profile) => {
                    model = profile.id.clone();
                    override_note = format!("; override '{override_id}' applied");
                }
                None => {
                    // Normally caught at config load; kept non-fatal here.
                    warn!(
                        task_id = %task.id,
                        override_model = %override_id,
                        "Ignoring model override: unknown model id"
                    );
                    override_note = format!("; override '{override_id}' ignored (unknown model)");
                }
            }
        }

        let tokens = estimate_tokens(task);
        let estimated_cost = estimate_cost(&self.registry, &model, tokens);

        let reasoning = format!(
            "classified {} ({:.0}% confidence); mode {mode} selects {harness}/{model}; \
             ~{tokens} tokens, estimated ${estimated_cost:.4}{override_note}",
            classification.complexity,
            classification.confidence * 100.0,
        );

        debug!(
            task_id = %task.id,
            complexity = %classification.complexity,
            confidence = classification.confidence,
            mode = %mode,
            harness = %harness,
            model = %model,
            tokens,
            estimated_cost,
            "Routing decision made"
        );
        info!(
            task_id = %task.id,
            harness = %harness,
            model = %model,
            "Routed task to {harness}/{model} under {mode} mode"
        );

        RoutingDecision {
            harness,
            model,
            complexity: classification.complexity,
            mode,
            estimated_cost,
            reasoning,
        }
    }

    /// The registry this router resolves against.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}
