//! The escalation cascade state machine.
//!
//! One cascade executes one task's attempts strictly sequentially: each
//! attempt's outcome decides whether to stop, block, or advance along the
//! configured escalation path. Failures are data; nothing the injected
//! executor does can make the cascade itself fail.

use super::types::{
    AttemptResult, EscalationResult, EscalationStep, ExecutionOutcome, TaskExecutor,
};
use crate::config::EscalationConfig;
use crate::fallback::selector::DEFAULT_COOLDOWN;
use crate::fallback::store::{AvailabilityStore, InMemoryAvailabilityStore};
use crate::routing::router::{estimate_cost, estimate_tokens};
use crate::task::Task;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use steer_models::ModelRegistry;
use tracing::{info, warn};

/// Runs task cascades against an injected executor.
pub struct CascadeExecutor {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn AvailabilityStore>,
}

impl CascadeExecutor {
    /// Creates a cascade executor with a private availability store.
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self::with_store(registry, Arc::new(InMemoryAvailabilityStore::new()))
    }

    /// Creates a cascade executor sharing the caller's availability store,
    /// so rate limits observed here are visible to the fallback selector.
    #[must_use]
    pub fn with_store(registry: Arc<ModelRegistry>, store: Arc<dyn AvailabilityStore>) -> Self {
        Self { registry, store }
    }

    /// Executes one task, escalating on failure until success, a block, or
    /// the attempt bound.
    ///
    /// Never fails: configuration problems and exhausted paths surface as a
    /// `blocked` result with a descriptive reason.
    pub async fn run(
        &self,
        task: &Task,
        harness: &str,
        model: &str,
        executor: &dyn TaskExecutor,
        config: &EscalationConfig,
    ) -> EscalationResult {
        let prompt = task.to_prompt();
        let tokens = estimate_tokens(task);

        let mut harness = harness.to_string();
        let mut model = model.to_string();
        let mut steps: Vec<EscalationStep> = Vec::new();
        let mut actual_cost = 0.0;

        if config.max_attempts == 0 {
            warn!(task_id = %task.id, "Cascade blocked before any attempt: max_attempts is 0");
            return Self::blocked(
                harness,
                model,
                steps,
                actual_cost,
                "max attempts must be at least 1".to_string(),
            );
        }

        let mut attempt: u32 = 1;
        loop {
            info!(
                task_id = %task.id,
                attempt,
                harness = %harness,
                model = %model,
                "Starting cascade attempt"
            );

            let cost = estimate_cost(&self.registry, &model, tokens);
            let (result, error, duration_ms) =
                match executor.execute(&harness, &model, &prompt).await {
                    Ok(outcome) => self.classify_outcome(&harness, &outcome),
                    Err(e) => (AttemptResult::Failure, Some(e.to_string()), None),
                };

            actual_cost += cost;
            steps.push(EscalationStep {
                attempt,
                harness: harness.clone(),
                model: model.clone(),
                result,
                error: error.clone(),
                cost,
                tokens,
                duration_ms,
            });

            if result == AttemptResult::Success {
                info!(
                    task_id = %task.id,
                    attempts = attempt,
                    actual_cost,
                    "Cascade succeeded"
                );
                return EscalationResult {
                    success: true,
                    final_harness: harness,
                    final_model: model,
                    attempts: attempt,
                    steps,
                    actual_cost,
                    blocked: false,
                    block_reason: None,
                };
            }

            warn!(
                task_id = %task.id,
                attempt,
                result = %result,
                error = error.as_deref().unwrap_or(""),
                "Cascade attempt did not succeed"
            );

            if !config.enabled {
                return Self::blocked(
                    harness,
                    model,
                    steps,
                    actual_cost,
                    "escalation disabled; task failed on its only attempt".to_string(),
                );
            }

            if attempt >= config.max_attempts {
                return Self::blocked(
                    harness,
                    model,
                    steps,
                    actual_cost,
                    format!("max attempts ({}) reached without success", config.max_attempts),
                );
            }

            if config.escalation_path.is_empty() {
                return Self::blocked(
                    harness,
                    model,
                    steps,
                    actual_cost,
                    "no escalation path configured".to_string(),
                );
            }

            let Some(next_model) = config.escalation_path.get(&model) else {
                return Self::blocked(
                    harness.clone(),
                    model.clone(),
                    steps,
                    actual_cost,
                    format!("no next model configured for '{model}' in the escalation path"),
                );
            };

            let Some(next_harness) = self.registry.harness_for_model(next_model) else {
                // Normally caught at config load; kept terminal here.
                return Self::blocked(
                    harness.clone(),
                    model.clone(),
                    steps,
                    actual_cost,
                    format!("escalation target '{next_model}' is not in the registry"),
                );
            };

            if next_harness.name != harness {
                info!(
                    task_id = %task.id,
                    from_harness = %harness,
                    to_harness = %next_harness.name,
                    to_model = %next_model,
                    "Escalation crosses harness boundary"
                );
            }

            harness = next_harness.name.clone();
            model = next_model.clone();
            attempt += 1;
        }
    }

    /// Classifies an executor outcome and applies rate-limit side effects.
    fn classify_outcome(
        &self,
        harness: &str,
        outcome: &ExecutionOutcome,
    ) -> (AttemptResult, Option<String>, Option<u64>) {
        if outcome.exit_code == 0 && outcome.is_complete {
            return (AttemptResult::Success, None, Some(outcome.duration_ms));
        }

        if outcome.rate_limited {
            let cooldown = outcome
                .reset_at
                .and_then(|reset| (reset - Utc::now()).to_std().ok())
                .unwrap_or(DEFAULT_COOLDOWN);
            self.store.set_cooldown(harness, Instant::now() + cooldown);
            warn!(
                harness = %harness,
                cooldown_ms = cooldown.as_millis() as u64,
                "Harness rate limited during cascade, starting cooldown"
            );
            return (AttemptResult::RateLimited, None, Some(outcome.duration_ms));
        }

        let error = if outcome.exit_code != 0 {
            format!("executor exited with code {}", outcome.exit_code)
        } else {
            "executor exited cleanly but did not complete the task".to_string()
        };
        (AttemptResult::Failure, Some(error), Some(outcome.duration_ms))
    }

    fn blocked(
        final_harness: String,
        final_model: String,
        steps: Vec<EscalationStep>,
        actual_cost: f64,
        reason: String,
    ) -> EscalationResult {
        let attempts = steps.len() as u32;
        EscalationResult {
            success: false,
            final_harness,
            final_model,
            attempts,
            steps,
            actual_cost,
            blocked: true,
            block_reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Executor that replays a fixed script of outcomes.
    struct ScriptedExecutor {
        script: Mutex<VecDeque<anyhow::Result<ExecutionOutcome>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedExecutor {
        fn new(script: Vec<anyhow::Result<ExecutionOutcome>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl TaskExecutor for ScriptedExecutor {
        async fn execute(
            &self,
            harness: &str,
            model: &str,
            _prompt: &str,
        ) -> anyhow::Result<ExecutionOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((harness.to_string(), model.to_string()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(failure()))
        }
    }

    fn success() -> ExecutionOutcome {
        ExecutionOutcome {
            output: "done".to_string(),
            exit_code: 0,
            is_complete: true,
            duration_ms: 1200,
            rate_limited: false,
            reset_at: None,
        }
    }

    fn failure() -> ExecutionOutcome {
        ExecutionOutcome {
            output: "".to_string(),
            exit_code: 1,
            is_complete: false,
            duration_ms: 800,
            rate_limited: false,
            reset_at: None,
        }
    }

    fn rate_limited() -> ExecutionOutcome {
        ExecutionOutcome {
            output: "".to_string(),
            exit_code: 1,
            is_complete: false,
            duration_ms: 50,
            rate_limited: true,
            reset_at: None,
        }
    }

    fn task() -> Task {
        Task::new("t1", "Add endpoint", "Add a small handler with validation.")
    }

    fn path(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
            .collect()
    }

    fn cascade() -> CascadeExecutor {
        CascadeExecutor::new(Arc::new(ModelRegistry::built_in()))
    }

    #[tokio::test]
    async fn test_first_attempt_success_records_single_step() {
        let executor = ScriptedExecutor::new(vec![Ok(success())]);
        let config = EscalationConfig::default();

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.success);
        assert!(!result.blocked);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].result, AttemptResult::Success);
        assert_eq!(result.final_model, "grok-code-fast-1");
    }

    #[tokio::test]
    async fn test_escalation_walks_path_in_order() {
        // grok (opencode) -> haiku (claude-code) -> sonnet (claude-code)
        let executor = ScriptedExecutor::new(vec![Ok(failure()), Ok(failure()), Ok(success())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 5,
            escalation_path: path(&[
                ("grok-code-fast-1", "claude-haiku-4-5"),
                ("claude-haiku-4-5", "claude-sonnet-4-5"),
            ]),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.success);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.final_model, "claude-sonnet-4-5");
        assert_eq!(result.final_harness, "claude-code");
        let models: Vec<&str> = result.steps.iter().map(|s| s.model.as_str()).collect();
        assert_eq!(
            models,
            vec!["grok-code-fast-1", "claude-haiku-4-5", "claude-sonnet-4-5"]
        );
        // Cross-harness escalation hands the executor the new harness too.
        assert_eq!(
            executor.calls(),
            vec![
                ("opencode".to_string(), "grok-code-fast-1".to_string()),
                ("claude-code".to_string(), "claude-haiku-4-5".to_string()),
                ("claude-code".to_string(), "claude-sonnet-4-5".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_always_failing_executor_blocks_at_max_attempts() {
        let executor = ScriptedExecutor::new(vec![Ok(failure()), Ok(failure()), Ok(failure())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 3,
            escalation_path: path(&[
                ("grok-code-fast-1", "claude-haiku-4-5"),
                ("claude-haiku-4-5", "claude-sonnet-4-5"),
                ("claude-sonnet-4-5", "claude-opus-4-1"),
            ]),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(!result.success);
        assert!(result.blocked);
        assert_eq!(result.attempts, 3);
        assert!(result.block_reason.unwrap().contains("max attempts"));
    }

    #[tokio::test]
    async fn test_empty_path_blocks_on_first_failure() {
        let executor = ScriptedExecutor::new(vec![Ok(failure())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 3,
            escalation_path: HashMap::new(),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.blocked);
        assert_eq!(result.attempts, 1);
        assert!(result.block_reason.unwrap().contains("no escalation path"));
    }

    #[tokio::test]
    async fn test_missing_next_model_is_distinguished_from_empty_path() {
        let executor = ScriptedExecutor::new(vec![Ok(failure())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 3,
            escalation_path: path(&[("claude-haiku-4-5", "claude-sonnet-4-5")]),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.blocked);
        let reason = result.block_reason.unwrap();
        assert!(reason.contains("no next model"));
        assert!(reason.contains("grok-code-fast-1"));
    }

    #[tokio::test]
    async fn test_escalation_disabled_stops_after_one_attempt() {
        let executor = ScriptedExecutor::new(vec![Ok(failure()), Ok(success())]);
        let config = EscalationConfig {
            enabled: false,
            max_attempts: 3,
            escalation_path: path(&[("grok-code-fast-1", "claude-haiku-4-5")]),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(!result.success);
        assert!(result.blocked);
        assert_eq!(result.attempts, 1);
        assert!(result.block_reason.unwrap().contains("escalation disabled"));
    }

    #[tokio::test]
    async fn test_max_attempts_one_blocks_on_first_failure() {
        let executor = ScriptedExecutor::new(vec![Ok(failure())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 1,
            escalation_path: path(&[("grok-code-fast-1", "claude-haiku-4-5")]),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.blocked);
        assert_eq!(result.attempts, 1);
        assert!(result.block_reason.unwrap().contains("max attempts"));
    }

    #[tokio::test]
    async fn test_executor_error_becomes_failure_step() {
        let executor =
            ScriptedExecutor::new(vec![Err(anyhow::anyhow!("spawn failed: ENOENT")), Ok(success())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 3,
            escalation_path: path(&[("claude-haiku-4-5", "claude-sonnet-4-5")]),
        };

        let result = cascade()
            .run(&task(), "claude-code", "claude-haiku-4-5", &executor, &config)
            .await;

        assert!(result.success);
        assert_eq!(result.steps[0].result, AttemptResult::Failure);
        assert_eq!(
            result.steps[0].error.as_deref(),
            Some("spawn failed: ENOENT")
        );
    }

    #[tokio::test]
    async fn test_failed_attempt_costs_accumulate() {
        let executor = ScriptedExecutor::new(vec![Ok(failure()), Ok(success())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 3,
            escalation_path: path(&[("claude-haiku-4-5", "claude-sonnet-4-5")]),
        };

        let result = cascade()
            .run(&task(), "claude-code", "claude-haiku-4-5", &executor, &config)
            .await;

        assert!(result.success);
        assert_eq!(result.attempts, 2);
        let step_sum: f64 = result.steps.iter().map(|s| s.cost).sum();
        assert!(result.steps[0].cost > 0.0, "failed attempt still costs");
        assert!((result.actual_cost - step_sum).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_rate_limited_attempt_sets_cooldown_and_escalates() {
        let store = Arc::new(InMemoryAvailabilityStore::new());
        let cascade = CascadeExecutor::with_store(
            Arc::new(ModelRegistry::built_in()),
            Arc::clone(&store) as Arc<dyn AvailabilityStore>,
        );
        let executor = ScriptedExecutor::new(vec![Ok(rate_limited()), Ok(success())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 3,
            escalation_path: path(&[("grok-code-fast-1", "claude-haiku-4-5")]),
        };

        let result = cascade
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.success);
        assert_eq!(result.steps[0].result, AttemptResult::RateLimited);
        assert_eq!(result.final_harness, "claude-code");
        assert!(store.cooldown_until("opencode").is_some());
    }

    #[tokio::test]
    async fn test_zero_max_attempts_blocks_without_running() {
        let executor = ScriptedExecutor::new(vec![Ok(success())]);
        let config = EscalationConfig {
            enabled: true,
            max_attempts: 0,
            escalation_path: HashMap::new(),
        };

        let result = cascade()
            .run(&task(), "opencode", "grok-code-fast-1", &executor, &config)
            .await;

        assert!(result.blocked);
        assert_eq!(result.attempts, 0);
        assert!(executor.calls().is_empty());
        assert!(result.block_reason.unwrap().contains("max attempts"));
    }
}
