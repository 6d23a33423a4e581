//! Types for the escalation cascade.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the injected executor reports for one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Raw agent output (opaque to this core).
    pub output: String,
    /// Process exit code of the harness invocation.
    pub exit_code: i32,
    /// Whether the agent marked the task complete.
    pub is_complete: bool,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u64,
    /// Whether the harness reported a rate limit.
    #[serde(default)]
    pub rate_limited: bool,
    /// When the rate limit resets, if the harness said.
    #[serde(default)]
    pub reset_at: Option<DateTime<Utc>>,
}

/// The injected task executor.
///
/// The orchestration layer implements this to actually spawn harness
/// processes. Each escalation step passes a full (harness, model) pair, so
/// cross-harness escalation needs nothing special from implementors. Once
/// invoked, an attempt runs to completion; callers needing timeouts enforce
/// them inside this executor.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Runs one attempt of a task on the given harness and model.
    ///
    /// # Errors
    /// Any error is recorded by the cascade as a failed attempt; it is
    /// never propagated further.
    async fn execute(
        &self,
        harness: &str,
        model: &str,
        prompt: &str,
    ) -> anyhow::Result<ExecutionOutcome>;
}

/// How one attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    /// Exit code 0 and the agent marked the task complete.
    Success,
    /// Anything else that is not a rate limit.
    Failure,
    /// The harness reported a rate limit.
    RateLimited,
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptResult::Success => write!(f, "success"),
            AttemptResult::Failure => write!(f, "failure"),
            AttemptResult::RateLimited => write!(f, "rate_limited"),
        }
    }
}

/// One attempt within a cascade. Append-only within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationStep {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Harness used for this attempt.
    pub harness: String,
    /// Model used for this attempt.
    pub model: String,
    /// How the attempt ended.
    pub result: AttemptResult,
    /// Error message for failed attempts.
    pub error: Option<String>,
    /// Projected cost of this attempt in USD (charged even on failure).
    pub cost: f64,
    /// Token estimate the cost was based on.
    pub tokens: u64,
    /// Attempt duration, when the executor reported one.
    pub duration_ms: Option<u64>,
}

/// Terminal result of one task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationResult {
    /// Whether any attempt succeeded.
    pub success: bool,
    /// Harness of the last attempt.
    pub final_harness: String,
    /// Model of the last attempt.
    pub final_model: String,
    /// Number of attempts made.
    pub attempts: u32,
    /// Every attempt, in order.
    pub steps: Vec<EscalationStep>,
    /// Total cost across all attempts, failed ones included.
    pub actual_cost: f64,
    /// Whether the cascade stopped without success and without a next step.
    pub blocked: bool,
    /// Why the cascade blocked, when it did.
    pub block_reason: Option<String>,
}

impl EscalationResult {
    /// Whether this run went past its first attempt.
    #[must_use]
    pub fn escalated(&self) -> bool {
        self.attempts > 1
    }
}
