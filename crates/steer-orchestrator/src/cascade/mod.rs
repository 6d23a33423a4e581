//! Escalation cascade: bounded retry-with-escalation for one task.
//!
//! The executor is injected; this module only decides what to try next and
//! records what happened.

pub mod executor;
pub mod types;

pub use executor::CascadeExecutor;
pub use types::{
    AttemptResult, EscalationResult, EscalationStep, ExecutionOutcome, TaskExecutor,
};
