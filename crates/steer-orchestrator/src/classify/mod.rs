//! Task complexity classification.
//!
//! Classification is a two-phase design. Phase 1 is the heuristic scorer in
//! [`heuristic`]: fast, I/O-free, always available. Phase 2 is an
//! external-model classifier for low-confidence results; its contract is
//! defined in [`external`] but the implementation is intentionally absent,
//! so the seam stays explicit instead of becoming a silent no-op.

pub mod external;
pub mod heuristic;

use crate::routing::types::Complexity;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use external::ExternalModelClassifier;
pub use heuristic::HeuristicClassifier;

/// Confidence at or above which the heuristic result is accepted as-is.
pub const CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Outcome of classifying one task. Recomputed per routing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Classified difficulty tier.
    pub complexity: Complexity,
    /// Confidence in the classification, always within [0, 1].
    pub confidence: f64,
    /// Human-readable explanation of the signals that drove the result.
    pub reasoning: String,
    /// Whether an external model contributed to this result.
    pub used_external_model: bool,
}

/// A classification strategy.
///
/// `hint` carries the heuristic result when a strategy is consulted as a
/// second phase, so it can refine rather than start over.
pub trait ClassifierStrategy: Send + Sync {
    /// Classifies a task, optionally refining a prior heuristic result.
    fn classify(&self, task: &Task, hint: Option<&ClassificationResult>) -> ClassificationResult;
}

/// Facade over the classification phases.
///
/// Always runs the heuristic. When the heuristic is confident
/// (at or above [`CONFIDENCE_THRESHOLD`]) its result is returned directly. Below the
/// threshold the design calls for the external-model phase; since that phase
/// is unimplemented, the heuristic result is returned with its
/// below-threshold confidence intact so callers can see the uncertainty.
#[derive(Default)]
pub struct Classifier {
    heuristic: HeuristicClassifier,
}

impl Classifier {
    /// Creates a classifier with the default heuristic.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heuristic: HeuristicClassifier::new(),
        }
    }

    /// Classifies a task. Never fails; uncertain input yields a
    /// low-confidence result rather than an error.
    #[must_use]
    pub fn classify(&self, task: &Task) -> ClassificationResult {
        let result = self.heuristic.classify(task, None);
        debug_assert!((0.0..=1.0).contains(&result.confidence));

        if result.confidence >= CONFIDENCE_THRESHOLD {
            debug!(
                task_id = %task.id,
                complexity = %result.complexity,
                confidence = result.confidence,
                "Heuristic classification accepted"
            );
            return result;
        }

        // The external-model phase would run here. Until it exists, return
        // the heuristic result with its low confidence visible to callers.
        warn!(
            task_id = %task.id,
            complexity = %result.complexity,
            confidence = result.confidence,
            "Heuristic confidence below threshold; external-model classification unavailable"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_typo_classifies_simple_with_high_confidence() {
        let classifier = Classifier::new();
        let task = Task::new("t1", "Fix typo in README", "Correct the spelling in the intro.");
        let result = classifier.classify(&task);

        assert_eq!(result.complexity, Complexity::Simple);
        assert!(result.confidence >= 0.8, "confidence {}", result.confidence);
        assert!(!result.used_external_model);
    }

    #[test]
    fn test_vague_task_keeps_confidence_below_threshold() {
        let classifier = Classifier::new();
        let task = Task::new("t2", "Do the thing", "As discussed.");
        let result = classifier.classify(&task);

        assert!(result.confidence < CONFIDENCE_THRESHOLD);
        assert!(!result.used_external_model);
    }

    #[test]
    fn test_confidence_always_in_unit_interval() {
        let classifier = Classifier::new();
        let texts = [
            "",
            "Fix typo in README docs documentation comment rename changelog",
            "Optimize concurrency performance and fix the race condition in the distributed scheduler architecture",
        ];
        for (i, text) in texts.iter().enumerate() {
            let task = Task::new(format!("t{i}"), *text, *text);
            let result = classifier.classify(&task);
            assert!((0.0..=1.0).contains(&result.confidence), "text: {text}");
        }
    }
}
