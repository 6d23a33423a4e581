//! External-model classification phase (contract only).
//!
//! When the heuristic scorer is not confident, the design hands the task and
//! the heuristic result to a small external model for a second opinion. The
//! contract is fixed here; no implementation ships yet. Invoking it fails
//! loudly so a wiring mistake can never masquerade as a real classification.

use super::{ClassificationResult, ClassifierStrategy};
use crate::task::Task;

/// Phase-2 classifier backed by an external model.
///
/// Contract: takes the task plus the heuristic result as a hint and returns
/// a full [`ClassificationResult`] with `used_external_model = true`.
/// Deliberately unimplemented; constructing it is allowed (so wiring can be
/// exercised in tests), calling [`ClassifierStrategy::classify`] is not.
#[derive(Debug, Default)]
pub struct ExternalModelClassifier;

impl ExternalModelClassifier {
    /// Creates the (unimplemented) external-model classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ClassifierStrategy for ExternalModelClassifier {
    fn classify(&self, task: &Task, _hint: Option<&ClassificationResult>) -> ClassificationResult {
        unimplemented!(
            "external-model classification is not implemented; task '{}' must be \
             classified heuristically",
            task.id
        )
    }
}
