//! Fixed mode-by-complexity routing matrix.
//!
//! The matrix is the policy core: free mode only ever selects zero-cost
//! models, genius mode always selects the single most capable model, and
//! cheap/good interpolate between those poles by complexity. Config
//! overrides are applied on top of the matrix by the router, never inside
//! it.

use super::types::{Complexity, Mode};

/// One cell of the routing matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixRule {
    /// Harness to run.
    pub harness: &'static str,
    /// Model to drive it with.
    pub model: &'static str,
}

const fn rule(harness: &'static str, model: &'static str) -> MatrixRule {
    MatrixRule { harness, model }
}

/// Resolves the matrix cell for a mode/complexity pair.
#[must_use]
pub const fn matrix_rule(mode: Mode, complexity: Complexity) -> MatrixRule {
    match (mode, complexity) {
        // Free mode: zero-cost models only. Flash gets the harder tasks for
        // its larger context.
        (Mode::Free, Complexity::Simple | Complexity::Medium) => {
            rule("opencode", "grok-code-fast-1")
        }
        (Mode::Free, Complexity::Complex | Complexity::Expert) => {
            rule("gemini-cli", "gemini-2.5-flash")
        }

        // Cheap mode: free where it is adequate, paid where it is not.
        (Mode::Cheap, Complexity::Simple) => rule("opencode", "grok-code-fast-1"),
        (Mode::Cheap, Complexity::Medium) => rule("codex", "gpt-5-mini"),
        (Mode::Cheap, Complexity::Complex) => rule("claude-code", "claude-haiku-4-5"),
        (Mode::Cheap, Complexity::Expert) => rule("claude-code", "claude-sonnet-4-5"),

        // Good mode: capable models throughout.
        (Mode::Good, Complexity::Simple) => rule("claude-code", "claude-haiku-4-5"),
        (Mode::Good, Complexity::Medium | Complexity::Complex) => {
            rule("claude-code", "claude-sonnet-4-5")
        }
        (Mode::Good, Complexity::Expert) => rule("claude-code", "claude-opus-4-1"),

        // Genius mode: the most capable model, regardless of complexity.
        (Mode::Genius, _) => rule("claude-code", "claude-opus-4-1"),
    }
}
