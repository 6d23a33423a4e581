//! Types for the mode/complexity routing system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost/quality policy selecting how aggressively to prefer cheap models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Zero-cost models only.
    Free,
    /// Cheapest adequate paid models.
    Cheap,
    /// Balanced quality/cost.
    Good,
    /// The single most capable model, regardless of complexity.
    Genius,
}

impl Mode {
    /// All modes, for matrix iteration.
    pub const ALL: [Mode; 4] = [Mode::Free, Mode::Cheap, Mode::Good, Mode::Genius];

    /// Converts a string to a Mode.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Mode::Free),
            "cheap" => Some(Mode::Cheap),
            "good" => Some(Mode::Good),
            "genius" => Some(Mode::Genius),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Free => write!(f, "free"),
            Mode::Cheap => write!(f, "cheap"),
            Mode::Good => write!(f, "good"),
            Mode::Genius => write!(f, "genius"),
        }
    }
}

/// Classified difficulty tier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Typos, docs, renames.
    Simple,
    /// Routine feature work.
    Medium,
    /// Security, integrations, stateful logic.
    Complex,
    /// Performance, concurrency, architecture.
    Expert,
}

impl Complexity {
    /// All complexity levels, simplest first.
    pub const ALL: [Complexity; 4] = [
        Complexity::Simple,
        Complexity::Medium,
        Complexity::Complex,
        Complexity::Expert,
    ];

    /// Converts a string to a Complexity.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Some(Complexity::Simple),
            "medium" => Some(Complexity::Medium),
            "complex" => Some(Complexity::Complex),
            "expert" => Some(Complexity::Expert),
            _ => None,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::Complex => write!(f, "complex"),
            Complexity::Expert => write!(f, "expert"),
        }
    }
}

/// The routing outcome for a single task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Selected harness name.
    pub harness: String,
    /// Selected model id.
    pub model: String,
    /// Classified complexity the decision was based on.
    pub complexity: Complexity,
    /// Mode the decision was made under.
    pub mode: Mode,
    /// Projected cost in USD for this task.
    pub estimated_cost: f64,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str_roundtrip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_str(&mode.to_string()), Some(mode));
        }
        assert_eq!(Mode::from_str("turbo"), None);
    }

    #[test]
    fn test_complexity_from_str_roundtrip() {
        for complexity in Complexity::ALL {
            assert_eq!(Complexity::from_str(&complexity.to_string()), Some(complexity));
        }
        assert_eq!(Complexity::from_str("impossible"), None);
    }
}
