//! Model and harness profile types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost/capability tier of a model.
///
/// Ordering is by capability: `Free` is the weakest tier, `Sota` the
/// strongest. This ordering is what tier-first sorting and "best model for
/// mode" policies rely on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Zero-cost models (free quotas, free-tier aggregators).
    Free,
    /// Cheap paid models for routine work.
    Cheap,
    /// Mid-range models.
    Standard,
    /// High-capability paid models.
    Premium,
    /// The most capable model class available.
    Sota,
}

impl ModelTier {
    /// All tiers ordered most-capable first, as used for tier-first sorting.
    pub const BEST_FIRST: [ModelTier; 5] = [
        ModelTier::Sota,
        ModelTier::Premium,
        ModelTier::Standard,
        ModelTier::Cheap,
        ModelTier::Free,
    ];

    /// Converts a string to a ModelTier.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(ModelTier::Free),
            "cheap" => Some(ModelTier::Cheap),
            "standard" => Some(ModelTier::Standard),
            "premium" => Some(ModelTier::Premium),
            "sota" => Some(ModelTier::Sota),
            _ => None,
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Free => write!(f, "free"),
            ModelTier::Cheap => write!(f, "cheap"),
            ModelTier::Standard => write!(f, "standard"),
            ModelTier::Premium => write!(f, "premium"),
            ModelTier::Sota => write!(f, "sota"),
        }
    }
}

/// Static profile of a single model, owned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Model identifier as the harness expects it (e.g. "claude-sonnet-4-5").
    pub id: String,
    /// Name of the harness that drives this model.
    pub harness: String,
    /// Cost/capability tier.
    pub tier: ModelTier,
    /// Cost in USD per million input tokens. Exactly 0 for free tier.
    pub input_cost_per_million: f64,
    /// Cost in USD per million output tokens. Exactly 0 for free tier.
    pub output_cost_per_million: f64,
    /// Context window in tokens.
    pub context_window: u32,
    /// Capability tags (e.g. "coding", "reasoning").
    pub capabilities: Vec<String>,
}

impl ModelProfile {
    /// Creates a new model profile.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        harness: impl Into<String>,
        tier: ModelTier,
        input_cost_per_million: f64,
        output_cost_per_million: f64,
        context_window: u32,
        capabilities: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            harness: harness.into(),
            tier,
            input_cost_per_million,
            output_cost_per_million,
            context_window,
            capabilities: capabilities.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Whether this model costs nothing to run.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.tier == ModelTier::Free
    }
}

/// How a harness is told which model to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Model passed via a CLI flag (e.g. `--model`).
    CliFlag,
    /// Model configured through the harness's config file.
    ConfigFile,
    /// Model chosen via a dedicated subcommand.
    Subcommand,
}

/// Static profile of a coding-agent harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessProfile {
    /// Harness name (the external CLI tool, e.g. "claude-code").
    pub name: String,
    /// Model ids this harness can drive, in the harness's preferred order.
    pub models: Vec<String>,
    /// The model used when no routing decision applies.
    pub default_model: String,
    /// How a model is selected when invoking the harness.
    pub selection_method: SelectionMethod,
    /// Environment variable holding the harness's API key, when one is
    /// required. None when the harness runs without credentials.
    pub api_key_env: Option<String>,
    /// Whether the harness offers at least one zero-cost model.
    pub has_free_tier: bool,
}

impl HarnessProfile {
    /// Creates a new harness profile.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        models: &[&str],
        default_model: impl Into<String>,
        selection_method: SelectionMethod,
        api_key_env: Option<&str>,
        has_free_tier: bool,
    ) -> Self {
        Self {
            name: name.into(),
            models: models.iter().map(|m| (*m).to_string()).collect(),
            default_model: default_model.into(),
            selection_method,
            api_key_env: api_key_env.map(ToString::to_string),
            has_free_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering_matches_capability() {
        assert!(ModelTier::Sota > ModelTier::Premium);
        assert!(ModelTier::Premium > ModelTier::Standard);
        assert!(ModelTier::Standard > ModelTier::Cheap);
        assert!(ModelTier::Cheap > ModelTier::Free);
    }

    #[test]
    fn test_tier_from_str_roundtrip() {
        for tier in ModelTier::BEST_FIRST {
            assert_eq!(ModelTier::from_str(&tier.to_string()), Some(tier));
        }
        assert_eq!(ModelTier::from_str("ultra"), None);
    }

    #[test]
    fn test_free_model_is_free() {
        let profile = ModelProfile::new(
            "grok-code-fast-1",
            "opencode",
            ModelTier::Free,
            0.0,
            0.0,
            256_000,
            &["coding"],
        );
        assert!(profile.is_free());
        assert_eq!(profile.input_cost_per_million, 0.0);
        assert_eq!(profile.output_cost_per_million, 0.0);
    }
}
