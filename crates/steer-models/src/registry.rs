//! Static catalog of models and harnesses with pure lookups.

use crate::profile::{HarnessProfile, ModelProfile, ModelTier, SelectionMethod};

/// Immutable catalog of model and harness profiles.
///
/// All lookups are side-effect-free. "Not found" is expressed as `None` or
/// an empty list; the registry has no other error surface.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelProfile>,
    harnesses: Vec<HarnessProfile>,
}

impl ModelRegistry {
    /// Creates a registry from explicit profiles.
    #[must_use]
    pub fn new(models: Vec<ModelProfile>, harnesses: Vec<HarnessProfile>) -> Self {
        Self { models, harnesses }
    }

    /// The built-in catalog of known harnesses and models.
    #[must_use]
    pub fn built_in() -> Self {
        let models = vec![
            // Anthropic models, driven by claude-code
            ModelProfile::new(
                "claude-opus-4-1",
                "claude-code",
                ModelTier::Sota,
                15.0,
                75.0,
                200_000,
                &["reasoning", "architecture", "coding"],
            ),
            ModelProfile::new(
                "claude-sonnet-4-5",
                "claude-code",
                ModelTier::Premium,
                3.0,
                15.0,
                200_000,
                &["coding", "refactoring", "agentic"],
            ),
            ModelProfile::new(
                "claude-haiku-4-5",
                "claude-code",
                ModelTier::Cheap,
                1.0,
                5.0,
                200_000,
                &["coding", "speed"],
            ),
            // opencode free-tier aggregator
            ModelProfile::new(
                "grok-code-fast-1",
                "opencode",
                ModelTier::Free,
                0.0,
                0.0,
                256_000,
                &["coding", "speed"],
            ),
            ModelProfile::new(
                "kimi-k2",
                "opencode",
                ModelTier::Cheap,
                0.6,
                2.5,
                131_072,
                &["coding"],
            ),
            ModelProfile::new(
                "qwen3-coder",
                "opencode",
                ModelTier::Standard,
                0.9,
                3.6,
                262_144,
                &["coding", "agentic"],
            ),
            // Google models, driven by gemini-cli (flash rides the free quota)
            ModelProfile::new(
                "gemini-2.5-flash",
                "gemini-cli",
                ModelTier::Free,
                0.0,
                0.0,
                1_048_576,
                &["speed", "summaries"],
            ),
            ModelProfile::new(
                "gemini-2.5-pro",
                "gemini-cli",
                ModelTier::Standard,
                1.25,
                10.0,
                1_048_576,
                &["reasoning", "long-context"],
            ),
            // OpenAI models, driven by codex
            ModelProfile::new(
                "gpt-5-codex",
                "codex",
                ModelTier::Premium,
                1.25,
                10.0,
                400_000,
                &["coding", "agentic"],
            ),
            ModelProfile::new(
                "gpt-5-mini",
                "codex",
                ModelTier::Cheap,
                0.25,
                2.0,
                400_000,
                &["coding", "speed"],
            ),
        ];

        let harnesses = vec![
            HarnessProfile::new(
                "claude-code",
                &["claude-opus-4-1", "claude-sonnet-4-5", "claude-haiku-4-5"],
                "claude-sonnet-4-5",
                SelectionMethod::CliFlag,
                Some("ANTHROPIC_API_KEY"),
                false,
            ),
            HarnessProfile::new(
                "opencode",
                &["grok-code-fast-1", "kimi-k2", "qwen3-coder"],
                "grok-code-fast-1",
                SelectionMethod::ConfigFile,
                None,
                true,
            ),
            HarnessProfile::new(
                "gemini-cli",
                &["gemini-2.5-flash", "gemini-2.5-pro"],
                "gemini-2.5-flash",
                SelectionMethod::CliFlag,
                Some("GEMINI_API_KEY"),
                true,
            ),
            HarnessProfile::new(
                "codex",
                &["gpt-5-codex", "gpt-5-mini"],
                "gpt-5-codex",
                SelectionMethod::Subcommand,
                Some("OPENAI_API_KEY"),
                false,
            ),
        ];

        Self::new(models, harnesses)
    }

    /// Looks up a model profile by id.
    #[must_use]
    pub fn model(&self, id: &str) -> Option<&ModelProfile> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Looks up a harness profile by name.
    #[must_use]
    pub fn harness(&self, name: &str) -> Option<&HarnessProfile> {
        self.harnesses.iter().find(|h| h.name == name)
    }

    /// Lists the models a harness can drive, sorted tier-first
    /// (sota, premium, standard, cheap, free).
    #[must_use]
    pub fn models_for_harness(&self, name: &str) -> Vec<&ModelProfile> {
        let mut models: Vec<&ModelProfile> =
            self.models.iter().filter(|m| m.harness == name).collect();
        models.sort_by(|a, b| b.tier.cmp(&a.tier));
        models
    }

    /// Lists all models in a given tier.
    #[must_use]
    pub fn models_by_tier(&self, tier: ModelTier) -> Vec<&ModelProfile> {
        self.models.iter().filter(|m| m.tier == tier).collect()
    }

    /// The default model for a harness.
    #[must_use]
    pub fn default_model(&self, harness: &str) -> Option<&ModelProfile> {
        let profile = self.harness(harness)?;
        self.model(&profile.default_model)
    }

    /// The harness that owns a given model id.
    #[must_use]
    pub fn harness_for_model(&self, model_id: &str) -> Option<&HarnessProfile> {
        let model = self.model(model_id)?;
        self.harness(&model.harness)
    }

    /// All harness profiles.
    #[must_use]
    pub fn harnesses(&self) -> &[HarnessProfile] {
        &self.harnesses
    }

    /// All model profiles.
    #[must_use]
    pub fn models(&self) -> &[ModelProfile] {
        &self.models
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::built_in()
    }
}
