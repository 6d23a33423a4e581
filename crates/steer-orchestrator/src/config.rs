//! Routing configuration: default mode, fallback order, overrides and
//! escalation settings, with TOML loading and registry validation.

use crate::routing::types::{Complexity, Mode};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use steer_models::ModelRegistry;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the file.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Escalation settings for the cascade executor.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationConfig {
    /// Whether failed attempts escalate at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Upper bound on attempts within one cascade. 1 means "no escalation,
    /// block on first failure".
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Model id to the next, more capable model id to try on failure.
    #[serde(default)]
    pub escalation_path: HashMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_attempts: default_max_attempts(),
            escalation_path: HashMap::new(),
        }
    }
}

/// Routing configuration consumed by the router, selector and cascade.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Mode used when no per-call override is given.
    #[serde(default = "default_mode")]
    pub default_mode: Mode,

    /// Harness names in fallback preference order.
    #[serde(default = "default_fallback_order")]
    pub harness_fallback_order: Vec<String>,

    /// Per-complexity model overrides, applied only within the guardrails
    /// the router enforces (same harness, free-mode cost guarantee).
    #[serde(default)]
    pub model_overrides: HashMap<Complexity, String>,

    /// Escalation settings.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

fn default_mode() -> Mode {
    Mode::Cheap
}

fn default_fallback_order() -> Vec<String> {
    ["claude-code", "opencode", "gemini-cli", "codex"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            harness_fallback_order: default_fallback_order(),
            model_overrides: HashMap::new(),
            escalation: EscalationConfig::default(),
        }
    }
}

/// Configuration loader for routing settings.
pub struct RoutingConfigLoader;

impl RoutingConfigLoader {
    /// Loads routing configuration from a TOML file and validates every
    /// referenced model and harness against the registry.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it
    /// references unknown model ids or harnesses.
    pub fn load(path: &Path, registry: &ModelRegistry) -> Result<RoutingConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: RoutingConfig = toml::from_str(&content)?;

        Self::validate(&config, registry)?;

        Ok(config)
    }

    /// Validates a configuration against the registry.
    ///
    /// Unknown model ids are rejected here, at load time, instead of
    /// failing silently during routing. Structural escalation problems
    /// (empty path, zero attempts) are not errors; the cascade reports
    /// them as blocked results.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` naming the first offending entry.
    pub fn validate(config: &RoutingConfig, registry: &ModelRegistry) -> Result<()> {
        for harness in &config.harness_fallback_order {
            if registry.harness(harness).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Unknown harness '{harness}' in harness_fallback_order"
                )));
            }
        }

        for (complexity, model_id) in &config.model_overrides {
            if registry.model(model_id).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Unknown model '{model_id}' in model_overrides for complexity '{complexity}'"
                )));
            }
        }

        for (from, to) in &config.escalation.escalation_path {
            if registry.model(from).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Unknown model '{from}' as escalation_path source"
                )));
            }
            if registry.model(to).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Unknown model '{to}' as escalation_path target for '{from}'"
                )));
            }
        }

        Ok(())
    }
}
