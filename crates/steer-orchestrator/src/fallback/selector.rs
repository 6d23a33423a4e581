//! Harness fallback selection under cooldown, installation and API-key
//! constraints.

use super::store::AvailabilityStore;
use crate::config::RoutingConfig;
use crate::routing::matrix::matrix_rule;
use crate::routing::types::{Complexity, Mode};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use steer_models::{ModelRegistry, ModelTier};
use tracing::{debug, warn};

/// Default cooldown applied when a harness reports a rate limit.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(60_000);

/// Options controlling harness selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorOptions {
    /// Restrict candidates to harnesses with a free tier.
    pub free_mode: bool,
    /// Skip the API-key environment check.
    pub skip_api_key_check: bool,
}

/// Why a candidate harness was passed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Name not present in the registry.
    UnknownHarness,
    /// Free mode is set and the harness has no free-tier model.
    NoFreeTier,
    /// Harness is cooling down after a rate limit.
    OnCooldown,
    /// The installed probe reported the CLI as absent.
    NotInstalled,
    /// The named API-key environment variable is unset or empty.
    MissingApiKey(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnknownHarness => write!(f, "unknown harness"),
            RejectionReason::NoFreeTier => write!(f, "no free-tier model"),
            RejectionReason::OnCooldown => write!(f, "on cooldown"),
            RejectionReason::NotInstalled => write!(f, "not installed"),
            RejectionReason::MissingApiKey(var) => write!(f, "missing API key ({var})"),
        }
    }
}

/// One rejected candidate in the selection trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRejection {
    /// Harness that was considered.
    pub harness: String,
    /// Why it was passed over.
    pub reason: RejectionReason,
}

/// Result of walking the fallback order.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessSelection {
    /// First fully-passing harness, if any.
    pub harness: Option<String>,
    /// Why each earlier candidate was rejected.
    pub trail: Vec<CandidateRejection>,
}

impl HarnessSelection {
    /// Whether a harness was found.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.harness.is_some()
    }
}

/// Probe reporting whether a harness CLI is installed.
///
/// Injected by the orchestration layer; this core never spawns processes.
pub type InstallProbe = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Chooses an available harness given cooldown, installation and API-key
/// constraints, and resolves concrete models for already-chosen harnesses.
pub struct HarnessSelector {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn AvailabilityStore>,
    install_probe: InstallProbe,
}

impl HarnessSelector {
    /// Creates a selector over the given registry, shared availability
    /// store and installed probe.
    #[must_use]
    pub fn new(
        registry: Arc<ModelRegistry>,
        store: Arc<dyn AvailabilityStore>,
        install_probe: InstallProbe,
    ) -> Self {
        Self {
            registry,
            store,
            install_probe,
        }
    }

    /// Puts a harness on cooldown after a rate-limit signal.
    pub fn mark_rate_limited(&self, harness: &str, duration: Option<Duration>) {
        let duration = duration.unwrap_or(DEFAULT_COOLDOWN);
        self.store
            .set_cooldown(harness, Instant::now() + duration);
        warn!(
            harness = %harness,
            cooldown_ms = duration.as_millis() as u64,
            "Harness rate limited, starting cooldown"
        );
    }

    /// Whether a harness is currently cooling down.
    ///
    /// Expired entries are cleared on read; there is no background timer.
    #[must_use]
    pub fn is_on_cooldown(&self, harness: &str) -> bool {
        match self.store.cooldown_until(harness) {
            Some(until) if until > Instant::now() => true,
            Some(_) => {
                self.store.clear_cooldown(harness);
                false
            }
            None => false,
        }
    }

    /// Walks the ordered harness list and returns the first candidate that
    /// passes every availability check, with a trail of why earlier
    /// candidates were rejected. When none pass, `harness` is `None` and
    /// the trail covers every candidate.
    #[must_use]
    pub fn available_harness(&self, order: &[String], options: &SelectorOptions) -> HarnessSelection {
        let mut trail = Vec::new();

        for name in order {
            if let Some(reason) = self.rejection_for(name, options) {
                debug!(harness = %name, reason = %reason, "Harness candidate rejected");
                trail.push(CandidateRejection {
                    harness: name.clone(),
                    reason,
                });
                continue;
            }

            debug!(harness = %name, "Harness candidate selected");
            return HarnessSelection {
                harness: Some(name.clone()),
                trail,
            };
        }

        warn!(
            candidates = order.len(),
            "No harness available after walking the fallback order"
        );
        HarnessSelection {
            harness: None,
            trail,
        }
    }

    fn rejection_for(&self, name: &str, options: &SelectorOptions) -> Option<RejectionReason> {
        let Some(profile) = self.registry.harness(name) else {
            return Some(RejectionReason::UnknownHarness);
        };

        if options.free_mode && !profile.has_free_tier {
            return Some(RejectionReason::NoFreeTier);
        }

        if self.is_on_cooldown(name) {
            return Some(RejectionReason::OnCooldown);
        }

        let installed = self.store.installed(name).unwrap_or_else(|| {
            let probed = (self.install_probe)(name);
            self.store.set_installed(name, probed);
            probed
        });
        if !installed {
            return Some(RejectionReason::NotInstalled);
        }

        if !options.skip_api_key_check && !profile.has_free_tier {
            if let Some(var) = &profile.api_key_env {
                let present = std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false);
                if !present {
                    return Some(RejectionReason::MissingApiKey(var.clone()));
                }
            }
        }

        None
    }

    /// Resolves the concrete model for an already-chosen harness.
    ///
    /// Preference order: a config override whose harness matches, the
    /// matrix's model when it already targets this harness, the harness's
    /// best model under the mode's tier policy, else its first model.
    #[must_use]
    pub fn model_for_harness_and_mode(
        &self,
        harness: &str,
        mode: Mode,
        complexity: Complexity,
        config: Option<&RoutingConfig>,
    ) -> Option<String> {
        let profile = self.registry.harness(harness)?;

        if let Some(config) = config {
            if let Some(override_id) = config.model_overrides.get(&complexity) {
                if let Some(model) = self.registry.model(override_id) {
                    if model.harness == harness {
                        return Some(model.id.clone());
                    }
                }
            }
        }

        let rule = matrix_rule(mode, complexity);
        if rule.harness == harness {
            return Some(rule.model.to_string());
        }

        let models = self.registry.models_for_harness(harness);
        let by_tier = |tier: ModelTier| models.iter().find(|m| m.tier == tier);
        let policy_pick = match mode {
            Mode::Free => by_tier(ModelTier::Free),
            Mode::Cheap => by_tier(ModelTier::Cheap).or_else(|| by_tier(ModelTier::Standard)),
            Mode::Good | Mode::Genius => {
                by_tier(ModelTier::Sota).or_else(|| by_tier(ModelTier::Premium))
            }
        };
        if let Some(model) = policy_pick {
            return Some(model.id.clone());
        }

        profile.models.first().cloned()
    }
}
