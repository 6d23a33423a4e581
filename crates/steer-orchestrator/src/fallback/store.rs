//! Injected availability state: harness cooldowns and installation cache.
//!
//! The store is owned by the caller and shared between the selector and the
//! cascade executor. Both maps are read-mostly and advisory; a stale read
//! costs at most one doomed attempt, so last-writer-wins semantics over an
//! RwLock are sufficient.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

/// Shared availability state for harnesses.
pub trait AvailabilityStore: Send + Sync {
    /// When the harness's cooldown expires, if one is set.
    fn cooldown_until(&self, harness: &str) -> Option<Instant>;

    /// Puts the harness on cooldown until the given instant.
    fn set_cooldown(&self, harness: &str, until: Instant);

    /// Removes a harness's cooldown entry.
    fn clear_cooldown(&self, harness: &str);

    /// Cached result of the installed probe, if the harness was probed.
    fn installed(&self, harness: &str) -> Option<bool>;

    /// Caches an installed-probe result.
    fn set_installed(&self, harness: &str, installed: bool);

    /// Clears all cooldowns and cached probe results.
    fn clear(&self);
}

/// Default in-process store backed by RwLock maps.
#[derive(Debug, Default)]
pub struct InMemoryAvailabilityStore {
    cooldowns: RwLock<HashMap<String, Instant>>,
    installed: RwLock<HashMap<String, bool>>,
}

impl InMemoryAvailabilityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AvailabilityStore for InMemoryAvailabilityStore {
    fn cooldown_until(&self, harness: &str) -> Option<Instant> {
        self.cooldowns.read().unwrap().get(harness).copied()
    }

    fn set_cooldown(&self, harness: &str, until: Instant) {
        self.cooldowns
            .write()
            .unwrap()
            .insert(harness.to_string(), until);
    }

    fn clear_cooldown(&self, harness: &str) {
        self.cooldowns.write().unwrap().remove(harness);
    }

    fn installed(&self, harness: &str) -> Option<bool> {
        self.installed.read().unwrap().get(harness).copied()
    }

    fn set_installed(&self, harness: &str, installed: bool) {
        self.installed
            .write()
            .unwrap()
            .insert(harness.to_string(), installed);
    }

    fn clear(&self) {
        self.cooldowns.write().unwrap().clear();
        self.installed.write().unwrap().clear();
    }
}
