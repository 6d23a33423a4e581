//! Harness availability and fallback selection.
//!
//! Cooldown and installation state live behind the injected
//! [`AvailabilityStore`]; the [`HarnessSelector`] walks a caller-supplied
//! fallback order and explains every rejection it makes along the way.

pub mod selector;
pub mod store;

pub use selector::{
    CandidateRejection, DEFAULT_COOLDOWN, HarnessSelection, HarnessSelector, InstallProbe,
    RejectionReason, SelectorOptions,
};
pub use store::{AvailabilityStore, InMemoryAvailabilityStore};
