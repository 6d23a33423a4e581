//! Model and harness catalog for Steer.
//!
//! This crate owns the static knowledge about coding-agent harnesses and the
//! models they can drive: identifiers, cost/capability tiers, per-token
//! pricing, and which harness owns which model. Everything here is pure data
//! with side-effect-free lookups; routing and execution policy live in
//! `steer-orchestrator`.
//!
//! # Supported Harnesses
//!
//! - **claude-code**: Anthropic's agent CLI (API key required)
//! - **opencode**: multi-provider agent CLI with a free tier (no key needed
//!   for free models)
//! - **gemini-cli**: Google's agent CLI (free quota, API key for paid use)
//! - **codex**: OpenAI's agent CLI (API key required)

pub mod profile;
pub mod registry;

pub use profile::{HarnessProfile, ModelProfile, ModelTier, SelectionMethod};
pub use registry::ModelRegistry;
