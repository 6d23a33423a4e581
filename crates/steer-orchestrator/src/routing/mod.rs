//! Mode-by-complexity routing.
//!
//! The router classifies a task, resolves the fixed routing matrix, applies
//! bounded configuration overrides, and attaches a token/cost projection to
//! the resulting decision.

pub mod matrix;
pub mod router;
pub mod types;

pub use matrix::{MatrixRule, matrix_rule};
pub use router::{TaskRouter, estimate_cost, estimate_tokens};
pub use types::{Complexity, Mode, RoutingDecision};
