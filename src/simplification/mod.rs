//! Simplification framework - reduces expressions to canonical form
//!
//! Simplification is total: there is no error channel. The result is a fixpoint
//! of the pass sequence unless a cycle or the pass ceiling stopped it first.

pub(crate) mod engine;
pub(crate) mod passes;
pub(crate) mod rules;

use crate::Expr;
use crate::config::SimplifyConfig;

/// Simplify with explicit settings
pub(crate) fn simplify_with(expr: &Expr, config: &SimplifyConfig) -> Expr {
    engine::Simplifier::new(config).simplify(expr)
}
