//! Symbolic differentiation
//!
//! [`Differentiator`] walks the tree once per call; the public entry points in
//! [`crate::builder`] validate input limits and simplify the result.

mod engine;

pub(crate) use engine::Differentiator;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::error::DiffError;
use crate::{Expr, Symbol};

/// `d(expr)/d(var)` with no fixed variables, no custom functions and no simplification
pub(crate) fn derive_raw(expr: &Expr, var: &Symbol) -> Result<Expr, DiffError> {
    let fixed = FxHashSet::default();
    let custom = FxHashMap::default();
    Differentiator::new(var, &fixed, &custom).derive(expr)
}
