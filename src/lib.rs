//! Symbolic differentiation and simplification kernel
//!
//! Parses infix formulas into shared, canonical expression trees, differentiates
//! them, simplifies them to a fixpoint and evaluates them numerically, including
//! special functions (gamma family, Bessel, zeta and its derivatives).
//!
//! # Features
//! - Immutable `Arc`-shared expression nodes with cached structural hashes
//! - Rule-based simplification with a domain-safe mode and fixed symbols
//! - Compiled stack-machine evaluation with domain and overflow checks
//! - Builder API for differentiation and simplification settings
//! - First-order uncertainty propagation with optional covariances
//! - Parallel batch evaluation (`parallel` feature, on by default)
//!
//! # Usage Examples
//!
//! ## String API
//! ```
//! use symb_kernel::{diff, parse, simplify};
//!
//! assert_eq!(diff("x^3 + 2*x^2 + x + 1", "x", None).unwrap(), parse("3*x^2 + 4*x + 1").unwrap());
//! assert_eq!(simplify("sin(x)^2 + cos(x)^2").unwrap().to_string(), "1");
//! ```
//!
//! ## Typed API
//! ```
//! use symb_kernel::{Diff, Symbol};
//!
//! let x = Symbol::new("x");
//! let expr = x.clone().pow_of(2.0) + x.clone().sin();
//! let derivative = Diff::new().differentiate(&expr, &x).unwrap();
//! assert_eq!(derivative.to_string(), "2*x + cos(x)");
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

mod builder;
mod config;
mod core;
mod diff;
mod evaluator;
mod functions;
mod helpers;
pub(crate) mod math;
mod parser;
mod simplification;
pub mod traits;
mod uncertainty;
mod view;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(test)]
mod tests;

pub use builder::{
    CustomEvalFn, CustomFn, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Diff, PartialDerivativeFn,
    Simplify, SimplifyInput,
};
pub use config::{DEFAULT_MAX_PASSES, SimplifyConfig};
pub use crate::core::{DiffError, EvaluationError, Expected, Expr, Func, ParseError, Span, Symbol};
pub use evaluator::{CompiledExpr, Evaluator, eval, eval_with};
pub use functions::Builtin;
pub use helpers::{evaluate_str, gradient, gradient_str, hessian, hessian_str, jacobian, jacobian_str};
pub use parser::{MAX_NESTING, parse};
pub use uncertainty::{CovEntry, CovarianceMatrix, relative_uncertainty, uncertainty_propagation};
pub use view::{Kind, View};

/// Main API function for symbolic differentiation
///
/// # Arguments
/// * `formula` - Expression to differentiate (e.g., "a*sin(x)")
/// * `var` - Variable to differentiate with respect to
/// * `fixed_vars` - Symbols held constant (e.g., `Some(&["a"])`)
///
/// The result is simplified. Settings come from [`SimplifyConfig::from_env`]
/// and the input is checked against [`DEFAULT_MAX_DEPTH`] and [`DEFAULT_MAX_NODES`].
///
/// # Example
/// ```
/// use symb_kernel::{diff, parse};
///
/// let d = diff("a*sin(x)", "x", Some(&["a"])).unwrap();
/// assert_eq!(d, parse("a*cos(x)").unwrap());
/// ```
///
/// # Note
/// For more control (custom functions, higher orders, limits), use the [`Diff`] builder.
pub fn diff(formula: &str, var: &str, fixed_vars: Option<&[&str]>) -> Result<Expr, DiffError> {
    let mut builder = Diff::with_config(SimplifyConfig::from_env());
    if let Some(vars) = fixed_vars {
        for v in vars {
            builder = builder.fixed_var(&Symbol::new(v));
        }
    }
    builder
        .max_depth(DEFAULT_MAX_DEPTH)
        .max_nodes(DEFAULT_MAX_NODES)
        .diff_str(formula, var)
}

/// Simplify a formula or an expression
///
/// Accepts `&str`, `String`, `Expr` or `&Expr`. Only parsing can fail; the
/// simplifier itself always returns a result. Settings come from
/// [`SimplifyConfig::from_env`].
///
/// # Example
/// ```
/// use symb_kernel::{parse, simplify};
///
/// assert_eq!(simplify("2*x + 3*x + x").unwrap(), parse("6*x").unwrap());
/// let e = parse("x^2*x^3").unwrap();
/// assert_eq!(simplify(&e).unwrap(), parse("x^5").unwrap());
/// ```
pub fn simplify(input: impl SimplifyInput) -> Result<Expr, ParseError> {
    let expr = input.into_expr()?;
    Ok(Simplify::with_config(SimplifyConfig::from_env()).simplify(&expr))
}
