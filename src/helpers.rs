//! Multi-variable differentiation helpers
//!
//! Gradient, Hessian and Jacobian for both the `Expr`-based and the
//! string-based API, plus partial evaluation of formula strings.

use crate::config::SimplifyConfig;
use crate::core::error::{DiffError, ParseError};
use crate::{Diff, Expr, Symbol, parser, simplification};

fn gradient_internal(diff: &Diff, expr: &Expr, vars: &[&Symbol]) -> Result<Vec<Expr>, DiffError> {
    vars.iter().map(|var| diff.differentiate(expr, var)).collect()
}

fn parse_vars(vars: &[&str]) -> Vec<Symbol> {
    vars.iter().map(|v| Symbol::new(v)).collect()
}

/// Partial derivatives `[∂f/∂x₁, ∂f/∂x₂, ...]`
///
/// # Example
/// ```
/// use symb_kernel::{Symbol, gradient, parse};
///
/// let x = Symbol::new("x");
/// let y = Symbol::new("y");
/// let grad = gradient(&parse("x^2 + y^2").unwrap(), &[&x, &y]).unwrap();
/// assert_eq!(grad[0], parse("2*x").unwrap());
/// assert_eq!(grad[1], parse("2*y").unwrap());
/// ```
pub fn gradient(expr: &Expr, vars: &[&Symbol]) -> Result<Vec<Expr>, DiffError> {
    gradient_internal(&Diff::new(), expr, vars)
}

/// Second partial derivatives `H[i][j] = ∂²f/∂xᵢ∂xⱼ`
pub fn hessian(expr: &Expr, vars: &[&Symbol]) -> Result<Vec<Vec<Expr>>, DiffError> {
    let diff = Diff::new();
    gradient_internal(&diff, expr, vars)?
        .iter()
        .map(|partial| gradient_internal(&diff, partial, vars))
        .collect()
}

/// `J[i][j] = ∂fᵢ/∂xⱼ`
pub fn jacobian(exprs: &[Expr], vars: &[&Symbol]) -> Result<Vec<Vec<Expr>>, DiffError> {
    let diff = Diff::new();
    exprs
        .iter()
        .map(|expr| gradient_internal(&diff, expr, vars))
        .collect()
}

/// Gradient of a formula string
pub fn gradient_str(formula: &str, vars: &[&str]) -> Result<Vec<Expr>, DiffError> {
    let expr = parser::parse(formula)?;
    let vars = parse_vars(vars);
    let refs: Vec<&Symbol> = vars.iter().collect();
    gradient(&expr, &refs)
}

/// Hessian of a formula string
pub fn hessian_str(formula: &str, vars: &[&str]) -> Result<Vec<Vec<Expr>>, DiffError> {
    let expr = parser::parse(formula)?;
    let vars = parse_vars(vars);
    let refs: Vec<&Symbol> = vars.iter().collect();
    hessian(&expr, &refs)
}

/// Jacobian of formula strings
pub fn jacobian_str(formulas: &[&str], vars: &[&str]) -> Result<Vec<Vec<Expr>>, DiffError> {
    let exprs = formulas
        .iter()
        .map(|f| parser::parse(f))
        .collect::<Result<Vec<_>, _>>()?;
    let vars = parse_vars(vars);
    let refs: Vec<&Symbol> = vars.iter().collect();
    jacobian(&exprs, &refs)
}

/// Substitute the given values and simplify.
///
/// Variables without a value stay symbolic, so the result may still contain symbols.
///
/// # Example
/// ```
/// use symb_kernel::{Expr, evaluate_str, parse};
///
/// assert_eq!(evaluate_str("x*y + 1", &[("x", 3.0)]).unwrap(), parse("3*y + 1").unwrap());
/// assert_eq!(evaluate_str("x*y + 1", &[("x", 3.0), ("y", 2.0)]).unwrap(), Expr::number(7.0));
/// ```
pub fn evaluate_str(formula: &str, vars: &[(&str, f64)]) -> Result<Expr, ParseError> {
    let mut expr = parser::parse(formula)?;
    for (name, value) in vars {
        expr = expr.substitute(&Symbol::new(name), &Expr::number(*value));
    }
    Ok(simplification::simplify_with(&expr, &SimplifyConfig::from_env()))
}
