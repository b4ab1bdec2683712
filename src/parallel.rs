//! Parallel batch evaluation using Rayon
//!
//! The expression is compiled once; the points are then evaluated in parallel
//! against the shared [`CompiledExpr`].
//!
//! Enabled by the default `parallel` feature.

use rayon::prelude::*;

use crate::core::error::EvaluationError;
use crate::evaluator::{CompiledExpr, Evaluator};
use crate::Expr;

/// Evaluate `expr` at every point, with point values given in `params` order.
///
/// Compilation failures (an unbound variable, an unknown function) are reported
/// once for the whole batch; numeric failures are reported per point.
///
/// # Example
/// ```
/// use symb_kernel::parallel::eval_batch;
/// use symb_kernel::parse;
///
/// let expr = parse("x^2 + y").unwrap();
/// let results = eval_batch(&expr, &["x", "y"], &[vec![1.0, 1.0], vec![2.0, 0.5]]).unwrap();
/// assert_eq!(results, vec![Ok(2.0), Ok(4.5)]);
/// ```
pub fn eval_batch(
    expr: &Expr,
    params: &[&str],
    points: &[Vec<f64>],
) -> Result<Vec<Result<f64, EvaluationError>>, EvaluationError> {
    eval_batch_with(expr, params, points, &Evaluator::default())
}

/// [`eval_batch`] with user function evaluators
pub fn eval_batch_with(
    expr: &Expr,
    params: &[&str],
    points: &[Vec<f64>],
    evaluator: &Evaluator,
) -> Result<Vec<Result<f64, EvaluationError>>, EvaluationError> {
    let compiled = evaluator.compile(expr, params)?;
    Ok(run_batch(&compiled, points))
}

/// Evaluate an already compiled expression at every point
pub fn run_batch(compiled: &CompiledExpr, points: &[Vec<f64>]) -> Vec<Result<f64, EvaluationError>> {
    points
        .par_iter()
        .map(|point| compiled.evaluate(point))
        .collect()
}
