//! Compiled numeric evaluator.
//!
//! Expressions are compiled into flat postfix bytecode and run on a small stack
//! machine, so evaluation never recurses over the tree.
//!
//! ```text
//! ┌─────────────┐    ┌────────────┐    ┌────────────────┐
//! │    Expr     │ -> │  Compiler  │ -> │  CompiledExpr  │
//! │   (tree)    │    │ (bytecode) │    │ (stack machine)│
//! └─────────────┘    └────────────┘    └────────────────┘
//!                                              │
//!                                  ┌───────────┴───────────┐
//!                                  ▼                       ▼
//!                            ┌──────────┐           ┌────────────┐
//!                            │ evaluate │           │ eval_batch │
//!                            │ (scalar) │           │  (rayon)   │
//!                            └──────────┘           └────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use symb_kernel::{eval, parse};
//!
//! let expr = parse("sin(x)*cos(x) + x^2").unwrap();
//! let bindings = HashMap::from([("x", 0.5)]);
//! let value = eval(&expr, &bindings).unwrap();
//! assert!((value - (0.5_f64.sin() * 0.5_f64.cos() + 0.25)).abs() < 1e-12);
//! ```

mod compiler;
mod execution;
mod instruction;

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use self::compiler::Compiler;
use self::instruction::Instruction;
use crate::builder::{CustomEvalFn, CustomFn};
use crate::core::error::EvaluationError;
use crate::{Expr, Symbol};

/// Evaluate `expr` with the given variable bindings.
///
/// Unbound `pi` and `e` evaluate to π and Euler's number; any other unbound
/// symbol is an [`EvaluationError::UnboundVariable`].
pub fn eval<S: BuildHasher>(
    expr: &Expr,
    bindings: &HashMap<&str, f64, S>,
) -> Result<f64, EvaluationError> {
    Evaluator::default().eval(expr, bindings)
}

/// Evaluate with user function evaluators registered on `evaluator`
pub fn eval_with<S: BuildHasher>(
    expr: &Expr,
    bindings: &HashMap<&str, f64, S>,
    evaluator: &Evaluator,
) -> Result<f64, EvaluationError> {
    evaluator.eval(expr, bindings)
}

/// Evaluation settings: the user functions opaque calls may dispatch to
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use symb_kernel::{CustomFn, Evaluator, parse};
///
/// let evaluator = Evaluator::new().custom_fn("sq", CustomFn::new(1).eval(|a| Some(a[0] * a[0])));
/// let expr = parse("sq(x) + 1").unwrap();
/// assert_eq!(evaluator.eval(&expr, &HashMap::from([("x", 3.0)])), Ok(10.0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    custom_fns: FxHashMap<Arc<str>, CustomFn>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user function. Only its evaluator is used here.
    pub fn custom_fn(mut self, name: &str, def: CustomFn) -> Self {
        self.custom_fns.insert(Arc::from(name), def);
        self
    }

    /// Compile with parameters in the given order
    pub fn compile(&self, expr: &Expr, params: &[&str]) -> Result<CompiledExpr, EvaluationError> {
        let params: Vec<Symbol> = params.iter().map(|p| Symbol::new(p)).collect();
        self.compile_symbols(expr, params)
    }

    pub fn eval<S: BuildHasher>(
        &self,
        expr: &Expr,
        bindings: &HashMap<&str, f64, S>,
    ) -> Result<f64, EvaluationError> {
        let mut params = Vec::new();
        let mut values = Vec::new();
        for s in expr.variables() {
            if let Some(v) = bindings.get(s.label().as_ref()) {
                params.push(s);
                values.push(*v);
            }
        }
        self.compile_symbols(expr, params)?.execute(&values)
    }

    fn compile_symbols(&self, expr: &Expr, params: Vec<Symbol>) -> Result<CompiledExpr, EvaluationError> {
        let mut compiler = Compiler::new(&params, &self.custom_fns);
        compiler.compile_expr(expr)?;
        let program = compiler.finish();
        Ok(CompiledExpr {
            instructions: program.instructions.into_boxed_slice(),
            constants: program.constants.into_boxed_slice(),
            functions: program.functions.into_boxed_slice(),
            stack_size: program.stack_size,
            cache_size: program.cache_size,
            params: params.into_boxed_slice(),
        })
    }
}

/// Compiled expression - thread-safe, reusable.
///
/// All data is immutable after construction and every run uses its own stack,
/// so one instance can be shared across threads.
#[derive(Clone)]
pub struct CompiledExpr {
    instructions: Box<[Instruction]>,
    constants: Box<[f64]>,
    functions: Box<[(Arc<str>, CustomEvalFn)]>,
    stack_size: usize,
    cache_size: usize,
    params: Box<[Symbol]>,
}

impl CompiledExpr {
    /// Compile with builtin functions only
    ///
    /// # Example
    /// ```
    /// use symb_kernel::{CompiledExpr, parse};
    ///
    /// let compiled = CompiledExpr::compile(&parse("x*y + 1").unwrap(), &["x", "y"]).unwrap();
    /// assert_eq!(compiled.evaluate(&[2.0, 3.0]), Ok(7.0));
    /// ```
    pub fn compile(expr: &Expr, params: &[&str]) -> Result<Self, EvaluationError> {
        Evaluator::default().compile(expr, params)
    }

    /// Evaluate at `values`, given in parameter order
    pub fn evaluate(&self, values: &[f64]) -> Result<f64, EvaluationError> {
        if let Some(missing) = self.params.get(values.len()) {
            return Err(EvaluationError::UnboundVariable(missing.label().into_owned()));
        }
        self.execute(values)
    }

    /// Parameters in evaluation order
    pub fn params(&self) -> &[Symbol] {
        &self.params
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

impl fmt::Debug for CompiledExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpr")
            .field("params", &self.params)
            .field("instructions", &self.instructions.len())
            .field("stack_size", &self.stack_size)
            .field("cache_size", &self.cache_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use approx::assert_relative_eq;

    fn eval_at(input: &str, bindings: &[(&str, f64)]) -> Result<f64, EvaluationError> {
        let bindings: HashMap<&str, f64> = bindings.iter().copied().collect();
        eval(&parse(input).unwrap(), &bindings)
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval_at("2*x + 3", &[("x", 4.0)]), Ok(11.0));
        assert_eq!(eval_at("x/y", &[("x", 1.0), ("y", 4.0)]), Ok(0.25));
        assert_eq!(eval_at("x^y", &[("x", 2.0), ("y", 10.0)]), Ok(1024.0));
    }

    #[test]
    fn test_constants_fall_back_when_unbound() {
        assert_relative_eq!(eval_at("cos(pi)", &[]).unwrap(), -1.0);
        assert_relative_eq!(eval_at("ln(e)", &[]).unwrap(), 1.0);
        assert_eq!(eval_at("e", &[("e", 2.0)]), Ok(2.0));
    }

    #[test]
    fn test_unbound_variable() {
        assert_eq!(
            eval_at("x + y", &[("x", 1.0)]),
            Err(EvaluationError::UnboundVariable("y".to_string()))
        );
    }

    #[test]
    fn test_domain_errors_are_not_nan() {
        assert_eq!(eval_at("1/x", &[("x", 0.0)]), Err(EvaluationError::domain("division", 0.0)));
        assert_eq!(eval_at("ln(x)", &[("x", -1.0)]), Err(EvaluationError::domain("ln", -1.0)));
        assert_eq!(eval_at("sqrt(x)", &[("x", -4.0)]), Err(EvaluationError::domain("sqrt", -4.0)));
        assert_eq!(eval_at("x^y", &[("x", -2.0), ("y", 0.5)]), Err(EvaluationError::domain("pow", -2.0)));
        assert!(matches!(eval_at("gamma(x)", &[("x", -2.0)]), Err(EvaluationError::DomainError { .. })));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(eval_at("exp(x)", &[("x", 1000.0)]), Err(EvaluationError::Overflow));
        assert_eq!(eval_at("x*x", &[("x", 1e200)]), Err(EvaluationError::Overflow));
    }

    #[test]
    fn test_special_functions() {
        assert_relative_eq!(eval_at("gamma(2.5)", &[]).unwrap(), 1.329_340_388_179_137, epsilon = 1e-8);
        assert_relative_eq!(eval_at("digamma(2.5)", &[]).unwrap(), 0.703_156_640_645_243, epsilon = 1e-8);
        assert_relative_eq!(eval_at("zeta(2)", &[]).unwrap(), std::f64::consts::PI.powi(2) / 6.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zeta_derivative_nodes() {
        let x = Symbol::new("x");
        let node = Expr::derivative(parse("zeta(x)").unwrap(), x, 3);
        let value = eval(&node, &HashMap::from([("x", 2.5)])).unwrap();
        assert!(value.is_finite());
        let direct = crate::math::eval_zeta_deriv(3, 2.5).unwrap();
        assert_relative_eq!(value, direct, max_relative = 1e-12);
    }

    #[test]
    fn test_derivative_of_composite_zeta() {
        // d/dx ζ(x²) = 2x ζ'(x²)
        let d = crate::diff("zeta(x^2)", "x", None).unwrap();
        let value = eval(&d, &HashMap::from([("x", 1.5)])).unwrap();
        let expected = 3.0 * crate::math::eval_zeta_deriv(1, 2.25).unwrap();
        assert_relative_eq!(value, expected, max_relative = 1e-10);
    }

    #[test]
    fn test_derivative_node_of_closed_form_is_expanded() {
        let x = Symbol::new("x");
        let node = Expr::derivative(parse("sin(x)").unwrap(), x, 2);
        let value = eval(&node, &HashMap::from([("x", 0.3)])).unwrap();
        assert_relative_eq!(value, -(0.3_f64.sin()), max_relative = 1e-12);
    }

    #[test]
    fn test_custom_functions() {
        let evaluator = Evaluator::new().custom_fn(
            "f",
            CustomFn::new(2).eval(|args| (args[1] != 0.0).then(|| args[0] / args[1])),
        );
        let expr = parse("f(x, y) + 1").unwrap();
        let bindings = HashMap::from([("x", 6.0), ("y", 3.0)]);
        assert_eq!(eval_with(&expr, &bindings, &evaluator), Ok(3.0));

        let bindings = HashMap::from([("x", 6.0), ("y", 0.0)]);
        assert_eq!(
            eval_with(&expr, &bindings, &evaluator),
            Err(EvaluationError::domain("f", 6.0))
        );
        assert_eq!(
            eval(&expr, &bindings),
            Err(EvaluationError::UnknownFunction("f".to_string()))
        );
    }

    #[test]
    fn test_compiled_reuse() {
        let compiled = CompiledExpr::compile(&parse("x^2 + y").unwrap(), &["x", "y"]).unwrap();
        assert_eq!(compiled.params().len(), 2);
        assert_eq!(compiled.evaluate(&[3.0, 1.0]), Ok(10.0));
        assert_eq!(compiled.evaluate(&[1.0, 1.0]), Ok(2.0));
        assert_eq!(
            compiled.evaluate(&[1.0]),
            Err(EvaluationError::UnboundVariable("y".to_string()))
        );
    }

    #[test]
    fn test_anonymous_symbols_bind_by_label() {
        let t = Symbol::anon();
        let expr = Expr::from(t.clone()) * 2.0;
        let label = t.label().into_owned();
        let bindings = HashMap::from([(label.as_str(), 4.0)]);
        assert_eq!(eval(&expr, &bindings), Ok(8.0));
    }
}
