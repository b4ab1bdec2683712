//! Builder pattern API for differentiation and simplification
//!
//! Provides a fluent interface for configuring and executing differentiation and
//! simplification.
//!
//! # Example
//! ```
//! use symb_kernel::{Diff, Symbol, parse};
//!
//! let x = Symbol::new("x");
//! let a = Symbol::new("a");
//! let expr = parse("a*x^2").unwrap();
//!
//! let derivative = Diff::new().fixed_var(&a).differentiate(&expr, &x).unwrap();
//! assert_eq!(derivative, parse("2*a*x").unwrap());
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::config::SimplifyConfig;
use crate::core::error::{DiffError, ParseError};
use crate::diff::Differentiator;
use crate::{Expr, Symbol, parser, simplification};

/// Default maximum depth of a differentiation input
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default maximum node count of a differentiation input
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Custom evaluation function type for user-defined functions
/// Takes: array of numeric arguments -> optional numeric result
pub type CustomEvalFn = Arc<dyn Fn(&[f64]) -> Option<f64> + Send + Sync>;

/// Partial derivative function for custom functions
/// Takes: slice of argument expressions -> ∂F/∂arg[i]
pub type PartialDerivativeFn = Arc<dyn Fn(&[Expr]) -> Expr + Send + Sync>;

/// Definition of a user function: arity, optional evaluator and partial derivatives
///
/// # Example
/// ```
/// use symb_kernel::{CustomFn, Expr};
///
/// // F(x, y) = x * sin(y)
/// let f = CustomFn::new(2)
///     .eval(|args| Some(args[0] * args[1].sin()))
///     .partial(0, |args| args[1].clone().sin())
///     .partial(1, |args| args[0].clone() * args[1].clone().cos());
/// assert_eq!(f.arity(), 2);
/// ```
#[derive(Clone)]
pub struct CustomFn {
    arity: usize,
    eval_fn: Option<CustomEvalFn>,
    partials: FxHashMap<usize, PartialDerivativeFn>,
}

impl CustomFn {
    /// Create a new custom function with given arity
    pub fn new(arity: usize) -> Self {
        CustomFn {
            arity,
            eval_fn: None,
            partials: FxHashMap::default(),
        }
    }

    /// Set the numeric evaluation function
    pub fn eval<F>(mut self, f: F) -> Self
    where
        F: Fn(&[f64]) -> Option<f64> + Send + Sync + 'static,
    {
        self.eval_fn = Some(Arc::new(f));
        self
    }

    /// Add the partial derivative with respect to argument `i`.
    ///
    /// The closure receives all argument expressions and returns ∂F/∂arg[i].
    pub fn partial<F>(mut self, i: usize, f: F) -> Self
    where
        F: Fn(&[Expr]) -> Expr + Send + Sync + 'static,
    {
        if i >= self.arity {
            warn!(index = i, arity = self.arity, "ignoring partial derivative past the arity");
            return self;
        }
        self.partials.insert(i, Arc::new(f));
        self
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// ∂F/∂arg[i] at `args`; `None` if no partial was registered or the call has the wrong arity
    pub(crate) fn partial_derivative(&self, i: usize, args: &[Expr]) -> Option<Expr> {
        if args.len() != self.arity {
            return None;
        }
        self.partials.get(&i).map(|f| f(args))
    }

    /// The evaluator when one is registered and `argc` matches the arity
    pub(crate) fn evaluator(&self, argc: usize) -> Option<&CustomEvalFn> {
        self.eval_fn.as_ref().filter(|_| argc == self.arity)
    }
}

impl fmt::Debug for CustomFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut partials: Vec<usize> = self.partials.keys().copied().collect();
        partials.sort_unstable();
        f.debug_struct("CustomFn")
            .field("arity", &self.arity)
            .field("has_eval", &self.eval_fn.is_some())
            .field("partials", &partials)
            .finish()
    }
}

/// Builder for differentiation operations
#[derive(Clone, Debug)]
pub struct Diff {
    config: SimplifyConfig,
    custom_fns: FxHashMap<Arc<str>, CustomFn>,
    max_depth: Option<usize>,
    max_nodes: Option<usize>,
    order: u32,
}

impl Default for Diff {
    fn default() -> Self {
        Diff::with_config(SimplifyConfig::default())
    }
}

impl Diff {
    /// Create a new differentiation builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from explicit simplifier settings, e.g. [`SimplifyConfig::from_env`]
    pub fn with_config(config: SimplifyConfig) -> Self {
        Diff {
            config,
            custom_fns: FxHashMap::default(),
            max_depth: None,
            max_nodes: None,
            order: 1,
        }
    }

    /// Enable or disable domain-safe mode (skips domain-altering rules)
    pub fn domain_safe(mut self, safe: bool) -> Self {
        self.config.domain_safe = safe;
        self
    }

    /// Add a single fixed variable (treated as constant during differentiation)
    pub fn fixed_var(mut self, var: &Symbol) -> Self {
        self.config.fixed_vars.insert(var.clone());
        self
    }

    /// Add multiple fixed variables
    pub fn fixed_vars(mut self, vars: &[&Symbol]) -> Self {
        self.config.fixed_vars.extend(vars.iter().map(|v| (*v).clone()));
        self
    }

    /// Register a user function with its partial derivatives.
    ///
    /// The chain rule is applied automatically: dF/dx = Σ (∂F/∂arg[i])·(darg[i]/dx)
    pub fn custom_fn(mut self, name: &str, def: CustomFn) -> Self {
        self.custom_fns.insert(Arc::from(name), def);
        self
    }

    /// Set maximum input depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set maximum input node count
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    /// Differentiate `n` times; the result is simplified after every step
    pub fn order(mut self, n: u32) -> Self {
        self.order = n;
        self
    }

    /// Pass ceiling for the simplification of each step
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.config.max_passes = passes;
        self
    }

    /// Differentiate an expression with respect to a variable and simplify the result
    pub fn differentiate(&self, expr: &Expr, var: &Symbol) -> Result<Expr, DiffError> {
        if self.config.fixed_vars.contains(var) {
            return Err(DiffError::VariableInBothFixedAndDiff {
                var: var.label().into_owned(),
            });
        }

        // Check limits
        if let Some(limit) = self.max_depth
            && expr.max_depth() > limit
        {
            return Err(DiffError::MaxDepthExceeded { limit });
        }
        if let Some(limit) = self.max_nodes
            && expr.node_count() > limit
        {
            return Err(DiffError::MaxNodesExceeded { limit });
        }

        let mut current = expr.clone();
        for _ in 0..self.order {
            let derivative = Differentiator::new(var, &self.config.fixed_vars, &self.custom_fns)
                .derive(&current)?;
            current = simplification::simplify_with(&derivative, &self.config);
        }
        Ok(current)
    }

    /// Parse and differentiate a formula
    pub fn diff_str(&self, formula: &str, var: &str) -> Result<Expr, DiffError> {
        let var = Symbol::new(var);
        if self.config.fixed_vars.contains(&var) {
            return Err(DiffError::VariableInBothFixedAndDiff {
                var: var.label().into_owned(),
            });
        }
        let expr = parser::parse(formula)?;
        self.differentiate(&expr, &var)
    }
}

/// Builder for simplification operations
#[derive(Clone, Debug, Default)]
pub struct Simplify {
    config: SimplifyConfig,
}

impl Simplify {
    /// Create a new simplification builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from explicit settings, e.g. [`SimplifyConfig::from_env`]
    pub fn with_config(config: SimplifyConfig) -> Self {
        Simplify { config }
    }

    /// Enable or disable domain-safe mode
    pub fn domain_safe(mut self, safe: bool) -> Self {
        self.config.domain_safe = safe;
        self
    }

    /// Add a single fixed variable
    pub fn fixed_var(mut self, var: &Symbol) -> Self {
        self.config.fixed_vars.insert(var.clone());
        self
    }

    /// Add multiple fixed variables
    pub fn fixed_vars(mut self, vars: &[&Symbol]) -> Self {
        self.config.fixed_vars.extend(vars.iter().map(|v| (*v).clone()));
        self
    }

    /// Set the pass ceiling
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.config.max_passes = passes;
        self
    }

    /// Simplify an expression
    pub fn simplify(&self, expr: &Expr) -> Expr {
        simplification::simplify_with(expr, &self.config)
    }

    /// Parse and simplify a formula
    pub fn simplify_str(&self, formula: &str) -> Result<Expr, ParseError> {
        Ok(self.simplify(&parser::parse(formula)?))
    }
}

/// Input accepted by [`crate::simplify`]: formula text or an existing expression
pub trait SimplifyInput {
    fn into_expr(self) -> Result<Expr, ParseError>;
}

impl SimplifyInput for &str {
    fn into_expr(self) -> Result<Expr, ParseError> {
        parser::parse(self)
    }
}

impl SimplifyInput for &String {
    fn into_expr(self) -> Result<Expr, ParseError> {
        parser::parse(self)
    }
}

impl SimplifyInput for String {
    fn into_expr(self) -> Result<Expr, ParseError> {
        parser::parse(&self)
    }
}

impl SimplifyInput for Expr {
    fn into_expr(self) -> Result<Expr, ParseError> {
        Ok(self)
    }
}

impl SimplifyInput for &Expr {
    fn into_expr(self) -> Result<Expr, ParseError> {
        Ok(self.clone())
    }
}
