//! Uncertainty propagation for symbolic expressions
//!
//! First-order propagation (GUM, JCGM 100:2008 §5.1.2):
//!
//! σ_f² = Σᵢ Σⱼ (∂f/∂xᵢ)(∂f/∂xⱼ) Cov(xᵢ, xⱼ)
//!
//! Each unordered pair is visited once, so the cross term is
//! (∂f/∂xᵢ)(∂f/∂xⱼ)(Cov(xᵢ, xⱼ) + Cov(xⱼ, xᵢ)).

use tracing::trace;

use crate::functions::Builtin;
use crate::{Diff, DiffError, Expr, Simplify, Symbol};

/// Covariance matrix entry, numeric or symbolic
#[derive(Debug, Clone, PartialEq)]
pub enum CovEntry {
    Num(f64),
    /// e.g. `rho_xy*sigma_x*sigma_y`
    Symbolic(Expr),
}

impl CovEntry {
    pub fn to_expr(&self) -> Expr {
        match self {
            CovEntry::Num(n) => Expr::number(*n),
            CovEntry::Symbolic(e) => e.clone(),
        }
    }

    /// Exactly zero. Symbolic entries count when they are the literal `0`.
    pub fn is_zero(&self) -> bool {
        match self {
            CovEntry::Num(n) => *n == 0.0,
            CovEntry::Symbolic(e) => e.is_zero(),
        }
    }
}

impl From<f64> for CovEntry {
    fn from(n: f64) -> Self {
        CovEntry::Num(n)
    }
}

impl From<Expr> for CovEntry {
    fn from(e: Expr) -> Self {
        CovEntry::Symbolic(e)
    }
}

/// `Cov[i][j] = Cov(xᵢ, xⱼ)`, with the variances on the diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    entries: Vec<Vec<CovEntry>>,
}

impl CovarianceMatrix {
    /// Rows in variable order. Shape is checked when the matrix is used.
    pub fn new(entries: Vec<Vec<CovEntry>>) -> Self {
        CovarianceMatrix { entries }
    }

    /// Uncorrelated variables with the given variances σᵢ²
    pub fn diagonal(variances: Vec<CovEntry>) -> Self {
        let n = variances.len();
        let mut entries = vec![vec![CovEntry::Num(0.0); n]; n];
        for (i, variance) in variances.into_iter().enumerate() {
            entries[i][i] = variance;
        }
        CovarianceMatrix { entries }
    }

    /// Uncorrelated variables with variances `sigma_<name>^2`
    pub fn diagonal_symbolic(names: &[&str]) -> Self {
        Self::diagonal(
            names
                .iter()
                .map(|name| CovEntry::Symbolic(Expr::powf(Expr::symbol(&format!("sigma_{name}")), 2.0)))
                .collect(),
        )
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&CovEntry> {
        self.entries.get(i).and_then(|row| row.get(j))
    }

    /// Number of rows
    pub fn dim(&self) -> usize {
        self.entries.len()
    }

    fn is_square(&self, n: usize) -> bool {
        self.entries.len() == n && self.entries.iter().all(|row| row.len() == n)
    }
}

/// Standard deviation σ_f of `expr` with respect to `variables`
///
/// Without a covariance matrix the variables are taken as uncorrelated with
/// symbolic variances `sigma_<name>^2`. The result is simplified.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use symb_kernel::{CovEntry, CovarianceMatrix, eval, parse, uncertainty_propagation};
///
/// let f = parse("x*y").unwrap();
/// let sigma = uncertainty_propagation(&f, &["x", "y"], None).unwrap();
/// let at = HashMap::from([("x", 2.0), ("y", 3.0), ("sigma_x", 0.1), ("sigma_y", 0.2)]);
/// assert!((eval(&sigma, &at).unwrap() - 0.5).abs() < 1e-12);
///
/// let cov = CovarianceMatrix::diagonal(vec![CovEntry::Num(1.0), CovEntry::Num(4.0)]);
/// let sigma = uncertainty_propagation(&parse("x + y").unwrap(), &["x", "y"], Some(&cov)).unwrap();
/// assert!((eval(&sigma, &HashMap::new()).unwrap() - 5f64.sqrt()).abs() < 1e-12);
/// ```
pub fn uncertainty_propagation(
    expr: &Expr,
    variables: &[&str],
    covariance: Option<&CovarianceMatrix>,
) -> Result<Expr, DiffError> {
    let n = variables.len();
    if n == 0 {
        return Ok(Expr::zero());
    }

    let default_cov;
    let cov = match covariance {
        Some(c) if !c.is_square(n) => {
            return Err(DiffError::CovarianceDimension { expected: n, found: c.dim() });
        }
        Some(c) => c,
        None => {
            default_cov = CovarianceMatrix::diagonal_symbolic(variables);
            &default_cov
        }
    };

    let diff = Diff::new();
    let partials = variables
        .iter()
        .map(|v| diff.differentiate(expr, &Symbol::new(v)))
        .collect::<Result<Vec<_>, _>>()?;

    let entry = |i: usize, j: usize| cov.get(i, j).filter(|c| !c.is_zero()).map(CovEntry::to_expr);
    let mut terms = Vec::new();
    for i in 0..n {
        if partials[i].is_zero() {
            continue;
        }
        if let Some(variance) = entry(i, i) {
            terms.push(Expr::product(vec![Expr::powf(partials[i].clone(), 2.0), variance]));
        }
        for j in (i + 1)..n {
            if partials[j].is_zero() {
                continue;
            }
            let pair: Vec<Expr> = [entry(i, j), entry(j, i)].into_iter().flatten().collect();
            if !pair.is_empty() {
                terms.push(Expr::product(vec![
                    partials[i].clone(),
                    partials[j].clone(),
                    Expr::sum(pair),
                ]));
            }
        }
    }
    trace!(variables = n, terms = terms.len(), "propagating uncertainty");

    let simplify = Simplify::new();
    let variance = simplify.simplify(&Expr::sum(terms));
    Ok(simplify.simplify(&Expr::func(Builtin::Sqrt, vec![variance])))
}

/// Relative uncertainty σ_f / |f|
pub fn relative_uncertainty(
    expr: &Expr,
    variables: &[&str],
    covariance: Option<&CovarianceMatrix>,
) -> Result<Expr, DiffError> {
    let std_dev = uncertainty_propagation(expr, variables, covariance)?;
    Ok(Expr::div_expr(std_dev, Expr::func(Builtin::Abs, vec![expr.clone()])))
}
