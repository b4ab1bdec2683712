//! Differentiation engine - applies calculus rules
//!
//! The output is correct but not simplified: like factors and like terms are
//! left for the simplifier's collection pass to merge. Shared subtrees are
//! differentiated once.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::builder::CustomFn;
use crate::core::error::DiffError;
use crate::core::expr::{ExprKind, Func};
use crate::functions::{Builtin, DerivativeRule};
use crate::{Expr, Symbol};

pub(crate) struct Differentiator<'a> {
    var: &'a Symbol,
    fixed_vars: &'a FxHashSet<Symbol>,
    custom_fns: &'a FxHashMap<Arc<str>, CustomFn>,
    memo: FxHashMap<Expr, Expr>,
}

impl<'a> Differentiator<'a> {
    pub(crate) fn new(
        var: &'a Symbol,
        fixed_vars: &'a FxHashSet<Symbol>,
        custom_fns: &'a FxHashMap<Arc<str>, CustomFn>,
    ) -> Self {
        Differentiator {
            var,
            fixed_vars,
            custom_fns,
            memo: FxHashMap::default(),
        }
    }

    /// `d(expr)/d(var)`
    pub(crate) fn derive(&mut self, expr: &Expr) -> Result<Expr, DiffError> {
        if let Some(done) = self.memo.get(expr) {
            return Ok(done.clone());
        }
        let result = self.derive_node(expr)?;
        self.memo.insert(expr.clone(), result.clone());
        Ok(result)
    }

    fn derive_node(&mut self, expr: &Expr) -> Result<Expr, DiffError> {
        match expr.kind() {
            ExprKind::Number(_) => Ok(Expr::zero()),

            ExprKind::Symbol(s) => {
                if s == self.var && !self.fixed_vars.contains(s) {
                    Ok(Expr::one())
                } else {
                    Ok(Expr::zero())
                }
            }

            // Linearity: coefficients pass through
            ExprKind::Sum(terms) => {
                let mut out = Vec::with_capacity(terms.len());
                for (c, t) in terms {
                    let d = self.derive(t)?;
                    if !d.is_zero() {
                        out.push((*c, d));
                    }
                }
                Ok(Expr::sum_terms(out))
            }

            ExprKind::Product(factors) => self.derive_product(factors),

            ExprKind::Pow(base, exp) => self.derive_pow(expr, base, exp),

            ExprKind::Function { func, args } => self.derive_call(expr, func, args),

            ExprKind::Derivative { inner, var, order } => {
                if !inner.contains_var(self.var) {
                    return Ok(Expr::zero());
                }
                // Same variable merges into a higher order; a different one nests
                Ok(Expr::derivative(
                    Expr::derivative(inner.clone(), var.clone(), *order),
                    self.var.clone(),
                    1,
                ))
            }
        }
    }

    /// `d(Π bᵢ^kᵢ) = Σ kᵢ·bᵢ^(kᵢ-1)·bᵢ'·Π_{j≠i} bⱼ^kⱼ`
    ///
    /// Each term lowers its own exponent rather than dividing the whole product
    /// by `bᵢ`, so the result stays finite wherever a factor vanishes.
    fn derive_product(&mut self, factors: &[(Expr, f64)]) -> Result<Expr, DiffError> {
        let mut primes = Vec::with_capacity(factors.len());
        for (b, _) in factors {
            primes.push(self.derive(b)?);
        }
        if primes.iter().all(Expr::is_zero) {
            return Ok(Expr::zero());
        }

        let mut terms = Vec::new();
        for (i, ((_, k), d)) in factors.iter().zip(&primes).enumerate() {
            if d.is_zero() {
                continue;
            }
            let mut parts: Vec<(Expr, f64)> = Vec::with_capacity(factors.len() + 1);
            for (j, (bj, kj)) in factors.iter().enumerate() {
                let exp = if j == i { kj - 1.0 } else { *kj };
                parts.push((bj.clone(), exp));
            }
            parts.push((d.clone(), 1.0));
            terms.push((*k, Expr::product_factors(parts)));
        }
        Ok(Expr::sum_terms(terms))
    }

    fn derive_pow(&mut self, expr: &Expr, base: &Expr, exp: &Expr) -> Result<Expr, DiffError> {
        let df = self.derive(base)?;
        let dg = self.derive(exp)?;
        let result = match (df.is_zero(), dg.is_zero()) {
            (true, true) => Expr::zero(),
            // g·f^(g-1)·f'
            (false, true) => Expr::product(vec![
                exp.clone(),
                Expr::pow(base.clone(), Expr::sub_expr(exp.clone(), Expr::one())),
                df,
            ]),
            // ln(f)·f^g·g'
            (true, false) => Expr::product(vec![
                Expr::func(Builtin::Ln, vec![base.clone()]),
                expr.clone(),
                dg,
            ]),
            // f^g·(g'·ln f + g·f'/f)
            (false, false) => {
                let log_part = Expr::mul_expr(dg, Expr::func(Builtin::Ln, vec![base.clone()]));
                let ratio = Expr::product_factors(vec![
                    (exp.clone(), 1.0),
                    (df, 1.0),
                    (base.clone(), -1.0),
                ]);
                Expr::mul_expr(expr.clone(), Expr::add_expr(log_part, ratio))
            }
        };
        Ok(result)
    }

    fn derive_call(&mut self, expr: &Expr, func: &Func, args: &[Expr]) -> Result<Expr, DiffError> {
        let mut dargs = Vec::with_capacity(args.len());
        for a in args {
            dargs.push(self.derive(a)?);
        }
        if dargs.iter().all(Expr::is_zero) {
            return Ok(Expr::zero());
        }

        match func {
            Func::Builtin(b) => match b.definition().derivative {
                DerivativeRule::Closed(rule) => {
                    rule(args, &dargs).ok_or_else(|| DiffError::unsupported(b.name()))
                }
                DerivativeRule::Live => Ok(Expr::derivative(expr.clone(), self.var.clone(), 1)),
                DerivativeRule::Unsupported => Err(DiffError::unsupported(b.name())),
            },
            Func::Named(name) => {
                // dF/dx = Σ ∂F/∂argᵢ · dargᵢ/dx
                let custom = self
                    .custom_fns
                    .get(name)
                    .ok_or_else(|| DiffError::unsupported(name.as_ref()))?;
                let mut terms = Vec::new();
                for (i, d) in dargs.into_iter().enumerate() {
                    if d.is_zero() {
                        continue;
                    }
                    let partial = custom
                        .partial_derivative(i, args)
                        .ok_or_else(|| DiffError::unsupported(name.as_ref()))?;
                    terms.push(Expr::mul_expr(partial, d));
                }
                Ok(Expr::sum(terms))
            }
        }
    }
}
