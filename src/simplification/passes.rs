//! Structural passes run once per simplification iteration
//!
//! Child order is maintained by the constructors, so "reorder" only has to pick
//! a canonical sign for sum factors.

use crate::Expr;
use crate::core::expr::ExprKind;
use crate::core::ordering::factor_cmp;
use crate::core::traverse::rewrite_bottom_up;
use crate::traits::FLOAT_TOLERANCE;

/// Rebuild every node through the canonical constructors
pub(crate) fn flatten(expr: &Expr) -> Expr {
    expr.rebuild()
}

/// Merge like terms in sums and like bases in products
pub(crate) fn collect(expr: &Expr) -> Expr {
    rewrite_bottom_up(expr, |node| match node.kind() {
        ExprKind::Sum(terms) => {
            let merged = merge_like_terms(terms);
            (merged.len() != terms.len()).then(|| Expr::sum_terms(merged))
        }
        ExprKind::Product(factors) => {
            let merged = merge_like_factors(factors.clone());
            (merged.len() != factors.len()).then(|| Expr::product_factors(merged))
        }
        _ => None,
    })
}

/// Give each integer-power sum factor a positive last coefficient: `(1 - x)^-1 -> -(x - 1)^-1`
pub(crate) fn reorder(expr: &Expr) -> Expr {
    rewrite_bottom_up(expr, |node| {
        let ExprKind::Product(factors) = node.kind() else {
            return None;
        };
        let mut flipped = false;
        let mut sign = 1.0;
        let mut out = Vec::with_capacity(factors.len());
        for (b, k) in factors {
            if k.fract() == 0.0 && last_coeff(b).is_some_and(|c| c < 0.0) {
                flipped = true;
                if k % 2.0 != 0.0 {
                    sign = -sign;
                }
                out.push((Expr::negate(b.clone()), *k));
            } else {
                out.push((b.clone(), *k));
            }
        }
        flipped.then(|| Expr::scaled(sign, Expr::product_factors(out)))
    })
}

fn last_coeff(e: &Expr) -> Option<f64> {
    match e.kind() {
        ExprKind::Sum(terms) if terms.len() > 1 => terms.last().map(|(c, _)| *c),
        _ => None,
    }
}

fn cancels(a: f64, b: f64) -> bool {
    (a + b).abs() <= FLOAT_TOLERANCE * a.abs().max(b.abs())
}

/// Merge adjacent equal terms of a sorted term list; cancelled terms are dropped
pub(crate) fn merge_like_terms(terms: &[(f64, Expr)]) -> Vec<(f64, Expr)> {
    let mut out: Vec<(f64, Expr)> = Vec::with_capacity(terms.len());
    for (c, t) in terms {
        if let Some(last) = out.last_mut()
            && last.1 == *t
        {
            last.0 = if cancels(last.0, *c) { 0.0 } else { last.0 + c };
            continue;
        }
        out.push((*c, t.clone()));
    }
    out.retain(|(c, _)| *c != 0.0);
    out
}

/// Sort factors and add the exponents of equal bases.
///
/// A literal zero base is never merged, so `0^-1·0` keeps its division by zero.
pub(crate) fn merge_like_factors(mut factors: Vec<(Expr, f64)>) -> Vec<(Expr, f64)> {
    factors.sort_by(factor_cmp);
    let mut out: Vec<(Expr, f64)> = Vec::with_capacity(factors.len());
    for (b, k) in factors {
        if let Some(last) = out.last_mut()
            && last.0 == b
            && !b.is_zero()
        {
            last.1 = if cancels(last.1, k) { 0.0 } else { last.1 + k };
            continue;
        }
        out.push((b, k));
    }
    out.retain(|(_, k)| *k != 0.0);
    out
}
