use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{ExprKind, NodeKind};
use crate::functions::Builtin;
use crate::simplification::rules::{Rule, RuleContext, is_integer, split_call_power};
use crate::traits::approx_eq;

/// Terms of a sum with indices `i` and `j` replaced by `(c, replacement)`
pub(crate) fn replace_pair(terms: &[(f64, Expr)], i: usize, j: usize, c: f64, replacement: Expr) -> Expr {
    let mut out: Vec<(f64, Expr)> = terms
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != i && *k != j)
        .map(|(_, t)| t.clone())
        .collect();
    out.push((c, replacement));
    Expr::sum_terms(out)
}

/// `c·f(u)²·R + s·c·g(u)²·R -> c·R`
pub(crate) fn fold_square_pair(terms: &[(f64, Expr)], f: Builtin, g: Builtin, s: f64) -> Option<Expr> {
    for (i, (ci, ti)) in terms.iter().enumerate() {
        for (u, rest) in split_call_power(ti, f, 2.0) {
            for (j, (cj, tj)) in terms.iter().enumerate() {
                if i == j || !approx_eq(*cj, s * ci) {
                    continue;
                }
                if split_call_power(tj, g, 2.0).into_iter().any(|(v, r)| v == u && r == rest) {
                    return Some(replace_pair(terms, i, j, *ci, rest));
                }
            }
        }
    }
    None
}

/// `a·R + b·f(u)²·R -> c·g(u)²·R` when `coeff(a, b)` gives `c`
pub(crate) fn fold_square_complement(
    terms: &[(f64, Expr)],
    f: Builtin,
    g: Builtin,
    coeff: impl Fn(f64, f64) -> Option<f64>,
) -> Option<Expr> {
    for (j, (cj, tj)) in terms.iter().enumerate() {
        for (u, rest) in split_call_power(tj, f, 2.0) {
            let found = terms
                .iter()
                .enumerate()
                .find(|(i, (_, ti))| *i != j && *ti == rest)
                .and_then(|(i, (ci, _))| Some((i, coeff(*ci, *cj)?)));
            if let Some((i, c)) = found {
                let square = Expr::mul_expr(Expr::powf(Expr::func(g, vec![u]), 2.0), rest);
                return Some(replace_pair(terms, i, j, c, square));
            }
        }
    }
    None
}

/// `k` when the argument is `k·pi` for an integer `k`
fn pi_multiple(arg: &Expr, context: &RuleContext) -> Option<f64> {
    if context.is_pi(arg) {
        return Some(1.0);
    }
    let (k, t) = arg.as_scaled()?;
    (context.is_pi(t) && is_integer(k)).then_some(k)
}

rule!(
    TrigPiRule,
    "trig_pi",
    95,
    Trigonometric,
    &[NodeKind::Function],
    |expr: &Expr, context: &RuleContext| -> Option<Expr> {
        if let Some(arg) = expr.unary_arg(Builtin::Sin).or_else(|| expr.unary_arg(Builtin::Tan)) {
            pi_multiple(arg, context)?;
            return Some(Expr::zero());
        }
        let k = pi_multiple(expr.unary_arg(Builtin::Cos)?, context)?;
        Some(Expr::number(if k % 2.0 == 0.0 { 1.0 } else { -1.0 }))
    }
);

rule!(
    PythagoreanRule,
    "pythagorean",
    80,
    Trigonometric,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        fold_square_pair(terms, Builtin::Sin, Builtin::Cos, 1.0)
    }
);

rule!(
    PythagoreanComplementRule,
    "pythagorean_complement",
    79,
    Trigonometric,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        // c - c·sin² = c·cos², c - c·cos² = c·sin²
        let opposite = |a: f64, b: f64| approx_eq(a, -b).then_some(a);
        fold_square_complement(terms, Builtin::Sin, Builtin::Cos, opposite)
            .or_else(|| fold_square_complement(terms, Builtin::Cos, Builtin::Sin, opposite))
    }
);

/// `f(u)^k · g(u)^-k -> h(u)^k` over the factors of a product
pub(crate) fn fold_ratio(expr: &Expr, f: Builtin, g: Builtin, h: Builtin) -> Option<Expr> {
    let ExprKind::Product(factors) = expr.kind() else {
        return None;
    };
    for (i, (bi, ki)) in factors.iter().enumerate() {
        let Some(u) = bi.unary_arg(f) else {
            continue;
        };
        let partner = factors
            .iter()
            .position(|(bj, kj)| *kj == -ki && bj.unary_arg(g) == Some(u));
        if let Some(j) = partner {
            let mut out: Vec<(Expr, f64)> = factors
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i && *k != j)
                .map(|(_, f)| f.clone())
                .collect();
            out.push((Expr::func(h, vec![u.clone()]), *ki));
            return Some(Expr::product_factors(out));
        }
    }
    None
}

rule!(
    TanRatioRule,
    "tan_ratio",
    75,
    Trigonometric,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        fold_ratio(expr, Builtin::Sin, Builtin::Cos, Builtin::Tan)
    }
);

pub(crate) fn get_trigonometric_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(TrigPiRule),
        Arc::new(PythagoreanRule),
        Arc::new(PythagoreanComplementRule),
        Arc::new(TanRatioRule),
    ]
}
