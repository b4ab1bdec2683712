use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{ExprKind, Func, NodeKind};
use crate::simplification::rules::{Rule, RuleContext, factors_of, is_integer};
use crate::traits::approx_eq;

rule!(
    ParityRule,
    "parity",
    90,
    Algebraic,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let Some((Func::Builtin(b), [arg])) = expr.as_call() else {
            return None;
        };
        if !arg.is_negatively_led() {
            return None;
        }
        let flipped = Expr::func(*b, vec![Expr::negate(arg.clone())]);
        if b.is_odd() {
            Some(Expr::negate(flipped))
        } else if b.is_even() {
            Some(flipped)
        } else {
            None
        }
    }
);

/// Exponent carried by a factor whose base is `b`: `(b^e)^k -> k·e`, `b^k -> k`
fn base_and_exponent(base: &Expr, k: f64) -> (Expr, Expr, bool) {
    match base.kind() {
        ExprKind::Pow(b, e) => (b.clone(), Expr::scaled(k, e.clone()), true),
        _ => (base.clone(), Expr::number(k), false),
    }
}

rule!(
    ExponentCombineRule,
    "exponent_combine",
    85,
    Algebraic,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Product(factors) = expr.kind() else {
            return None;
        };
        // (base, exponents, has_symbolic)
        let mut groups: Vec<(Expr, Vec<Expr>, bool)> = Vec::new();
        for (b, k) in factors {
            let (base, exp, symbolic) = base_and_exponent(b, *k);
            match groups.iter_mut().find(|(gb, _, _)| *gb == base) {
                Some(group) => {
                    group.1.push(exp);
                    group.2 |= symbolic;
                }
                None => groups.push((base, vec![exp], symbolic)),
            }
        }
        if !groups.iter().any(|(_, exps, symbolic)| *symbolic && exps.len() > 1) {
            return None;
        }
        let combined = groups
            .into_iter()
            .map(|(base, exps, _)| (Expr::pow(base, Expr::sum(exps)), 1.0))
            .collect();
        Some(Expr::product_factors(combined))
    }
);

rule!(
    IntegerPowerOfPowerRule,
    "integer_power_of_power",
    84,
    Algebraic,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Product(factors) = expr.kind() else {
            return None;
        };
        let hit = factors
            .iter()
            .any(|(b, k)| matches!(b.kind(), ExprKind::Pow(..)) && *k != 1.0 && is_integer(*k));
        if !hit {
            return None;
        }
        let out = factors
            .iter()
            .map(|(b, k)| match b.kind() {
                ExprKind::Pow(base, e) if is_integer(*k) => {
                    (Expr::pow(base.clone(), Expr::scaled(*k, e.clone())), 1.0)
                }
                _ => (b.clone(), *k),
            })
            .collect();
        Some(Expr::product_factors(out))
    }
);

rule!(
    PowerOfPowerRule,
    "power_of_power",
    83,
    Algebraic,
    &[NodeKind::Pow, NodeKind::Product],
    alters_domain: true,
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        match expr.kind() {
            // (a^m)^n with a symbolic outer exponent
            ExprKind::Pow(inner, n) => match inner.kind() {
                ExprKind::Pow(a, m) => Some(Expr::pow(a.clone(), Expr::mul_expr(m.clone(), n.clone()))),
                _ => {
                    let (a, m) = inner.as_power()?;
                    Some(Expr::pow(a.clone(), Expr::scaled(m, n.clone())))
                }
            },
            // (a^m)^k with a fractional k
            ExprKind::Product(factors) => {
                if !factors
                    .iter()
                    .any(|(b, k)| matches!(b.kind(), ExprKind::Pow(..)) && !is_integer(*k))
                {
                    return None;
                }
                let out = factors
                    .iter()
                    .map(|(b, k)| match b.kind() {
                        ExprKind::Pow(base, e) => {
                            (Expr::pow(base.clone(), Expr::scaled(*k, e.clone())), 1.0)
                        }
                        _ => (b.clone(), *k),
                    })
                    .collect();
                Some(Expr::product_factors(out))
            }
            _ => None,
        }
    }
);

/// `c·t = a²` with a clean square root: `4x² -> 2x`, `0.25 -> 0.5`
fn square_root(c: f64, t: &Expr) -> Option<Expr> {
    if c <= 0.0 {
        return None;
    }
    let r = c.sqrt();
    if r * r != c {
        return None;
    }
    let halves = factors_of(t)
        .into_iter()
        .map(|(b, k)| (k % 2.0 == 0.0).then_some((b, k / 2.0)))
        .collect::<Option<Vec<_>>>()?;
    Some(Expr::scaled(r, Expr::product_factors(halves)))
}

rule!(
    PerfectSquareRule,
    "perfect_square",
    70,
    Algebraic,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        if terms.len() != 3 {
            return None;
        }
        for (i, j, m) in [(0, 1, 2), (0, 2, 1), (1, 2, 0)] {
            let (Some(a), Some(b)) = (
                square_root(terms[i].0, &terms[i].1),
                square_root(terms[j].0, &terms[j].1),
            ) else {
                continue;
            };
            let (cross, cross_term) = Expr::mul_expr(a.clone(), b.clone()).split_coeff();
            let (cm, tm) = &terms[m];
            if *tm != cross_term {
                continue;
            }
            if approx_eq(*cm, 2.0 * cross) {
                return Some(Expr::powf(Expr::add_expr(a, b), 2.0));
            }
            if approx_eq(*cm, -2.0 * cross) {
                return Some(Expr::powf(Expr::sub_expr(a, b), 2.0));
            }
        }
        None
    }
);

pub(crate) fn get_algebraic_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(ParityRule),
        Arc::new(ExponentCombineRule),
        Arc::new(IntegerPowerOfPowerRule),
        Arc::new(PowerOfPowerRule),
        Arc::new(PerfectSquareRule),
    ]
}
