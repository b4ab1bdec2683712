use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{ExprKind, NodeKind};
use crate::functions::Builtin;
use crate::simplification::rules::{Rule, RuleContext};

/// Replace factors `which(u)^k` for which `reduce(k)` is `Some(m)` with `u^m`
fn unwrap_root_factors(expr: &Expr, which: Builtin, reduce: impl Fn(f64) -> Option<f64>) -> Option<Expr> {
    let ExprKind::Product(factors) = expr.kind() else {
        return None;
    };
    let mut hit = false;
    let out: Vec<(Expr, f64)> = factors
        .iter()
        .map(|(b, k)| match (b.unary_arg(which), reduce(*k)) {
            (Some(u), Some(m)) => {
                hit = true;
                (u.clone(), m)
            }
            _ => (b.clone(), *k),
        })
        .collect();
    hit.then(|| Expr::product_factors(out))
}

fn even_half(k: f64) -> Option<f64> {
    (k % 2.0 == 0.0).then_some(k / 2.0)
}

rule!(
    SqrtSquareRule,
    "sqrt_square",
    85,
    Root,
    &[NodeKind::Product],
    alters_domain: true,
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        unwrap_root_factors(expr, Builtin::Sqrt, even_half)
    }
);

rule!(
    CbrtCubeRule,
    "cbrt_cube",
    85,
    Root,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        unwrap_root_factors(expr, Builtin::Cbrt, |k| (k % 3.0 == 0.0).then_some(k / 3.0))
    }
);

rule!(
    AbsEvenPowerRule,
    "abs_even_power",
    85,
    Root,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        unwrap_root_factors(expr, Builtin::Abs, |k| (k % 2.0 == 0.0).then_some(k))
    }
);

rule!(
    SqrtOfSquareRule,
    "sqrt_of_square",
    85,
    Root,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let (u, k) = expr.unary_arg(Builtin::Sqrt)?.as_power()?;
        (k == 2.0).then(|| Expr::func(Builtin::Abs, vec![u.clone()]))
    }
);

/// Expressions that are never negative where defined
fn is_non_negative(e: &Expr) -> bool {
    match e.kind() {
        ExprKind::Number(n) => *n >= 0.0,
        ExprKind::Product(factors) => factors.iter().all(|(b, k)| k % 2.0 == 0.0 || is_non_negative(b)),
        _ => [Builtin::Abs, Builtin::Sqrt, Builtin::Exp, Builtin::Cosh]
            .into_iter()
            .any(|b| e.unary_arg(b).is_some()),
    }
}

rule!(
    AbsNonNegativeRule,
    "abs_non_negative",
    85,
    Root,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let u = expr.unary_arg(Builtin::Abs)?;
        is_non_negative(u).then(|| u.clone())
    }
);

pub(crate) fn get_root_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(SqrtSquareRule),
        Arc::new(CbrtCubeRule),
        Arc::new(AbsEvenPowerRule),
        Arc::new(SqrtOfSquareRule),
        Arc::new(AbsNonNegativeRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn apply(rule: &dyn Rule, input: &str) -> Option<Expr> {
        rule.apply(&parse(input).unwrap(), &RuleContext::default())
    }

    #[test]
    fn test_sqrt_square() {
        assert_eq!(apply(&SqrtSquareRule, "sqrt(x)^2"), Some(Expr::symbol("x")));
        assert_eq!(apply(&SqrtSquareRule, "y*sqrt(x)^4"), Some(parse("y*x^2").unwrap()));
        assert_eq!(apply(&SqrtSquareRule, "sqrt(x)^3"), None);
        assert!(SqrtSquareRule.alters_domain());
    }

    #[test]
    fn test_cbrt_cube_is_domain_preserving() {
        assert_eq!(apply(&CbrtCubeRule, "cbrt(x)^3"), Some(Expr::symbol("x")));
        assert!(!CbrtCubeRule.alters_domain());
    }

    #[test]
    fn test_sqrt_of_square_is_abs() {
        assert_eq!(apply(&SqrtOfSquareRule, "sqrt(x^2)"), Some(parse("abs(x)").unwrap()));
        assert_eq!(apply(&SqrtOfSquareRule, "sqrt(x^3)"), None);
    }

    #[test]
    fn test_abs_rules() {
        assert_eq!(apply(&AbsEvenPowerRule, "abs(x)^2"), Some(parse("x^2").unwrap()));
        assert_eq!(apply(&AbsNonNegativeRule, "abs(abs(x))"), Some(parse("abs(x)").unwrap()));
        assert_eq!(apply(&AbsNonNegativeRule, "abs(exp(x))"), Some(parse("exp(x)").unwrap()));
        assert_eq!(apply(&AbsNonNegativeRule, "abs(x^2)"), Some(parse("x^2").unwrap()));
        assert_eq!(apply(&AbsNonNegativeRule, "abs(x)"), None);
    }
}
