use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{ExprKind, NodeKind};
use crate::functions::Builtin;
use crate::simplification::rules::trigonometric::{
    fold_ratio, fold_square_complement, fold_square_pair, replace_pair,
};
use crate::simplification::rules::{Rule, RuleContext};
use crate::traits::approx_eq;

rule!(
    CoshSinhIdentityRule,
    "cosh_sinh_identity",
    80,
    Hyperbolic,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        // cosh² - sinh² = 1, 1 + sinh² = cosh², cosh² - 1 = sinh²
        fold_square_pair(terms, Builtin::Cosh, Builtin::Sinh, -1.0)
            .or_else(|| {
                fold_square_complement(terms, Builtin::Sinh, Builtin::Cosh, |a, b| {
                    approx_eq(a, b).then_some(a)
                })
            })
            .or_else(|| {
                fold_square_complement(terms, Builtin::Cosh, Builtin::Sinh, |a, b| {
                    approx_eq(a, -b).then_some(b)
                })
            })
    }
);

rule!(
    ExpToHyperbolicRule,
    "exp_to_hyperbolic",
    78,
    Hyperbolic,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        for (i, (ci, ti)) in terms.iter().enumerate() {
            let Some(u) = ti.unary_arg(Builtin::Exp) else {
                continue;
            };
            if u.is_negatively_led() {
                continue;
            }
            let minus_u = Expr::negate(u.clone());
            for (j, (cj, tj)) in terms.iter().enumerate() {
                if i == j || tj.unary_arg(Builtin::Exp) != Some(&minus_u) {
                    continue;
                }
                // c·e^u + c·e^-u = 2c·cosh(u), c·e^u - c·e^-u = 2c·sinh(u)
                if approx_eq(*ci, *cj) {
                    return Some(replace_pair(terms, i, j, 2.0 * ci, Expr::func(Builtin::Cosh, vec![u.clone()])));
                }
                if approx_eq(*ci, -cj) {
                    return Some(replace_pair(terms, i, j, 2.0 * ci, Expr::func(Builtin::Sinh, vec![u.clone()])));
                }
            }
        }
        None
    }
);

rule!(
    TanhRatioRule,
    "tanh_ratio",
    75,
    Hyperbolic,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        fold_ratio(expr, Builtin::Sinh, Builtin::Cosh, Builtin::Tanh)
    }
);

pub(crate) fn get_hyperbolic_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(CoshSinhIdentityRule),
        Arc::new(ExpToHyperbolicRule),
        Arc::new(TanhRatioRule),
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
    fn test_cosh_sinh_identity() {
        assert_eq!(apply(&CoshSinhIdentityRule, "cosh(x)^2 - sinh(x)^2"), Some(Expr::one()));
        assert_eq!(apply(&CoshSinhIdentityRule, "1 + sinh(x)^2"), Some(parse("cosh(x)^2").unwrap()));
        assert_eq!(apply(&CoshSinhIdentityRule, "cosh(x)^2 - 1"), Some(parse("sinh(x)^2").unwrap()));
        assert_eq!(apply(&CoshSinhIdentityRule, "cosh(x)^2 + sinh(x)^2"), None);
    }

    #[test]
    fn test_exp_to_hyperbolic() {
        assert_eq!(apply(&ExpToHyperbolicRule, "exp(x) + exp(-x)"), Some(parse("2*cosh(x)").unwrap()));
        assert_eq!(apply(&ExpToHyperbolicRule, "exp(x)/2 - exp(-x)/2"), Some(parse("sinh(x)").unwrap()));
        assert_eq!(apply(&ExpToHyperbolicRule, "exp(x) + 2*exp(-x)"), None);
    }

    #[test]
    fn test_tanh_ratio() {
        assert_eq!(apply(&TanhRatioRule, "sinh(x)/cosh(x)"), Some(parse("tanh(x)").unwrap()));
    }
}
