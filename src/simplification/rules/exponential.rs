use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{ExprKind, NodeKind};
use crate::functions::Builtin;
use crate::simplification::rules::{Rule, RuleContext};

rule!(
    LnExpRule,
    "ln_exp",
    90,
    Exponential,
    &[NodeKind::Function],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        expr.unary_arg(Builtin::Ln)?.unary_arg(Builtin::Exp).cloned()
    }
);

rule!(
    ExpLnRule,
    "exp_ln",
    90,
    Exponential,
    &[NodeKind::Function],
    alters_domain: true,
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        expr.unary_arg(Builtin::Exp)?.unary_arg(Builtin::Ln).cloned()
    }
);

rule!(
    EulerPowerRule,
    "euler_power",
    88,
    Exponential,
    &[NodeKind::Pow],
    |expr: &Expr, context: &RuleContext| -> Option<Expr> {
        let ExprKind::Pow(base, exp) = expr.kind() else {
            return None;
        };
        context
            .is_euler(base)
            .then(|| Expr::func(Builtin::Exp, vec![exp.clone()]))
    }
);

rule!(
    ExpProductRule,
    "exp_product",
    80,
    Exponential,
    &[NodeKind::Product],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Product(factors) = expr.kind() else {
            return None;
        };
        let (exps, mut rest): (Vec<_>, Vec<_>) = factors
            .iter()
            .cloned()
            .partition(|(b, _)| b.unary_arg(Builtin::Exp).is_some());
        if exps.len() < 2 {
            return None;
        }
        // exp(a)^k·exp(b)^m = exp(k·a + m·b)
        let exponent = Expr::sum_terms(
            exps.iter()
                .filter_map(|(b, k)| Some((*k, b.unary_arg(Builtin::Exp)?.clone())))
                .collect(),
        );
        rest.push((Expr::func(Builtin::Exp, vec![exponent]), 1.0));
        Some(Expr::product_factors(rest))
    }
);

pub(crate) fn get_exponential_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(LnExpRule),
        Arc::new(ExpLnRule),
        Arc::new(EulerPowerRule),
        Arc::new(ExpProductRule),
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
    fn test_ln_exp_inverse_pair() {
        assert_eq!(apply(&LnExpRule, "ln(exp(x + 1))"), Some(parse("x + 1").unwrap()));
        assert_eq!(apply(&ExpLnRule, "exp(ln(x))"), Some(Expr::symbol("x")));
        assert!(ExpLnRule.alters_domain());
        assert!(!LnExpRule.alters_domain());
    }

    #[test]
    fn test_euler_power() {
        assert_eq!(apply(&EulerPowerRule, "e^x"), Some(parse("exp(x)").unwrap()));
        assert_eq!(apply(&EulerPowerRule, "2^x"), None);
        let mut context = RuleContext::default();
        context.fixed_vars.insert(crate::Symbol::new("e"));
        assert_eq!(EulerPowerRule.apply(&parse("e^x").unwrap(), &context), None);
    }

    #[test]
    fn test_exp_product() {
        // Like terms in the new exponent are left for the collect pass
        assert_eq!(apply(&ExpProductRule, "y*exp(x)*exp(2*x)"), Some(parse("y*exp(x + 2*x)").unwrap()));
        assert_eq!(apply(&ExpProductRule, "exp(x)/exp(y)"), Some(parse("exp(x - y)").unwrap()));
        assert_eq!(apply(&ExpProductRule, "y*exp(x)"), None);
    }
}
