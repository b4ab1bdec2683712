use std::sync::Arc;

use crate::Expr;
use crate::core::expr::{ExprKind, NodeKind};
use crate::core::poly::{MAX_DEGREE, UniPoly};
use crate::simplification::passes::{collect, merge_like_factors};
use crate::simplification::rules::{Rule, RuleContext, factors_of, is_integer};

/// Fractional terms combined at most by the common-denominator rule
const MAX_COMBINED_TERMS: usize = 8;

/// The single variable of the first multi-term sum factor
fn polynomial_generator(factors: &[(Expr, f64)]) -> Option<Expr> {
    factors.iter().find_map(|(b, k)| {
        let is_sum = matches!(b.kind(), ExprKind::Sum(terms) if terms.len() > 1);
        if !is_sum || !is_integer(*k) {
            return None;
        }
        let vars = b.variables();
        if vars.len() != 1 {
            return None;
        }
        vars.into_iter().next().map(Expr::from_symbol)
    })
}

rule!(
    FractionCancelRule,
    "fraction_cancel",
    80,
    Algebraic,
    &[NodeKind::Product],
    alters_domain: true,
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Product(factors) = expr.kind() else {
            return None;
        };
        if !factors.iter().any(|(_, k)| *k < 0.0) {
            return None;
        }
        let generator = polynomial_generator(factors)?;

        let mut num = UniPoly::constant(1.0);
        let mut den = UniPoly::constant(1.0);
        let (mut has_num, mut has_den) = (false, false);
        let mut rest = Vec::new();
        for (b, k) in factors {
            let poly = (is_integer(*k) && k.abs() <= MAX_DEGREE as f64)
                .then(|| UniPoly::from_expr(b, &generator))
                .flatten()
                .filter(|p| p.degree() > 0);
            match poly {
                Some(p) if *k > 0.0 => {
                    num = num.mul(&p.pow(*k as usize));
                    has_num = true;
                }
                Some(p) => {
                    den = den.mul(&p.pow(-*k as usize));
                    has_den = true;
                }
                None => rest.push((b.clone(), *k)),
            }
        }
        if !has_num || !has_den || num.degree() > MAX_DEGREE || den.degree() > MAX_DEGREE {
            return None;
        }

        let g = num.gcd(&den);
        if g.degree() == 0 {
            return None;
        }
        let (nq, nr) = num.div_rem(&g)?;
        let (dq, dr) = den.div_rem(&g)?;
        if !nr.is_zero() || !dr.is_zero() {
            return None;
        }
        rest.push((nq.to_expr(&generator), 1.0));
        rest.push((dq.to_expr(&generator), -1.0));
        Some(Expr::product_factors(rest))
    }
);

/// `(numerator, reciprocal of denominator)` of a term; `None` when nothing divides
fn split_fraction(term: &Expr) -> (Expr, Option<Expr>) {
    let (num, den): (Vec<_>, Vec<_>) = factors_of(term).into_iter().partition(|(_, k)| *k > 0.0);
    if den.is_empty() {
        return (term.clone(), None);
    }
    (Expr::product_factors(num), Some(Expr::product_factors(den)))
}

rule!(
    SameDenominatorRule,
    "same_denominator",
    75,
    Algebraic,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        let split: Vec<(Expr, Option<Expr>)> = terms.iter().map(|(_, t)| split_fraction(t)).collect();

        let mut groups: Vec<(&Expr, Vec<usize>)> = Vec::new();
        for (i, (_, den)) in split.iter().enumerate() {
            let Some(den) = den else {
                continue;
            };
            match groups.iter_mut().find(|(d, _)| *d == den) {
                Some(group) => group.1.push(i),
                None => groups.push((den, vec![i])),
            }
        }
        let (den, members) = groups.into_iter().find(|(_, m)| m.len() > 1)?;

        let numerator = Expr::sum_terms(
            members
                .iter()
                .map(|&i| (terms[i].0, split[i].0.clone()))
                .collect(),
        );
        let mut out: Vec<(f64, Expr)> = terms
            .iter()
            .enumerate()
            .filter(|(i, _)| !members.contains(i))
            .map(|(_, t)| t.clone())
            .collect();
        out.push((1.0, Expr::mul_expr(numerator, den.clone())));
        Some(Expr::sum_terms(out))
    }
);

rule!(
    CommonDenominatorRule,
    "common_denominator",
    60,
    Algebraic,
    &[NodeKind::Sum],
    |expr: &Expr, _context: &RuleContext| -> Option<Expr> {
        let ExprKind::Sum(terms) = expr.kind() else {
            return None;
        };
        let parts: Vec<(f64, Vec<(Expr, f64)>, Vec<(Expr, f64)>)> = terms
            .iter()
            .map(|(c, t)| {
                let (num, den): (Vec<_>, Vec<_>) =
                    factors_of(t).into_iter().partition(|(_, k)| *k > 0.0);
                (*c, num, den)
            })
            .collect();
        let fractional = parts.iter().filter(|(_, _, den)| !den.is_empty()).count();
        if !(2..=MAX_COMBINED_TERMS).contains(&fractional) {
            return None;
        }

        // Least common denominator: each base at its largest power
        let mut lcd: Vec<(Expr, f64)> = Vec::new();
        for (_, _, den) in &parts {
            for (b, k) in den {
                match lcd.iter_mut().find(|(lb, _)| lb == b) {
                    Some(entry) => entry.1 = entry.1.max(-k),
                    None => lcd.push((b.clone(), -k)),
                }
            }
        }

        let numerators = parts
            .into_iter()
            .map(|(c, mut num, den)| {
                for (b, k) in &lcd {
                    let have = den.iter().find(|(db, _)| db == b).map_or(0.0, |(_, dk)| -dk);
                    num.push((b.clone(), k - have));
                }
                (c, Expr::product_factors(merge_like_factors(num)))
            })
            .collect();
        let numerator = collect(&Expr::sum_terms(numerators));

        let mut factors: Vec<(Expr, f64)> = lcd.into_iter().map(|(b, k)| (b, -k)).collect();
        factors.push((numerator, 1.0));
        let combined = Expr::product_factors(factors);
        (combined.node_count() < expr.node_count()).then_some(combined)
    }
);

pub(crate) fn get_fraction_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(FractionCancelRule),
        Arc::new(SameDenominatorRule),
        Arc::new(CommonDenominatorRule),
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
    fn test_fraction_cancel() {
        assert_eq!(apply(&FractionCancelRule, "(x^2 - 1)/(x - 1)"), Some(parse("x + 1").unwrap()));
        assert_eq!(apply(&FractionCancelRule, "(x^2 + x)/x"), Some(parse("x + 1").unwrap()));
        assert_eq!(apply(&FractionCancelRule, "(x + 1)/(x - 1)"), None);
        assert_eq!(apply(&FractionCancelRule, "x/(x + 1)"), None);
        assert!(FractionCancelRule.alters_domain());
    }

    #[test]
    fn test_fraction_cancel_keeps_other_factors() {
        assert_eq!(
            apply(&FractionCancelRule, "y*(x^2 - 1)/(x + 1)"),
            Some(parse("y*(x - 1)").unwrap())
        );
    }

    #[test]
    fn test_same_denominator() {
        let s = parse("x + 1").unwrap();
        assert_eq!(
            apply(&SameDenominatorRule, "x/(x + 1) + 1/(x + 1)"),
            Some(Expr::product_factors(vec![(s.clone(), 1.0), (s, -1.0)]))
        );
        assert_eq!(apply(&SameDenominatorRule, "1/x + 1/y"), None);
    }

    #[test]
    fn test_common_denominator_only_when_smaller() {
        assert_eq!(
            apply(&CommonDenominatorRule, "1/(x - 1) - 1/(x + 1)"),
            Some(parse("2/((x - 1)*(x + 1))").unwrap())
        );
        assert_eq!(apply(&CommonDenominatorRule, "1/x + 1/y"), None);
    }
}
