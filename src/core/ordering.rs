//! Canonical ordering of expressions
//!
//! Children of `Sum` and `Product` are sorted with these comparators, so two
//! expressions built from the same parts in any order end up structurally equal.
//! Terms are compared as:
//! 1. numbers before everything else,
//! 2. then by base (`x^3` and `x` share base `x`),
//! 3. then by exponent (numeric before symbolic),
//! 4. then by full structure.
//!
//! Each step is a total order, so the whole is one as well.

use std::cmp::Ordering;

use super::expr::{Expr, ExprKind};

enum ExpKey<'a> {
    Num(f64),
    Sym(&'a Expr),
}

fn split_power(e: &Expr) -> (&Expr, ExpKey<'_>) {
    match e.kind() {
        ExprKind::Product(f) if f.len() == 1 => (&f[0].0, ExpKey::Num(f[0].1)),
        ExprKind::Pow(b, x) => (b, ExpKey::Sym(x)),
        _ => (e, ExpKey::Num(1.0)),
    }
}

fn exp_cmp(a: &ExpKey<'_>, b: &ExpKey<'_>) -> Ordering {
    match (a, b) {
        (ExpKey::Num(x), ExpKey::Num(y)) => x.total_cmp(y),
        (ExpKey::Num(_), ExpKey::Sym(_)) => Ordering::Less,
        (ExpKey::Sym(_), ExpKey::Num(_)) => Ordering::Greater,
        (ExpKey::Sym(x), ExpKey::Sym(y)) => struct_cmp(x, y),
    }
}

/// Canonical total order over expressions
pub(crate) fn expr_cmp(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => return x.total_cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }
    let (base_a, exp_a) = split_power(a);
    let (base_b, exp_b) = split_power(b);
    struct_cmp(base_a, base_b)
        .then_with(|| exp_cmp(&exp_a, &exp_b))
        .then_with(|| struct_cmp(a, b))
}

/// Order of `(coefficient, term)` pairs inside a sum
pub(crate) fn term_cmp(a: &(f64, Expr), b: &(f64, Expr)) -> Ordering {
    expr_cmp(&a.1, &b.1).then_with(|| a.0.total_cmp(&b.0))
}

/// Order of `(base, exponent)` pairs inside a product
pub(crate) fn factor_cmp(a: &(Expr, f64), b: &(Expr, f64)) -> Ordering {
    expr_cmp(&a.0, &b.0).then_with(|| a.1.total_cmp(&b.1))
}

fn rank(e: &Expr) -> u8 {
    match e.kind() {
        ExprKind::Number(_) => 0,
        ExprKind::Symbol(_) => 1,
        ExprKind::Function { .. } => 2,
        ExprKind::Derivative { .. } => 3,
        ExprKind::Sum(_) => 4,
        ExprKind::Product(_) => 5,
        ExprKind::Pow(..) => 6,
    }
}

fn slice_cmp<T>(a: &[T], b: &[T], cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .zip(b)
            .map(|(x, y)| cmp(x, y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Purely structural comparison: `Equal` only for structurally equal trees
fn struct_cmp(a: &Expr, b: &Expr) -> Ordering {
    if a.ptr_eq(b) {
        return Ordering::Equal;
    }
    let by_rank = rank(a).cmp(&rank(b));
    if by_rank.is_ne() {
        return by_rank;
    }
    match (a.kind(), b.kind()) {
        (ExprKind::Number(x), ExprKind::Number(y)) => x.total_cmp(y),
        (ExprKind::Symbol(x), ExprKind::Symbol(y)) => x.canonical_cmp(y),
        (
            ExprKind::Function { func: fa, args: aa },
            ExprKind::Function { func: fb, args: ab },
        ) => fa
            .name()
            .cmp(fb.name())
            .then_with(|| slice_cmp(aa, ab, |x, y| expr_cmp(x, y))),
        (
            ExprKind::Derivative {
                inner: ia,
                var: va,
                order: oa,
            },
            ExprKind::Derivative {
                inner: ib,
                var: vb,
                order: ob,
            },
        ) => va
            .canonical_cmp(vb)
            .then(oa.cmp(ob))
            .then_with(|| expr_cmp(ia, ib)),
        (ExprKind::Sum(ta), ExprKind::Sum(tb)) => slice_cmp(ta, tb, term_cmp),
        (ExprKind::Product(fa), ExprKind::Product(fb)) => slice_cmp(fa, fb, factor_cmp),
        (ExprKind::Pow(ba, ea), ExprKind::Pow(bb, eb)) => {
            expr_cmp(ba, bb).then_with(|| expr_cmp(ea, eb))
        }
        // Unreachable: equal ranks imply equal variants
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Builtin;

    #[test]
    fn test_numbers_first_then_by_degree() {
        let x = Expr::symbol("x");
        let mut items = vec![
            Expr::powf(x.clone(), 2.0),
            x.clone(),
            Expr::number(1.0),
        ];
        items.sort_by(expr_cmp);
        assert_eq!(items[0], Expr::number(1.0));
        assert_eq!(items[1], x);
        assert_eq!(items[2], Expr::powf(Expr::symbol("x"), 2.0));
    }

    #[test]
    fn test_functions_sort_by_name() {
        let x = Expr::symbol("x");
        let s = Expr::func(Builtin::Sin, vec![x.clone()]);
        let c = Expr::func(Builtin::Cos, vec![x]);
        assert_eq!(expr_cmp(&c, &s), Ordering::Less);
    }

    #[test]
    fn test_order_is_antisymmetric() {
        let x = Expr::symbol("x");
        let y = Expr::symbol("y");
        let samples = vec![
            Expr::number(-2.0),
            x.clone(),
            y.clone(),
            Expr::powf(x.clone(), 3.0),
            Expr::pow(x.clone(), y.clone()),
            Expr::add_expr(x.clone(), y.clone()),
            Expr::func(Builtin::Exp, vec![x.clone()]),
            Expr::mul_expr(x.clone(), y.clone()),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(expr_cmp(a, b), expr_cmp(b, a).reverse());
                assert_eq!(expr_cmp(a, b) == Ordering::Equal, a == b);
            }
        }
    }
}
