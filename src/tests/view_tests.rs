//! Walking expressions through the read-only view.

use crate::{Expr, Kind, Symbol, diff, parse};

/// Rebuild an expression from its view, checking every projection on the way
fn rebuild(e: &Expr) -> Expr {
    let view = e.view();
    let children: Vec<Expr> = view.iter().map(rebuild).collect();
    match view.kind() {
        Kind::Number | Kind::Symbol | Kind::Derivative => e.clone(),
        Kind::Sum => Expr::sum(children),
        Kind::Product => Expr::product(children),
        Kind::Div => Expr::div_expr(children[0].clone(), children[1].clone()),
        Kind::Pow => Expr::pow(children[0].clone(), children[1].clone()),
        Kind::Function => match e.kind() {
            crate::core::expr::ExprKind::Function { func, .. } => match func {
                crate::Func::Builtin(b) => Expr::func(*b, children),
                crate::Func::Named(name) => Expr::named_func(name, children),
            },
            _ => unreachable!("function view of a non-call"),
        },
    }
}

#[test]
fn test_quadratic_view() {
    let e = parse("x^2 + 2*x + 1").unwrap();
    let view = e.view();
    assert_eq!(view.kind(), Kind::Sum);
    assert_eq!(view.len(), 3);
    assert_eq!(view[0], view[-3]);
    assert_eq!(view[-1], view[2]);
    assert_eq!(view[1].view().kind(), Kind::Product);
    assert_eq!(view[1].view()[0].view().value(), Some(2.0));
}

#[test]
fn test_views_rebuild_the_same_expression() {
    for input in [
        "x^2 + 2*x + 1",
        "3*x*y/(z + 1)",
        "-sin(x)/x^2",
        "a^b + exp(-x)*besselj(1, x)",
        "f(x, 2*y) - 0.5",
        "(x + 1)^(-2)",
    ] {
        let e = parse(input).unwrap();
        assert_eq!(rebuild(&e), e, "rebuilding {input}");
    }
}

#[test]
fn test_view_of_derivative_result() {
    let d = diff("zeta(x^2)", "x", None).unwrap();
    assert!(d.view().is_derivative());
    assert_eq!(d.view().derivative_var(), Some(&Symbol::new("x")));
    assert_eq!(d.view()[0].view().name().as_deref(), Some("zeta"));
}

#[test]
fn test_anonymous_symbols_are_distinct() {
    let a = Symbol::anon();
    let b = Symbol::anon();
    assert_ne!(a, b);
    assert_ne!(a.id(), b.id());
    assert!(a.is_anonymous());
    assert_eq!(a.name(), None);

    let e = Expr::from_symbol(a.clone()) + Expr::from_symbol(b.clone());
    let view = e.view();
    assert_eq!(view.len(), 2);
    assert_eq!(view[0].view().symbol(), Some(&a));
    assert_eq!(view[1].view().symbol(), Some(&b));
    assert!(view[0].view().name().is_some_and(|n| n.starts_with('$')));

    // Anonymous symbols never collide with parsed names
    assert_ne!(Expr::from_symbol(a), parse("x").unwrap());
}

#[test]
fn test_named_symbols_are_interned() {
    let x1 = Symbol::new("x");
    let x2 = Symbol::new("x");
    assert_eq!(x1, x2);
    assert_eq!(x1.id(), x2.id());
    assert_eq!(Symbol::lookup("x"), Some(x1));
}
