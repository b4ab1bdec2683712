//! Differentiation scenarios through the public API, checked structurally where
//! the canonical form is predictable and against central differences otherwise.

use std::collections::HashMap;

use approx::assert_relative_eq;

use crate::{Diff, DiffError, Expr, Symbol, diff, eval, parse, simplify};

fn at(expr: &Expr, x: f64) -> f64 {
    eval(expr, &HashMap::from([("x", x)])).unwrap()
}

fn central_difference(f: &Expr, x: f64) -> f64 {
    let h = 1e-6 * x.abs().max(1.0);
    (at(f, x + h) - at(f, x - h)) / (2.0 * h)
}

#[test]
fn test_polynomial() {
    assert_eq!(
        diff("x^3 + 2*x^2 + x + 1", "x", None).unwrap(),
        parse("3*x^2 + 4*x + 1").unwrap()
    );
    assert_eq!(diff("7", "x", None).unwrap(), Expr::zero());
    assert_eq!(diff("y", "x", None).unwrap(), Expr::zero());
    assert_eq!(diff("x", "x", None).unwrap(), Expr::one());
}

#[test]
fn test_product_rule() {
    assert_eq!(
        diff("sin(x)*cos(x)", "x", None).unwrap(),
        simplify("cos(x)^2 - sin(x)^2").unwrap()
    );
}

#[test]
fn test_chain_rule() {
    assert_eq!(diff("sin(x^2)", "x", None).unwrap(), parse("2*x*cos(x^2)").unwrap());
    assert_eq!(diff("exp(3*x)", "x", None).unwrap(), parse("3*exp(3*x)").unwrap());
}

#[test]
fn test_fixed_symbols_are_constants() {
    assert_eq!(
        diff("a*x^2 + b", "x", Some(&["a", "b"])).unwrap(),
        parse("2*a*x").unwrap()
    );
    // Symbols are constants with respect to other variables even without fixing them
    assert_eq!(diff("a*x", "x", None).unwrap(), Expr::symbol("a"));
}

#[test]
fn test_variable_in_both_fixed_and_diff() {
    assert_eq!(
        diff("x^2", "x", Some(&["x"])),
        Err(DiffError::VariableInBothFixedAndDiff { var: "x".to_string() })
    );
}

#[test]
fn test_unsupported_functions() {
    assert_eq!(diff("floor(x)", "x", None), Err(DiffError::unsupported("floor")));
    assert_eq!(diff("f(x)", "x", None), Err(DiffError::unsupported("f")));
    // No dependence on the variable, so nothing to differentiate
    assert_eq!(diff("floor(y) + x", "x", None).unwrap(), Expr::one());
}

#[test]
fn test_parse_errors_propagate() {
    assert!(matches!(diff("x +", "x", None), Err(DiffError::Parse(_))));
}

#[test]
fn test_depth_limit() {
    let nested = format!("{}x{}", "sin(".repeat(120), ")".repeat(120));
    assert_eq!(
        diff(&nested, "x", None),
        Err(DiffError::MaxDepthExceeded { limit: crate::DEFAULT_MAX_DEPTH })
    );
}

#[test]
fn test_node_limit() {
    let wide: Vec<String> = (1..=40).map(|i| format!("sin({i}*x)")).collect();
    let formula = wide.join(" + ");
    assert_eq!(
        Diff::new().max_nodes(50).diff_str(&formula, "x"),
        Err(DiffError::MaxNodesExceeded { limit: 50 })
    );
    assert!(Diff::new().max_nodes(500).diff_str(&formula, "x").is_ok());
}

#[test]
fn test_zeta_produces_derivative_nodes() {
    let d = diff("zeta(x)", "x", None).unwrap();
    let view = d.view();
    assert!(view.is_derivative());
    assert_eq!(view.derivative_order(), Some(1));
    assert_eq!(view[0], parse("zeta(x)").unwrap());

    let d3 = Diff::new().order(3).diff_str("zeta(x)", "x").unwrap();
    assert_eq!(d3.view().derivative_order(), Some(3));
    assert!(at(&d3, 2.5).is_finite());
}

#[test]
fn test_matches_central_differences() {
    let formulas = [
        "sin(x)*cos(x)",
        "tan(x)",
        "sec(x) + csc(x)",
        "exp(x^2)",
        "ln(x^2 + 1)",
        "sqrt(x)",
        "cbrt(x)",
        "atan(x)",
        "asin(x/2)",
        "acos(x/2)",
        "sinh(x)*cosh(x)",
        "tanh(x)",
        "acosh(x + 1)",
        "atanh(x/2)",
        "erf(x)",
        "erfc(x^2)",
        "gamma(x)",
        "digamma(x)",
        "polygamma(1, x)",
        "beta(x, 2)",
        "lambertw(x)",
        "besselj(0, x)",
        "bessely(1, x)",
        "besseli(2, x)",
        "zeta(x + 2)",
        "acoth(x + 1)",
        "asech(x/2)",
        "acsch(x)",
        "sinc(x)",
        "tetragamma(x)",
        "besselk(0, x)",
        "besselk(2, x)",
        "zeta_deriv(1, x + 2)",
        "elliptic_k(x/2)",
        "elliptic_e(x/2)",
        "hermite(3, x)",
        "assoc_legendre(2, 1, x/2)",
        "assoc_legendre(3, 3, x/2)",
        "spherical_harmonic(2, 1, x, 2*x)",
        "ynm(3, 0, x, x)",
        "x^x",
        "x^sin(x)",
        "log(2, x)",
        "abs(x - 3)",
        "1/(x + 1)^2",
    ];
    for formula in formulas {
        let f = parse(formula).unwrap();
        let d = diff(formula, "x", None).unwrap();
        for x in [0.7, 1.3] {
            let expected = central_difference(&f, x);
            let actual = at(&d, x);
            assert_relative_eq!(actual, expected, epsilon = 1e-6, max_relative = 1e-5);
        }
    }
}

#[test]
fn test_degree_and_order_must_be_constant() {
    assert_eq!(diff("hermite(x, 2)", "x", None), Err(DiffError::unsupported("hermite")));
    assert_eq!(
        diff("assoc_legendre(2, x, 0.5)", "x", None),
        Err(DiffError::unsupported("assoc_legendre"))
    );
    assert_eq!(
        diff("ynm(x, 0, 1, 1)", "x", None),
        Err(DiffError::unsupported("spherical_harmonic"))
    );
    // H₀ is constant
    assert_eq!(at(&diff("hermite(0, x)", "x", None).unwrap(), 0.7), 0.0);
}

#[test]
fn test_linearity() {
    let f = "x^3*sin(x)";
    let g = "exp(-x)/(x + 2)";
    let lhs = diff(&format!("{f} + 4*({g})"), "x", None).unwrap();
    let df = diff(f, "x", None).unwrap();
    let dg = diff(g, "x", None).unwrap();
    for x in [0.3, 1.1, 2.9] {
        assert_relative_eq!(at(&lhs, x), at(&df, x) + 4.0 * at(&dg, x), max_relative = 1e-10);
    }
}

#[test]
fn test_higher_order_builder() {
    let x = Symbol::new("x");
    let e = parse("x^5").unwrap();
    assert_eq!(Diff::new().order(2).differentiate(&e, &x).unwrap(), parse("20*x^3").unwrap());
    assert_eq!(Diff::new().order(6).differentiate(&e, &x).unwrap(), Expr::zero());
}

#[test]
fn test_with_respect_to_anonymous_symbol() {
    let t = Symbol::anon();
    let e = Expr::from_symbol(t.clone()).pow_of(3.0);
    let d = Diff::new().differentiate(&e, &t).unwrap();
    assert_eq!(d, Expr::scaled(3.0, Expr::from_symbol(t).pow_of(2.0)));
    // Named x is unrelated to the anonymous symbol
    assert_eq!(Diff::new().differentiate(&e, &Symbol::new("x")).unwrap(), Expr::zero());
}

#[test]
fn test_derivative_of_input_is_unchanged() {
    let e = parse("x^2*y").unwrap();
    let before = e.to_string();
    let _ = Diff::new().differentiate(&e, &Symbol::new("x")).unwrap();
    assert_eq!(e.to_string(), before);
}
