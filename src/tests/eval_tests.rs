//! Numeric evaluation scenarios: special function values, derivative nodes,
//! error reporting and the compiled evaluator.

use std::collections::HashMap;
use std::f64::consts::PI;

use approx::assert_relative_eq;

use crate::{
    CompiledExpr, CustomFn, Diff, EvaluationError, Evaluator, Expr, Symbol, diff, eval, parse,
};

fn value(input: &str) -> Result<f64, EvaluationError> {
    eval(&parse(input).unwrap(), &HashMap::new())
}

fn value_at(input: &str, x: f64) -> Result<f64, EvaluationError> {
    eval(&parse(input).unwrap(), &HashMap::from([("x", x)]))
}

#[test]
fn test_special_function_values() {
    let cases = [
        ("gamma(2.5)", 1.329_340_388_179_137),
        ("digamma(2.5)", 0.703_156_640_645_243_2),
        ("trigamma(1)", PI * PI / 6.0),
        ("polygamma(1, 1)", PI * PI / 6.0),
        ("beta(2, 3)", 1.0 / 12.0),
        ("zeta(2)", PI * PI / 6.0),
        ("erf(0.5)", 0.520_499_877_813_046_5),
        ("erfc(-1)", 1.842_700_792_949_715),
        ("lambertw(1)", 0.567_143_290_409_783_8),
        ("besselj(0, 1)", 0.765_197_686_557_966_6),
        ("bessely(0, 1)", 0.088_256_964_215_676_96),
        ("besseli(0, 1)", 1.266_065_877_752_008_4),
        ("besselk(1, 2)", 0.139_865_881_816_522_43),
        ("sinc(0)", 1.0),
        ("elliptic_k(0.5)", 1.685_750_354_812_596),
        ("hermite(4, 0.5)", 1.0),
        ("ynm(0, 0, 1, 2)", 0.282_094_791_773_878_14),
    ];
    for (input, expected) in cases {
        assert_relative_eq!(value(input).unwrap(), expected, epsilon = 1e-9);
    }
}

#[test]
fn test_elementary_values() {
    assert_relative_eq!(value("sin(pi/6)").unwrap(), 0.5, epsilon = 1e-14);
    assert_relative_eq!(value("ln(e^2)").unwrap(), 2.0, epsilon = 1e-14);
    assert_relative_eq!(value("log10(1000) + log2(8)").unwrap(), 6.0, epsilon = 1e-14);
    assert_relative_eq!(value("atanh(0.5)").unwrap(), 0.549_306_144_334_054_8, epsilon = 1e-14);
    assert_relative_eq!(value("cbrt(-27)").unwrap(), -3.0, epsilon = 1e-14);
    assert_eq!(value("sign(-2) + abs(-3) + floor(2.7) + ceil(0.2) + round(1.5)").unwrap(), 7.0);
}

fn zeta_derivative_at(order: u32, s: f64) -> f64 {
    let d = Diff::new().order(order).diff_str("zeta(x)", "x").unwrap();
    eval(&d, &HashMap::from([("x", s)])).unwrap()
}

#[test]
fn test_higher_zeta_derivatives() {
    let expected = [
        -0.387_341_950_326_21,
        0.581_968_927_042_07,
        -1.184_687_732_958_35,
        3.161_587_535_848_34,
        -10.535_719_229_432_0,
    ];
    for (k, want) in (1..=5).zip(expected) {
        assert_relative_eq!(zeta_derivative_at(k, 2.5), want, epsilon = 1e-9);
    }
}

#[test]
fn test_zeta_left_of_the_critical_strip() {
    assert_relative_eq!(value("zeta(-3)").unwrap(), 1.0 / 120.0, max_relative = 1e-12);
    assert_relative_eq!(value("zeta(-10.5)").unwrap(), 0.011_146_122_473_942_814, max_relative = 1e-9);
    assert_relative_eq!(zeta_derivative_at(1, -2.0), -0.030_448_457_058_393_27, max_relative = 1e-9);
    let expected = [
        -0.006_265_736_372_189_758,
        -0.033_797_718_036_422_297,
        -0.048_842_828_301_297_743,
    ];
    for (k, want) in (1..=3).zip(expected) {
        assert_relative_eq!(zeta_derivative_at(k, -2.5), want, max_relative = 1e-9);
    }
    assert_relative_eq!(
        value("zeta_deriv(2, -7.5)").unwrap(),
        -0.009_931_410_531_586_173,
        max_relative = 1e-9
    );
}

#[test]
fn test_zeta_derivative_matches_central_difference() {
    let d = diff("zeta(x)", "x", None).unwrap();
    let f = parse("zeta(x)").unwrap();
    let h = 1e-6;
    let at = |e: &Expr, x: f64| eval(e, &HashMap::from([("x", x)])).unwrap();
    let numeric = (at(&f, 3.0 + h) - at(&f, 3.0 - h)) / (2.0 * h);
    assert_relative_eq!(at(&d, 3.0), numeric, max_relative = 1e-6);
}

#[test]
fn test_domain_errors() {
    assert_eq!(value_at("1/x", 0.0), Err(EvaluationError::domain("division", 0.0)));
    assert_eq!(value_at("ln(x)", -1.0), Err(EvaluationError::domain("ln", -1.0)));
    assert_eq!(value_at("sqrt(x)", -4.0), Err(EvaluationError::domain("sqrt", -4.0)));
    assert_eq!(value_at("gamma(x)", -2.0), Err(EvaluationError::domain("gamma", -2.0)));
    assert_eq!(value_at("zeta(x)", 1.0), Err(EvaluationError::domain("zeta", 1.0)));
    assert!(matches!(value_at("x^0.5", -1.0), Err(EvaluationError::DomainError { .. })));
}

#[test]
fn test_derivative_of_a_product_vanishing_at_zero() {
    // d/dx (x sin x) = sin x + x cos x, which is 0 at x = 0
    let at_zero = HashMap::from([("x", 0.0)]);
    let live = diff("zeta(x*sin(x) + 2)", "x", None).unwrap();
    assert_eq!(eval(&live, &at_zero).unwrap(), 0.0);
    let node = Expr::derivative(parse("x*sin(x)").unwrap(), Symbol::new("x"), 1);
    assert_eq!(eval(&node, &at_zero).unwrap(), 0.0);
    let second = Expr::derivative(parse("x^2*exp(x)").unwrap(), Symbol::new("x"), 2);
    assert_eq!(eval(&second, &at_zero).unwrap(), 2.0);
}

#[test]
fn test_cancelling_overflow_is_reported() {
    let e = parse("1e300*x - 1e300*y").unwrap();
    let huge = HashMap::from([("x", 1e10), ("y", 1e10)]);
    assert_eq!(eval(&e, &huge), Err(EvaluationError::Overflow));
    let wrapped = parse("sin(1e300*x - 1e300*y)").unwrap();
    assert_eq!(eval(&wrapped, &huge), Err(EvaluationError::Overflow));
    let compiled = CompiledExpr::compile(&e, &["x", "y"]).unwrap();
    assert_eq!(compiled.evaluate(&[1e10, 1e10]), Err(EvaluationError::Overflow));
}

#[test]
fn test_overflow() {
    assert_eq!(value_at("exp(x)", 1000.0), Err(EvaluationError::Overflow));
    assert_eq!(value_at("x^3", 1e200), Err(EvaluationError::Overflow));
    assert_eq!(value_at("gamma(x)", 200.0), Err(EvaluationError::Overflow));
}

#[test]
fn test_unbound_and_unknown() {
    assert_eq!(value("x + 1"), Err(EvaluationError::UnboundVariable("x".to_string())));
    assert_eq!(value("f(2)"), Err(EvaluationError::UnknownFunction("f".to_string())));
}

#[test]
fn test_constants_and_overrides() {
    assert_relative_eq!(value("pi").unwrap(), PI);
    assert_relative_eq!(value("e").unwrap(), std::f64::consts::E);
    let e = parse("pi*r^2").unwrap();
    assert_relative_eq!(eval(&e, &HashMap::from([("r", 2.0)])).unwrap(), 4.0 * PI);
    assert_eq!(eval(&e, &HashMap::from([("r", 2.0), ("pi", 3.0)])).unwrap(), 12.0);
}

#[test]
fn test_derivative_evaluates_like_closed_form() {
    let d = diff("x^2*sin(x)", "x", None).unwrap();
    let closed = parse("2*x*sin(x) + x^2*cos(x)").unwrap();
    for x in [-1.5, 0.0, 0.4, 3.0] {
        let bindings = HashMap::from([("x", x)]);
        assert_relative_eq!(
            eval(&d, &bindings).unwrap(),
            eval(&closed, &bindings).unwrap(),
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_custom_function_evaluation() {
    let evaluator = Evaluator::new().custom_fn(
        "hypot",
        CustomFn::new(2).eval(|a| Some(a[0].hypot(a[1]))),
    );
    let e = parse("hypot(x, 4)").unwrap();
    let bindings = HashMap::from([("x", 3.0)]);
    assert_eq!(evaluator.eval(&e, &bindings).unwrap(), 5.0);
    assert_eq!(
        eval(&e, &bindings),
        Err(EvaluationError::UnknownFunction("hypot".to_string()))
    );
}

#[test]
fn test_compiled_expression_reuse() {
    let e = parse("sin(x)^2 + sin(x)*y + exp(y)").unwrap();
    let compiled = CompiledExpr::compile(&e, &["x", "y"]).unwrap();
    assert_eq!(compiled.params().len(), 2);
    for (x, y) in [(0.0, 0.0), (1.0, 2.0), (-0.5, 0.25)] {
        let expected = eval(&e, &HashMap::from([("x", x), ("y", y)])).unwrap();
        assert_relative_eq!(compiled.evaluate(&[x, y]).unwrap(), expected, epsilon = 1e-14);
    }
}

#[test]
fn test_anonymous_symbols_bind_by_label() {
    let t = Symbol::anon();
    let e = Expr::from_symbol(t.clone()) + 1.0;
    let label = t.label().into_owned();
    assert_eq!(eval(&e, &HashMap::from([(label.as_str(), 2.0)])).unwrap(), 3.0);
}
