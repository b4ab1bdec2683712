//! End-to-end parser scenarios: canonical equality, implicit multiplication,
//! display round trips and error reporting.

use std::collections::HashMap;

use crate::{Expected, Expr, Symbol, eval, parse};

fn value_at(input: &str, x: f64) -> f64 {
    eval(&parse(input).unwrap(), &HashMap::from([("x", x)])).unwrap()
}

#[test]
fn test_equivalent_spellings_share_a_canonical_form() {
    assert_eq!(parse("x + 1").unwrap(), parse("1 + x").unwrap());
    assert_eq!(parse("x*y").unwrap(), parse("y*x").unwrap());
    assert_eq!(parse("x*x").unwrap(), parse("x^2").unwrap());
    assert_eq!(parse("x + x").unwrap(), parse("2*x").unwrap());
    assert_eq!(parse("x/x").unwrap(), Expr::one());
    assert_eq!(parse("a - b").unwrap(), parse("-b + a").unwrap());
    assert_eq!(parse("(x^2)^3").unwrap(), parse("x^6").unwrap());
}

#[test]
fn test_hash_matches_for_equal_trees() {
    let a = parse("sin(x)*y + 3").unwrap();
    let b = parse("3 + y*sin(x)").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.hash_value(), b.hash_value());
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(parse("2x").unwrap(), parse("2*x").unwrap());
    assert_eq!(parse("3sin(x)").unwrap(), parse("3*sin(x)").unwrap());
    assert_eq!(parse("(x + 1)(x - 1)").unwrap(), parse("(x + 1)*(x - 1)").unwrap());
    assert_eq!(parse("(x + 1)y").unwrap(), parse("(x + 1)*y").unwrap());
    assert_eq!(parse("2(x + 1)").unwrap(), parse("2*x + 2").unwrap());
}

#[test]
fn test_operator_semantics() {
    assert_eq!(value_at("-x^2", 3.0), -9.0);
    assert_eq!(value_at("2^3^2", 0.0), 512.0);
    assert_eq!(value_at("x^-1", 4.0), 0.25);
    assert_eq!(value_at("10 - 4 - 3", 0.0), 3.0);
    assert_eq!(value_at("12/4/2", 0.0), 1.5);
}

#[test]
fn test_function_names_and_aliases() {
    assert_eq!(parse("log(x)").unwrap(), parse("ln(x)").unwrap());
    assert_eq!(parse("arcsin(x)").unwrap(), parse("asin(x)").unwrap());
    assert_eq!(value_at("log(2, x)", 8.0), 3.0);

    let unknown = parse("f(x, y^2)").unwrap();
    let view = unknown.view();
    assert!(view.is_function());
    assert_eq!(view.name().as_deref(), Some("f"));
    assert_eq!(view.len(), 2);
}

#[test]
fn test_variables_of_parsed_expression() {
    let e = parse("a*sin(x) + b^y").unwrap();
    let vars = e.variables();
    assert_eq!(vars.len(), 4);
    for name in ["a", "b", "x", "y"] {
        assert!(vars.contains(&Symbol::new(name)));
    }
    assert!(parse("sin(2)").unwrap().variables().is_empty());
}

#[test]
fn test_display_round_trips() {
    let inputs = [
        "x^3 + 2*x^2 + x + 1",
        "sin(x)/(1 + x)",
        "-x^2",
        "x - y",
        "a*b^(c + 1)",
        "exp(-x)*cos(2*x)",
        "1/(x*y)",
        "(x + 1)^(-1/2)",
        "besselj(2, x)*gamma(x + 1)",
        "log(2, x) - abs(x - 3)",
        "2^x^y",
        "f(x, y) + 0.25",
    ];
    for input in inputs {
        let e = parse(input).unwrap();
        let printed = e.to_string();
        assert_eq!(parse(&printed).unwrap(), e, "round trip of {input} via {printed}");
    }
}

#[test]
fn test_display_shapes() {
    assert_eq!(parse("x*2").unwrap().to_string(), "2*x");
    assert_eq!(parse("x^2 + 2*x + 1").unwrap().to_string(), "1 + 2*x + x^2");
    assert_eq!(parse("sin(x)/(x + 1)").unwrap().to_string(), "sin(x)/(1 + x)");
    assert_eq!(parse("3 + 4").unwrap().to_string(), "7");
}

#[test]
fn test_parse_errors() {
    for input in ["", "x +", "(x", "x)", "sin()", "2 * * 3", "x $ y", "sin(x, y)"] {
        let err = parse(input).unwrap_err();
        assert!(!err.to_string().is_empty(), "{input} should describe its error");
    }
    assert_eq!(parse("(x").unwrap_err().expected, Expected::ClosingParen);
    assert_eq!(parse("x +").unwrap_err().expected, Expected::Operand);
}

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(parse("  x  ^ 2\t+\n1 ").unwrap(), parse("x^2+1").unwrap());
}
