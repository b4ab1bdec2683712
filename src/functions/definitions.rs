//! Capability records for every builtin function
//!
//! # Derivative References
//!
//! - Trigonometric and hyperbolic: DLMF §4.21, §4.35
//! - Error function: DLMF §7.10 (erf'(x) = 2/√π e^(-x²))
//! - Gamma: DLMF §5.2.1 (Γ'(x) = Γ(x)ψ(x)), polygamma DLMF §5.15
//! - Beta: ∂B/∂a = B(a,b)(ψ(a) - ψ(a+b))
//! - Bessel: DLMF §10.6.1, §10.29.1 (recurrence-based derivatives)
//! - Lambert W: Corless et al. (1996), W'(x) = W(x)/(x(1+W(x)))
//! - Elliptic integrals: DLMF §19.4.1
//! - Hermite and Legendre: DLMF §18.9, §14.10.5
//! - Spherical harmonics: from the Legendre rule with `x = cos θ`

use super::registry::{DerivativeRule, FunctionDefinition};
use super::{Builtin, call1, prod};
use crate::Expr;
use crate::math;
use crate::traits::as_integer;

const TWO_OVER_SQRT_PI: f64 = std::f64::consts::FRAC_2_SQRT_PI;

// ===== Evaluation helpers =====

fn unary(args: &[f64], f: impl Fn(f64) -> Option<f64>) -> Option<f64> {
    match args {
        [x] => f(*x),
        _ => None,
    }
}

fn binary(args: &[f64], f: impl Fn(f64, f64) -> Option<f64>) -> Option<f64> {
    match args {
        [a, b] => f(*a, *b),
        _ => None,
    }
}

/// `(degree, order, x…)` functions with integer degree and order
fn with_degree(args: &[f64], f: impl Fn(i32, i32, &[f64]) -> Option<f64>) -> Option<f64> {
    match args {
        [l, m, rest @ ..] => f(order(*l)?, order(*m)?, rest),
        _ => None,
    }
}

/// Integer order argument of Bessel and polygamma
fn order(x: f64) -> Option<i32> {
    as_integer(x).and_then(|n| i32::try_from(n).ok())
}

fn nonzero(x: f64) -> Option<f64> {
    (x != 0.0).then_some(x)
}

// ===== Derivative helpers =====

/// `f'(u) · u'` for one-argument functions
fn chain(args: &[Expr], dargs: &[Expr], outer: fn(&Expr) -> Expr) -> Option<Expr> {
    match (args, dargs) {
        ([u], [du]) => Some(Expr::mul_expr(outer(u), du.clone())),
        _ => None,
    }
}

/// `(order, x)` functions: the order must not vary
fn order_chain(args: &[Expr], dargs: &[Expr], outer: fn(&Expr, &Expr) -> Expr) -> Option<Expr> {
    match (args, dargs) {
        ([n, x], [dn, dx]) if dn.is_zero() => Some(Expr::mul_expr(outer(n, x), dx.clone())),
        _ => None,
    }
}

/// Derivative order of `zeta_deriv`
fn zeta_order(x: f64) -> Option<u32> {
    as_integer(x).and_then(|n| u32::try_from(n).ok())
}

/// `(l, m, x)` functions: degree and order must not vary
fn degree_chain(
    args: &[Expr],
    dargs: &[Expr],
    outer: fn(&Expr, &Expr, &Expr) -> Expr,
) -> Option<Expr> {
    match (args, dargs) {
        ([l, m, x], [dl, dm, dx]) if dl.is_zero() && dm.is_zero() => {
            Some(Expr::mul_expr(outer(l, m, x), dx.clone()))
        }
        _ => None,
    }
}

/// `∂Y/∂θ·θ' + ∂Y/∂φ·φ'` for `Yₗᵐ(θ, φ) = Nₗᵐ Pₗᵐ(cos θ) cos(mφ)`
///
/// - `∂Y/∂θ = l cot θ Yₗᵐ - √((2l+1)(l-m)(l+m)/(2l-1)) Yₗ₋₁ᵐ / sin θ`
/// - `∂Y/∂φ = -m Yₗᵐ(θ, φ - π/(2m))`, since the shift turns `cos(mφ)` into `sin(mφ)`
fn spherical_harmonic_derivative(args: &[Expr], dargs: &[Expr]) -> Option<Expr> {
    let ([l, m, theta, phi], [dl, dm, dtheta, dphi]) = (args, dargs) else {
        return None;
    };
    if !dl.is_zero() || !dm.is_zero() {
        return None;
    }
    let ynm = |l: &Expr, phi: &Expr| {
        Expr::func(
            Builtin::SphericalHarmonic,
            vec![l.clone(), m.clone(), theta.clone(), phi.clone()],
        )
    };

    let mut terms = Vec::with_capacity(2);
    if !dtheta.is_zero() {
        let ratio = prod(vec![
            (shift(&Expr::scaled(2.0, l.clone()), 1.0), 1.0),
            (Expr::sub_expr(l.clone(), m.clone()), 1.0),
            (Expr::add_expr(l.clone(), m.clone()), 1.0),
            (shift(&Expr::scaled(2.0, l.clone()), -1.0), -1.0),
        ]);
        let lowered = prod(vec![
            (ratio, 0.5),
            (ynm(&shift(l, -1.0), phi), 1.0),
            (call1(Builtin::Sin, theta), -1.0),
        ]);
        let raised = Expr::product(vec![l.clone(), call1(Builtin::Cot, theta), ynm(l, phi)]);
        terms.push(Expr::mul_expr(Expr::sub_expr(raised, lowered), dtheta.clone()));
    }
    if !dphi.is_zero() && !m.is_zero() {
        let quarter_turn = prod(vec![(Expr::number(std::f64::consts::FRAC_PI_2), 1.0), (m.clone(), -1.0)]);
        let shifted = ynm(l, &Expr::sub_expr(phi.clone(), quarter_turn));
        terms.push(Expr::negate(Expr::product(vec![m.clone(), shifted, dphi.clone()])));
    }
    Some(Expr::sum(terms))
}

fn square(u: &Expr) -> Expr {
    Expr::powf(u.clone(), 2.0)
}

/// `1 ± u²`
fn one_plus_sq(sign: f64, u: &Expr) -> Expr {
    Expr::sum_terms(vec![(1.0, Expr::one()), (sign, square(u))])
}

/// `u² ± 1`
fn sq_plus_one(sign: f64, u: &Expr) -> Expr {
    Expr::sum_terms(vec![(1.0, square(u)), (sign, Expr::one())])
}

fn call2(which: Builtin, a: &Expr, b: &Expr) -> Expr {
    Expr::func(which, vec![a.clone(), b.clone()])
}

fn shift(n: &Expr, by: f64) -> Expr {
    Expr::add_expr(n.clone(), Expr::number(by))
}

fn def(
    name: &'static str,
    arity: std::ops::RangeInclusive<usize>,
    eval: fn(&[f64]) -> Option<f64>,
    derivative: DerivativeRule,
) -> FunctionDefinition {
    FunctionDefinition {
        name,
        arity,
        eval,
        derivative,
    }
}

use DerivativeRule::{Closed, Live, Unsupported};

/// The capability record of a tag. Exhaustive by construction.
pub(crate) fn definition(which: Builtin) -> FunctionDefinition {
    match which {
        // ===== Trigonometric =====
        Builtin::Sin => def(
            "sin",
            1..=1,
            |a| unary(a, |x| Some(x.sin())),
            Closed(|a, d| chain(a, d, |u| call1(Builtin::Cos, u))),
        ),
        Builtin::Cos => def(
            "cos",
            1..=1,
            |a| unary(a, |x| Some(x.cos())),
            Closed(|a, d| chain(a, d, |u| Expr::negate(call1(Builtin::Sin, u)))),
        ),
        Builtin::Tan => def(
            "tan",
            1..=1,
            |a| unary(a, |x| nonzero(x.cos()).map(|c| x.sin() / c)),
            Closed(|a, d| chain(a, d, |u| square(&call1(Builtin::Sec, u)))),
        ),
        Builtin::Cot => def(
            "cot",
            1..=1,
            |a| unary(a, |x| nonzero(x.sin()).map(|s| x.cos() / s)),
            Closed(|a, d| chain(a, d, |u| Expr::negate(square(&call1(Builtin::Csc, u))))),
        ),
        Builtin::Sec => def(
            "sec",
            1..=1,
            |a| unary(a, |x| nonzero(x.cos()).map(|c| 1.0 / c)),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::mul_expr(call1(Builtin::Sec, u), call1(Builtin::Tan, u))
                })
            }),
        ),
        Builtin::Csc => def(
            "csc",
            1..=1,
            |a| unary(a, |x| nonzero(x.sin()).map(|s| 1.0 / s)),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::negate(Expr::mul_expr(
                        call1(Builtin::Csc, u),
                        call1(Builtin::Cot, u),
                    ))
                })
            }),
        ),
        Builtin::Asin => def(
            "asin",
            1..=1,
            |a| unary(a, |x| (x.abs() <= 1.0).then(|| x.asin())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(one_plus_sq(-1.0, u), -0.5))),
        ),
        Builtin::Acos => def(
            "acos",
            1..=1,
            |a| unary(a, |x| (x.abs() <= 1.0).then(|| x.acos())),
            Closed(|a, d| {
                chain(a, d, |u| Expr::negate(Expr::powf(one_plus_sq(-1.0, u), -0.5)))
            }),
        ),
        Builtin::Atan => def(
            "atan",
            1..=1,
            |a| unary(a, |x| Some(x.atan())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(one_plus_sq(1.0, u), -1.0))),
        ),
        Builtin::Acot => def(
            "acot",
            1..=1,
            |a| {
                unary(a, |x| {
                    Some(if x == 0.0 {
                        std::f64::consts::FRAC_PI_2
                    } else {
                        (1.0 / x).atan()
                    })
                })
            },
            Closed(|a, d| {
                chain(a, d, |u| Expr::negate(Expr::powf(one_plus_sq(1.0, u), -1.0)))
            }),
        ),
        Builtin::Asec => def(
            "asec",
            1..=1,
            |a| unary(a, |x| (x.abs() >= 1.0).then(|| (1.0 / x).acos())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    prod(vec![
                        (call1(Builtin::Abs, u), -1.0),
                        (sq_plus_one(-1.0, u), -0.5),
                    ])
                })
            }),
        ),
        Builtin::Acsc => def(
            "acsc",
            1..=1,
            |a| unary(a, |x| (x.abs() >= 1.0).then(|| (1.0 / x).asin())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::negate(prod(vec![
                        (call1(Builtin::Abs, u), -1.0),
                        (sq_plus_one(-1.0, u), -0.5),
                    ]))
                })
            }),
        ),

        // ===== Hyperbolic =====
        Builtin::Sinh => def(
            "sinh",
            1..=1,
            |a| unary(a, |x| Some(x.sinh())),
            Closed(|a, d| chain(a, d, |u| call1(Builtin::Cosh, u))),
        ),
        Builtin::Cosh => def(
            "cosh",
            1..=1,
            |a| unary(a, |x| Some(x.cosh())),
            Closed(|a, d| chain(a, d, |u| call1(Builtin::Sinh, u))),
        ),
        Builtin::Tanh => def(
            "tanh",
            1..=1,
            |a| unary(a, |x| Some(x.tanh())),
            Closed(|a, d| chain(a, d, |u| square(&call1(Builtin::Sech, u)))),
        ),
        Builtin::Coth => def(
            "coth",
            1..=1,
            |a| unary(a, |x| nonzero(x).map(|x| 1.0 / x.tanh())),
            Closed(|a, d| chain(a, d, |u| Expr::negate(square(&call1(Builtin::Csch, u))))),
        ),
        Builtin::Sech => def(
            "sech",
            1..=1,
            |a| unary(a, |x| Some(1.0 / x.cosh())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::negate(Expr::mul_expr(
                        call1(Builtin::Sech, u),
                        call1(Builtin::Tanh, u),
                    ))
                })
            }),
        ),
        Builtin::Csch => def(
            "csch",
            1..=1,
            |a| unary(a, |x| nonzero(x).map(|x| 1.0 / x.sinh())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::negate(Expr::mul_expr(
                        call1(Builtin::Csch, u),
                        call1(Builtin::Coth, u),
                    ))
                })
            }),
        ),
        Builtin::Asinh => def(
            "asinh",
            1..=1,
            |a| unary(a, |x| Some(x.asinh())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(sq_plus_one(1.0, u), -0.5))),
        ),
        Builtin::Acosh => def(
            "acosh",
            1..=1,
            |a| unary(a, |x| (x >= 1.0).then(|| x.acosh())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(sq_plus_one(-1.0, u), -0.5))),
        ),
        Builtin::Atanh => def(
            "atanh",
            1..=1,
            |a| unary(a, |x| (x.abs() < 1.0).then(|| x.atanh())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(one_plus_sq(-1.0, u), -1.0))),
        ),
        Builtin::Acoth => def(
            "acoth",
            1..=1,
            |a| unary(a, |x| (x.abs() > 1.0).then(|| 0.5 * ((x + 1.0) / (x - 1.0)).ln())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(one_plus_sq(-1.0, u), -1.0))),
        ),
        Builtin::Asech => def(
            "asech",
            1..=1,
            |a| unary(a, |x| (x > 0.0 && x <= 1.0).then(|| (1.0 / x).acosh())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::negate(prod(vec![(u.clone(), -1.0), (one_plus_sq(-1.0, u), -0.5)]))
                })
            }),
        ),
        Builtin::Acsch => def(
            "acsch",
            1..=1,
            |a| unary(a, |x| nonzero(x).map(|x| (1.0 / x).asinh())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::negate(prod(vec![
                        (call1(Builtin::Abs, u), -1.0),
                        (one_plus_sq(1.0, u), -0.5),
                    ]))
                })
            }),
        ),

        // ===== Exponential and logarithmic =====
        Builtin::Exp => def(
            "exp",
            1..=1,
            |a| unary(a, |x| Some(x.exp())),
            Closed(|a, d| chain(a, d, |u| call1(Builtin::Exp, u))),
        ),
        Builtin::Ln => def(
            "ln",
            1..=1,
            |a| unary(a, |x| (x > 0.0).then(|| x.ln())),
            Closed(|a, d| chain(a, d, |u| Expr::powf(u.clone(), -1.0))),
        ),
        Builtin::Log => def(
            "log",
            2..=2,
            |a| binary(a, |b, x| (b > 0.0 && b != 1.0 && x > 0.0).then(|| x.ln() / b.ln())),
            Closed(|a, d| match (a, d) {
                // log_b(x) = ln x / ln b
                ([b, x], [db, dx]) => {
                    let ln_b = call1(Builtin::Ln, b);
                    let wrt_x = prod(vec![(x.clone(), -1.0), (ln_b.clone(), -1.0), (dx.clone(), 1.0)]);
                    let wrt_b = prod(vec![
                        (call1(Builtin::Ln, x), 1.0),
                        (b.clone(), -1.0),
                        (ln_b, -2.0),
                        (db.clone(), 1.0),
                    ]);
                    Some(Expr::sub_expr(wrt_x, wrt_b))
                }
                _ => None,
            }),
        ),
        Builtin::Log10 => def(
            "log10",
            1..=1,
            |a| unary(a, |x| (x > 0.0).then(|| x.log10())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::scaled(std::f64::consts::LOG10_E, Expr::powf(u.clone(), -1.0))
                })
            }),
        ),
        Builtin::Log2 => def(
            "log2",
            1..=1,
            |a| unary(a, |x| (x > 0.0).then(|| x.log2())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::scaled(std::f64::consts::LOG2_E, Expr::powf(u.clone(), -1.0))
                })
            }),
        ),

        // ===== Roots and piecewise =====
        Builtin::Sqrt => def(
            "sqrt",
            1..=1,
            |a| unary(a, |x| (x >= 0.0).then(|| x.sqrt())),
            Closed(|a, d| {
                chain(a, d, |u| Expr::scaled(0.5, Expr::powf(call1(Builtin::Sqrt, u), -1.0)))
            }),
        ),
        Builtin::Cbrt => def(
            "cbrt",
            1..=1,
            |a| unary(a, |x| Some(x.cbrt())),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::scaled(1.0 / 3.0, Expr::powf(call1(Builtin::Cbrt, u), -2.0))
                })
            }),
        ),
        Builtin::Abs => def(
            "abs",
            1..=1,
            |a| unary(a, |x| Some(x.abs())),
            Closed(|a, d| chain(a, d, |u| call1(Builtin::Sign, u))),
        ),
        Builtin::Sign => def(
            "sign",
            1..=1,
            |a| unary(a, |x| Some(if x == 0.0 { 0.0 } else { x.signum() })),
            Closed(|a, d| chain(a, d, |_| Expr::zero())),
        ),
        Builtin::Floor => def("floor", 1..=1, |a| unary(a, |x| Some(x.floor())), Unsupported),
        Builtin::Ceil => def("ceil", 1..=1, |a| unary(a, |x| Some(x.ceil())), Unsupported),
        Builtin::Round => def("round", 1..=1, |a| unary(a, |x| Some(x.round())), Unsupported),

        // ===== Special functions =====
        Builtin::Sinc => def(
            "sinc",
            1..=1,
            |a| unary(a, |x| Some(if x == 0.0 { 1.0 } else { x.sin() / x })),
            Closed(|a, d| {
                chain(a, d, |u| {
                    // (cos u - sinc u)/u
                    prod(vec![
                        (
                            Expr::sub_expr(call1(Builtin::Cos, u), call1(Builtin::Sinc, u)),
                            1.0,
                        ),
                        (u.clone(), -1.0),
                    ])
                })
            }),
        ),
        Builtin::Erf => def(
            "erf",
            1..=1,
            |a| unary(a, |x| Some(math::eval_erf(x))),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::scaled(
                        TWO_OVER_SQRT_PI,
                        call1(Builtin::Exp, &Expr::negate(square(u))),
                    )
                })
            }),
        ),
        Builtin::Erfc => def(
            "erfc",
            1..=1,
            |a| unary(a, |x| Some(math::eval_erfc(x))),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::scaled(
                        -TWO_OVER_SQRT_PI,
                        call1(Builtin::Exp, &Expr::negate(square(u))),
                    )
                })
            }),
        ),
        Builtin::Gamma => def(
            "gamma",
            1..=1,
            |a| unary(a, math::eval_gamma),
            Closed(|a, d| {
                chain(a, d, |u| {
                    Expr::mul_expr(call1(Builtin::Gamma, u), call1(Builtin::Digamma, u))
                })
            }),
        ),
        Builtin::Digamma => def(
            "digamma",
            1..=1,
            |a| unary(a, math::eval_digamma),
            Closed(|a, d| chain(a, d, |u| call1(Builtin::Trigamma, u))),
        ),
        Builtin::Trigamma => def(
            "trigamma",
            1..=1,
            |a| unary(a, math::eval_trigamma),
            Closed(|a, d| {
                chain(a, d, |u| call2(Builtin::Polygamma, &Expr::number(2.0), u))
            }),
        ),
        Builtin::Tetragamma => def(
            "tetragamma",
            1..=1,
            |a| unary(a, math::eval_tetragamma),
            Closed(|a, d| {
                chain(a, d, |u| call2(Builtin::Polygamma, &Expr::number(3.0), u))
            }),
        ),
        Builtin::Polygamma => def(
            "polygamma",
            2..=2,
            |a| {
                binary(a, |n, x| {
                    let n = u32::try_from(order(n)?).ok()?;
                    math::eval_polygamma(n, x)
                })
            },
            Closed(|a, d| {
                order_chain(a, d, |n, x| call2(Builtin::Polygamma, &shift(n, 1.0), x))
            }),
        ),
        Builtin::Beta => def(
            "beta",
            2..=2,
            |a| binary(a, math::eval_beta),
            Closed(|a, d| match (a, d) {
                // ∂B/∂a = B(a,b)(ψ(a) - ψ(a+b)), symmetric in b
                ([x, y], [dx, dy]) => {
                    let beta = call2(Builtin::Beta, x, y);
                    let psi_sum = call1(Builtin::Digamma, &Expr::add_expr(x.clone(), y.clone()));
                    let partial = |v: &Expr| {
                        Expr::mul_expr(
                            beta.clone(),
                            Expr::sub_expr(call1(Builtin::Digamma, v), psi_sum.clone()),
                        )
                    };
                    Some(Expr::add_expr(
                        Expr::mul_expr(partial(x), dx.clone()),
                        Expr::mul_expr(partial(y), dy.clone()),
                    ))
                }
                _ => None,
            }),
        ),
        Builtin::BesselJ => def(
            "besselj",
            2..=2,
            |a| binary(a, |n, x| math::bessel_j(order(n)?, x)),
            Closed(|a, d| {
                order_chain(a, d, |n, x| {
                    // J'ₙ = (Jₙ₋₁ - Jₙ₊₁)/2
                    Expr::sum_terms(vec![
                        (0.5, call2(Builtin::BesselJ, &shift(n, -1.0), x)),
                        (-0.5, call2(Builtin::BesselJ, &shift(n, 1.0), x)),
                    ])
                })
            }),
        ),
        Builtin::BesselY => def(
            "bessely",
            2..=2,
            |a| binary(a, |n, x| math::bessel_y(order(n)?, x)),
            Closed(|a, d| {
                order_chain(a, d, |n, x| {
                    Expr::sum_terms(vec![
                        (0.5, call2(Builtin::BesselY, &shift(n, -1.0), x)),
                        (-0.5, call2(Builtin::BesselY, &shift(n, 1.0), x)),
                    ])
                })
            }),
        ),
        Builtin::BesselI => def(
            "besseli",
            2..=2,
            |a| binary(a, |n, x| math::bessel_i(order(n)?, x)),
            Closed(|a, d| {
                order_chain(a, d, |n, x| {
                    // I'ₙ = (Iₙ₋₁ + Iₙ₊₁)/2
                    Expr::sum_terms(vec![
                        (0.5, call2(Builtin::BesselI, &shift(n, -1.0), x)),
                        (0.5, call2(Builtin::BesselI, &shift(n, 1.0), x)),
                    ])
                })
            }),
        ),
        Builtin::BesselK => def(
            "besselk",
            2..=2,
            |a| binary(a, |n, x| math::bessel_k(order(n)?, x)),
            Closed(|a, d| {
                order_chain(a, d, |n, x| {
                    // K'ₙ = -(Kₙ₋₁ + Kₙ₊₁)/2
                    Expr::sum_terms(vec![
                        (-0.5, call2(Builtin::BesselK, &shift(n, -1.0), x)),
                        (-0.5, call2(Builtin::BesselK, &shift(n, 1.0), x)),
                    ])
                })
            }),
        ),
        Builtin::Zeta => def("zeta", 1..=1, |a| unary(a, math::eval_zeta), Live),
        Builtin::ZetaDeriv => def(
            "zeta_deriv",
            2..=2,
            |a| binary(a, |n, s| math::eval_zeta_deriv(zeta_order(n)?, s)),
            Closed(|a, d| {
                order_chain(a, d, |n, s| call2(Builtin::ZetaDeriv, &shift(n, 1.0), s))
            }),
        ),
        Builtin::LambertW => def(
            "lambertw",
            1..=1,
            |a| unary(a, math::eval_lambert_w),
            Closed(|a, d| {
                chain(a, d, |u| {
                    // W/(u(1+W))
                    let w = call1(Builtin::LambertW, u);
                    prod(vec![
                        (w.clone(), 1.0),
                        (u.clone(), -1.0),
                        (Expr::add_expr(Expr::one(), w), -1.0),
                    ])
                })
            }),
        ),
        Builtin::EllipticK => def(
            "elliptic_k",
            1..=1,
            |a| unary(a, math::eval_elliptic_k),
            Closed(|a, d| {
                chain(a, d, |k| {
                    // E/(k(1-k²)) - K/k
                    Expr::sub_expr(
                        prod(vec![
                            (call1(Builtin::EllipticE, k), 1.0),
                            (k.clone(), -1.0),
                            (one_plus_sq(-1.0, k), -1.0),
                        ]),
                        prod(vec![(call1(Builtin::EllipticK, k), 1.0), (k.clone(), -1.0)]),
                    )
                })
            }),
        ),
        Builtin::EllipticE => def(
            "elliptic_e",
            1..=1,
            |a| unary(a, math::eval_elliptic_e),
            Closed(|a, d| {
                chain(a, d, |k| {
                    // (E - K)/k
                    prod(vec![
                        (
                            Expr::sub_expr(
                                call1(Builtin::EllipticE, k),
                                call1(Builtin::EllipticK, k),
                            ),
                            1.0,
                        ),
                        (k.clone(), -1.0),
                    ])
                })
            }),
        ),
        Builtin::Hermite => def(
            "hermite",
            2..=2,
            |a| binary(a, |n, x| math::eval_hermite(order(n)?, x)),
            Closed(|a, d| {
                order_chain(a, d, |n, x| {
                    // H'ₙ = 2n Hₙ₋₁; H₀ is constant
                    if n.is_zero() {
                        return Expr::zero();
                    }
                    Expr::scaled(
                        2.0,
                        Expr::mul_expr(n.clone(), call2(Builtin::Hermite, &shift(n, -1.0), x)),
                    )
                })
            }),
        ),
        Builtin::AssocLegendre => def(
            "assoc_legendre",
            3..=3,
            |a| {
                with_degree(a, |l, m, rest| match rest {
                    [x] => math::eval_assoc_legendre(l, m, *x),
                    _ => None,
                })
            },
            Closed(|a, d| {
                degree_chain(a, d, |l, m, x| {
                    // (l x Pₗᵐ - (l+m) Pₗ₋₁ᵐ)/(x² - 1)
                    let p = |l: &Expr| {
                        Expr::func(Builtin::AssocLegendre, vec![l.clone(), m.clone(), x.clone()])
                    };
                    let numerator = Expr::sub_expr(
                        Expr::product(vec![l.clone(), x.clone(), p(l)]),
                        Expr::mul_expr(Expr::add_expr(l.clone(), m.clone()), p(&shift(l, -1.0))),
                    );
                    prod(vec![(numerator, 1.0), (sq_plus_one(-1.0, x), -1.0)])
                })
            }),
        ),
        Builtin::SphericalHarmonic => def(
            "spherical_harmonic",
            4..=4,
            |a| {
                with_degree(a, |l, m, rest| match rest {
                    [theta, phi] => math::eval_spherical_harmonic(l, m, *theta, *phi),
                    _ => None,
                })
            },
            Closed(spherical_harmonic_derivative),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(b: Builtin, args: &[f64]) -> Option<f64> {
        (b.definition().eval)(args)
    }

    #[test]
    fn test_domain_checks() {
        assert!(eval(Builtin::Ln, &[0.0]).is_none());
        assert!(eval(Builtin::Sqrt, &[-1.0]).is_none());
        assert!(eval(Builtin::Asin, &[1.5]).is_none());
        assert!(eval(Builtin::Log, &[1.0, 5.0]).is_none());
        assert!(eval(Builtin::BesselJ, &[0.5, 1.0]).is_none());
        assert!(eval(Builtin::Zeta, &[1.0]).is_none());
        assert!(eval(Builtin::Gamma, &[-2.0]).is_none());
    }

    #[test]
    fn test_values() {
        assert_eq!(eval(Builtin::Log, &[2.0, 8.0]), Some(3.0));
        assert_eq!(eval(Builtin::Sign, &[-4.0]), Some(-1.0));
        assert_eq!(eval(Builtin::Floor, &[2.7]), Some(2.0));
        assert!((eval(Builtin::Polygamma, &[0.0, 1.0]).unwrap() + 0.5772156649015329).abs() < 1e-12);
    }

    #[test]
    fn test_extended_values() {
        let close = |a: Option<f64>, b: f64| a.is_some_and(|a| (a - b).abs() < 1e-12);
        assert!(close(eval(Builtin::Sinc, &[0.0]), 1.0));
        assert!(close(eval(Builtin::Sinc, &[2.0]), 2.0f64.sin() / 2.0));
        assert!(close(eval(Builtin::Acoth, &[2.0]), 0.5 * 3.0f64.ln()));
        assert!(close(eval(Builtin::Asech, &[0.5]), 2.0f64.acosh()));
        assert!(close(eval(Builtin::Acsch, &[2.0]), 0.5f64.asinh()));
        assert!(close(eval(Builtin::Hermite, &[2.0, 3.0]), 34.0));
        assert!(close(eval(Builtin::AssocLegendre, &[3.0, 2.0, 0.4]), 5.04));
        assert!(close(
            eval(Builtin::ZetaDeriv, &[1.0, 2.0]),
            math::eval_zeta_deriv(1, 2.0).unwrap_or(f64::NAN)
        ));
        // ψ''(1) = -2ζ(3)
        let tetragamma = eval(Builtin::Tetragamma, &[1.0]).unwrap();
        assert!((tetragamma + 2.0 * 1.202_056_903_159_594_2).abs() < 1e-9);
    }

    #[test]
    fn test_extended_domains() {
        assert!(eval(Builtin::Acoth, &[0.5]).is_none());
        assert!(eval(Builtin::Asech, &[1.5]).is_none());
        assert!(eval(Builtin::Acsch, &[0.0]).is_none());
        assert!(eval(Builtin::BesselK, &[0.0, -1.0]).is_none());
        assert!(eval(Builtin::EllipticK, &[1.0]).is_none());
        assert!(eval(Builtin::ZetaDeriv, &[-1.0, 2.0]).is_none());
        assert!(eval(Builtin::ZetaDeriv, &[0.5, 2.0]).is_none());
        assert!(eval(Builtin::Hermite, &[1.5, 2.0]).is_none());
        assert!(eval(Builtin::AssocLegendre, &[2.0, 1.0, 1.2]).is_none());
    }

    #[test]
    fn test_wrong_arity_evaluates_to_none() {
        assert!(eval(Builtin::Sin, &[1.0, 2.0]).is_none());
        assert!(eval(Builtin::Beta, &[1.0]).is_none());
    }

    #[test]
    fn test_piecewise_functions_are_not_differentiable() {
        for b in [Builtin::Floor, Builtin::Ceil, Builtin::Round] {
            assert!(matches!(b.definition().derivative, DerivativeRule::Unsupported));
        }
        assert!(matches!(Builtin::Zeta.definition().derivative, DerivativeRule::Live));
    }
}
