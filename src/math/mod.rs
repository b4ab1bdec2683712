//! Special-function kernels
//!
//! Functions that can hit a pole or leave their real domain return `Option<T>`;
//! the evaluator maps `None` to a typed domain error. Key validations:
//!
//! - **Gamma family**: non-positive integers are poles
//! - **Zeta**: `s = 1` is a pole; everything else is reached by continuation
//! - **Bessel Y and K**: require `x > 0`
//! - **Elliptic K**: `|k| < 1`; **Elliptic E**: `|k| ≤ 1`
//! - **Legendre**: `|x| ≤ 1`
//! - **Lambert W**: principal branch, `x ≥ -1/e`

use crate::traits::{MathScalar, lit};

pub mod bessel;
pub mod elliptic;
pub mod gamma;
pub mod polynomials;
pub mod zeta;

pub use bessel::{bessel_i, bessel_j, bessel_k, bessel_y};
pub use elliptic::{eval_elliptic_e, eval_elliptic_k};
pub use gamma::{
    eval_beta, eval_digamma, eval_gamma, eval_polygamma, eval_tetragamma, eval_trigamma,
};
pub use polynomials::{eval_assoc_legendre, eval_hermite, eval_spherical_harmonic};
pub use zeta::{eval_zeta, eval_zeta_deriv};

/// Error function
///
/// Power series below 3, continued-fraction `erfc` above.
pub fn eval_erf<T: MathScalar>(x: T) -> T {
    if x.is_nan() {
        return x;
    }
    let ax = x.abs();
    let v = if ax < lit(3.0) {
        erf_series(ax)
    } else {
        T::one() - erfc_fraction(ax)
    };
    if x < T::zero() { -v } else { v }
}

/// Complementary error function `1 - erf(x)` without cancellation for large x
pub fn eval_erfc<T: MathScalar>(x: T) -> T {
    if x.is_nan() {
        return x;
    }
    if x < T::zero() {
        return lit::<T>(2.0) - eval_erfc(-x);
    }
    if x < lit(3.0) {
        T::one() - erf_series(x)
    } else {
        erfc_fraction(x)
    }
}

fn erf_series<T: MathScalar>(x: T) -> T {
    // erf(x) = 2/√π Σ (-1)ⁿ x^(2n+1) / (n! (2n+1))
    let x2 = x * x;
    let mut power = x;
    let mut sum = x;
    for n in 1..100 {
        power = -power * x2 / lit(n as f64);
        let term = power / lit((2 * n + 1) as f64);
        sum = sum + term;
        if term.abs() <= T::epsilon() * sum.abs() {
            break;
        }
    }
    lit::<T>(2.0) / T::PI().sqrt() * sum
}

fn erfc_fraction<T: MathScalar>(x: T) -> T {
    // erfc(x) = e^(-x²)/√π · 1/(x + (1/2)/(x + 1/(x + (3/2)/(x + ...))))
    let mut t = x;
    for n in (1..=60).rev() {
        t = x + lit::<T>(n as f64 / 2.0) / t;
    }
    (-(x * x)).exp() / (T::PI().sqrt() * t)
}

/// Principal branch W₀ of the Lambert W function, solved by Halley iteration
pub fn eval_lambert_w<T: MathScalar>(x: T) -> Option<T> {
    let branch_point = -(-T::one()).exp();
    if x.is_nan() || x < branch_point {
        return None;
    }
    if x == branch_point {
        return Some(-T::one());
    }
    if x == T::zero() {
        return Some(T::zero());
    }
    let one = T::one();
    let two = lit::<T>(2.0);
    let mut w = if x < lit(-0.32) {
        // Series about the branch point
        let p = (two * (T::E() * x + one)).sqrt();
        -one + p - p * p / lit(3.0)
    } else if x < lit(3.0) {
        (one + x).ln() * lit(0.8)
    } else {
        let l = x.ln();
        l - l.ln()
    };

    for _ in 0..64 {
        let ew = w.exp();
        let f = w * ew - x;
        let wp1 = w + one;
        if wp1 == T::zero() {
            break;
        }
        let denom = ew * wp1 - (w + two) * f / (two * wp1);
        let step = f / denom;
        w = w - step;
        if step.abs() <= T::epsilon() * (one + w.abs()) {
            break;
        }
    }
    Some(w)
}
