//! Gamma family: Γ, ln Γ, ψ, ψ₁, ψ₂ and ψ⁽ⁿ⁾

use crate::traits::{MathScalar, lit};

/// Lanczos coefficients, g = 7, n = 9
const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Even-index Bernoulli numbers B₂ … B₂₀
pub(crate) const BERNOULLI_EVEN: [f64; 10] = [
    1.0 / 6.0,
    -1.0 / 30.0,
    1.0 / 42.0,
    -1.0 / 30.0,
    5.0 / 66.0,
    -691.0 / 2730.0,
    7.0 / 6.0,
    -3617.0 / 510.0,
    43867.0 / 798.0,
    -174_611.0 / 330.0,
];

/// Upward shifts allowed before a far-negative argument is rejected
const MAX_SHIFT: usize = 100_000;

fn is_pole<T: MathScalar>(x: T) -> bool {
    x <= T::zero() && x.fract() == T::zero()
}

/// Lanczos sum `A_g(x)` for the shifted argument `x - 1`
fn lanczos_sum<T: MathScalar>(xm1: T) -> T {
    let mut ag = lit::<T>(LANCZOS[0]);
    for (i, &c) in LANCZOS.iter().enumerate().skip(1) {
        ag = ag + lit::<T>(c) / (xm1 + lit::<T>(i as f64));
    }
    ag
}

/// Γ(x). `None` at the poles 0, -1, -2, …
pub fn eval_gamma<T: MathScalar>(x: T) -> Option<T> {
    if x.is_nan() || is_pole(x) {
        return None;
    }
    let half = lit::<T>(0.5);
    let pi = T::PI();
    if x < half {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        let g = eval_gamma(T::one() - x)?;
        return Some(pi / ((pi * x).sin() * g));
    }
    let xm1 = x - T::one();
    let t = xm1 + lit::<T>(LANCZOS_G) + half;
    let sqrt_two_pi = (lit::<T>(2.0) * pi).sqrt();
    // Split t^(x-1/2) so the intermediate does not overflow before e^-t shrinks it
    let pw = t.powf((xm1 + half) / lit::<T>(2.0));
    Some(sqrt_two_pi * pw * ((-t).exp() * pw) * lanczos_sum(xm1))
}

/// ln Γ(x) for `x > 0`
pub fn eval_ln_gamma<T: MathScalar>(x: T) -> Option<T> {
    if x.is_nan() || x <= T::zero() {
        return None;
    }
    let half = lit::<T>(0.5);
    if x < half {
        // ln Γ(x) = ln π - ln sin(πx) - ln Γ(1-x)
        let pi = T::PI();
        return Some(pi.ln() - (pi * x).sin().ln() - eval_ln_gamma(T::one() - x)?);
    }
    let xm1 = x - T::one();
    let t = xm1 + lit::<T>(LANCZOS_G) + half;
    let ln_sqrt_two_pi = lit::<T>(0.918_938_533_204_672_8);
    Some(ln_sqrt_two_pi + (xm1 + half) * t.ln() - t + lanczos_sum(xm1).ln())
}

/// Digamma ψ(x) = Γ'(x)/Γ(x)
///
/// Shifts the argument above 10 with `ψ(x) = ψ(x+1) - 1/x`, then applies the
/// asymptotic series. Negative arguments use the reflection formula.
pub fn eval_digamma<T: MathScalar>(x: T) -> Option<T> {
    if x.is_nan() || is_pole(x) {
        return None;
    }
    let one = T::one();
    let pi = T::PI();
    if x < T::zero() {
        // ψ(x) = ψ(1-x) - π cot(πx)
        return Some(eval_digamma(one - x)? - pi / (pi * x).tan());
    }

    let mut xv = x;
    let mut acc = T::zero();
    let ten = lit::<T>(10.0);
    while xv < ten {
        acc = acc - one / xv;
        xv = xv + one;
    }

    let inv2 = one / (xv * xv);
    let mut series = T::zero();
    let mut pw = inv2;
    for (k, &b) in BERNOULLI_EVEN.iter().enumerate().take(7) {
        let two_k = lit::<T>(2.0 * (k + 1) as f64);
        series = series + lit::<T>(b) / two_k * pw;
        pw = pw * inv2;
    }
    Some(acc + xv.ln() - lit::<T>(0.5) / xv - series)
}

/// Trigamma ψ₁(x)
pub fn eval_trigamma<T: MathScalar>(x: T) -> Option<T> {
    eval_polygamma(1, x)
}

/// Tetragamma ψ₂(x)
pub fn eval_tetragamma<T: MathScalar>(x: T) -> Option<T> {
    eval_polygamma(2, x)
}

/// Polygamma ψ⁽ⁿ⁾(x); `n = 0` is the digamma function.
///
/// Uses `ψ⁽ⁿ⁾(x) = ψ⁽ⁿ⁾(x+1) - (-1)ⁿ n! / x^(n+1)` to move the argument into the
/// asymptotic region `x ≥ 15 + n`.
pub fn eval_polygamma<T: MathScalar>(n: u32, x: T) -> Option<T> {
    if n == 0 {
        return eval_digamma(x);
    }
    if x.is_nan() || is_pole(x) {
        return None;
    }
    let one = T::one();
    let nf = n as f64;
    let n_fact = factorial(n);
    let sign_n = if n % 2 == 0 { one } else { -one };
    let n1 = lit::<T>(nf + 1.0);

    let mut xv = x;
    let mut acc = T::zero();
    let threshold = lit::<T>(15.0 + nf);
    let mut shifts = 0;
    while xv < threshold {
        acc = acc - sign_n * lit::<T>(n_fact) / xv.powf(n1);
        xv = xv + one;
        shifts += 1;
        if shifts > MAX_SHIFT {
            return None;
        }
    }

    // (-1)^(n+1) [ (n-1)!/x^n + n!/(2x^(n+1)) + Σ B₂ₖ (2k+n-1)!/((2k)! x^(2k+n)) ]
    let mut series = lit::<T>(factorial(n - 1)) / xv.powf(lit::<T>(nf))
        + lit::<T>(n_fact) / (lit::<T>(2.0) * xv.powf(n1));
    for (k, &b) in BERNOULLI_EVEN.iter().enumerate() {
        let two_k = 2 * (k as u32 + 1);
        // (2k+n-1)! / (2k)!
        let ratio: f64 = (two_k + 1..two_k + n).map(|i| i as f64).product();
        let term = lit::<T>(b * ratio) / xv.powf(lit::<T>((two_k + n) as f64));
        series = series + term;
        if term.abs() < T::epsilon() * series.abs() {
            break;
        }
    }
    Some(acc - sign_n * series)
}

/// Beta function B(a, b) = Γ(a)Γ(b)/Γ(a+b)
pub fn eval_beta<T: MathScalar>(a: T, b: T) -> Option<T> {
    if a > T::zero() && b > T::zero() {
        let ln = eval_ln_gamma(a)? + eval_ln_gamma(b)? - eval_ln_gamma(a + b)?;
        return Some(ln.exp());
    }
    let ga = eval_gamma(a)?;
    let gb = eval_gamma(b)?;
    match eval_gamma(a + b) {
        Some(gab) => Some(ga * gb / gab),
        // 1/Γ vanishes at its poles
        None => Some(T::zero()),
    }
}

pub(crate) fn factorial(n: u32) -> f64 {
    (1..=n).map(|i| i as f64).product()
}
