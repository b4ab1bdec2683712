//! Bessel functions of integer order: Jₙ, Yₙ, Iₙ, Kₙ
//!
//! Small arguments use the ascending power series; large arguments use the
//! Hankel asymptotic expansion for orders 0 and 1 and the three-term recurrence
//! upward, which is stable while `n < x` for J and for all n for Y.
//!
//! K₀ and K₁ come from the trapezoidal rule on `∫₀^∞ e^(-x cosh t) cosh(nt) dt`,
//! which converges geometrically for this analytic, doubly decaying integrand.

use crate::traits::{MathScalar, lit};

/// Switch-over point from power series to asymptotic expansion
const SERIES_LIMIT: f64 = 12.0;
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const MAX_TERMS: usize = 300;

/// Jₙ(x)
pub fn bessel_j<T: MathScalar>(n: i32, x: T) -> Option<T> {
    if x.is_nan() {
        return None;
    }
    let n_abs = n.unsigned_abs();
    // J₋ₙ = (-1)ⁿ Jₙ and Jₙ(-x) = (-1)ⁿ Jₙ(x)
    let flip = (n < 0 && n_abs % 2 == 1) != (x < T::zero() && n_abs % 2 == 1);
    let ax = x.abs();
    let v = if ax <= lit(SERIES_LIMIT) || lit::<T>(n_abs as f64) >= ax {
        j_series(n_abs, ax)
    } else {
        let j0 = hankel(0, ax).0;
        let j1 = hankel(1, ax).0;
        upward(n_abs, ax, j0, j1)
    };
    Some(if flip { -v } else { v })
}

/// Yₙ(x), defined for `x > 0`
pub fn bessel_y<T: MathScalar>(n: i32, x: T) -> Option<T> {
    if x.is_nan() || x <= T::zero() {
        return None;
    }
    let n_abs = n.unsigned_abs();
    let v = if x <= lit(SERIES_LIMIT) {
        y_series(n_abs, x)
    } else {
        let y0 = hankel(0, x).1;
        let y1 = hankel(1, x).1;
        upward(n_abs, x, y0, y1)
    };
    // Y₋ₙ = (-1)ⁿ Yₙ
    Some(if n < 0 && n_abs % 2 == 1 { -v } else { v })
}

/// Modified Bessel function Iₙ(x)
pub fn bessel_i<T: MathScalar>(n: i32, x: T) -> Option<T> {
    if x.is_nan() {
        return None;
    }
    let n_abs = n.unsigned_abs();
    let ax = x.abs();
    let v = if ax <= lit(30.0) || lit::<T>(n_abs as f64) * lit(2.0) >= ax {
        i_series(n_abs, ax)
    } else {
        i_asymptotic(n_abs, ax)
    };
    // I₋ₙ = Iₙ and Iₙ(-x) = (-1)ⁿ Iₙ(x)
    Some(if x < T::zero() && n_abs % 2 == 1 { -v } else { v })
}

/// Modified Bessel function of the second kind Kₙ(x), defined for `x > 0`
pub fn bessel_k<T: MathScalar>(n: i32, x: T) -> Option<T> {
    if x.is_nan() || x <= T::zero() {
        return None;
    }
    // K₋ₙ = Kₙ; Kₖ₊₁ = Kₖ₋₁ + (2k/x) Kₖ is stable upward
    let n_abs = n.unsigned_abs();
    let k0 = k_integral(0, x);
    if n_abs == 0 {
        return Some(k0);
    }
    let (mut prev, mut cur) = (k0, k_integral(1, x));
    for k in 1..n_abs {
        let next = prev + lit::<T>(2.0 * k as f64) / x * cur;
        prev = cur;
        cur = next;
    }
    Some(cur)
}

/// Trapezoidal sum of `∫₀^∞ e^(-x cosh t) cosh(nt) dt`; the peak narrows like `1/√x`
fn k_integral<T: MathScalar>(n: u32, x: T) -> T {
    let h = if x <= T::one() {
        lit::<T>(0.1)
    } else {
        lit::<T>(0.1) / x.sqrt()
    };
    let nt = lit::<T>(n as f64);
    let mut sum = (-x).exp() / lit(2.0);
    for k in 1..10_000u32 {
        let t = h * lit(k as f64);
        let term = (-x * t.cosh()).exp() * (nt * t).cosh();
        sum = sum + term;
        if term <= lit::<T>(1e-18) * sum {
            break;
        }
    }
    h * sum
}

/// Leading factor `(x/2)ⁿ / n!`
fn lead<T: MathScalar>(n: u32, half_x: T) -> T {
    (1..=n).fold(T::one(), |acc, k| acc * half_x / lit(k as f64))
}

fn j_series<T: MathScalar>(n: u32, x: T) -> T {
    let half_x = x / lit(2.0);
    let q = -(half_x * half_x);
    let mut term = lead(n, half_x);
    let mut sum = term;
    for m in 1..MAX_TERMS {
        term = term * q / (lit::<T>(m as f64) * lit((m as u32 + n) as f64));
        sum = sum + term;
        if term.abs() <= T::epsilon() * sum.abs() {
            break;
        }
    }
    sum
}

fn i_series<T: MathScalar>(n: u32, x: T) -> T {
    let half_x = x / lit(2.0);
    let q = half_x * half_x;
    let mut term = lead(n, half_x);
    let mut sum = term;
    for m in 1..MAX_TERMS {
        term = term * q / (lit::<T>(m as f64) * lit((m as u32 + n) as f64));
        sum = sum + term;
        if term.abs() <= T::epsilon() * sum.abs() {
            break;
        }
    }
    sum
}

/// Yₙ(x) = -(1/π) Σ_{k<n} (n-k-1)!/k! (x/2)^(2k-n) + (2/π) ln(x/2) Jₙ(x)
///         - (1/π) Σ_{k≥0} (ψ(k+1) + ψ(n+k+1)) (-1)ᵏ (x/2)^(2k+n) / (k!(n+k)!)
fn y_series<T: MathScalar>(n: u32, x: T) -> T {
    let pi = T::PI();
    let half_x = x / lit(2.0);

    let mut finite = T::zero();
    if n > 0 {
        // k = 0 term is (n-1)! (x/2)^(-n)
        let mut term = (1..n).fold(T::one(), |acc, i| acc * lit(i as f64)) / half_x.powi(n as i32);
        finite = term;
        for k in 1..n {
            term = term * half_x * half_x / (lit::<T>(k as f64) * lit((n - k) as f64));
            finite = finite + term;
        }
    }

    // ψ(k+1) = -γ + H_k
    let gamma = lit::<T>(EULER_GAMMA);
    let harmonic = |m: u32| (1..=m).fold(T::zero(), |acc, i| acc + T::one() / lit(i as f64));
    let mut psi_k = -gamma;
    let mut psi_nk = -gamma + harmonic(n);
    let q = -(half_x * half_x);
    let mut term = lead(n, half_x);
    let mut series = (psi_k + psi_nk) * term;
    for k in 1..MAX_TERMS as u32 {
        psi_k = psi_k + T::one() / lit(k as f64);
        psi_nk = psi_nk + T::one() / lit((n + k) as f64);
        term = term * q / (lit::<T>(k as f64) * lit((n + k) as f64));
        let contribution = (psi_k + psi_nk) * term;
        series = series + contribution;
        if contribution.abs() <= T::epsilon() * series.abs() && term.abs() <= T::epsilon() {
            break;
        }
    }

    (-finite + lit::<T>(2.0) * half_x.ln() * j_series(n, x) - series) / pi
}

/// Hankel expansion: returns `(Jₙ(x), Yₙ(x))` for large positive x
fn hankel<T: MathScalar>(n: u32, x: T) -> (T, T) {
    let mu = lit::<T>(4.0 * (n as f64) * (n as f64));
    let eight_x = lit::<T>(8.0) * x;
    let mut p = T::one();
    let mut q = T::zero();
    let mut a = T::one();
    let mut last = T::infinity();
    for k in 1..60u32 {
        let odd = lit::<T>((2 * k - 1) as f64);
        a = a * (mu - odd * odd) / (lit::<T>(k as f64) * eight_x);
        // Asymptotic series: stop before the terms start growing
        if a.abs() >= last {
            break;
        }
        last = a.abs();
        match k % 4 {
            1 => q = q + a,
            2 => p = p - a,
            3 => q = q - a,
            _ => p = p + a,
        }
        if a.abs() <= T::epsilon() {
            break;
        }
    }
    let chi = x - (lit::<T>(n as f64) / lit(2.0) + lit(0.25)) * T::PI();
    let amp = (lit::<T>(2.0) / (T::PI() * x)).sqrt();
    (
        amp * (p * chi.cos() - q * chi.sin()),
        amp * (p * chi.sin() + q * chi.cos()),
    )
}

/// Cₖ₊₁ = (2k/x) Cₖ - Cₖ₋₁
fn upward<T: MathScalar>(n: u32, x: T, c0: T, c1: T) -> T {
    if n == 0 {
        return c0;
    }
    let (mut prev, mut cur) = (c0, c1);
    for k in 1..n {
        let next = lit::<T>(2.0 * k as f64) / x * cur - prev;
        prev = cur;
        cur = next;
    }
    cur
}

fn i_asymptotic<T: MathScalar>(n: u32, x: T) -> T {
    let mu = lit::<T>(4.0 * (n as f64) * (n as f64));
    let eight_x = lit::<T>(8.0) * x;
    let mut sum = T::one();
    let mut a = T::one();
    let mut last = T::infinity();
    for k in 1..60u32 {
        let odd = lit::<T>((2 * k - 1) as f64);
        a = -a * (mu - odd * odd) / (lit::<T>(k as f64) * eight_x);
        if a.abs() >= last {
            break;
        }
        last = a.abs();
        sum = sum + a;
        if a.abs() <= T::epsilon() * sum.abs() {
            break;
        }
    }
    x.exp() / (lit::<T>(2.0) * T::PI() * x).sqrt() * sum
}
