//! Orthogonal polynomials and spherical harmonics, all by three-term recurrence

use crate::traits::{MathScalar, lit};

/// Physicists' Hermite polynomial Hₙ(x); `None` for negative `n`
///
/// `Hₖ₊₁ = 2x Hₖ - 2k Hₖ₋₁`
pub fn eval_hermite<T: MathScalar>(n: i32, x: T) -> Option<T> {
    if n < 0 {
        return None;
    }
    let two = lit::<T>(2.0);
    let (mut prev, mut cur) = (T::one(), two * x);
    if n == 0 {
        return Some(prev);
    }
    for k in 1..n {
        let next = two * x * cur - two * lit(k as f64) * prev;
        prev = cur;
        cur = next;
    }
    Some(cur)
}

/// Associated Legendre function Pₗᵐ(x) on `[-1, 1]`, with the Condon–Shortley phase
///
/// Negative degrees use `P₋ₗ₋₁ = Pₗ`, negative orders
/// `Pₗ⁻ᵐ = (-1)ᵐ (l-m)!/(l+m)! Pₗᵐ`, and `|m| > l` gives zero.
pub fn eval_assoc_legendre<T: MathScalar>(l: i32, m: i32, x: T) -> Option<T> {
    if x.is_nan() || x.abs() > T::one() {
        return None;
    }
    let l = if l < 0 { -l - 1 } else { l };
    let m_abs = m.abs();
    if m_abs > l {
        return Some(T::zero());
    }
    let p = legendre_nonneg(l as u32, m_abs as u32, x);
    if m >= 0 {
        return Some(p);
    }
    // (l-|m|)!/(l+|m|)!
    let ratio = ((l - m_abs + 1)..=(l + m_abs)).fold(T::one(), |acc, i| acc / lit(i as f64));
    let sign = if m_abs % 2 == 0 { T::one() } else { -T::one() };
    Some(sign * ratio * p)
}

/// Pₗᵐ for `0 ≤ m ≤ l`: Pₘᵐ, then Pₘ₊₁ᵐ, then upward in l
fn legendre_nonneg<T: MathScalar>(l: u32, m: u32, x: T) -> T {
    let one = T::one();
    let mut pmm = one;
    if m > 0 {
        let root = ((one - x) * (one + x)).sqrt();
        let mut odd = one;
        for _ in 0..m {
            pmm = -pmm * odd * root;
            odd = odd + lit(2.0);
        }
    }
    if l == m {
        return pmm;
    }
    let mut prev = pmm;
    let mut cur = x * lit((2 * m + 1) as f64) * pmm;
    for ll in (m + 2)..=l {
        let next = (x * lit((2 * ll - 1) as f64) * cur - lit::<T>((ll + m - 1) as f64) * prev)
            / lit((ll - m) as f64);
        prev = cur;
        cur = next;
    }
    cur
}

/// Real spherical harmonic `Yₗᵐ(θ, φ) = Nₗᵐ Pₗᵐ(cos θ) cos(mφ)`
///
/// `Nₗᵐ = √((2l+1)/(4π) · (l-m)!/(l+m)!)`. Degrees and orders outside
/// `|m| ≤ l` give zero, as the recurrences for derivatives expect.
pub fn eval_spherical_harmonic<T: MathScalar>(l: i32, m: i32, theta: T, phi: T) -> Option<T> {
    if theta.is_nan() || phi.is_nan() {
        return None;
    }
    if l < 0 || m.abs() > l {
        return Some(T::zero());
    }
    let p = eval_assoc_legendre(l, m, theta.cos())?;
    // (l-m)!/(l+m)! for signed m
    let ratio = if m >= 0 {
        ((l - m + 1)..=(l + m)).fold(T::one(), |acc, i| acc / lit(i as f64))
    } else {
        ((l + m + 1)..=(l - m)).fold(T::one(), |acc, i| acc * lit(i as f64))
    };
    let norm = (lit::<T>((2 * l + 1) as f64) / (lit::<T>(4.0) * T::PI()) * ratio).sqrt();
    Some(norm * p * (lit::<T>(m as f64) * phi).cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_hermite_low_orders() {
        let x = 0.7f64;
        assert_eq!(eval_hermite(0, x), Some(1.0));
        assert_eq!(eval_hermite(1, x), Some(1.4));
        // H₃ = 8x³ - 12x
        assert_relative_eq!(eval_hermite(3, x).unwrap(), 8.0 * x.powi(3) - 12.0 * x, epsilon = 1e-14);
        // H₅ = 32x⁵ - 160x³ + 120x
        let h5 = 32.0 * x.powi(5) - 160.0 * x.powi(3) + 120.0 * x;
        assert_relative_eq!(eval_hermite(5, x).unwrap(), h5, epsilon = 1e-12);
        assert!(eval_hermite(-1, x).is_none());
    }

    #[test]
    fn test_assoc_legendre_reference_values() {
        assert_relative_eq!(eval_assoc_legendre(3, 2, 0.4f64).unwrap(), 5.04, epsilon = 1e-13);
        assert_relative_eq!(eval_assoc_legendre(2, 1, 0.5f64).unwrap(), -1.299_038_105_676_658, epsilon = 1e-14);
        assert_relative_eq!(eval_assoc_legendre(2, -1, 0.3f64).unwrap(), 0.143_090_880_212_541_88, epsilon = 1e-14);
        assert_relative_eq!(eval_assoc_legendre(5, 0, -0.7f64).unwrap(), 0.365_198_75, epsilon = 1e-14);
        assert_relative_eq!(eval_assoc_legendre(4, 4, 0.2f64).unwrap(), 96.768, epsilon = 1e-11);
    }

    #[test]
    fn test_assoc_legendre_edges() {
        assert_eq!(eval_assoc_legendre(1, 2, 0.5f64), Some(0.0));
        assert_eq!(eval_assoc_legendre(-3, 1, 0.5f64), eval_assoc_legendre(2, 1, 0.5f64));
        assert!(eval_assoc_legendre(2, 0, 1.5f64).is_none());
    }

    #[test]
    fn test_spherical_harmonic_values() {
        // Y₀⁰ = 1/(2√π)
        let y00 = eval_spherical_harmonic(0, 0, 1.3f64, 0.4).unwrap();
        assert_relative_eq!(y00, 0.5 / PI.sqrt(), epsilon = 1e-15);
        // Y₁⁰ = √(3/(4π)) cos θ
        let y10 = eval_spherical_harmonic(1, 0, 0.9f64, 2.0).unwrap();
        assert_relative_eq!(y10, (3.0 / (4.0 * PI)).sqrt() * 0.9f64.cos(), epsilon = 1e-15);
        // Real part of Y₁¹ = -√(3/(8π)) sin θ cos φ
        let y11 = eval_spherical_harmonic(1, 1, 0.9f64, 2.0).unwrap();
        let expected = -(3.0 / (8.0 * PI)).sqrt() * 0.9f64.sin() * 2.0f64.cos();
        assert_relative_eq!(y11, expected, epsilon = 1e-15);
        assert_eq!(eval_spherical_harmonic(1, 3, 0.9f64, 2.0), Some(0.0));
    }
}
