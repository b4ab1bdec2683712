//! Complete elliptic integrals by the arithmetic-geometric mean
//!
//! Both take the modulus `k`, not the parameter `m = k²`.

use crate::traits::{MathScalar, lit};

const MAX_AGM_STEPS: usize = 64;

/// K(k) = ∫₀^(π/2) dθ / √(1 - k² sin²θ) = π / (2 AGM(1, √(1-k²))), for `|k| < 1`
pub fn eval_elliptic_k<T: MathScalar>(k: T) -> Option<T> {
    if k.is_nan() || k.abs() >= T::one() {
        return None;
    }
    let (a, _) = agm(k);
    Some(T::PI() / (lit::<T>(2.0) * a))
}

/// E(k) = ∫₀^(π/2) √(1 - k² sin²θ) dθ, for `|k| ≤ 1`
///
/// `E = K · (1 - Σₙ 2ⁿ⁻¹ cₙ²)` with `c₀ = k` and `cₙ₊₁ = (aₙ - bₙ)/2`.
pub fn eval_elliptic_e<T: MathScalar>(k: T) -> Option<T> {
    if k.is_nan() || k.abs() > T::one() {
        return None;
    }
    if k.abs() == T::one() {
        return Some(T::one());
    }
    let (a, defect) = agm(k);
    Some(T::PI() / (lit::<T>(2.0) * a) * (T::one() - defect))
}

/// `(AGM(1, √(1-k²)), Σ 2ⁿ⁻¹ cₙ²)`
fn agm<T: MathScalar>(k: T) -> (T, T) {
    let two = lit::<T>(2.0);
    let mut a = T::one();
    let mut b = (T::one() - k * k).sqrt();
    let mut weight = lit::<T>(0.5);
    let mut defect = weight * k * k;
    for _ in 0..MAX_AGM_STEPS {
        let c = (a - b) / two;
        let next_b = (a * b).sqrt();
        a = (a + b) / two;
        b = next_b;
        weight = weight * two;
        defect = defect + weight * c * c;
        if c.abs() <= T::epsilon() * a {
            break;
        }
    }
    (a, defect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_elliptic_at_zero_modulus() {
        assert_relative_eq!(eval_elliptic_k(0.0f64).unwrap(), FRAC_PI_2, epsilon = 1e-15);
        assert_relative_eq!(eval_elliptic_e(0.0f64).unwrap(), FRAC_PI_2, epsilon = 1e-15);
    }

    #[test]
    fn test_elliptic_reference_values() {
        assert_relative_eq!(eval_elliptic_k(0.5f64).unwrap(), 1.685_750_354_812_596, epsilon = 1e-14);
        assert_relative_eq!(eval_elliptic_e(0.5f64).unwrap(), 1.467_462_209_339_427_2, epsilon = 1e-14);
        assert_relative_eq!(eval_elliptic_k(0.9f64).unwrap(), 2.280_549_138_422_770_3, epsilon = 1e-13);
        assert_relative_eq!(eval_elliptic_e(0.9f64).unwrap(), 1.171_697_052_781_614_3, epsilon = 1e-13);
        // Even in k
        assert_eq!(eval_elliptic_k(-0.7f64), eval_elliptic_k(0.7f64));
    }

    #[test]
    fn test_legendre_relation() {
        // E(k)K(k') + E(k')K(k) - K(k)K(k') = π/2
        let k = 0.6f64;
        let kp = (1.0 - k * k).sqrt();
        let (kk, ek) = (eval_elliptic_k(k).unwrap(), eval_elliptic_e(k).unwrap());
        let (kkp, ekp) = (eval_elliptic_k(kp).unwrap(), eval_elliptic_e(kp).unwrap());
        assert_relative_eq!(ek * kkp + ekp * kk - kk * kkp, FRAC_PI_2, epsilon = 1e-13);
    }

    #[test]
    fn test_elliptic_domain() {
        assert!(eval_elliptic_k(1.0f64).is_none());
        assert_eq!(eval_elliptic_e(1.0f64), Some(1.0));
        assert!(eval_elliptic_e(1.5f64).is_none());
    }
}
