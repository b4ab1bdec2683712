//! Dense univariate polynomials with `f64` coefficients
//!
//! Used by fraction cancellation: numerator and denominator factors that are
//! polynomials in one generator are divided by their GCD.

use super::expr::{Expr, ExprKind};

/// Highest degree expanded when converting from an expression
pub(crate) const MAX_DEGREE: usize = 64;
/// Coefficients below this (relative to the largest) count as zero
const REL_TOLERANCE: f64 = 1e-9;

/// `Σ coeffs[i]·xⁱ`, trailing zeros trimmed
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UniPoly {
    coeffs: Vec<f64>,
}

impl UniPoly {
    pub(crate) fn constant(c: f64) -> Self {
        UniPoly { coeffs: vec![c] }.trimmed()
    }

    /// The generator `x`
    pub(crate) fn var() -> Self {
        UniPoly {
            coeffs: vec![0.0, 1.0],
        }
    }

    fn trimmed(mut self) -> Self {
        while self.coeffs.last() == Some(&0.0) {
            self.coeffs.pop();
        }
        self
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree; the zero polynomial has degree 0
    pub(crate) fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    fn lead(&self) -> f64 {
        self.coeffs.last().copied().unwrap_or(0.0)
    }

    fn max_abs(&self) -> f64 {
        self.coeffs.iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    /// Zero out coefficients that are noise relative to `scale`
    fn cleaned(mut self, scale: f64) -> Self {
        let tol = REL_TOLERANCE * scale.max(1.0);
        for c in &mut self.coeffs {
            if c.abs() <= tol {
                *c = 0.0;
            }
        }
        self.trimmed()
    }

    pub(crate) fn add(&self, other: &UniPoly) -> UniPoly {
        let n = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..n)
            .map(|i| self.coeffs.get(i).unwrap_or(&0.0) + other.coeffs.get(i).unwrap_or(&0.0))
            .collect();
        UniPoly { coeffs }.trimmed()
    }

    pub(crate) fn scale(&self, c: f64) -> UniPoly {
        UniPoly {
            coeffs: self.coeffs.iter().map(|x| x * c).collect(),
        }
        .trimmed()
    }

    pub(crate) fn mul(&self, other: &UniPoly) -> UniPoly {
        if self.is_zero() || other.is_zero() {
            return UniPoly { coeffs: Vec::new() };
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        UniPoly { coeffs }.trimmed()
    }

    pub(crate) fn pow(&self, k: usize) -> UniPoly {
        (0..k).fold(UniPoly::constant(1.0), |acc, _| acc.mul(self))
    }

    /// Long division: `(quotient, remainder)`. `None` when dividing by zero.
    pub(crate) fn div_rem(&self, divisor: &UniPoly) -> Option<(UniPoly, UniPoly)> {
        if divisor.is_zero() {
            return None;
        }
        let scale = self.max_abs();
        let mut rem = self.coeffs.clone();
        let dd = divisor.degree();
        let lead = divisor.lead();
        if self.coeffs.len() < divisor.coeffs.len() {
            return Some((UniPoly { coeffs: Vec::new() }, self.clone()));
        }
        let mut quot = vec![0.0; self.coeffs.len() - dd];
        for i in (0..quot.len()).rev() {
            let q = rem[i + dd] / lead;
            quot[i] = q;
            for (j, d) in divisor.coeffs.iter().enumerate() {
                rem[i + j] -= q * d;
            }
        }
        rem.truncate(dd);
        Some((
            UniPoly { coeffs: quot }.cleaned(scale),
            UniPoly { coeffs: rem }.cleaned(scale),
        ))
    }

    /// Monic greatest common divisor by the Euclidean algorithm
    pub(crate) fn gcd(&self, other: &UniPoly) -> UniPoly {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let Some((_, r)) = a.div_rem(&b) else {
                break;
            };
            a = b;
            b = r;
        }
        let lead = a.lead();
        if lead == 0.0 { a } else { a.scale(1.0 / lead) }
    }

    /// Read `e` as a polynomial in `generator` with numeric coefficients
    pub(crate) fn from_expr(e: &Expr, generator: &Expr) -> Option<UniPoly> {
        if e == generator {
            return Some(UniPoly::var());
        }
        let p = match e.kind() {
            ExprKind::Number(n) => UniPoly::constant(*n),
            ExprKind::Sum(terms) => {
                let mut acc = UniPoly::constant(0.0);
                for (c, t) in terms {
                    acc = acc.add(&UniPoly::from_expr(t, generator)?.scale(*c));
                }
                acc
            }
            ExprKind::Product(factors) => {
                let mut acc = UniPoly::constant(1.0);
                for (b, k) in factors {
                    let k = exponent(*k)?;
                    acc = acc.mul(&UniPoly::from_expr(b, generator)?.pow(k));
                    if acc.degree() > MAX_DEGREE {
                        return None;
                    }
                }
                acc
            }
            _ => return None,
        };
        Some(p)
    }

    /// Canonical expression `Σ cᵢ·generatorⁱ`; near-integers are snapped
    pub(crate) fn to_expr(&self, generator: &Expr) -> Expr {
        let terms = self
            .coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0.0)
            .map(|(i, c)| (snap(*c), Expr::powf(generator.clone(), i as f64)))
            .collect();
        Expr::sum_terms(terms)
    }
}

fn exponent(k: f64) -> Option<usize> {
    (k >= 0.0 && k.fract() == 0.0 && k <= MAX_DEGREE as f64).then_some(k as usize)
}

fn snap(c: f64) -> f64 {
    let r = c.round();
    if (c - r).abs() <= REL_TOLERANCE * r.abs().max(1.0) { r } else { c }
}
