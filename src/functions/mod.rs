//! Builtin function tags
//!
//! Functions are a closed enumeration. Each tag owns one capability record
//! (name, arity, evaluator, derivative rule) built by an exhaustive match in
//! [`definitions`], so adding a tag without its rules fails to compile.

use crate::Expr;

pub(crate) mod definitions;
pub(crate) mod registry;

pub(crate) use registry::{DerivativeRule, FunctionDefinition};

/// Builtin function tags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Builtin {
    // Trigonometric
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Acot,
    Asec,
    Acsc,
    // Hyperbolic
    Sinh,
    Cosh,
    Tanh,
    Coth,
    Sech,
    Csch,
    Asinh,
    Acosh,
    Atanh,
    Acoth,
    Asech,
    Acsch,
    // Exponential and logarithmic
    Exp,
    Ln,
    /// `log(base, x)`
    Log,
    Log10,
    Log2,
    // Roots and piecewise
    Sqrt,
    Cbrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Round,
    // Special functions
    /// `sin(x)/x`, continuous at zero
    Sinc,
    Erf,
    Erfc,
    Gamma,
    Digamma,
    Trigamma,
    Tetragamma,
    /// `polygamma(n, x)`
    Polygamma,
    /// `beta(a, b)`
    Beta,
    /// `besselj(n, x)`
    BesselJ,
    /// `bessely(n, x)`
    BesselY,
    /// `besseli(n, x)`
    BesselI,
    /// `besselk(n, x)`
    BesselK,
    Zeta,
    /// `zeta_deriv(n, s)`: the n-th derivative of ζ at `s`
    ZetaDeriv,
    LambertW,
    /// `elliptic_k(k)`, modulus convention
    EllipticK,
    /// `elliptic_e(k)`, modulus convention
    EllipticE,
    /// `hermite(n, x)`
    Hermite,
    /// `assoc_legendre(l, m, x)`
    AssocLegendre,
    /// `spherical_harmonic(l, m, theta, phi)`, also spelled `ynm`
    SphericalHarmonic,
}

impl Builtin {
    pub const ALL: [Builtin; 57] = [
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Cot,
        Builtin::Sec,
        Builtin::Csc,
        Builtin::Asin,
        Builtin::Acos,
        Builtin::Atan,
        Builtin::Acot,
        Builtin::Asec,
        Builtin::Acsc,
        Builtin::Sinh,
        Builtin::Cosh,
        Builtin::Tanh,
        Builtin::Coth,
        Builtin::Sech,
        Builtin::Csch,
        Builtin::Asinh,
        Builtin::Acosh,
        Builtin::Atanh,
        Builtin::Acoth,
        Builtin::Asech,
        Builtin::Acsch,
        Builtin::Exp,
        Builtin::Ln,
        Builtin::Log,
        Builtin::Log10,
        Builtin::Log2,
        Builtin::Sqrt,
        Builtin::Cbrt,
        Builtin::Abs,
        Builtin::Sign,
        Builtin::Floor,
        Builtin::Ceil,
        Builtin::Round,
        Builtin::Sinc,
        Builtin::Erf,
        Builtin::Erfc,
        Builtin::Gamma,
        Builtin::Digamma,
        Builtin::Trigamma,
        Builtin::Tetragamma,
        Builtin::Polygamma,
        Builtin::Beta,
        Builtin::BesselJ,
        Builtin::BesselY,
        Builtin::BesselI,
        Builtin::BesselK,
        Builtin::Zeta,
        Builtin::ZetaDeriv,
        Builtin::LambertW,
        Builtin::EllipticK,
        Builtin::EllipticE,
        Builtin::Hermite,
        Builtin::AssocLegendre,
        Builtin::SphericalHarmonic,
    ];

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Resolve a call by name and argument count.
    ///
    /// `log` with one argument is the natural logarithm; with two it is
    /// `log(base, x)`.
    pub fn from_name(name: &str, arg_count: usize) -> Option<Builtin> {
        let b = match name {
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "tan" => Builtin::Tan,
            "cot" => Builtin::Cot,
            "sec" => Builtin::Sec,
            "csc" => Builtin::Csc,
            "asin" | "arcsin" => Builtin::Asin,
            "acos" | "arccos" => Builtin::Acos,
            "atan" | "arctan" => Builtin::Atan,
            "acot" => Builtin::Acot,
            "asec" => Builtin::Asec,
            "acsc" => Builtin::Acsc,
            "sinh" => Builtin::Sinh,
            "cosh" => Builtin::Cosh,
            "tanh" => Builtin::Tanh,
            "coth" => Builtin::Coth,
            "sech" => Builtin::Sech,
            "csch" => Builtin::Csch,
            "asinh" => Builtin::Asinh,
            "acosh" => Builtin::Acosh,
            "atanh" => Builtin::Atanh,
            "acoth" => Builtin::Acoth,
            "asech" => Builtin::Asech,
            "acsch" => Builtin::Acsch,
            "exp" => Builtin::Exp,
            "ln" => Builtin::Ln,
            "log" if arg_count == 1 => Builtin::Ln,
            "log" => Builtin::Log,
            "log10" => Builtin::Log10,
            "log2" => Builtin::Log2,
            "sqrt" => Builtin::Sqrt,
            "cbrt" => Builtin::Cbrt,
            "abs" => Builtin::Abs,
            "sign" | "sgn" => Builtin::Sign,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "round" => Builtin::Round,
            "sinc" => Builtin::Sinc,
            "erf" => Builtin::Erf,
            "erfc" => Builtin::Erfc,
            "gamma" => Builtin::Gamma,
            "digamma" => Builtin::Digamma,
            "trigamma" => Builtin::Trigamma,
            "tetragamma" => Builtin::Tetragamma,
            "polygamma" => Builtin::Polygamma,
            "beta" => Builtin::Beta,
            "besselj" => Builtin::BesselJ,
            "bessely" => Builtin::BesselY,
            "besseli" => Builtin::BesselI,
            "besselk" => Builtin::BesselK,
            "zeta" => Builtin::Zeta,
            "zeta_deriv" => Builtin::ZetaDeriv,
            "lambertw" => Builtin::LambertW,
            "elliptic_k" => Builtin::EllipticK,
            "elliptic_e" => Builtin::EllipticE,
            "hermite" => Builtin::Hermite,
            "assoc_legendre" => Builtin::AssocLegendre,
            "spherical_harmonic" | "ynm" => Builtin::SphericalHarmonic,
            _ => return None,
        };
        Some(b)
    }

    /// Capability record for this tag
    pub(crate) fn definition(self) -> &'static FunctionDefinition {
        registry::lookup(self)
    }

    /// Odd functions: `f(-u) = -f(u)`
    pub(crate) fn is_odd(self) -> bool {
        matches!(
            self,
            Builtin::Sin
                | Builtin::Tan
                | Builtin::Cot
                | Builtin::Csc
                | Builtin::Asin
                | Builtin::Atan
                | Builtin::Sinh
                | Builtin::Tanh
                | Builtin::Coth
                | Builtin::Csch
                | Builtin::Asinh
                | Builtin::Atanh
                | Builtin::Acoth
                | Builtin::Acsch
                | Builtin::Erf
                | Builtin::Cbrt
                | Builtin::Sign
        )
    }

    /// Even functions: `f(-u) = f(u)`
    pub(crate) fn is_even(self) -> bool {
        matches!(
            self,
            Builtin::Cos
                | Builtin::Sec
                | Builtin::Cosh
                | Builtin::Sech
                | Builtin::Abs
                | Builtin::Sinc
        )
    }
}

// ===== Helpers for building derivative expressions =====

/// One-argument builtin call
pub(crate) fn call1(which: Builtin, arg: &Expr) -> Expr {
    Expr::func(which, vec![arg.clone()])
}

/// Product of factors with numeric exponents
pub(crate) fn prod(factors: Vec<(Expr, f64)>) -> Expr {
    Expr::product_factors(factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for b in Builtin::ALL {
            let arity = *b.definition().arity.start();
            assert_eq!(Builtin::from_name(b.name(), arity), Some(b), "{b:?}");
        }
    }

    #[test]
    fn test_log_resolution_by_arity() {
        assert_eq!(Builtin::from_name("log", 1), Some(Builtin::Ln));
        assert_eq!(Builtin::from_name("log", 2), Some(Builtin::Log));
        assert_eq!(Builtin::from_name("nonexistent", 1), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Builtin::from_name("ynm", 4), Some(Builtin::SphericalHarmonic));
        assert_eq!(Builtin::from_name("zeta_deriv", 2), Some(Builtin::ZetaDeriv));
        assert_eq!(Builtin::SphericalHarmonic.name(), "spherical_harmonic");
    }

    #[test]
    fn test_parity_tables_are_disjoint() {
        assert!(Builtin::ALL.iter().all(|b| !(b.is_odd() && b.is_even())));
    }
}
