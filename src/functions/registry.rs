use crate::Expr;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use super::Builtin;

/// Total derivative: `(args, d(args)/dx) -> d f(args)/dx`. `None` when the
/// derivative with respect to an argument that actually varies is undefined,
/// e.g. a varying Bessel order.
pub(crate) type DerivativeFn = fn(&[Expr], &[Expr]) -> Option<Expr>;

/// How a function differentiates
#[derive(Clone, Copy)]
pub(crate) enum DerivativeRule {
    /// Closed-form chain rule
    Closed(DerivativeFn),
    /// No closed form: the engine keeps a live `Derivative` node
    Live,
    /// Not differentiable (piecewise-constant functions)
    Unsupported,
}

/// Capability record of a builtin function
#[derive(Clone)]
pub(crate) struct FunctionDefinition {
    /// Canonical name (e.g. "sin", "besselj")
    pub name: &'static str,

    /// Acceptable argument count
    pub arity: RangeInclusive<usize>,

    /// Numeric evaluation; `None` outside the real domain
    pub eval: fn(&[f64]) -> Option<f64>,

    pub derivative: DerivativeRule,
}

impl FunctionDefinition {
    pub(crate) fn validate_arity(&self, args: usize) -> bool {
        self.arity.contains(&args)
    }
}

/// Definitions indexed by tag discriminant, in `Builtin::ALL` order
static REGISTRY: OnceLock<Vec<FunctionDefinition>> = OnceLock::new();

fn init_registry() -> Vec<FunctionDefinition> {
    Builtin::ALL
        .iter()
        .map(|&b| super::definitions::definition(b))
        .collect()
}

pub(crate) fn lookup(which: Builtin) -> &'static FunctionDefinition {
    &REGISTRY.get_or_init(init_registry)[which as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_tags() {
        for (i, b) in Builtin::ALL.iter().enumerate() {
            assert_eq!(*b as usize, i);
        }
    }

    #[test]
    fn test_arity_validation() {
        assert!(Builtin::Sin.definition().validate_arity(1));
        assert!(!Builtin::Sin.definition().validate_arity(2));
        assert!(Builtin::BesselJ.definition().validate_arity(2));
    }
}
