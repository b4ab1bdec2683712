//! Expression tree
//!
//! `Expr` is a cheap-to-clone handle to an immutable, reference-counted node. Each
//! node caches a structural hash so inequality is usually decided by one integer
//! comparison.
//!
//! The public constructors keep every node in canonical shape:
//! - numeric literals are folded,
//! - `Sum` never holds a `Sum` term and `Product` never holds a `Product` base,
//! - a number times a term is a single-term `Sum`,
//! - children of `Sum` and `Product` are sorted by [`super::ordering`].
//!
//! Like terms are *not* merged here; that is the simplifier's collection pass.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use super::ordering::{factor_cmp, term_cmp};
use super::symbol::Symbol;
use crate::functions::Builtin;

/// Function head: a builtin tag or a user-named function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Func {
    Builtin(Builtin),
    /// A name the parser did not recognize. Evaluated and differentiated only
    /// through user-supplied callbacks.
    Named(Arc<str>),
}

impl Func {
    pub fn name(&self) -> &str {
        match self {
            Func::Builtin(b) => b.name(),
            Func::Named(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExprKind {
    Number(f64),
    Symbol(Symbol),
    /// `Σ cᵢ·tᵢ`. The constant term is stored as `(c, 1)`.
    Sum(Vec<(f64, Expr)>),
    /// `Π bᵢ^kᵢ` with numeric exponents; division is a negative exponent.
    Product(Vec<(Expr, f64)>),
    /// General power whose exponent is not a number
    Pow(Expr, Expr),
    Function {
        func: Func,
        args: Vec<Expr>,
    },
    /// `∂ⁿ(inner)/∂varⁿ` kept unevaluated because no closed form exists
    Derivative {
        inner: Expr,
        var: Symbol,
        order: u32,
    },
}

/// Node tag used to index simplification rules
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) enum NodeKind {
    Number,
    Symbol,
    Sum,
    Product,
    Pow,
    Function,
    Derivative,
}

pub(crate) struct Node {
    hash: u64,
    kind: ExprKind,
}

/// An immutable symbolic expression
#[derive(Clone)]
pub struct Expr(Arc<Node>);

fn compute_hash(kind: &ExprKind) -> u64 {
    let mut h = FxHasher::default();
    match kind {
        ExprKind::Number(n) => {
            0u8.hash(&mut h);
            n.to_bits().hash(&mut h);
        }
        ExprKind::Symbol(s) => {
            1u8.hash(&mut h);
            s.id().hash(&mut h);
        }
        ExprKind::Sum(terms) => {
            2u8.hash(&mut h);
            terms.len().hash(&mut h);
            for (c, t) in terms {
                c.to_bits().hash(&mut h);
                t.hash_value().hash(&mut h);
            }
        }
        ExprKind::Product(factors) => {
            3u8.hash(&mut h);
            factors.len().hash(&mut h);
            for (b, k) in factors {
                b.hash_value().hash(&mut h);
                k.to_bits().hash(&mut h);
            }
        }
        ExprKind::Pow(b, e) => {
            4u8.hash(&mut h);
            b.hash_value().hash(&mut h);
            e.hash_value().hash(&mut h);
        }
        ExprKind::Function { func, args } => {
            5u8.hash(&mut h);
            func.hash(&mut h);
            for a in args {
                a.hash_value().hash(&mut h);
            }
        }
        ExprKind::Derivative { inner, var, order } => {
            6u8.hash(&mut h);
            inner.hash_value().hash(&mut h);
            var.id().hash(&mut h);
            order.hash(&mut h);
        }
    }
    h.finish()
}

impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.0.hash == other.0.hash && self.0.kind == other.0.kind
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl Expr {
    #[inline]
    pub(crate) fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub(crate) fn node_kind(&self) -> NodeKind {
        match self.kind() {
            ExprKind::Number(_) => NodeKind::Number,
            ExprKind::Symbol(_) => NodeKind::Symbol,
            ExprKind::Sum(_) => NodeKind::Sum,
            ExprKind::Product(_) => NodeKind::Product,
            ExprKind::Pow(..) => NodeKind::Pow,
            ExprKind::Function { .. } => NodeKind::Function,
            ExprKind::Derivative { .. } => NodeKind::Derivative,
        }
    }

    /// Cached structural hash
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.0.hash
    }

    /// True when both handles point at the same node
    #[inline]
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self.kind() {
            ExprKind::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.kind(), ExprKind::Number(_))
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.as_number() == Some(1.0)
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.kind() {
            ExprKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// `c·t` stored as a single-term sum
    pub(crate) fn as_scaled(&self) -> Option<(f64, &Expr)> {
        match self.kind() {
            ExprKind::Sum(terms) if terms.len() == 1 => Some((terms[0].0, &terms[0].1)),
            _ => None,
        }
    }

    /// Split into numeric coefficient and remaining term: `3x -> (3, x)`, `5 -> (5, 1)`
    pub(crate) fn split_coeff(&self) -> (f64, Expr) {
        match self.kind() {
            ExprKind::Number(n) => (*n, Expr::one()),
            ExprKind::Sum(terms) if terms.len() == 1 => (terms[0].0, terms[0].1.clone()),
            _ => (1.0, self.clone()),
        }
    }

    /// Whether the leading coefficient is negative (`-x`, `-3`, `-2·sin(y)`)
    pub(crate) fn is_negatively_led(&self) -> bool {
        match self.kind() {
            ExprKind::Number(n) => *n < 0.0,
            ExprKind::Sum(terms) if terms.len() == 1 => terms[0].0 < 0.0,
            _ => false,
        }
    }

    pub(crate) fn as_call(&self) -> Option<(&Func, &[Expr])> {
        match self.kind() {
            ExprKind::Function { func, args } => Some((func, args)),
            _ => None,
        }
    }

    /// Arguments when this is a call to the given builtin
    pub(crate) fn builtin_args(&self, which: Builtin) -> Option<&[Expr]> {
        match self.kind() {
            ExprKind::Function {
                func: Func::Builtin(b),
                args,
            } if *b == which => Some(args),
            _ => None,
        }
    }

    /// Single argument of a one-argument builtin call
    pub(crate) fn unary_arg(&self, which: Builtin) -> Option<&Expr> {
        match self.builtin_args(which) {
            Some([arg]) => Some(arg),
            _ => None,
        }
    }

    /// `(base, k)` for a single-factor product `base^k`
    pub(crate) fn as_power(&self) -> Option<(&Expr, f64)> {
        match self.kind() {
            ExprKind::Product(factors) if factors.len() == 1 => {
                Some((&factors[0].0, factors[0].1))
            }
            _ => None,
        }
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

impl Expr {
    fn from_kind(kind: ExprKind) -> Expr {
        Expr(Arc::new(Node {
            hash: compute_hash(&kind),
            kind,
        }))
    }

    pub fn number(n: f64) -> Expr {
        // -0.0 and 0.0 must hash alike
        let n = if n == 0.0 { 0.0 } else { n };
        Expr::from_kind(ExprKind::Number(n))
    }

    pub fn zero() -> Expr {
        Expr::number(0.0)
    }

    pub fn one() -> Expr {
        Expr::number(1.0)
    }

    /// Named symbol, interned
    pub fn symbol(name: &str) -> Expr {
        Expr::from_symbol(Symbol::new(name))
    }

    pub fn from_symbol(symbol: Symbol) -> Expr {
        Expr::from_kind(ExprKind::Symbol(symbol))
    }

    /// Fresh anonymous symbol as an expression
    pub fn anon() -> Expr {
        Expr::from_symbol(Symbol::anon())
    }

    pub fn sum(terms: Vec<Expr>) -> Expr {
        Expr::sum_terms(terms.into_iter().map(|t| (1.0, t)).collect())
    }

    /// Weighted sum `Σ cᵢ·tᵢ`
    pub fn sum_terms(terms: Vec<(f64, Expr)>) -> Expr {
        let mut constant = 0.0;
        let mut out = Vec::with_capacity(terms.len());
        for (c, t) in terms {
            if c == 0.0 {
                continue;
            }
            if let Some(n) = t.as_number() {
                constant += c * n;
                continue;
            }
            if let ExprKind::Sum(inner) = t.kind() {
                for (ci, ti) in inner {
                    match ti.as_number() {
                        Some(n) => constant += c * ci * n,
                        None => out.push((c * ci, ti.clone())),
                    }
                }
                continue;
            }
            out.push((c, t));
        }
        Expr::finish_sum(constant, out)
    }

    fn finish_sum(constant: f64, mut out: Vec<(f64, Expr)>) -> Expr {
        out.retain(|(c, _)| *c != 0.0);
        if constant != 0.0 {
            out.push((constant, Expr::one()));
        }
        out.sort_by(term_cmp);
        match out.len() {
            0 => Expr::zero(),
            1 => {
                let (c, t) = out.swap_remove(0);
                if c == 1.0 {
                    t
                } else if let Some(n) = t.as_number() {
                    Expr::number(c * n)
                } else {
                    Expr::from_kind(ExprKind::Sum(vec![(c, t)]))
                }
            }
            _ => Expr::from_kind(ExprKind::Sum(out)),
        }
    }

    /// `c·e`, distributing over sums
    pub fn scaled(c: f64, e: Expr) -> Expr {
        if c == 1.0 {
            return e;
        }
        if c == 0.0 {
            return Expr::zero();
        }
        match e.kind() {
            ExprKind::Number(n) => Expr::number(c * n),
            ExprKind::Sum(terms) => {
                Expr::sum_terms(terms.iter().map(|(k, t)| (c * k, t.clone())).collect())
            }
            _ => Expr::from_kind(ExprKind::Sum(vec![(c, e)])),
        }
    }

    pub fn product(factors: Vec<Expr>) -> Expr {
        Expr::product_factors(factors.into_iter().map(|f| (f, 1.0)).collect())
    }

    /// `Π bᵢ^kᵢ` with numeric exponents
    pub fn product_factors(factors: Vec<(Expr, f64)>) -> Expr {
        let mut coeff = 1.0;
        let mut out: Vec<(Expr, f64)> = Vec::with_capacity(factors.len());
        let mut work = factors;

        while let Some((base, k)) = work.pop() {
            if k == 0.0 {
                continue;
            }
            if let Some(n) = base.as_number() {
                let v = n.powf(k);
                // Keep 0^-k (division by zero) and non-real powers unevaluated
                if (n == 0.0 && k < 0.0) || !v.is_finite() {
                    out.push((base, k));
                } else {
                    coeff *= v;
                }
                continue;
            }
            if let Some((c, t)) = base.as_scaled()
                && (k.fract() == 0.0 || c > 0.0)
            {
                let v = c.powf(k);
                if v.is_finite() && v != 0.0 {
                    coeff *= v;
                    work.push((t.clone(), k));
                    continue;
                }
            }
            if let ExprKind::Product(inner) = base.kind() {
                work.extend(inner.iter().map(|(b, e)| (b.clone(), e * k)));
                continue;
            }
            out.push((base, k));
        }

        if coeff == 0.0 {
            let divides_by_zero = out.iter().any(|(b, k)| *k < 0.0 && b.is_zero());
            if !divides_by_zero {
                return Expr::zero();
            }
            out.push((Expr::zero(), 1.0));
            coeff = 1.0;
        }

        out.sort_by(factor_cmp);
        if out.is_empty() {
            return Expr::number(coeff);
        }
        if out.len() == 1 && out[0].1 == 1.0 {
            let (base, _) = out.swap_remove(0);
            return Expr::scaled(coeff, base);
        }
        Expr::scaled(coeff, Expr::from_kind(ExprKind::Product(out)))
    }

    /// `base^exp`; numeric exponents fold into a product factor
    pub fn pow(base: Expr, exp: Expr) -> Expr {
        if let Some(k) = exp.as_number() {
            return Expr::powf(base, k);
        }
        if base.is_one() {
            return Expr::one();
        }
        Expr::from_kind(ExprKind::Pow(base, exp))
    }

    pub fn powf(base: Expr, k: f64) -> Expr {
        Expr::product_factors(vec![(base, k)])
    }

    pub fn add_expr(a: Expr, b: Expr) -> Expr {
        Expr::sum_terms(vec![(1.0, a), (1.0, b)])
    }

    pub fn sub_expr(a: Expr, b: Expr) -> Expr {
        Expr::sum_terms(vec![(1.0, a), (-1.0, b)])
    }

    pub fn mul_expr(a: Expr, b: Expr) -> Expr {
        Expr::product_factors(vec![(a, 1.0), (b, 1.0)])
    }

    pub fn div_expr(a: Expr, b: Expr) -> Expr {
        Expr::product_factors(vec![(a, 1.0), (b, -1.0)])
    }

    pub fn negate(e: Expr) -> Expr {
        Expr::scaled(-1.0, e)
    }

    /// Builtin function call. Arity is checked by the parser, not here.
    pub fn func(which: Builtin, args: Vec<Expr>) -> Expr {
        Expr::call(Func::Builtin(which), args)
    }

    /// Call to a user-named function
    pub fn named_func(name: &str, args: Vec<Expr>) -> Expr {
        match crate::functions::Builtin::from_name(name, args.len()) {
            Some(b) => Expr::func(b, args),
            None => Expr::call(Func::Named(Arc::from(name)), args),
        }
    }

    pub(crate) fn call(func: Func, args: Vec<Expr>) -> Expr {
        Expr::from_kind(ExprKind::Function { func, args })
    }

    /// `∂ⁿ(inner)/∂varⁿ`; nested derivatives in the same variable merge orders
    pub fn derivative(inner: Expr, var: Symbol, order: u32) -> Expr {
        if order == 0 {
            return inner;
        }
        if let ExprKind::Derivative {
            inner: nested,
            var: nested_var,
            order: nested_order,
        } = inner.kind()
            && *nested_var == var
        {
            return Expr::derivative(nested.clone(), var, order + nested_order);
        }
        Expr::from_kind(ExprKind::Derivative { inner, var, order })
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::number(n)
    }
}

impl From<Symbol> for Expr {
    fn from(s: Symbol) -> Self {
        Expr::from_symbol(s)
    }
}

impl From<&Symbol> for Expr {
    fn from(s: &Symbol) -> Self {
        Expr::from_symbol(s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn test_numbers_fold_in_sum() {
        let e = Expr::sum(vec![Expr::number(2.0), Expr::number(3.0), x()]);
        match e.kind() {
            ExprKind::Sum(terms) => {
                assert_eq!(terms.len(), 2);
                assert_eq!(terms[0], (5.0, Expr::one()));
                assert_eq!(terms[1], (1.0, x()));
            }
            _ => panic!("expected sum, got {e}"),
        }
    }

    #[test]
    fn test_sum_flattens() {
        let inner = Expr::add_expr(x(), Expr::symbol("y"));
        let outer = Expr::sum_terms(vec![(2.0, inner), (1.0, Expr::symbol("z"))]);
        match outer.kind() {
            ExprKind::Sum(terms) => {
                assert_eq!(terms.len(), 3);
                assert!(terms.iter().all(|(_, t)| !matches!(t.kind(), ExprKind::Sum(_))));
            }
            _ => panic!("expected sum"),
        }
    }

    #[test]
    fn test_scaled_term_is_single_term_sum() {
        let e = Expr::mul_expr(Expr::number(3.0), x());
        assert_eq!(e.as_scaled().map(|(c, t)| (c, t.clone())), Some((3.0, x())));
        assert_eq!(e.split_coeff(), (3.0, x()));
    }

    #[test]
    fn test_product_flattens_and_extracts_coefficient() {
        let two_x = Expr::scaled(2.0, x());
        let e = Expr::product(vec![two_x, Expr::symbol("y"), Expr::number(3.0)]);
        let (c, rest) = e.split_coeff();
        assert_eq!(c, 6.0);
        assert!(matches!(rest.kind(), ExprKind::Product(f) if f.len() == 2));
    }

    #[test]
    fn test_power_of_product_distributes() {
        let xy = Expr::mul_expr(x(), Expr::symbol("y"));
        let sq = Expr::powf(xy, 2.0);
        match sq.kind() {
            ExprKind::Product(f) => assert!(f.iter().all(|(_, k)| *k == 2.0)),
            _ => panic!("expected product"),
        }
    }

    #[test]
    fn test_pow_identities() {
        assert_eq!(Expr::powf(x(), 1.0), x());
        assert_eq!(Expr::powf(x(), 0.0), Expr::one());
        assert_eq!(Expr::pow(Expr::one(), x()), Expr::one());
        assert_eq!(Expr::powf(Expr::number(2.0), 3.0), Expr::number(8.0));
    }

    #[test]
    fn test_division_by_zero_stays_unevaluated() {
        let e = Expr::div_expr(x(), Expr::zero());
        match e.kind() {
            ExprKind::Product(f) => assert!(f.iter().any(|(b, k)| b.is_zero() && *k == -1.0)),
            _ => panic!("expected product, got {e}"),
        }
        let zero_over_zero = Expr::div_expr(Expr::zero(), Expr::zero());
        assert!(!zero_over_zero.is_zero());
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(Expr::number(-0.0), Expr::number(0.0));
        assert_eq!(Expr::number(-0.0).hash_value(), Expr::zero().hash_value());
    }

    #[test]
    fn test_derivative_orders_merge() {
        let xs = Symbol::new("x");
        let z = Expr::func(Builtin::Zeta, vec![x()]);
        let d1 = Expr::derivative(z.clone(), xs.clone(), 1);
        let d2 = Expr::derivative(d1, xs.clone(), 2);
        assert_eq!(d2, Expr::derivative(z, xs, 3));
    }

    #[test]
    fn test_order_independent_construction() {
        let a = Expr::sum(vec![x(), Expr::symbol("y"), Expr::number(1.0)]);
        let b = Expr::sum(vec![Expr::number(1.0), Expr::symbol("y"), x()]);
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
    }
}
