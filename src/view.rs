//! Read-only structural view of an expression
//!
//! The canonical tree stores coefficients on sum terms and numeric exponents on
//! product factors. A [`View`] projects that storage onto the shapes a caller
//! expects when walking a formula:
//! - a scaled term `c·t` is a `Product` whose first child is the number `c`;
//! - a product with negative exponents is a `Div` of numerator and denominator;
//! - a single factor `b^k` is a `Pow` with a number exponent.
//!
//! # Example
//! ```
//! use symb_kernel::{Kind, parse};
//!
//! let expr = parse("x^2 + 2*x + 1").unwrap();
//! let view = expr.view();
//! assert_eq!(view.kind(), Kind::Sum);
//! assert_eq!(view.len(), 3);
//! assert_eq!(view[-1], view[2]);
//! ```

use std::borrow::Cow;
use std::ops::Index;

use crate::core::expr::ExprKind;
use crate::{Expr, Symbol};

/// Node shape as seen through a [`View`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    Symbol,
    Sum,
    Product,
    Div,
    Pow,
    Function,
    Derivative,
}

/// Projection of one node with its children
#[derive(Debug, Clone)]
pub struct View {
    expr: Expr,
    kind: Kind,
    children: Vec<Expr>,
}

impl Expr {
    /// Read-only projection of this node
    pub fn view(&self) -> View {
        let (kind, children) = project(self);
        View {
            expr: self.clone(),
            kind,
            children,
        }
    }
}

/// `Π bᵢ^kᵢ` split into the positive-exponent and negated negative-exponent halves
fn split_fraction(factors: &[(Expr, f64)]) -> (Vec<(Expr, f64)>, Vec<(Expr, f64)>) {
    let num = factors.iter().filter(|(_, k)| *k > 0.0).cloned().collect();
    let den = factors
        .iter()
        .filter(|(_, k)| *k < 0.0)
        .map(|(b, k)| (b.clone(), -k))
        .collect();
    (num, den)
}

fn factor_exprs(factors: Vec<(Expr, f64)>) -> Vec<Expr> {
    factors.into_iter().map(|(b, k)| Expr::powf(b, k)).collect()
}

fn project(expr: &Expr) -> (Kind, Vec<Expr>) {
    match expr.kind() {
        ExprKind::Number(_) => (Kind::Number, Vec::new()),
        ExprKind::Symbol(_) => (Kind::Symbol, Vec::new()),
        ExprKind::Sum(terms) => match terms.as_slice() {
            [(c, t)] => project_scaled(*c, t),
            _ => (
                Kind::Sum,
                terms.iter().map(|(c, t)| Expr::scaled(*c, t.clone())).collect(),
            ),
        },
        ExprKind::Product(factors) => {
            let (num, den) = split_fraction(factors);
            if !den.is_empty() {
                return (
                    Kind::Div,
                    vec![Expr::product_factors(num), Expr::product_factors(den)],
                );
            }
            match num.as_slice() {
                [(b, k)] => (Kind::Pow, vec![b.clone(), Expr::number(*k)]),
                _ => (Kind::Product, factor_exprs(num)),
            }
        }
        ExprKind::Pow(base, exp) => (Kind::Pow, vec![base.clone(), exp.clone()]),
        ExprKind::Function { args, .. } => (Kind::Function, args.clone()),
        ExprKind::Derivative { inner, .. } => (Kind::Derivative, vec![inner.clone()]),
    }
}

/// `c·t` with `c ≠ 1`
fn project_scaled(c: f64, t: &Expr) -> (Kind, Vec<Expr>) {
    let factors = match t.kind() {
        ExprKind::Product(factors) => factors.clone(),
        _ => vec![(t.clone(), 1.0)],
    };
    let (num, den) = split_fraction(&factors);
    if !den.is_empty() {
        return (
            Kind::Div,
            vec![
                Expr::scaled(c, Expr::product_factors(num)),
                Expr::product_factors(den),
            ],
        );
    }
    let mut children = vec![Expr::number(c)];
    children.extend(factor_exprs(num));
    (Kind::Product, children)
}

impl View {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The viewed expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn is_number(&self) -> bool {
        self.kind == Kind::Number
    }

    pub fn is_symbol(&self) -> bool {
        self.kind == Kind::Symbol
    }

    pub fn is_sum(&self) -> bool {
        self.kind == Kind::Sum
    }

    pub fn is_product(&self) -> bool {
        self.kind == Kind::Product
    }

    pub fn is_div(&self) -> bool {
        self.kind == Kind::Div
    }

    pub fn is_pow(&self) -> bool {
        self.kind == Kind::Pow
    }

    pub fn is_function(&self) -> bool {
        self.kind == Kind::Function
    }

    pub fn is_derivative(&self) -> bool {
        self.kind == Kind::Derivative
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child at `index`; negative indices count from the end
    pub fn get(&self, index: isize) -> Option<&Expr> {
        let len = self.children.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        self.children.get(resolved)
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.children.iter()
    }

    /// Value of a number node
    pub fn value(&self) -> Option<f64> {
        self.expr.as_number()
    }

    /// Symbol label or function name
    pub fn name(&self) -> Option<Cow<'_, str>> {
        match self.expr.kind() {
            ExprKind::Symbol(s) => Some(s.label()),
            ExprKind::Function { func, .. } => Some(Cow::Borrowed(func.name())),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.expr.as_symbol()
    }

    /// Differentiation variable of a derivative node
    pub fn derivative_var(&self) -> Option<&Symbol> {
        match self.expr.kind() {
            ExprKind::Derivative { var, .. } => Some(var),
            _ => None,
        }
    }

    pub fn derivative_order(&self) -> Option<u32> {
        match self.expr.kind() {
            ExprKind::Derivative { order, .. } => Some(*order),
            _ => None,
        }
    }
}

impl Index<isize> for View {
    type Output = Expr;

    fn index(&self, index: isize) -> &Expr {
        match self.get(index) {
            Some(child) => child,
            None => panic!(
                "child index {index} out of range for a view with {} children",
                self.children.len()
            ),
        }
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn view(input: &str) -> View {
        parse(input).unwrap().view()
    }

    #[test]
    fn test_atoms() {
        let v = view("2.5");
        assert!(v.is_number());
        assert_eq!(v.value(), Some(2.5));
        assert!(v.is_empty());

        let v = view("x");
        assert!(v.is_symbol());
        assert_eq!(v.name().as_deref(), Some("x"));
        assert_eq!(v.value(), None);
    }

    #[test]
    fn test_sum_children_and_negative_indices() {
        let v = view("x^2 + 2*x + 1");
        assert!(v.is_sum());
        assert_eq!(v.len(), 3);
        assert_eq!(v[0], v[-3]);
        assert_eq!(v[-1], v[2]);
        assert_eq!(v.get(3), None);
        assert_eq!(v.get(-4), None);
        assert_eq!(v[0], Expr::number(1.0));
        assert!(v[-1].view().is_pow());
    }

    #[test]
    fn test_scaled_term_is_product() {
        let v = view("3*x");
        assert!(v.is_product());
        assert_eq!(v[0], Expr::number(3.0));
        assert_eq!(v[1], Expr::symbol("x"));

        let v = view("-2*x*y");
        assert!(v.is_product());
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].view().value(), Some(-2.0));
    }

    #[test]
    fn test_division() {
        let v = view("sin(x)/(x + 1)");
        assert!(v.is_div());
        assert_eq!(v[0], parse("sin(x)").unwrap());
        assert_eq!(v[1], parse("x + 1").unwrap());

        let v = view("3/x");
        assert!(v.is_div());
        assert_eq!(v[0], Expr::number(3.0));
        assert_eq!(v[1], Expr::symbol("x"));
    }

    #[test]
    fn test_pow_and_function() {
        let v = view("x^3");
        assert!(v.is_pow());
        assert_eq!(v[1].view().value(), Some(3.0));

        let v = view("x^y");
        assert!(v.is_pow());
        assert_eq!(v[1], Expr::symbol("y"));

        let v = view("besselj(0, x)");
        assert!(v.is_function());
        assert_eq!(v.name().as_deref(), Some("besselj"));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_derivative_node() {
        let x = Symbol::new("x");
        let d = Expr::derivative(parse("zeta(x)").unwrap(), x.clone(), 2);
        let v = d.view();
        assert!(v.is_derivative());
        assert_eq!(v.derivative_var(), Some(&x));
        assert_eq!(v.derivative_order(), Some(2));
        assert!(v[0].view().is_function());
    }

    #[test]
    fn test_iteration() {
        let v = view("a + b + c");
        let names: Vec<String> = v.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!((&v).into_iter().count(), 3);
    }
}
