//! Tree traversal utilities
//!
//! Rewrites use an explicit work stack instead of native recursion, so very wide
//! or deep generated expressions cannot exhaust the thread stack.

use rustc_hash::{FxHashMap, FxHashSet};

use super::expr::{Expr, ExprKind};
use super::symbol::Symbol;

impl Expr {
    /// Direct children in canonical order. Coefficients and numeric exponents are
    /// part of the node, not children.
    pub(crate) fn children(&self) -> Vec<Expr> {
        match self.kind() {
            ExprKind::Number(_) | ExprKind::Symbol(_) => Vec::new(),
            ExprKind::Sum(terms) => terms.iter().map(|(_, t)| t.clone()).collect(),
            ExprKind::Product(factors) => factors.iter().map(|(b, _)| b.clone()).collect(),
            ExprKind::Pow(b, e) => vec![b.clone(), e.clone()],
            ExprKind::Function { args, .. } => args.clone(),
            ExprKind::Derivative { inner, .. } => vec![inner.clone()],
        }
    }

    /// Rebuild this node over new children through the canonical constructors.
    ///
    /// `children` must line up with [`Expr::children`].
    pub(crate) fn with_children(&self, children: Vec<Expr>) -> Expr {
        match self.kind() {
            ExprKind::Number(_) | ExprKind::Symbol(_) => self.clone(),
            ExprKind::Sum(terms) => Expr::sum_terms(
                terms
                    .iter()
                    .zip(children)
                    .map(|((c, _), t)| (*c, t))
                    .collect(),
            ),
            ExprKind::Product(factors) => Expr::product_factors(
                factors
                    .iter()
                    .zip(children)
                    .map(|((_, k), b)| (b, *k))
                    .collect(),
            ),
            ExprKind::Pow(..) => {
                let mut it = children.into_iter();
                match (it.next(), it.next()) {
                    (Some(b), Some(e)) => Expr::pow(b, e),
                    _ => self.clone(),
                }
            }
            ExprKind::Function { func, .. } => Expr::call(func.clone(), children),
            ExprKind::Derivative { var, order, .. } => match children.into_iter().next() {
                Some(inner) => Expr::derivative(inner, var.clone(), *order),
                None => self.clone(),
            },
        }
    }

    /// Like [`Expr::with_children`] but returns `self` untouched when nothing changed
    fn replace_children(&self, children: Vec<Expr>) -> Expr {
        let unchanged = self
            .children()
            .iter()
            .zip(&children)
            .all(|(old, new)| old.ptr_eq(new));
        if unchanged {
            self.clone()
        } else {
            self.with_children(children)
        }
    }

    /// Rebuild every node bottom-up through the constructors
    pub(crate) fn rebuild(&self) -> Expr {
        rewrite_bottom_up(self, |node| {
            let rebuilt = node.with_children(node.children());
            (rebuilt != *node).then_some(rebuilt)
        })
    }

    /// Number of nodes, counting shared subtrees once per occurrence
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.clone()];
        while let Some(e) = stack.pop() {
            count += 1;
            stack.extend(e.children());
        }
        count
    }

    /// Length of the longest root-to-leaf path (a leaf has depth 1)
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.clone(), 1usize)];
        while let Some((e, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(e.children().into_iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Whether `var` occurs anywhere in the tree, including as a derivative variable
    pub fn contains_var(&self, var: &Symbol) -> bool {
        let mut stack = vec![self.clone()];
        while let Some(e) = stack.pop() {
            match e.kind() {
                ExprKind::Symbol(s) if s == var => return true,
                ExprKind::Derivative { var: v, .. } if v == var => return true,
                _ => stack.extend(e.children()),
            }
        }
        false
    }

    /// All symbols appearing in the expression
    pub fn variables(&self) -> FxHashSet<Symbol> {
        let mut out = FxHashSet::default();
        let mut stack = vec![self.clone()];
        while let Some(e) = stack.pop() {
            if let ExprKind::Symbol(s) = e.kind() {
                out.insert(s.clone());
            }
            stack.extend(e.children());
        }
        out
    }

    /// Replace every occurrence of `var` with `value`
    pub fn substitute(&self, var: &Symbol, value: &Expr) -> Expr {
        rewrite_bottom_up(self, |node| match node.as_symbol() {
            Some(s) if s == var => Some(value.clone()),
            _ => None,
        })
    }
}

enum Frame {
    Enter(Expr),
    Exit(Expr, usize),
}

/// Post-order rewrite with an explicit stack.
///
/// `f` sees each node after its children were rewritten and the node rebuilt;
/// returning `Some` replaces the node. Shared subtrees are rewritten once.
pub(crate) fn rewrite_bottom_up<F>(root: &Expr, mut f: F) -> Expr
where
    F: FnMut(&Expr) -> Option<Expr>,
{
    let mut memo: FxHashMap<Expr, Expr> = FxHashMap::default();
    let mut work = vec![Frame::Enter(root.clone())];
    let mut results: Vec<Expr> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Enter(e) => {
                if let Some(done) = memo.get(&e) {
                    results.push(done.clone());
                    continue;
                }
                let kids = e.children();
                if kids.is_empty() {
                    let out = f(&e).unwrap_or_else(|| e.clone());
                    memo.insert(e, out.clone());
                    results.push(out);
                } else {
                    work.push(Frame::Exit(e, kids.len()));
                    work.extend(kids.into_iter().rev().map(Frame::Enter));
                }
            }
            Frame::Exit(e, n) => {
                let kids = results.split_off(results.len() - n);
                let rebuilt = e.replace_children(kids);
                let out = f(&rebuilt).unwrap_or(rebuilt);
                memo.insert(e, out.clone());
                results.push(out);
            }
        }
    }

    results.pop().unwrap_or_else(|| root.clone())
}
