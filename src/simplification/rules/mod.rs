use std::sync::{Arc, OnceLock};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::expr::NodeKind;
use crate::{Expr, Symbol};

/// Core trait for all simplification rules
pub(crate) trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn priority(&self) -> i32;
    fn category(&self) -> RuleCategory;

    /// Rules whose output is defined on a larger domain than their input
    /// (`exp(ln u) -> u` drops `u > 0`). Skipped in domain-safe mode.
    fn alters_domain(&self) -> bool {
        false
    }

    /// Rules are ONLY checked against nodes of these kinds
    fn applies_to(&self) -> &'static [NodeKind];

    fn apply(&self, expr: &Expr, context: &RuleContext) -> Option<Expr>;
}

/// Categories of simplification rules
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum RuleCategory {
    Numeric,
    Algebraic,
    Trigonometric,
    Hyperbolic,
    Exponential,
    Root,
}

/// Context passed to rules during application
#[derive(Clone, Debug, Default)]
pub(crate) struct RuleContext {
    /// Symbols the user declared constant; `e` and `pi` in this set are plain symbols
    pub fixed_vars: FxHashSet<Symbol>,
    pub domain_safe: bool,
}

impl RuleContext {
    /// Whether the symbol named `name` is user-fixed
    pub(crate) fn is_fixed(&self, name: &str) -> bool {
        Symbol::lookup(name).is_some_and(|s| self.fixed_vars.contains(&s))
    }

    /// `e` treated as Euler's number
    pub(crate) fn is_euler(&self, expr: &Expr) -> bool {
        expr.as_symbol().and_then(Symbol::name) == Some("e") && !self.is_fixed("e")
    }

    /// `pi` treated as π
    pub(crate) fn is_pi(&self, expr: &Expr) -> bool {
        expr.as_symbol().and_then(Symbol::name) == Some("pi") && !self.is_fixed("pi")
    }
}

/// Declare a unit-struct rule.
///
/// `rule!(Name, "name", priority, Category, &[kinds], |expr, ctx| ...)`, with an
/// optional `alters_domain: true,` before the closure.
macro_rules! rule {
    ($name:ident, $rule_name:expr, $priority:expr, $category:ident, $applies_to:expr, alters_domain: $alters:expr, $logic:expr) => {
        rule!(@impl $name, $rule_name, $priority, $category, $applies_to, $alters, $logic);
    };
    ($name:ident, $rule_name:expr, $priority:expr, $category:ident, $applies_to:expr, $logic:expr) => {
        rule!(@impl $name, $rule_name, $priority, $category, $applies_to, false, $logic);
    };
    (@impl $name:ident, $rule_name:expr, $priority:expr, $category:ident, $applies_to:expr, $alters:expr, $logic:expr) => {
        pub(crate) struct $name;

        impl $crate::simplification::rules::Rule for $name {
            fn name(&self) -> &'static str {
                $rule_name
            }

            fn priority(&self) -> i32 {
                $priority
            }

            fn category(&self) -> $crate::simplification::rules::RuleCategory {
                $crate::simplification::rules::RuleCategory::$category
            }

            fn alters_domain(&self) -> bool {
                $alters
            }

            fn applies_to(&self) -> &'static [$crate::core::expr::NodeKind] {
                $applies_to
            }

            fn apply(
                &self,
                expr: &$crate::Expr,
                context: &$crate::simplification::rules::RuleContext,
            ) -> Option<$crate::Expr> {
                ($logic)(expr, context)
            }
        }
    };
}

/// Numeric folding of function calls and constants
pub(crate) mod numeric;

/// Powers, perfect squares and sign parity
pub(crate) mod algebraic;

/// Fraction cancellation and rational addition
pub(crate) mod fractions;

pub(crate) mod trigonometric;

pub(crate) mod hyperbolic;

/// Exponential and logarithmic rules
pub(crate) mod exponential;

/// Root and absolute-value rules
pub(crate) mod root;

type SharedRule = Arc<dyn Rule>;

/// Rule registry indexed by node kind, highest priority first
pub(crate) struct RuleRegistry {
    rules_by_kind: FxHashMap<NodeKind, Vec<SharedRule>>,
}

impl RuleRegistry {
    fn build() -> Self {
        let mut rules: Vec<SharedRule> = Vec::new();
        rules.extend(numeric::get_numeric_rules());
        rules.extend(algebraic::get_algebraic_rules());
        rules.extend(fractions::get_fraction_rules());
        rules.extend(trigonometric::get_trigonometric_rules());
        rules.extend(hyperbolic::get_hyperbolic_rules());
        rules.extend(exponential::get_exponential_rules());
        rules.extend(root::get_root_rules());

        // Priority descending; category then name break ties deterministically
        rules.sort_by_key(|r| (std::cmp::Reverse(r.priority()), r.category() as u8, r.name()));

        let mut rules_by_kind: FxHashMap<NodeKind, Vec<SharedRule>> = FxHashMap::default();
        for rule in &rules {
            for &kind in rule.applies_to() {
                rules_by_kind.entry(kind).or_default().push(Arc::clone(rule));
            }
        }
        RuleRegistry { rules_by_kind }
    }

    #[inline]
    pub(crate) fn rules_for(&self, kind: NodeKind) -> &[SharedRule] {
        self.rules_by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }
}

/// Global rule registry, built once
pub(crate) fn global_registry() -> &'static RuleRegistry {
    static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(RuleRegistry::build)
}

// ===== Shared pattern helpers =====

/// Factor list of a term: `Product` factors, `[]` for `1`, `[(t, 1)]` otherwise
pub(crate) fn factors_of(term: &Expr) -> Vec<(Expr, f64)> {
    match term.kind() {
        crate::core::expr::ExprKind::Product(f) => f.clone(),
        _ if term.is_one() => Vec::new(),
        _ => vec![(term.clone(), 1.0)],
    }
}

/// Every way of writing `term` as `which(u)^power · rest`, as `(u, rest)`
pub(crate) fn split_call_power(
    term: &Expr,
    which: crate::functions::Builtin,
    power: f64,
) -> Vec<(Expr, Expr)> {
    let factors = factors_of(term);
    factors
        .iter()
        .enumerate()
        .filter(|(_, (_, k))| *k == power)
        .filter_map(|(i, (b, _))| {
            let arg = b.unary_arg(which)?.clone();
            let mut rest = factors.clone();
            rest.remove(i);
            Some((arg, Expr::product_factors(rest)))
        })
        .collect()
}

#[inline]
pub(crate) fn is_integer(k: f64) -> bool {
    k.is_finite() && k.fract() == 0.0
}
