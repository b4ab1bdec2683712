//! Core simplification engine with rule-based architecture
//!
//! Each pass runs flatten, collect, the identity rules (bottom-up, by priority)
//! and the sign-normalizing reorder. Iteration ends at a fixpoint, on a cycle,
//! or at the configured pass ceiling.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use super::passes;
use super::rules::{RuleContext, global_registry};
use crate::Expr;
use crate::config::SimplifyConfig;
use crate::core::ordering::expr_cmp;
use crate::core::traverse::rewrite_bottom_up;

/// Main simplification engine
pub(crate) struct Simplifier {
    max_passes: usize,
    context: RuleContext,
}

impl Simplifier {
    pub(crate) fn new(config: &SimplifyConfig) -> Self {
        Simplifier {
            max_passes: config.max_passes,
            context: RuleContext {
                fixed_vars: config.fixed_vars.clone(),
                domain_safe: config.domain_safe,
            },
        }
    }

    /// Main simplification entry point
    pub(crate) fn simplify(&self, expr: &Expr) -> Expr {
        let mut current = expr.clone();
        // Every intermediate form, by first pass index, for cycle detection
        let mut history: FxHashMap<Expr, usize> = FxHashMap::default();
        let mut order: Vec<Expr> = Vec::new();

        for pass in 0..self.max_passes {
            let next = self.run_pass(&current);
            if next == current {
                trace!(passes = pass + 1, "simplification reached a fixpoint");
                return next;
            }
            if let Some(&start) = history.get(&next) {
                // Settle on one member of the cycle so repeated runs agree
                let chosen = order[start..]
                    .iter()
                    .min_by(|a, b| cycle_rank(a, b))
                    .cloned()
                    .unwrap_or(next);
                debug!(pass, expr = %chosen, "simplification cycle detected");
                return chosen;
            }
            history.insert(next.clone(), order.len());
            order.push(next.clone());
            current = next;
        }

        warn!(
            max_passes = self.max_passes,
            expr = %current,
            "simplification stopped at the pass ceiling"
        );
        current
    }

    fn run_pass(&self, expr: &Expr) -> Expr {
        let flat = passes::flatten(expr);
        let collected = passes::collect(&flat);
        let rewritten = rewrite_bottom_up(&collected, |node| self.apply_rules_to_node(node));
        passes::reorder(&rewritten)
    }

    /// Try every rule registered for the node's kind, highest priority first.
    ///
    /// Rules keep running on the rewritten node until one changes its kind.
    fn apply_rules_to_node(&self, node: &Expr) -> Option<Expr> {
        let registry = global_registry();
        let mut current = node.clone();
        let mut changed = false;

        for rule in registry.rules_for(current.node_kind()) {
            if self.context.domain_safe && rule.alters_domain() {
                continue;
            }
            let Some(next) = rule.apply(&current, &self.context) else {
                continue;
            };
            if next == current {
                continue;
            }
            trace!(rule = rule.name(), before = %current, after = %next, "rule fired");
            let kind_changed = next.node_kind() != current.node_kind();
            current = next;
            changed = true;
            if kind_changed {
                break;
            }
        }

        changed.then_some(current)
    }
}

/// Smaller trees first, then canonical order
fn cycle_rank(a: &Expr, b: &Expr) -> Ordering {
    a.node_count()
        .cmp(&b.node_count())
        .then_with(|| expr_cmp(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn simplify(input: &str) -> Expr {
        Simplifier::new(&SimplifyConfig::default()).simplify(&parse(input).unwrap())
    }

    #[test]
    fn test_fixpoint_is_stable() {
        let once = simplify("x/(x + 1) + 1/(x + 1) + sin(x)^2 + cos(x)^2");
        assert_eq!(once, Expr::number(2.0));
        let again = Simplifier::new(&SimplifyConfig::default()).simplify(&once);
        assert_eq!(again, once);
    }

    #[test]
    fn test_domain_safe_skips_domain_altering_rules() {
        let config = SimplifyConfig {
            domain_safe: true,
            ..SimplifyConfig::default()
        };
        let e = parse("exp(ln(x))").unwrap();
        assert_eq!(Simplifier::new(&config).simplify(&e), e);
        assert_eq!(simplify("exp(ln(x))"), Expr::symbol("x"));
    }

    #[test]
    fn test_pass_ceiling_returns_partial_result() {
        let config = SimplifyConfig {
            max_passes: 1,
            ..SimplifyConfig::default()
        };
        let out = Simplifier::new(&config).simplify(&parse("x + x").unwrap());
        assert_eq!(out, parse("2*x").unwrap());
    }

    #[test]
    fn test_fixed_e_is_a_plain_symbol() {
        let e = crate::Symbol::new("e");
        let mut config = SimplifyConfig::default();
        config.fixed_vars.insert(e);
        let out = Simplifier::new(&config).simplify(&parse("ln(e)").unwrap());
        assert_eq!(out, parse("ln(e)").unwrap());
        assert_eq!(simplify("ln(e)"), Expr::one());
    }
}
