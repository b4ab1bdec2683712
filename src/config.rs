//! Simplification settings
//!
//! Defaults can be overridden from the environment:
//! - `SYMB_KERNEL_DOMAIN_SAFE`: `1` or `true` skips domain-altering rewrites
//! - `SYMB_KERNEL_MAX_PASSES`: pass ceiling for the simplifier

use rustc_hash::FxHashSet;

use crate::Symbol;

/// Default pass ceiling of the simplifier
pub const DEFAULT_MAX_PASSES: usize = 64;

const DOMAIN_SAFE_VAR: &str = "SYMB_KERNEL_DOMAIN_SAFE";
const MAX_PASSES_VAR: &str = "SYMB_KERNEL_MAX_PASSES";

/// Settings for one simplification run
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Upper bound on flatten/collect/rewrite/reorder iterations
    pub max_passes: usize,
    /// Skip rewrites that enlarge the domain (`exp(ln u) -> u`, `sqrt(u)^2 -> u`, ...)
    pub domain_safe: bool,
    /// Symbols treated as opaque constants. A fixed `e` or `pi` is not Euler's number or π.
    pub fixed_vars: FxHashSet<Symbol>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        SimplifyConfig {
            max_passes: DEFAULT_MAX_PASSES,
            domain_safe: false,
            fixed_vars: FxHashSet::default(),
        }
    }
}

impl SimplifyConfig {
    /// Defaults overridden by `SYMB_KERNEL_DOMAIN_SAFE` and `SYMB_KERNEL_MAX_PASSES`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = SimplifyConfig::default();
        if let Some(raw) = lookup(DOMAIN_SAFE_VAR) {
            config.domain_safe = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true");
        }
        if let Some(raw) = lookup(MAX_PASSES_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_passes = n,
                _ => tracing::warn!(
                    value = %raw,
                    "ignoring invalid {MAX_PASSES_VAR}; using {DEFAULT_MAX_PASSES}"
                ),
            }
        }
        config
    }
}
