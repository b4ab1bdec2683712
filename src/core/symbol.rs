//! Interned symbols
//!
//! Named symbols are interned globally: every occurrence of the same name maps to
//! the same id, so equality is a single integer comparison. Anonymous symbols draw
//! a fresh id from the same counter and are never registered under a name, which
//! makes each one equal only to itself.
//!
//! # Example
//! ```
//! use symb_kernel::Symbol;
//!
//! let x = Symbol::new("x");
//! assert_eq!(x, Symbol::new("x"));
//!
//! let t1 = Symbol::anon();
//! let t2 = Symbol::anon();
//! assert_ne!(t1, t2);
//! assert!(t1.id() < t2.id());
//! ```

use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Process-wide id source. Starts at 1 and only ever increases.
static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

fn next_symbol_id() -> u64 {
    NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed)
}

fn registry() -> &'static RwLock<FxHashMap<Arc<str>, Symbol>> {
    static REGISTRY: OnceLock<RwLock<FxHashMap<Arc<str>, Symbol>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// A variable identity.
///
/// Cloning is cheap (an id plus a shared name). Equality and hashing use only the id.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    name: Option<Arc<str>>,
}

impl Symbol {
    /// Get or create the named symbol.
    pub fn new(name: &str) -> Self {
        // The table is only ever inserted into, so a poisoned lock still holds
        // consistent data.
        if let Some(existing) = registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return existing.clone();
        }

        let mut table = registry().write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race between the two locks
        if let Some(existing) = table.get(name) {
            return existing.clone();
        }
        let name: Arc<str> = Arc::from(name);
        let symbol = Symbol {
            id: next_symbol_id(),
            name: Some(Arc::clone(&name)),
        };
        table.insert(name, symbol.clone());
        symbol
    }

    /// Create a fresh anonymous symbol.
    ///
    /// Anonymous symbols render as `$<id>` and never compare equal to any other
    /// symbol, named or anonymous.
    pub fn anon() -> Self {
        Symbol {
            id: next_symbol_id(),
            name: None,
        }
    }

    /// Look up a named symbol without creating it.
    pub fn lookup(name: &str) -> Option<Self> {
        registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The symbol's name, or `None` for anonymous symbols.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Printable label: the name, or `$<id>` for anonymous symbols.
    pub fn label(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("${}", self.id)),
        }
    }

    /// Wrap as an expression.
    pub fn to_expr(&self) -> crate::Expr {
        crate::Expr::from_symbol(self.clone())
    }

    /// Canonical ordering: named symbols alphabetically, then anonymous ones by id.
    pub(crate) fn canonical_cmp(&self, other: &Symbol) -> CmpOrdering {
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => a.cmp(b).then(self.id.cmp(&other.id)),
            (Some(_), None) => CmpOrdering::Less,
            (None, Some(_)) => CmpOrdering::Greater,
            (None, None) => self.id.cmp(&other.id),
        }
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.label(), self.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}
