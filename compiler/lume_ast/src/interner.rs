//! Interned string identifiers.
//!
//! [`Symbol`] is a 32-bit index into a [`SymbolInterner`]. Interning
//! gives O(1) equality and hashing for names. The interner is
//! single-threaded; IR construction is a synchronous pass with no
//! concurrent access.

use std::fmt;

use rustc_hash::FxHashMap;

/// Interned string identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Create from a raw `u32` value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Symbol(raw)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// String interner mapping names to [`Symbol`]s and back.
#[derive(Default)]
pub struct SymbolInterner {
    lookup: FxHashMap<String, Symbol>,
    strings: Vec<String>,
}

impl SymbolInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(sym) = self.lookup.get(s) {
            return *sym;
        }
        let sym = Symbol(
            u32::try_from(self.strings.len())
                .unwrap_or_else(|_| panic!("symbol count exceeds u32")),
        );
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), sym);
        sym
    }

    /// Resolve a symbol back to its string.
    ///
    /// # Panics
    ///
    /// Panics if `sym` was not produced by this interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.raw() as usize]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
