//! Lexical scope stack for the lowering pass.

use lume_ast::Symbol;
use rustc_hash::FxHashMap;

use crate::ir::ValueId;

/// Maps source names to the IR values currently bound to them.
///
/// Lookup walks from the innermost frame outwards; a binding in an
/// inner frame shadows outer ones until the frame is popped.
pub struct ScopeStack {
    frames: Vec<FxHashMap<Symbol, ValueId>>,
}

impl ScopeStack {
    /// Create a stack holding only the module-scope frame.
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    /// Enter a new innermost frame.
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Leave the innermost frame, dropping its bindings.
    ///
    /// # Panics
    ///
    /// Panics on an attempt to pop the module-scope frame.
    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the module-scope frame");
        self.frames.pop();
    }

    /// Bind `name` in the innermost frame, shadowing any outer
    /// binding.
    pub fn set(&mut self, name: Symbol, value: ValueId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, value);
        }
    }

    /// Look up `name`, innermost frame first.
    pub fn get(&self, name: Symbol) -> Option<ValueId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name).copied())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sym(raw: u32) -> Symbol {
        Symbol::from_raw(raw)
    }

    #[test]
    fn get_unbound_is_none() {
        let scopes = ScopeStack::new();
        assert_eq!(scopes.get(sym(0)), None);
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let mut scopes = ScopeStack::new();
        scopes.set(sym(0), ValueId::new(1));
        scopes.push();
        scopes.set(sym(0), ValueId::new(2));
        assert_eq!(scopes.get(sym(0)), Some(ValueId::new(2)));
        scopes.pop();
        assert_eq!(scopes.get(sym(0)), Some(ValueId::new(1)));
    }

    #[test]
    fn outer_bindings_visible_from_inner_frames() {
        let mut scopes = ScopeStack::new();
        scopes.set(sym(3), ValueId::new(7));
        scopes.push();
        scopes.push();
        assert_eq!(scopes.get(sym(3)), Some(ValueId::new(7)));
    }

    #[test]
    #[should_panic(expected = "module-scope frame")]
    fn popping_root_frame_panics() {
        let mut scopes = ScopeStack::new();
        scopes.pop();
    }
}
