//! Resolved semantic info.
//!
//! [`Resolved`] is the read-only side table the resolver produces and
//! the IR lowering queries: the type of every expression, const-eval
//! results for compile-time-constant expressions, and call-target
//! classification. Expression types use a dense vector indexed by
//! [`ExprId`]; the sparser annotations use hash maps.

use lume_types::{ConstValue, TypeId};
use rustc_hash::FxHashMap;

use crate::ast::ExprId;
use crate::interner::Symbol;

/// A builtin function recognized by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinFn {
    Abs,
    Max,
    Min,
    Dot,
}

impl BuiltinFn {
    /// The source-level name of the builtin.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinFn::Abs => "abs",
            BuiltinFn::Max => "max",
            BuiltinFn::Min => "min",
            BuiltinFn::Dot => "dot",
        }
    }
}

/// What a call expression resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallTarget {
    /// A builtin function.
    Builtin(BuiltinFn),
    /// A value constructor, e.g. `i32(...)` zero-value or composite
    /// construction.
    Construct,
    /// A value conversion from `from` to the expression's type.
    Convert { from: TypeId },
    /// A user-declared function.
    Function(Symbol),
}

/// Read-only semantic annotations for one [`crate::Program`].
#[derive(Default)]
pub struct Resolved {
    /// Type of each expression, indexed by `ExprId`. `TypeId::VOID`
    /// for expressions the resolver never typed.
    expr_types: Vec<TypeId>,
    /// Const-eval results for compile-time-constant expressions.
    const_values: FxHashMap<ExprId, ConstValue>,
    /// Call-target classification for call expressions.
    call_targets: FxHashMap<ExprId, CallTarget>,
}

impl Resolved {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved type of an expression.
    pub fn type_of(&self, id: ExprId) -> TypeId {
        self.expr_types
            .get(id.index())
            .copied()
            .unwrap_or(TypeId::VOID)
    }

    /// The const-eval result for an expression, if it folded.
    pub fn const_value_of(&self, id: ExprId) -> Option<ConstValue> {
        self.const_values.get(&id).copied()
    }

    /// The call target of a call expression.
    pub fn call_target_of(&self, id: ExprId) -> Option<CallTarget> {
        self.call_targets.get(&id).copied()
    }

    /// Record an expression's type.
    pub fn set_type(&mut self, id: ExprId, ty: TypeId) {
        if self.expr_types.len() <= id.index() {
            self.expr_types.resize(id.index() + 1, TypeId::VOID);
        }
        self.expr_types[id.index()] = ty;
    }

    /// Record an expression's const-eval result. The expression also
    /// gets the constant's type if none was set.
    pub fn set_const(&mut self, id: ExprId, value: ConstValue) {
        if self.type_of(id) == TypeId::VOID {
            self.set_type(id, value.type_id());
        }
        self.const_values.insert(id, value);
    }

    /// Record a call expression's target.
    pub fn set_call_target(&mut self, id: ExprId, target: CallTarget) {
        self.call_targets.insert(id, target);
    }
}

// ── Tests ───────────────────────────────────────────────────────────
