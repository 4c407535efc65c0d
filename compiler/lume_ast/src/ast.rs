//! Arena AST.
//!
//! Expressions and statements are allocated into per-kind arenas owned
//! by [`Program`] and referenced by [`ExprId`]/[`StmtId`]. The parser
//! produces a `Program`; the resolver annotates it through the side
//! table in [`crate::Resolved`]; the IR lowering walks it read-only.
//!
//! Compound assignment and increment/decrement have no statement kinds
//! here: an earlier rewrite desugars them into plain [`StmtKind::Assign`]
//! before this tree reaches the IR builder.

use lume_types::TypeId;

use crate::interner::{Symbol, SymbolInterner};
use crate::span::Span;

// ── ID newtypes ─────────────────────────────────────────────────────

/// Expression ID within a [`Program`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Create a new expression ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Statement ID within a [`Program`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StmtId(u32);

impl StmtId {
    /// Create a new statement ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Operators ───────────────────────────────────────────────────────

/// Unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    AddressOf,
    Complement,
    Indirection,
    Negation,
    Not,
}

/// Binary operator.
///
/// `LogicalAnd`/`LogicalOr` are short-circuit: the IR builder lowers
/// them to explicit control flow, never to a flat binary instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// Returns `true` for the short-circuit operators.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }
}

// ── Expressions ─────────────────────────────────────────────────────

/// A literal value as written in source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lit {
    Bool(bool),
    I32(i32),
    U32(u32),
    F32(f32),
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    /// Create a new expression.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Lit),
    Ident(Symbol),
    Unary {
        op: UnaryOp,
        expr: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// Bit reinterpretation; the destination type comes from the
    /// resolved expression type.
    Bitcast {
        expr: ExprId,
    },
    /// A call. The resolver classifies the target (builtin, value
    /// constructor, conversion, or user function) in the side table.
    Call {
        target: Symbol,
        args: Vec<ExprId>,
    },
}

// ── Statements ──────────────────────────────────────────────────────

/// Kind of a variable declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarDeclKind {
    /// Mutable storage; lowers to a `Var` instruction.
    Var,
    /// Immutable binding; names the initializer's value, no storage.
    Let,
    /// Module/function constant; const-eval'd away, never lowered.
    Const,
}

/// A selector on a switch case: a constant expression or `default`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaseSelector {
    Value(ExprId),
    Default,
}

impl CaseSelector {
    /// Returns `true` for the `default` selector.
    pub fn is_default(self) -> bool {
        matches!(self, CaseSelector::Default)
    }
}

/// One case clause of a switch statement.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub selectors: Vec<CaseSelector>,
    /// Body; always a `StmtKind::Block`.
    pub body: StmtId,
}

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    /// Create a new statement.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    VarDecl {
        kind: VarDeclKind,
        name: Symbol,
        /// Declared store type; `None` means infer from the
        /// initializer's resolved type.
        ty: Option<TypeId>,
        init: Option<ExprId>,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
    },
    If {
        cond: ExprId,
        /// Always a `StmtKind::Block`.
        body: StmtId,
        /// Either another `If` (else-if chain) or a `Block`.
        else_stmt: Option<StmtId>,
    },
    Loop {
        /// Always a `StmtKind::Block`.
        body: StmtId,
        /// The continuing block, if present.
        continuing: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        continuing: Option<StmtId>,
        body: StmtId,
    },
    Switch {
        cond: ExprId,
        cases: Vec<SwitchCase>,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    /// `break if (cond)`; only valid as the final statement of a
    /// loop's continuing block.
    BreakIf(ExprId),
    Discard,
    /// Expression statement for a call evaluated for its effects.
    Call(ExprId),
}

// ── Declarations ────────────────────────────────────────────────────

/// Pipeline stage of an entry-point function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Vertex,
    Fragment,
    Compute { workgroup_size: [u32; 3] },
}

/// A function parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeId,
}

/// A function declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_type: TypeId,
    /// `Some` marks this function as a pipeline entry point.
    pub stage: Option<PipelineStage>,
    /// Always a `StmtKind::Block`.
    pub body: StmtId,
}

/// A module-scope declaration, in source order.
#[derive(Clone, Debug, PartialEq)]
pub enum GlobalDecl {
    /// A module-scope `var`/`const`; the `StmtId` is a `VarDecl`.
    Var(StmtId),
    Function(FunctionDecl),
}

// ── Program ─────────────────────────────────────────────────────────

/// A parsed program: arenas plus the module-scope declaration list.
#[derive(Default)]
pub struct Program {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    pub decls: Vec<GlobalDecl>,
    pub symbols: SymbolInterner,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its ID.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(
            u32::try_from(self.exprs.len()).unwrap_or_else(|_| panic!("expr count exceeds u32")),
        );
        self.exprs.push(expr);
        id
    }

    /// Allocate a statement, returning its ID.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(
            u32::try_from(self.stmts.len()).unwrap_or_else(|_| panic!("stmt count exceeds u32")),
        );
        self.stmts.push(stmt);
        id
    }

    /// Look up an expression.
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Look up a statement.
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// Number of allocated expressions (the upper bound for dense
    /// expression-indexed side tables).
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Intern a name into this program's symbol table.
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
