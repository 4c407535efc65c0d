//! AST and resolved semantic info for the Lume shader compiler.
//!
//! This crate provides:
//!
//! - **Interned symbols** ([`Symbol`], [`SymbolInterner`]) — compact
//!   32-bit identifiers for names.
//! - **Source spans** ([`Span`]) — byte ranges attached to every AST
//!   node and diagnostic.
//! - **The arena AST** ([`Program`], [`Expr`], [`Stmt`], declarations) —
//!   what the parser produces and the IR lowering consumes.
//! - **Resolved semantic info** ([`Resolved`]) — the read-only side
//!   table the resolver fills in: expression types, const-eval results,
//!   and call-target classification.
//!
//! The IR construction pass treats everything here as immutable input.

mod ast;
mod interner;
mod sem;
mod span;

pub use ast::{
    BinaryOp, CaseSelector, Expr, ExprId, ExprKind, FunctionDecl, GlobalDecl, Lit, Param,
    PipelineStage, Program, Stmt, StmtId, StmtKind, SwitchCase, UnaryOp, VarDeclKind,
};
pub use interner::{Symbol, SymbolInterner};
pub use sem::{BuiltinFn, CallTarget, Resolved};
pub use span::Span;
