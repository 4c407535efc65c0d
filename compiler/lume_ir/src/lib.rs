//! Control-flow-graph IR for the Lume shader compiler.
//!
//! This crate turns a resolved AST into a flow-graph [`Module`]:
//!
//! - [`ir`] — the data model: flow nodes (blocks, if, loop, switch,
//!   function entry/exit), instructions, values, and the module that
//!   owns them.
//! - [`builder`] — [`FlowBuilder`], the low-level allocator that wires
//!   branch edges and inbound-branch lists.
//! - [`lower`] — the AST walk: [`lower_program`] drives the builder,
//!   tracking reachability so dead code is never lowered.
//! - [`disassembler`] — deterministic text rendering for tests and
//!   debugging.
//!
//! The produced graph is deliberately unoptimized: `while`/`for`
//! desugar into loops with an `if {} else { break }` exit test, and
//! short-circuit `&&`/`||` into an `If` around a hidden temporary.
//! Later passes consume the inbound-branch counts to find and drop
//! unreachable merge points.

pub mod builder;
pub mod diagnostics;
pub mod disassembler;
pub mod ir;
pub mod lower;
pub mod scope;

pub use builder::FlowBuilder;
pub use diagnostics::{Diagnostic, Severity};
pub use disassembler::disassemble;
pub use ir::{
    Block, Branch, Case, CaseSelector, FlowId, FlowKind, FlowNode, FuncId, Function,
    FunctionParam, IfNode, InstId, InstKind, Instruction, LoopNode, Module, SwitchNode, Value,
    ValueId, ValueKind,
};
pub use lower::{lower_program, Lowered};
pub use scope::ScopeStack;
