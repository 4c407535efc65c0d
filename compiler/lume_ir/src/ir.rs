//! The control-flow-graph IR.
//!
//! A [`Module`] owns four arenas (flow nodes, values, instructions,
//! functions) addressed by `u32` ID newtypes. Control flow is a graph
//! of [`FlowNode`]s: linear [`Block`]s plus structured `If`/`Loop`/
//! `Switch` nodes whose named sub-targets point back into the graph.
//!
//! Every flow node records the IDs of the nodes that branch *to* it in
//! `inbound_branches`. A merge target with an empty inbound list is
//! unreachable, which is how dead code after a terminal construct
//! (both if-arms return, a loop without break, an exhaustive switch)
//! shows up in the graph.

use lume_ast::{BinaryOp, BuiltinFn, PipelineStage, Symbol, SymbolInterner, UnaryOp};
use lume_types::{Access, AddressSpace, ConstValue, TypeId, TypePool};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

// ── ID newtypes ─────────────────────────────────────────────────────

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw index.
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
    };
}

id_newtype!(
    /// Flow node ID within a [`Module`].
    FlowId
);
id_newtype!(
    /// Value ID within a [`Module`].
    ValueId
);
id_newtype!(
    /// Instruction ID within a [`Module`].
    InstId
);
id_newtype!(
    /// Function ID within a [`Module`].
    FuncId
);

// ── Values ──────────────────────────────────────────────────────────

/// An SSA-ish value: a constant, an instruction result, or a function
/// parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: TypeId,
}

/// What produced a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueKind {
    /// A compile-time constant.
    Constant(ConstValue),
    /// The result of an instruction.
    InstResult(InstId),
    /// The `index`th parameter of `func`.
    FunctionParam { func: FuncId, index: u32 },
}

// ── Instructions ────────────────────────────────────────────────────

/// An instruction inside a [`Block`].
///
/// `result` is `Some` for value-producing instructions and `None` for
/// `Store` and `Discard`.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub kind: InstKind,
    pub result: Option<ValueId>,
}

/// Instruction variants.
#[derive(Clone, Debug, PartialEq)]
pub enum InstKind {
    /// A non-short-circuit binary operation.
    Binary {
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Unary {
        op: UnaryOp,
        value: ValueId,
    },
    /// Bit reinterpretation to the result value's type.
    Bitcast {
        value: ValueId,
    },
    /// A call to a builtin function.
    Builtin {
        func: BuiltinFn,
        args: SmallVec<[ValueId; 4]>,
    },
    /// Value construction of the result type.
    Construct {
        args: SmallVec<[ValueId; 4]>,
    },
    /// Value conversion from `from` to the result type.
    Convert {
        from: TypeId,
        args: SmallVec<[ValueId; 4]>,
    },
    /// A call to a user-declared function.
    UserCall {
        name: Symbol,
        args: SmallVec<[ValueId; 4]>,
    },
    /// Storage declaration. The result value has pointer type; the
    /// initializer, when present, is emitted after the declaration and
    /// patched in.
    Var {
        space: AddressSpace,
        access: Access,
        initializer: Option<ValueId>,
    },
    /// Read through a pointer.
    Load {
        from: ValueId,
    },
    /// Write through a pointer.
    Store {
        to: ValueId,
        from: ValueId,
    },
    Discard,
}

// ── Flow nodes ──────────────────────────────────────────────────────

/// A block terminator: an unconditional branch carrying optional
/// arguments (a return value, for branches to the function
/// terminator).
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub target: FlowId,
    pub args: SmallVec<[ValueId; 1]>,
}

/// A linear instruction sequence with at most one outgoing branch.
///
/// `branch` is `None` while the block is still being filled, and stays
/// `None` forever on dead blocks nothing ever reached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub instructions: Vec<InstId>,
    pub branch: Option<Branch>,
}

/// An if/else construct with named sub-targets.
#[derive(Clone, Debug, PartialEq)]
pub struct IfNode {
    pub condition: ValueId,
    pub true_target: FlowId,
    pub false_target: FlowId,
    pub merge_target: FlowId,
}

/// A loop construct. `start` is the body entry, `continuing` the latch
/// block, `merge` the exit reached by `break`.
#[derive(Clone, Debug, PartialEq)]
pub struct LoopNode {
    pub start_target: FlowId,
    pub continuing_target: FlowId,
    pub merge_target: FlowId,
}

/// One selector of a switch case: a constant value or `default`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaseSelector {
    Value(ValueId),
    Default,
}

impl CaseSelector {
    /// Returns `true` for the `default` selector.
    pub fn is_default(self) -> bool {
        matches!(self, CaseSelector::Default)
    }
}

/// One case of a switch: its selectors and the body's entry block.
#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub selectors: SmallVec<[CaseSelector; 4]>,
    pub start_target: FlowId,
}

/// A switch construct.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchNode {
    pub condition: ValueId,
    pub cases: Vec<Case>,
    pub merge_target: FlowId,
}

/// Flow node variants.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowKind {
    Block(Block),
    If(IfNode),
    Loop(LoopNode),
    Switch(SwitchNode),
    /// Entry node of a function; the root of reachability.
    Function(FuncId),
    /// Exit node of a function; branching here is a return.
    FunctionTerminator(FuncId),
    /// Terminator of the module-scope root block.
    RootTerminator,
}

/// A node in the control-flow graph.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowNode {
    pub kind: FlowKind,
    /// IDs of the nodes that branch to this one, in wiring order.
    pub inbound_branches: Vec<FlowId>,
}

// ── Functions ───────────────────────────────────────────────────────

/// A function parameter's IR-side record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FunctionParam {
    pub name: Symbol,
    pub ty: TypeId,
    pub value: ValueId,
}

/// An IR function.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: Symbol,
    pub params: Vec<FunctionParam>,
    pub return_type: TypeId,
    /// `Some` for pipeline entry points.
    pub stage: Option<PipelineStage>,
    /// The `FlowKind::Function` node for this function.
    pub node: FlowId,
    /// Entry block.
    pub start_target: FlowId,
    /// The `FlowKind::FunctionTerminator` node.
    pub end_target: FlowId,
}

// ── Module ──────────────────────────────────────────────────────────

/// The IR for one program: arenas plus module-level tables.
pub struct Module {
    flow_nodes: Vec<FlowNode>,
    values: Vec<Value>,
    instructions: Vec<Instruction>,
    pub functions: Vec<Function>,
    /// Functions that are pipeline entry points, in declaration order.
    pub entry_points: Vec<FuncId>,
    /// Block holding module-scope variable declarations, if any.
    pub root_block: Option<FlowId>,
    pub types: TypePool,
    /// IR-side symbol table; names are re-interned here so the module
    /// does not borrow from the source program.
    pub symbols: SymbolInterner,
    value_names: FxHashMap<ValueId, Symbol>,
}

impl Module {
    /// Create an empty module around a type pool.
    pub fn new(types: TypePool) -> Self {
        Self {
            flow_nodes: Vec::new(),
            values: Vec::new(),
            instructions: Vec::new(),
            functions: Vec::new(),
            entry_points: Vec::new(),
            root_block: None,
            types,
            symbols: SymbolInterner::new(),
            value_names: FxHashMap::default(),
        }
    }

    pub(crate) fn alloc_flow(&mut self, kind: FlowKind) -> FlowId {
        let id = FlowId::new(
            u32::try_from(self.flow_nodes.len())
                .unwrap_or_else(|_| panic!("flow node count exceeds u32")),
        );
        self.flow_nodes.push(FlowNode {
            kind,
            inbound_branches: Vec::new(),
        });
        id
    }

    pub(crate) fn alloc_value(&mut self, value: Value) -> ValueId {
        let id = ValueId::new(
            u32::try_from(self.values.len()).unwrap_or_else(|_| panic!("value count exceeds u32")),
        );
        self.values.push(value);
        id
    }

    pub(crate) fn alloc_inst(&mut self, inst: Instruction) -> InstId {
        let id = InstId::new(
            u32::try_from(self.instructions.len())
                .unwrap_or_else(|_| panic!("instruction count exceeds u32")),
        );
        self.instructions.push(inst);
        id
    }

    /// Look up a flow node.
    pub fn flow(&self, id: FlowId) -> &FlowNode {
        &self.flow_nodes[id.index()]
    }

    pub(crate) fn flow_mut(&mut self, id: FlowId) -> &mut FlowNode {
        &mut self.flow_nodes[id.index()]
    }

    /// Look up a value.
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    /// Look up an instruction.
    pub fn inst(&self, id: InstId) -> &Instruction {
        &self.instructions[id.index()]
    }

    pub(crate) fn inst_mut(&mut self, id: InstId) -> &mut Instruction {
        &mut self.instructions[id.index()]
    }

    /// Look up a function.
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.index()]
    }

    pub(crate) fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Number of allocated flow nodes.
    pub fn flow_count(&self) -> usize {
        self.flow_nodes.len()
    }

    /// Number of allocated values.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Number of allocated instructions.
    pub fn inst_count(&self) -> usize {
        self.instructions.len()
    }

    /// Attach a source-level name to a value.
    pub fn set_name(&mut self, value: ValueId, name: Symbol) {
        self.value_names.insert(value, name);
    }

    /// The source-level name of a value, if one was recorded.
    pub fn name_of(&self, value: ValueId) -> Option<Symbol> {
        self.value_names.get(&value).copied()
    }

    /// Whether a node is transitively reachable from a function's
    /// entry node, following inbound edges backwards.
    ///
    /// Merge targets with no reachable predecessor are dead; callers
    /// use this to stop lowering after a terminal construct.
    pub fn is_connected(&self, node: FlowId) -> bool {
        let mut visited = vec![false; self.flow_nodes.len()];
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if visited[n.index()] {
                continue;
            }
            visited[n.index()] = true;
            let node = self.flow(n);
            if matches!(node.kind, FlowKind::Function(_)) {
                return true;
            }
            stack.extend_from_slice(&node.inbound_branches);
        }
        false
    }

    /// Whether a block already has its terminator. Control nodes count
    /// as branched; they never take a second outgoing edge.
    pub fn is_branched(&self, id: FlowId) -> bool {
        match &self.flow(id).kind {
            FlowKind::Block(block) => block.branch.is_some(),
            _ => true,
        }
    }

    /// The `(true, false, merge)` targets of an `If` node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an `If` node.
    pub fn if_targets(&self, id: FlowId) -> (FlowId, FlowId, FlowId) {
        match &self.flow(id).kind {
            FlowKind::If(node) => (node.true_target, node.false_target, node.merge_target),
            kind => panic!("expected an if node, found {kind:?}"),
        }
    }

    /// The `(start, continuing, merge)` targets of a `Loop` node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a `Loop` node.
    pub fn loop_targets(&self, id: FlowId) -> (FlowId, FlowId, FlowId) {
        match &self.flow(id).kind {
            FlowKind::Loop(node) => (node.start_target, node.continuing_target, node.merge_target),
            kind => panic!("expected a loop node, found {kind:?}"),
        }
    }

    /// The merge target of a `Switch` node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a `Switch` node.
    pub fn switch_merge(&self, id: FlowId) -> FlowId {
        match &self.flow(id).kind {
            FlowKind::Switch(node) => node.merge_target,
            kind => panic!("expected a switch node, found {kind:?}"),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
