//! Low-level flow-graph construction.
//!
//! [`FlowBuilder`] allocates flow nodes, values, and instructions into
//! a [`Module`] and wires branch edges. It knows nothing about the
//! AST; the lowering pass in [`crate::lower`] drives it.
//!
//! Structural edges are wired at creation time: a new `If` feeds its
//! true and false targets, a new `Loop` feeds its start block, a new
//! case block is fed by its `Switch`, and a new function feeds its
//! entry block. Everything else goes through [`FlowBuilder::branch`].

use lume_ast::{BinaryOp, BuiltinFn, PipelineStage, Symbol, UnaryOp};
use lume_types::{Access, AddressSpace, ConstValue, TypeId, TypePool};
use smallvec::SmallVec;

use crate::ir::{
    Block, Branch, Case, CaseSelector, FlowId, FlowKind, FuncId, Function, IfNode, InstId,
    InstKind, Instruction, LoopNode, Module, SwitchNode, Value, ValueId, ValueKind,
};

/// Allocates IR objects and wires the flow graph.
pub struct FlowBuilder {
    pub module: Module,
}

impl FlowBuilder {
    /// Create a builder around an empty module.
    pub fn new(types: TypePool) -> Self {
        Self {
            module: Module::new(types),
        }
    }

    // ── Flow nodes ──────────────────────────────────────────────────

    /// Allocate an empty block with no inbound edges.
    pub fn create_block(&mut self) -> FlowId {
        self.module.alloc_flow(FlowKind::Block(Block::default()))
    }

    /// Allocate a function: its entry node, start block, and
    /// terminator. The entry node is wired to the start block.
    pub fn create_function(
        &mut self,
        name: Symbol,
        return_type: TypeId,
        stage: Option<PipelineStage>,
    ) -> FuncId {
        let func = FuncId::new(
            u32::try_from(self.module.functions.len())
                .unwrap_or_else(|_| panic!("function count exceeds u32")),
        );
        let node = self.module.alloc_flow(FlowKind::Function(func));
        let start_target = self.create_block();
        let end_target = self.module.alloc_flow(FlowKind::FunctionTerminator(func));
        self.module.flow_mut(start_target).inbound_branches.push(node);

        self.module.functions.push(Function {
            name,
            params: Vec::new(),
            return_type,
            stage,
            node,
            start_target,
            end_target,
        });
        if stage.is_some() {
            self.module.entry_points.push(func);
        }
        func
    }

    /// Allocate an `If` node plus its three target blocks. The node is
    /// wired to the true and false targets; the merge target collects
    /// edges only from arms that actually reach it.
    pub fn create_if(&mut self, condition: ValueId) -> FlowId {
        let true_target = self.create_block();
        let false_target = self.create_block();
        let merge_target = self.create_block();
        let node = self.module.alloc_flow(FlowKind::If(IfNode {
            condition,
            true_target,
            false_target,
            merge_target,
        }));
        self.module.flow_mut(true_target).inbound_branches.push(node);
        self.module.flow_mut(false_target).inbound_branches.push(node);
        node
    }

    /// Allocate a `Loop` node plus start, continuing, and merge
    /// blocks. The node is wired to the start block; the back-edge
    /// from continuing to start is the lowering pass's job.
    pub fn create_loop(&mut self) -> FlowId {
        let start_target = self.create_block();
        let continuing_target = self.create_block();
        let merge_target = self.create_block();
        let node = self.module.alloc_flow(FlowKind::Loop(LoopNode {
            start_target,
            continuing_target,
            merge_target,
        }));
        self.module.flow_mut(start_target).inbound_branches.push(node);
        node
    }

    /// Allocate a `Switch` node with no cases yet and a merge block.
    pub fn create_switch(&mut self, condition: ValueId) -> FlowId {
        let merge_target = self.create_block();
        self.module.alloc_flow(FlowKind::Switch(SwitchNode {
            condition,
            cases: Vec::new(),
            merge_target,
        }))
    }

    /// Append a case to a switch, returning the case body's entry
    /// block, wired from the switch node.
    ///
    /// # Panics
    ///
    /// Panics if `switch` is not a `Switch` node.
    pub fn create_case(
        &mut self,
        switch: FlowId,
        selectors: SmallVec<[CaseSelector; 4]>,
    ) -> FlowId {
        let start_target = self.create_block();
        match &mut self.module.flow_mut(switch).kind {
            FlowKind::Switch(node) => node.cases.push(Case {
                selectors,
                start_target,
            }),
            kind => panic!("expected a switch node, found {kind:?}"),
        }
        self.module
            .flow_mut(start_target)
            .inbound_branches
            .push(switch);
        start_target
    }

    /// The module-scope root block, created (and terminated) on first
    /// use.
    pub fn root_block_or_create(&mut self) -> FlowId {
        if let Some(root) = self.module.root_block {
            return root;
        }
        let root = self.create_block();
        let terminator = self.module.alloc_flow(FlowKind::RootTerminator);
        self.branch(root, terminator, SmallVec::new());
        self.module.root_block = Some(root);
        root
    }

    /// Terminate `from` with a branch to `to` and record the inbound
    /// edge on `to`.
    ///
    /// # Panics
    ///
    /// Panics if `from` is not a block or already has a terminator;
    /// both indicate a bug in the lowering pass.
    pub fn branch(&mut self, from: FlowId, to: FlowId, args: SmallVec<[ValueId; 1]>) {
        match &mut self.module.flow_mut(from).kind {
            FlowKind::Block(block) => {
                assert!(
                    block.branch.is_none(),
                    "block {from:?} already has a terminator"
                );
                block.branch = Some(Branch { target: to, args });
            }
            kind => panic!("branch source must be a block, found {kind:?}"),
        }
        self.module.flow_mut(to).inbound_branches.push(from);
    }

    // ── Values ──────────────────────────────────────────────────────

    /// Allocate a constant value.
    pub fn constant(&mut self, value: ConstValue) -> ValueId {
        let ty = value.type_id();
        self.module.alloc_value(Value {
            kind: ValueKind::Constant(value),
            ty,
        })
    }

    /// Allocate the value for a function parameter.
    pub fn function_param(&mut self, func: FuncId, index: u32, ty: TypeId) -> ValueId {
        self.module.alloc_value(Value {
            kind: ValueKind::FunctionParam { func, index },
            ty,
        })
    }

    // ── Instructions ────────────────────────────────────────────────

    fn append(&mut self, block: FlowId, inst: InstId) {
        match &mut self.module.flow_mut(block).kind {
            FlowKind::Block(b) => b.instructions.push(inst),
            kind => panic!("instructions belong in blocks, found {kind:?}"),
        }
    }

    fn emit(&mut self, block: FlowId, ty: TypeId, kind: InstKind) -> ValueId {
        let inst = InstId::new(
            u32::try_from(self.module.inst_count())
                .unwrap_or_else(|_| panic!("instruction count exceeds u32")),
        );
        let result = self.module.alloc_value(Value {
            kind: ValueKind::InstResult(inst),
            ty,
        });
        let id = self.module.alloc_inst(Instruction {
            kind,
            result: Some(result),
        });
        debug_assert_eq!(id, inst);
        self.append(block, id);
        result
    }

    fn emit_no_result(&mut self, block: FlowId, kind: InstKind) {
        let id = self.module.alloc_inst(Instruction { kind, result: None });
        self.append(block, id);
    }

    /// Emit a binary operation into `block`.
    pub fn emit_binary(
        &mut self,
        block: FlowId,
        op: BinaryOp,
        ty: TypeId,
        lhs: ValueId,
        rhs: ValueId,
    ) -> ValueId {
        debug_assert!(
            !op.is_short_circuit(),
            "short-circuit operators lower to control flow, not instructions"
        );
        self.emit(block, ty, InstKind::Binary { op, lhs, rhs })
    }

    /// Emit a unary operation into `block`.
    pub fn emit_unary(&mut self, block: FlowId, op: UnaryOp, ty: TypeId, value: ValueId) -> ValueId {
        self.emit(block, ty, InstKind::Unary { op, value })
    }

    /// Emit a bitcast to `ty` into `block`.
    pub fn emit_bitcast(&mut self, block: FlowId, ty: TypeId, value: ValueId) -> ValueId {
        self.emit(block, ty, InstKind::Bitcast { value })
    }

    /// Emit a builtin call into `block`.
    pub fn emit_builtin(
        &mut self,
        block: FlowId,
        ty: TypeId,
        func: BuiltinFn,
        args: SmallVec<[ValueId; 4]>,
    ) -> ValueId {
        self.emit(block, ty, InstKind::Builtin { func, args })
    }

    /// Emit a value construction into `block`.
    pub fn emit_construct(
        &mut self,
        block: FlowId,
        ty: TypeId,
        args: SmallVec<[ValueId; 4]>,
    ) -> ValueId {
        self.emit(block, ty, InstKind::Construct { args })
    }

    /// Emit a value conversion from `from` to `ty` into `block`.
    pub fn emit_convert(
        &mut self,
        block: FlowId,
        ty: TypeId,
        from: TypeId,
        args: SmallVec<[ValueId; 4]>,
    ) -> ValueId {
        self.emit(block, ty, InstKind::Convert { from, args })
    }

    /// Emit a user-function call into `block`.
    pub fn emit_user_call(
        &mut self,
        block: FlowId,
        ty: TypeId,
        name: Symbol,
        args: SmallVec<[ValueId; 4]>,
    ) -> ValueId {
        self.emit(block, ty, InstKind::UserCall { name, args })
    }

    /// Emit a storage declaration into `block`. `ty` must be the
    /// pointer type; the initializer is patched in later via
    /// [`FlowBuilder::set_var_initializer`] so that initializer
    /// instructions land after the declaration.
    pub fn emit_var(
        &mut self,
        block: FlowId,
        ty: TypeId,
        space: AddressSpace,
        access: Access,
    ) -> ValueId {
        self.emit(
            block,
            ty,
            InstKind::Var {
                space,
                access,
                initializer: None,
            },
        )
    }

    /// Patch the initializer of a previously emitted `Var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` is not the result of a `Var` instruction.
    pub fn set_var_initializer(&mut self, var: ValueId, init: ValueId) {
        let ValueKind::InstResult(inst) = self.module.value(var).kind else {
            panic!("var initializer target is not an instruction result");
        };
        match &mut self.module.inst_mut(inst).kind {
            InstKind::Var { initializer, .. } => *initializer = Some(init),
            kind => panic!("expected a var instruction, found {kind:?}"),
        }
    }

    /// Emit a load through `from` into `block`.
    pub fn emit_load(&mut self, block: FlowId, ty: TypeId, from: ValueId) -> ValueId {
        self.emit(block, ty, InstKind::Load { from })
    }

    /// Emit a store of `from` through `to` into `block`.
    pub fn emit_store(&mut self, block: FlowId, to: ValueId, from: ValueId) {
        self.emit_no_result(block, InstKind::Store { to, from });
    }

    /// Emit a discard into `block`.
    pub fn emit_discard(&mut self, block: FlowId) {
        self.emit_no_result(block, InstKind::Discard);
    }
}

// ── Tests ───────────────────────────────────────────────────────────
