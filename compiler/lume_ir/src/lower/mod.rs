//! AST → flow-graph lowering.
//!
//! [`lower_program`] walks a resolved [`Program`] and drives the
//! [`FlowBuilder`] to produce a [`Module`]. The pass is a single
//! left-to-right traversal; no optimization happens here, not even
//! collapsing the `if (cond) {} else { break }` shape that `while`
//! and `for` desugar into.
//!
//! Two pieces of state shape everything:
//!
//! - `current_block` is where instructions land. It becomes `None`
//!   after a terminal statement (`return`, `break`, `continue`,
//!   `discard`, or a construct whose merge target ends up
//!   unreachable), and [`Lowerer::emit_statements`] stops lowering the
//!   remaining sibling statements once that happens. Dead code never
//!   allocates flow nodes.
//! - `flow_stack` holds the enclosing control constructs. `break`
//!   targets the innermost loop *or* switch; `continue` and `break if`
//!   skip switches and target the innermost loop.
//!
//! An expression with a const-eval result lowers to a plain constant
//! whatever its shape; a folded call emits no call instruction.

use lume_ast::{
    CallTarget, CaseSelector as AstCaseSelector, ExprId, ExprKind, FunctionDecl, GlobalDecl, Lit,
    Program, Resolved, Span, StmtId, StmtKind, SwitchCase, Symbol, VarDeclKind,
};
use lume_types::{Access, AddressSpace, ConstValue, TypeId, TypePool};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::builder::FlowBuilder;
use crate::diagnostics::{Diagnostic, Severity};
use crate::ir::{CaseSelector, FlowId, FlowKind, FuncId, FunctionParam, Module, ValueId};
use crate::scope::ScopeStack;


/// The result of a successful lowering.
pub struct Lowered {
    pub module: Module,
    /// The flow node each control-flow statement lowered to. A debug
    /// aid for tests and tooling; statements skipped as dead code have
    /// no entry.
    pub stmt_flow: FxHashMap<StmtId, FlowId>,
    /// Warnings recorded during the walk; an error would have failed
    /// it.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lower a resolved program to a flow-graph module.
///
/// `types` is the pool the resolver's type IDs index into; the module
/// takes ownership and interns pointer types into it during lowering.
///
/// # Errors
///
/// Returns every diagnostic recorded during the walk when any of them
/// is an error; the module is withheld, a partial graph would be
/// misleading. Warnings alone ride along on the [`Lowered`].
pub fn lower_program(
    program: &Program,
    resolved: &Resolved,
    types: TypePool,
) -> Result<Lowered, Vec<Diagnostic>> {
    Lowerer {
        program,
        resolved,
        builder: FlowBuilder::new(types),
        current_block: None,
        current_function: None,
        flow_stack: Vec::new(),
        scopes: ScopeStack::new(),
        diagnostics: Vec::new(),
        stmt_flow: FxHashMap::default(),
    }
    .run()
}

struct Lowerer<'a> {
    program: &'a Program,
    resolved: &'a Resolved,
    builder: FlowBuilder,
    /// Block receiving instructions; `None` while at an unreachable
    /// point.
    current_block: Option<FlowId>,
    current_function: Option<FuncId>,
    /// Enclosing control-flow nodes, innermost last.
    flow_stack: Vec<FlowId>,
    scopes: ScopeStack,
    diagnostics: Vec<Diagnostic>,
    stmt_flow: FxHashMap<StmtId, FlowId>,
}

impl Lowerer<'_> {
    fn run(mut self) -> Result<Lowered, Vec<Diagnostic>> {
        for decl in &self.program.decls {
            match decl {
                GlobalDecl::Var(stmt) => {
                    let root = self.builder.root_block_or_create();
                    self.current_block = Some(root);
                    self.emit_statement(*stmt);
                    self.current_block = None;
                }
                GlobalDecl::Function(func) => self.emit_function(func),
            }
        }

        if self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
        {
            Err(self.diagnostics)
        } else {
            Ok(Lowered {
                module: self.builder.module,
                stmt_flow: self.stmt_flow,
                diagnostics: self.diagnostics,
            })
        }
    }

    // ── Shared plumbing ─────────────────────────────────────────────

    /// The block instructions are currently landing in.
    ///
    /// # Panics
    ///
    /// Panics at an unreachable point; statement emitters check
    /// reachability before emitting.
    fn block(&self) -> FlowId {
        self.current_block
            .unwrap_or_else(|| panic!("no active block to emit into"))
    }

    /// The function being lowered.
    fn func(&self) -> FuncId {
        self.current_function
            .unwrap_or_else(|| panic!("statement lowered outside of a function"))
    }

    /// Terminate the current block with a branch to `to` and mark the
    /// current position unreachable.
    fn branch_from_current(&mut self, to: FlowId, args: SmallVec<[ValueId; 1]>) {
        let from = self.block();
        self.builder.branch(from, to, args);
        self.current_block = None;
    }

    /// Branch to `to` only if the current block is live and not yet
    /// terminated.
    fn branch_to_if_needed(&mut self, to: FlowId) {
        let Some(current) = self.current_block else {
            return;
        };
        if self.builder.module.is_branched(current) {
            return;
        }
        self.builder.branch(current, to, SmallVec::new());
        self.current_block = None;
    }

    /// Re-intern a source symbol into the module's own table.
    fn clone_symbol(&mut self, sym: Symbol) -> Symbol {
        let name = self.program.symbols.resolve(sym);
        self.builder.module.symbols.intern(name)
    }

    /// Innermost enclosing loop or switch: what `break` exits.
    fn find_enclosing_loop_or_switch(&self) -> Option<FlowId> {
        self.flow_stack
            .iter()
            .rev()
            .copied()
            .find(|&node| {
                matches!(
                    self.builder.module.flow(node).kind,
                    FlowKind::Loop(_) | FlowKind::Switch(_)
                )
            })
    }

    /// Innermost enclosing loop, looking through switches: what
    /// `continue` and `break if` target.
    fn find_enclosing_loop(&self) -> Option<FlowId> {
        self.flow_stack
            .iter()
            .rev()
            .copied()
            .find(|&node| matches!(self.builder.module.flow(node).kind, FlowKind::Loop(_)))
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }

    fn warn(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::warning(message, span));
    }

    // ── Declarations ────────────────────────────────────────────────

    fn emit_function(&mut self, decl: &FunctionDecl) {
        debug_assert!(self.flow_stack.is_empty(), "unbalanced flow stack");
        tracing::debug!(
            function = self.program.symbols.resolve(decl.name),
            "lowering function"
        );

        let name = self.clone_symbol(decl.name);
        let func = self.builder.create_function(name, decl.return_type, decl.stage);
        self.current_function = Some(func);

        self.scopes.push();
        for (index, param) in decl.params.iter().enumerate() {
            let index = u32::try_from(index).unwrap_or_else(|_| panic!("parameter count exceeds u32"));
            let value = self.builder.function_param(func, index, param.ty);
            let param_name = self.clone_symbol(param.name);
            self.builder.module.function_mut(func).params.push(FunctionParam {
                name: param_name,
                ty: param.ty,
                value,
            });
            self.builder.module.set_name(value, param_name);
            self.scopes.set(param.name, value);
        }

        let function = self.builder.module.function(func);
        let (node, start, end) = (function.node, function.start_target, function.end_target);

        self.flow_stack.push(node);
        self.current_block = Some(start);
        self.emit_statement(decl.body);
        // Implicit return, unless every path already reached the
        // terminator.
        self.branch_to_if_needed(end);
        self.flow_stack.pop();

        self.scopes.pop();
        debug_assert!(self.flow_stack.is_empty(), "unbalanced flow stack");
        self.current_block = None;
        self.current_function = None;
    }

    // ── Statements ──────────────────────────────────────────────────

    fn emit_statements(&mut self, stmts: &[StmtId]) {
        for (index, &stmt) in stmts.iter().enumerate() {
            self.emit_statement(stmt);

            // A terminated or invalidated block means the rest of the
            // statements in this list are dead code. Skip them.
            match self.current_block {
                Some(block) if !self.builder.module.is_branched(block) => {}
                _ => {
                    if let Some(&next) = stmts.get(index + 1) {
                        let span = self.program.stmt(next).span;
                        self.warn("unreachable statement", span);
                    }
                    break;
                }
            }
        }
    }

    fn emit_statement(&mut self, id: StmtId) {
        let stmt = self.program.stmt(id);
        match &stmt.kind {
            StmtKind::Block(stmts) => self.emit_block(stmts),
            StmtKind::VarDecl {
                kind,
                name,
                ty,
                init,
            } => self.emit_var_decl(*kind, *name, *ty, *init, stmt.span),
            StmtKind::Assign { lhs, rhs } => self.emit_assign(*lhs, *rhs),
            StmtKind::If {
                cond,
                body,
                else_stmt,
            } => self.emit_if(id, *cond, *body, *else_stmt),
            StmtKind::Loop { body, continuing } => self.emit_loop(id, *body, *continuing),
            StmtKind::While { cond, body } => self.emit_while(id, *cond, *body),
            StmtKind::For {
                init,
                cond,
                continuing,
                body,
            } => self.emit_for(id, *init, *cond, *continuing, *body),
            StmtKind::Switch { cond, cases } => self.emit_switch(id, *cond, cases),
            StmtKind::Return(value) => self.emit_return(*value),
            StmtKind::Break => self.emit_break(),
            StmtKind::Continue => self.emit_continue(),
            StmtKind::BreakIf(cond) => self.emit_break_if(id, *cond),
            StmtKind::Discard => self.emit_discard(),
            StmtKind::Call(expr) => {
                // Evaluated for effect; a discarded result is fine.
                self.emit_expression(*expr);
            }
        }
    }

    fn emit_block(&mut self, stmts: &[StmtId]) {
        self.scopes.push();
        // No new flow node: nested source blocks flatten into the
        // current one. Control constructs inject the blocks they need.
        self.emit_statements(stmts);
        self.scopes.pop();
    }

    fn emit_var_decl(
        &mut self,
        kind: VarDeclKind,
        name: Symbol,
        ty: Option<TypeId>,
        init: Option<ExprId>,
        span: Span,
    ) {
        match kind {
            VarDeclKind::Var => {
                let store_ty = match (ty, init) {
                    (Some(ty), _) => ty,
                    (None, Some(init)) => self.resolved.type_of(init),
                    (None, None) => {
                        let name = self.program.symbols.resolve(name);
                        self.error(
                            format!("cannot infer the type of `var {name}` without an initializer"),
                            span,
                        );
                        return;
                    }
                };
                let space = if self.current_function.is_some() {
                    AddressSpace::Function
                } else {
                    AddressSpace::Private
                };
                let access = Access::ReadWrite;
                let ptr_ty = self.builder.module.types.ptr(store_ty, space, access);

                // Declare first so the initializer's instructions land
                // after the declaration, then patch the value in.
                let block = self.block();
                let value = self.builder.emit_var(block, ptr_ty, space, access);
                if let Some(init) = init {
                    let Some(init_value) = self.emit_expression(init) else {
                        return;
                    };
                    self.builder.set_var_initializer(value, init_value);
                }

                self.scopes.set(name, value);
                let ir_name = self.clone_symbol(name);
                self.builder.module.set_name(value, ir_name);
            }
            VarDeclKind::Let => {
                // A `let` is not a standalone IR object; the name just
                // binds the initializer's value.
                let Some(init) = init else {
                    let name = self.program.symbols.resolve(name);
                    self.error(format!("`let {name}` requires an initializer"), span);
                    return;
                };
                let Some(value) = self.emit_expression(init) else {
                    return;
                };
                self.scopes.set(name, value);
                let ir_name = self.clone_symbol(name);
                self.builder.module.set_name(value, ir_name);
            }
            VarDeclKind::Const => {
                // Const-eval already happened; usages fold to
                // constants at each site, so nothing is emitted.
            }
        }
    }

    fn emit_assign(&mut self, lhs: ExprId, rhs: ExprId) {
        let Some(to) = self.emit_expression(lhs) else {
            return;
        };
        let Some(from) = self.emit_expression(rhs) else {
            return;
        };
        let block = self.block();
        self.builder.emit_store(block, to, from);
    }

    fn emit_if(&mut self, id: StmtId, cond: ExprId, body: StmtId, else_stmt: Option<StmtId>) {
        // The condition lands at the end of the preceding block.
        let Some(condition) = self.emit_expression(cond) else {
            return;
        };
        let if_node = self.builder.create_if(condition);
        self.branch_from_current(if_node, SmallVec::new());
        self.stmt_flow.insert(id, if_node);

        let (true_t, false_t, merge_t) = self.builder.module.if_targets(if_node);

        self.flow_stack.push(if_node);
        self.current_block = Some(true_t);
        self.emit_statement(body);
        self.branch_to_if_needed(merge_t);

        self.current_block = Some(false_t);
        if let Some(else_stmt) = else_stmt {
            self.emit_statement(else_stmt);
        }
        self.branch_to_if_needed(merge_t);
        self.flow_stack.pop();

        // When both arms branched away nothing targets the merge
        // block, and whatever follows this statement is dead.
        self.current_block = self
            .builder
            .module
            .is_connected(merge_t)
            .then_some(merge_t);
    }

    fn emit_loop(&mut self, id: StmtId, body: StmtId, continuing: Option<StmtId>) {
        let loop_node = self.builder.create_loop();
        self.branch_from_current(loop_node, SmallVec::new());
        self.stmt_flow.insert(id, loop_node);

        let (start, continuing_t, merge_t) = self.builder.module.loop_targets(loop_node);

        self.flow_stack.push(loop_node);
        self.current_block = Some(start);
        self.emit_statement(body);
        // Body fell off the end: continue into the latch.
        self.branch_to_if_needed(continuing_t);

        self.current_block = Some(continuing_t);
        if let Some(continuing) = continuing {
            self.emit_statement(continuing);
        }
        // Back-edge to the start, unless a `break if` already took it.
        self.branch_to_if_needed(start);
        self.flow_stack.pop();

        // The merge disconnects when nothing breaks and the body
        // never falls through, e.g. a loop that returns directly.
        self.current_block = self
            .builder
            .module
            .is_connected(merge_t)
            .then_some(merge_t);
    }

    fn emit_while(&mut self, id: StmtId, cond: ExprId, body: StmtId) {
        let loop_node = self.builder.create_loop();
        let (start, continuing_t, merge_t) = self.builder.module.loop_targets(loop_node);
        // The latch is always empty: straight back to the start.
        self.builder.branch(continuing_t, start, SmallVec::new());

        self.branch_from_current(loop_node, SmallVec::new());
        self.stmt_flow.insert(id, loop_node);

        self.flow_stack.push(loop_node);
        self.current_block = Some(start);
        let emitted = self.emit_while_inner(cond, body, continuing_t, merge_t);
        self.flow_stack.pop();

        // The merge always stays reachable: the exit test runs before
        // anything inside the loop.
        self.current_block = emitted.map(|()| merge_t);
    }

    fn emit_while_inner(
        &mut self,
        cond: ExprId,
        body: StmtId,
        continuing_t: FlowId,
        merge_t: FlowId,
    ) -> Option<()> {
        // The condition becomes `if (cond) {} else { break }`.
        let condition = self.emit_expression(cond)?;
        let if_node = self.builder.create_if(condition);
        let (true_t, false_t, if_merge) = self.builder.module.if_targets(if_node);
        self.builder.branch(true_t, if_merge, SmallVec::new());
        self.builder.branch(false_t, merge_t, SmallVec::new());
        self.branch_from_current(if_node, SmallVec::new());

        self.current_block = Some(if_merge);
        self.emit_statement(body);
        self.branch_to_if_needed(continuing_t);
        Some(())
    }

    fn emit_for(
        &mut self,
        id: StmtId,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        continuing: Option<StmtId>,
        body: StmtId,
    ) {
        let loop_node = self.builder.create_loop();
        let (start, continuing_t, merge_t) = self.builder.module.loop_targets(loop_node);
        self.builder.branch(continuing_t, start, SmallVec::new());

        // The initializer's bindings are scoped to the whole loop.
        self.scopes.push();
        if let Some(init) = init {
            // Emitted into the preceding block, before entering the
            // loop.
            self.emit_statement(init);
        }

        self.branch_from_current(loop_node, SmallVec::new());
        self.stmt_flow.insert(id, loop_node);

        self.flow_stack.push(loop_node);
        self.current_block = Some(start);
        let emitted = self.emit_for_inner(cond, continuing, body, continuing_t, merge_t);
        self.flow_stack.pop();
        self.scopes.pop();

        self.current_block = emitted.map(|()| merge_t);
    }

    fn emit_for_inner(
        &mut self,
        cond: Option<ExprId>,
        continuing: Option<StmtId>,
        body: StmtId,
        continuing_t: FlowId,
        merge_t: FlowId,
    ) -> Option<()> {
        if let Some(cond) = cond {
            let condition = self.emit_expression(cond)?;
            let if_node = self.builder.create_if(condition);
            let (true_t, false_t, if_merge) = self.builder.module.if_targets(if_node);
            self.builder.branch(true_t, if_merge, SmallVec::new());
            self.builder.branch(false_t, merge_t, SmallVec::new());
            self.branch_from_current(if_node, SmallVec::new());
            self.current_block = Some(if_merge);
        }

        self.emit_statement(body);
        self.branch_to_if_needed(continuing_t);

        if let Some(continuing) = continuing {
            // The latch already owns its back-edge; the continuing
            // statement's instructions still land in it.
            self.current_block = Some(continuing_t);
            self.emit_statement(continuing);
        }
        Some(())
    }

    fn emit_switch(&mut self, id: StmtId, cond: ExprId, cases: &[SwitchCase]) {
        let Some(condition) = self.emit_expression(cond) else {
            return;
        };
        let switch_node = self.builder.create_switch(condition);
        self.branch_from_current(switch_node, SmallVec::new());
        self.stmt_flow.insert(id, switch_node);

        let merge_t = self.builder.module.switch_merge(switch_node);

        self.flow_stack.push(switch_node);
        for case in cases {
            let mut selectors: SmallVec<[CaseSelector; 4]> = SmallVec::new();
            for selector in &case.selectors {
                match selector {
                    AstCaseSelector::Default => selectors.push(CaseSelector::Default),
                    AstCaseSelector::Value(expr) => {
                        let Some(value) = self.resolved.const_value_of(*expr) else {
                            let span = self.program.expr(*expr).span;
                            self.error("case selector must be a constant expression", span);
                            continue;
                        };
                        let value = self.builder.constant(value);
                        selectors.push(CaseSelector::Value(value));
                    }
                }
            }

            self.current_block = Some(self.builder.create_case(switch_node, selectors));
            self.emit_statement(case.body);
            self.branch_to_if_needed(merge_t);
        }
        self.flow_stack.pop();

        self.current_block = self
            .builder
            .module
            .is_connected(merge_t)
            .then_some(merge_t);
    }

    fn emit_return(&mut self, value: Option<ExprId>) {
        let mut args: SmallVec<[ValueId; 1]> = SmallVec::new();
        if let Some(value) = value {
            let Some(value) = self.emit_expression(value) else {
                return;
            };
            args.push(value);
        }
        let end = self.builder.module.function(self.func()).end_target;
        self.branch_from_current(end, args);
    }

    fn emit_break(&mut self) {
        let control = self
            .find_enclosing_loop_or_switch()
            .unwrap_or_else(|| panic!("`break` outside of a loop or switch"));
        let target = match &self.builder.module.flow(control).kind {
            FlowKind::Loop(node) => node.merge_target,
            FlowKind::Switch(node) => node.merge_target,
            _ => unreachable!(),
        };
        self.branch_from_current(target, SmallVec::new());
    }

    fn emit_continue(&mut self) {
        let control = self
            .find_enclosing_loop()
            .unwrap_or_else(|| panic!("`continue` outside of a loop"));
        let target = match &self.builder.module.flow(control).kind {
            FlowKind::Loop(node) => node.continuing_target,
            _ => unreachable!(),
        };
        self.branch_from_current(target, SmallVec::new());
    }

    /// `break if` sits at the end of a continuing block: true exits
    /// the loop, false takes the back-edge to the start.
    fn emit_break_if(&mut self, id: StmtId, cond: ExprId) {
        let Some(condition) = self.emit_expression(cond) else {
            return;
        };
        let if_node = self.builder.create_if(condition);
        self.branch_from_current(if_node, SmallVec::new());
        self.stmt_flow.insert(id, if_node);

        let loop_node = self
            .find_enclosing_loop()
            .unwrap_or_else(|| panic!("`break if` outside of a loop"));
        let (loop_start, _, loop_merge) = self.builder.module.loop_targets(loop_node);
        let (true_t, false_t, if_merge) = self.builder.module.if_targets(if_node);

        self.current_block = Some(true_t);
        self.branch_from_current(loop_merge, SmallVec::new());

        self.current_block = Some(false_t);
        self.branch_from_current(if_merge, SmallVec::new());

        // This must be the last statement of the continuing block, so
        // its merge is exactly the loop's back-edge.
        self.current_block = Some(if_merge);
        self.branch_from_current(loop_start, SmallVec::new());
    }

    fn emit_discard(&mut self) {
        let block = self.block();
        self.builder.emit_discard(block);
        // Discard ends the invocation; everything after it in this
        // block is unreachable. The block is left unterminated rather
        // than wired to any merge.
        self.current_block = None;
    }

    // ── Expressions ─────────────────────────────────────────────────

    fn emit_expression(&mut self, id: ExprId) -> Option<ValueId> {
        // Const-eval wins over shape: a folded expression of any kind
        // lowers to its constant.
        if let Some(value) = self.resolved.const_value_of(id) {
            return Some(self.builder.constant(value));
        }

        let expr = self.program.expr(id);
        match &expr.kind {
            ExprKind::Literal(lit) => Some(self.builder.constant(const_of_lit(*lit))),
            ExprKind::Ident(sym) => {
                if let Some(value) = self.scopes.get(*sym) {
                    return Some(value);
                }
                let name = self.program.symbols.resolve(*sym);
                self.error(format!("unknown identifier `{name}`"), expr.span);
                None
            }
            ExprKind::Unary { op, expr: inner } => {
                let value = self.emit_expression(*inner)?;
                let ty = self.resolved.type_of(id);
                let block = self.block();
                Some(self.builder.emit_unary(block, *op, ty, value))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                if op.is_short_circuit() {
                    return self.emit_short_circuit(*op, *lhs, *rhs);
                }
                let lhs = self.emit_expression(*lhs)?;
                let rhs = self.emit_expression(*rhs)?;
                let ty = self.resolved.type_of(id);
                let block = self.block();
                Some(self.builder.emit_binary(block, *op, ty, lhs, rhs))
            }
            ExprKind::Bitcast { expr: inner } => {
                let value = self.emit_expression(*inner)?;
                let ty = self.resolved.type_of(id);
                let block = self.block();
                Some(self.builder.emit_bitcast(block, ty, value))
            }
            ExprKind::Call { target, args } => self.emit_call(id, *target, args, expr.span),
        }
    }

    fn emit_call(
        &mut self,
        id: ExprId,
        target: Symbol,
        args: &[ExprId],
        span: Span,
    ) -> Option<ValueId> {
        let mut values: SmallVec<[ValueId; 4]> = SmallVec::new();
        for &arg in args {
            values.push(self.emit_expression(arg)?);
        }
        let ty = self.resolved.type_of(id);
        let block = self.block();

        match self.resolved.call_target_of(id) {
            Some(CallTarget::Builtin(func)) => {
                Some(self.builder.emit_builtin(block, ty, func, values))
            }
            Some(CallTarget::Construct) => Some(self.builder.emit_construct(block, ty, values)),
            Some(CallTarget::Convert { from }) => {
                Some(self.builder.emit_convert(block, ty, from, values))
            }
            Some(CallTarget::Function(name)) => {
                let name = self.clone_symbol(name);
                Some(self.builder.emit_user_call(block, ty, name, values))
            }
            None => {
                let name = self.program.symbols.resolve(target);
                self.error(format!("unresolved call target `{name}`"), span);
                None
            }
        }
    }

    /// `&&` and `||` decompose into an `If` around the right-hand
    /// side, with a hidden `var` carrying the result across the
    /// branch. For `&&` the RHS evaluates only in the true arm, for
    /// `||` only in the false arm. The expression's value is a load of
    /// the hidden var at the merge point.
    fn emit_short_circuit(
        &mut self,
        op: lume_ast::BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    ) -> Option<ValueId> {
        let lhs = self.emit_expression(lhs)?;

        let space = AddressSpace::Function;
        let access = Access::ReadWrite;
        let ptr_ty = self.builder.module.types.ptr(TypeId::BOOL, space, access);
        let block = self.block();
        let result_var = self.builder.emit_var(block, ptr_ty, space, access);
        self.builder.emit_store(block, result_var, lhs);

        let if_node = self.builder.create_if(lhs);
        self.branch_from_current(if_node, SmallVec::new());
        let (true_t, false_t, if_merge) = self.builder.module.if_targets(if_node);

        self.flow_stack.push(if_node);
        self.current_block = Some(if op == lume_ast::BinaryOp::LogicalAnd {
            true_t
        } else {
            false_t
        });
        let rhs = self.emit_expression(rhs);
        let Some(rhs) = rhs else {
            self.flow_stack.pop();
            return None;
        };
        let eval_block = self.block();
        self.builder.emit_store(eval_block, result_var, rhs);
        self.branch_from_current(if_merge, SmallVec::new());
        self.flow_stack.pop();

        self.current_block = Some(if_merge);
        Some(self.builder.emit_load(if_merge, TypeId::BOOL, result_var))
    }
}

fn const_of_lit(lit: Lit) -> ConstValue {
    match lit {
        Lit::Bool(value) => ConstValue::Bool(value),
        Lit::I32(value) => ConstValue::I32(value),
        Lit::U32(value) => ConstValue::U32(value),
        Lit::F32(value) => ConstValue::F32(value),
    }
}
