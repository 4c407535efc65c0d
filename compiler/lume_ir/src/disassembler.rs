//! Human-readable rendering of a [`Module`].
//!
//! The output is a debugging and testing aid, not a wire format. It is
//! deterministic: flow nodes are numbered `%fnN` in first-visit order,
//! values `%N` in first-print order (or by their source name when one
//! was recorded), and every node header carries its inbound-branch
//! count so reachability is visible in the text.

use std::fmt::Write as _;

use lume_ast::{BinaryOp, UnaryOp};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ir::{
    Block, CaseSelector, FlowId, FlowKind, InstId, InstKind, Instruction, Module, ValueId,
    ValueKind,
};

/// Render a module to text.
pub fn disassemble(module: &Module) -> String {
    let mut d = Disassembler {
        module,
        out: String::new(),
        indent: 0,
        flow_ids: FxHashMap::default(),
        value_labels: FxHashMap::default(),
        visited: FxHashSet::default(),
        stop_nodes: FxHashSet::default(),
    };
    if let Some(root) = module.root_block {
        d.walk(root);
    }
    for func in &module.functions {
        d.walk(func.node);
    }
    d.out
}

struct Disassembler<'a> {
    module: &'a Module,
    out: String,
    indent: usize,
    flow_ids: FxHashMap<FlowId, usize>,
    value_labels: FxHashMap<ValueId, String>,
    visited: FxHashSet<FlowId>,
    /// Merge/continuing targets the current construct will print
    /// itself; inner walks stop at them.
    stop_nodes: FxHashSet<FlowId>,
}

impl Disassembler<'_> {
    fn indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push(' ');
        }
    }

    fn flow_label(&mut self, id: FlowId) -> usize {
        let next = self.flow_ids.len() + 1;
        *self.flow_ids.entry(id).or_insert(next)
    }

    fn value_label(&mut self, id: ValueId) -> String {
        if let Some(label) = self.value_labels.get(&id) {
            return label.clone();
        }
        let label = match self.module.name_of(id) {
            Some(sym) => self.module.symbols.resolve(sym).to_string(),
            None => (self.value_labels.len() + 1).to_string(),
        };
        self.value_labels.insert(id, label.clone());
        label
    }

    fn value_str(&mut self, id: ValueId) -> String {
        let value = self.module.value(id);
        match value.kind {
            ValueKind::Constant(c) => c.to_string(),
            _ => {
                let label = self.value_label(id);
                format!("%{label}:{}", self.module.types.display(value.ty))
            }
        }
    }

    fn args_str(&mut self, args: &[ValueId]) -> String {
        let mut out = String::new();
        for &arg in args {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&self.value_str(arg));
        }
        out
    }

    /// A block with no terminator and no instructions was allocated
    /// but never reached; it is omitted from the output.
    fn is_dead(&self, id: FlowId) -> bool {
        match &self.module.flow(id).kind {
            FlowKind::Block(block) => block.branch.is_none() && block.instructions.is_empty(),
            _ => false,
        }
    }

    fn walk(&mut self, id: FlowId) {
        if self.visited.contains(&id) || self.stop_nodes.contains(&id) {
            return;
        }
        self.visited.insert(id);

        match &self.module.flow(id).kind {
            FlowKind::Function(func) => self.walk_function(id, *func),
            FlowKind::Block(block) => self.walk_block(id, block),
            FlowKind::If(_) => self.walk_if(id),
            FlowKind::Loop(_) => self.walk_loop(id),
            FlowKind::Switch(_) => self.walk_switch(id),
            FlowKind::FunctionTerminator(_) => {
                let inbound = self.module.flow(id).inbound_branches.len();
                self.indent();
                let _ = writeln!(self.out, "func_end [inbound: {inbound}]\n");
            }
            FlowKind::RootTerminator => self.out.push('\n'),
        }
    }

    fn walk_function(&mut self, id: FlowId, func: crate::ir::FuncId) {
        let function = self.module.function(func);
        let label = self.flow_label(id);
        let name = self.module.symbols.resolve(function.name).to_string();

        let mut params = String::new();
        for param in &function.params {
            if !params.is_empty() {
                params.push_str(", ");
            }
            let pname = self.module.symbols.resolve(param.name);
            let _ = write!(params, "{pname}:{}", self.module.types.display(param.ty));
        }

        self.indent();
        let _ = write!(
            self.out,
            "%fn{label} = func {name}({params}):{}",
            self.module.types.display(function.return_type)
        );
        match function.stage {
            Some(lume_ast::PipelineStage::Vertex) => self.out.push_str(" [@vertex]"),
            Some(lume_ast::PipelineStage::Fragment) => self.out.push_str(" [@fragment]"),
            Some(lume_ast::PipelineStage::Compute { workgroup_size: ws }) => {
                let _ = write!(
                    self.out,
                    " [@compute @workgroup_size({}, {}, {})]",
                    ws[0], ws[1], ws[2]
                );
            }
            None => {}
        }
        self.out.push('\n');

        let (start, end) = (function.start_target, function.end_target);
        self.indent += 2;
        self.stop_nodes.insert(end);
        self.walk(start);
        self.stop_nodes.remove(&end);
        self.indent -= 2;
        self.walk(end);
    }

    fn walk_block(&mut self, id: FlowId, block: &Block) {
        if block.branch.is_none() && block.instructions.is_empty() {
            return;
        }

        let label = self.flow_label(id);
        let inbound = self.module.flow(id).inbound_branches.len();
        self.indent();
        let _ = writeln!(self.out, "%fn{label} = block [inbound: {inbound}]");
        for &inst in &block.instructions {
            self.write_inst(inst);
        }

        let Some(branch) = &block.branch else {
            // Terminal without a branch (a discard ended the
            // invocation here).
            self.out.push('\n');
            return;
        };

        match &self.module.flow(branch.target).kind {
            FlowKind::FunctionTerminator(_) => {
                self.indent();
                self.out.push_str("ret");
                if !branch.args.is_empty() {
                    let args = self.args_str(&branch.args);
                    let _ = write!(self.out, " {args}");
                }
                self.out.push('\n');
            }
            FlowKind::RootTerminator => {}
            _ => {
                let target = self.flow_label(branch.target);
                self.indent();
                let _ = writeln!(self.out, "branch %fn{target}");
                self.out.push('\n');
            }
        }

        self.walk(branch.target);
    }

    fn walk_if(&mut self, id: FlowId) {
        let FlowKind::If(node) = &self.module.flow(id).kind else {
            return;
        };
        let label = self.flow_label(id);
        let cond = self.value_str(node.condition);
        let true_label = self.flow_label(node.true_target);
        let false_label = self.flow_label(node.false_target);
        let inbound = self.module.flow(id).inbound_branches.len();

        self.indent();
        let _ = write!(
            self.out,
            "%fn{label} = if {cond} [t: %fn{true_label}, f: %fn{false_label}"
        );
        if self.module.is_connected(node.merge_target) {
            let merge_label = self.flow_label(node.merge_target);
            let _ = write!(self.out, ", m: %fn{merge_label}");
        }
        let _ = writeln!(self.out, "] [inbound: {inbound}]");

        self.indent += 2;
        self.stop_nodes.insert(node.merge_target);

        self.indent();
        self.out.push_str("# true branch\n");
        self.walk(node.true_target);

        if !self.is_dead(node.false_target) {
            self.indent();
            self.out.push_str("# false branch\n");
            self.walk(node.false_target);
        }

        self.stop_nodes.remove(&node.merge_target);
        self.indent -= 2;

        if self.module.is_connected(node.merge_target) {
            self.indent();
            self.out.push_str("# if merge\n");
            self.walk(node.merge_target);
        }
    }

    fn walk_loop(&mut self, id: FlowId) {
        let FlowKind::Loop(node) = &self.module.flow(id).kind else {
            return;
        };
        let label = self.flow_label(id);
        let start_label = self.flow_label(node.start_target);
        let inbound = self.module.flow(id).inbound_branches.len();

        self.indent();
        let _ = write!(self.out, "%fn{label} = loop [s: %fn{start_label}");
        if self.module.is_connected(node.continuing_target) {
            let continuing_label = self.flow_label(node.continuing_target);
            let _ = write!(self.out, ", c: %fn{continuing_label}");
        }
        if self.module.is_connected(node.merge_target) {
            let merge_label = self.flow_label(node.merge_target);
            let _ = write!(self.out, ", m: %fn{merge_label}");
        }
        let _ = writeln!(self.out, "] [inbound: {inbound}]");

        self.stop_nodes.insert(node.merge_target);
        self.indent += 2;

        self.stop_nodes.insert(node.continuing_target);
        self.indent();
        self.out.push_str("# loop start\n");
        self.walk(node.start_target);
        self.stop_nodes.remove(&node.continuing_target);

        if self.module.is_connected(node.continuing_target) {
            self.indent();
            self.out.push_str("# loop continuing\n");
            self.walk(node.continuing_target);
        }

        self.indent -= 2;
        self.stop_nodes.remove(&node.merge_target);

        if self.module.is_connected(node.merge_target) {
            self.indent();
            self.out.push_str("# loop merge\n");
            self.walk(node.merge_target);
        }
    }

    fn walk_switch(&mut self, id: FlowId) {
        let FlowKind::Switch(node) = &self.module.flow(id).kind else {
            return;
        };
        let label = self.flow_label(id);
        let cond = self.value_str(node.condition);
        let inbound = self.module.flow(id).inbound_branches.len();

        self.indent();
        let _ = write!(self.out, "%fn{label} = switch {cond} [");
        for (i, case) in node.cases.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let selectors = self.selectors_str(&case.selectors);
            let case_label = self.flow_label(case.start_target);
            let _ = write!(self.out, "c: ({selectors}, %fn{case_label})");
        }
        if self.module.is_connected(node.merge_target) {
            let merge_label = self.flow_label(node.merge_target);
            let _ = write!(self.out, ", m: %fn{merge_label}");
        }
        let _ = writeln!(self.out, "] [inbound: {inbound}]");

        self.indent += 2;
        self.stop_nodes.insert(node.merge_target);
        for case in &node.cases {
            let selectors = self.selectors_str(&case.selectors);
            self.indent();
            let _ = writeln!(self.out, "# case {selectors}");
            self.walk(case.start_target);
        }
        self.stop_nodes.remove(&node.merge_target);
        self.indent -= 2;

        if self.module.is_connected(node.merge_target) {
            self.indent();
            self.out.push_str("# switch merge\n");
            self.walk(node.merge_target);
        }
    }

    fn selectors_str(&mut self, selectors: &[CaseSelector]) -> String {
        let mut out = String::new();
        for &selector in selectors {
            if !out.is_empty() {
                out.push(' ');
            }
            match selector {
                CaseSelector::Default => out.push_str("default"),
                CaseSelector::Value(value) => out.push_str(&self.value_str(value)),
            }
        }
        out
    }

    // ── Instructions ────────────────────────────────────────────────

    fn result_str(&mut self, inst: &Instruction) -> String {
        let result = inst
            .result
            .unwrap_or_else(|| panic!("instruction has no result value"));
        self.value_str(result)
    }

    fn write_inst(&mut self, id: InstId) {
        let inst = self.module.inst(id);
        self.indent();
        match &inst.kind {
            InstKind::Binary { op, lhs, rhs } => {
                let result = self.result_str(inst);
                let lhs = self.value_str(*lhs);
                let rhs = self.value_str(*rhs);
                let _ = writeln!(self.out, "{result} = {} {lhs}, {rhs}", binary_op_str(*op));
            }
            InstKind::Unary { op, value } => {
                let result = self.result_str(inst);
                let value = self.value_str(*value);
                let _ = writeln!(self.out, "{result} = {} {value}", unary_op_str(*op));
            }
            InstKind::Bitcast { value } => {
                let result = self.result_str(inst);
                let value = self.value_str(*value);
                let _ = writeln!(self.out, "{result} = bitcast {value}");
            }
            InstKind::Builtin { func, args } => {
                let result = self.result_str(inst);
                let args = self.args_str(args);
                let _ = writeln!(self.out, "{result} = {} {args}", func.name());
            }
            InstKind::Construct { args } => {
                let result = self.result_str(inst);
                let args = self.args_str(args);
                let _ = writeln!(self.out, "{result} = construct {args}");
            }
            InstKind::Convert { from, args } => {
                let result = self.result_str(inst);
                let from = self.module.types.display(*from);
                let args = self.args_str(args);
                let _ = writeln!(self.out, "{result} = convert {from}, {args}");
            }
            InstKind::UserCall { name, args } => {
                let result = self.result_str(inst);
                let name = self.module.symbols.resolve(*name).to_string();
                let _ = write!(self.out, "{result} = call {name}");
                if !args.is_empty() {
                    let args = self.args_str(args);
                    let _ = write!(self.out, ", {args}");
                }
                self.out.push('\n');
            }
            InstKind::Var {
                space,
                access,
                initializer,
            } => {
                let result = self.result_str(inst);
                let _ = write!(self.out, "{result} = var {space}, {access}");
                if let Some(init) = initializer {
                    let init = self.value_str(*init);
                    let _ = write!(self.out, ", {init}");
                }
                self.out.push('\n');
            }
            InstKind::Load { from } => {
                let result = self.result_str(inst);
                let from = self.value_str(*from);
                let _ = writeln!(self.out, "{result} = load {from}");
            }
            InstKind::Store { to, from } => {
                let to = self.value_str(*to);
                let from = self.value_str(*from);
                let _ = writeln!(self.out, "store {to}, {from}");
            }
            InstKind::Discard => self.out.push_str("discard\n"),
        }
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
        BinaryOp::Xor => "xor",
        BinaryOp::Equal => "eq",
        BinaryOp::NotEqual => "neq",
        BinaryOp::LessThan => "lt",
        BinaryOp::GreaterThan => "gt",
        BinaryOp::LessThanEqual => "lte",
        BinaryOp::GreaterThanEqual => "gte",
        BinaryOp::ShiftLeft => "shiftl",
        BinaryOp::ShiftRight => "shiftr",
        BinaryOp::Add => "add",
        BinaryOp::Subtract => "sub",
        BinaryOp::Multiply => "mul",
        BinaryOp::Divide => "div",
        BinaryOp::Modulo => "mod",
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            unreachable!("short-circuit operators never reach the instruction stream")
        }
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::AddressOf => "addr_of",
        UnaryOp::Complement => "complement",
        UnaryOp::Indirection => "indirection",
        UnaryOp::Negation => "negation",
        UnaryOp::Not => "not",
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use lume_types::{ConstValue, TypeId, TypePool};
    use pretty_assertions::assert_eq;
    use smallvec::SmallVec;

    use super::*;
    use crate::builder::FlowBuilder;

    #[test]
    fn empty_function_renders_entry_and_exit() {
        let mut b = FlowBuilder::new(TypePool::new());
        let name = b.module.symbols.intern("f");
        let func = b.create_function(name, TypeId::VOID, None);
        let function = b.module.function(func);
        let (start, end) = (function.start_target, function.end_target);
        b.branch(start, end, SmallVec::new());

        assert_eq!(
            disassemble(&b.module),
            "%fn1 = func f():void\n  \
             %fn2 = block [inbound: 1]\n  \
             ret\n\
             func_end [inbound: 1]\n\n"
        );
    }

    #[test]
    fn constants_render_with_suffixes() {
        let mut b = FlowBuilder::new(TypePool::new());
        let name = b.module.symbols.intern("f");
        let func = b.create_function(name, TypeId::I32, None);
        let function = b.module.function(func);
        let (start, end) = (function.start_target, function.end_target);
        let value = b.constant(ConstValue::I32(42));
        b.branch(start, end, SmallVec::from_iter([value]));

        let text = disassemble(&b.module);
        assert!(text.contains("ret 42i"), "got:\n{text}");
    }

    #[test]
    fn named_values_use_their_source_name() {
        let mut b = FlowBuilder::new(TypePool::new());
        let name = b.module.symbols.intern("f");
        let func = b.create_function(name, TypeId::VOID, None);
        let function = b.module.function(func);
        let (start, end) = (function.start_target, function.end_target);

        let lhs = b.constant(ConstValue::I32(1));
        let rhs = b.constant(ConstValue::I32(2));
        let sum = b.emit_binary(start, lume_ast::BinaryOp::Add, TypeId::I32, lhs, rhs);
        let sym = b.module.symbols.intern("x");
        b.module.set_name(sum, sym);
        b.branch(start, end, SmallVec::new());

        let text = disassemble(&b.module);
        assert!(text.contains("%x:i32 = add 1i, 2i"), "got:\n{text}");
    }
}
