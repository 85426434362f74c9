
use crate::ast::*;
use std::collections::{BTreeSet, HashMap};
use std::{error, fmt};

pub type Result<T> = std::result::Result<T, IrError>;

/// Invariant violations inside the generator. Reaching one of these means a
/// bug in the compiler, not in the program being compiled; semantic analysis
/// has already vouched for the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    UnbalancedValueMaps(usize),
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnbalancedValueMaps(depth) => {
                write!(f, "value map stack not empty after processing module (depth {depth})")
            }
        }
    }
}

impl error::Error for IrError {}

/// Emits textual SSA IR for a semantically validated module.
pub fn emit(module: &Module) -> Result<String> {
    Generator::new().run(module)
}

type ValueMap = HashMap<String, String>;

struct Generator {
    output: String,
    /// SSA name or immediate produced by the most recently visited expression.
    last_value: String,
    temp_counter: u64,
    label_counters: HashMap<&'static str, u64>,
    value_map_stack: Vec<ValueMap>,
}

impl Generator {
    fn new() -> Self {
        Self {
            output: String::new(),
            last_value: String::new(),
            temp_counter: 0,
            label_counters: HashMap::new(),
            value_map_stack: Vec::new(),
        }
    }

    fn run(mut self, module: &Module) -> Result<String> {
        self.push();
        self.emit_line(&format!("; C+ generated IR for module {}", module.name));
        for declaration in &module.declarations {
            self.emit_statement(declaration);
        }
        self.pop();

        if !self.value_map_stack.is_empty() {
            return Err(IrError::UnbalancedValueMaps(self.value_map_stack.len()));
        }

        Ok(self.output)
    }

    fn emit_line(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn new_temp(&mut self, hint: &str) -> String {
        let count = self.temp_counter;
        self.temp_counter += 1;
        format!("%{hint}{count}")
    }

    /// Labels count per hint, so the first if-statement gets `if.then0`,
    /// `if.else0`, `if.end0` and the next one the `1` family.
    fn new_label(&mut self, hint: &'static str) -> String {
        let counter = self.label_counters.entry(hint).or_insert(0);
        let count = *counter;
        *counter += 1;
        format!("{hint}{count}")
    }

    fn push(&mut self) {
        self.value_map_stack.push(ValueMap::new());
    }

    /// Pushes a shallow copy of the innermost map, so inner rebindings do
    /// not leak upward except via explicit phi merges.
    fn push_copy(&mut self) {
        let top = self.value_map_stack.last().cloned().unwrap_or_default();
        self.value_map_stack.push(top);
    }

    fn pop(&mut self) {
        self.value_map_stack.pop();
    }

    fn current_map(&self) -> ValueMap {
        self.value_map_stack.last().cloned().unwrap_or_default()
    }

    fn set_name(&mut self, name: &str, ssa: String) {
        if self.value_map_stack.is_empty() {
            self.push();
        }
        if let Some(map) = self.value_map_stack.last_mut() {
            map.insert(name.to_owned(), ssa);
        }
    }

    /// Walks the map stack from the top down. Falling back to the raw name
    /// cannot happen once semantic analysis has succeeded.
    fn lookup(&self, name: &str) -> String {
        self.value_map_stack
            .iter()
            .rev()
            .find_map(|map| map.get(name))
            .cloned()
            .unwrap_or_else(|| name.to_owned())
    }

    fn emit_exp(&mut self, exp: &Exp) {
        match &exp.kind {
            ExpKind::Literal(literal) => {
                self.last_value = match literal {
                    Literal::Int(value) => format!("imm.i32 {value}"),
                    Literal::Float(value) => format!("imm.f32 {value}"),
                    Literal::Str(value) => format!("const.str \"{value}\""),
                    Literal::Bool(true) => "imm.bool 1".to_owned(),
                    Literal::Bool(false) => "imm.bool 0".to_owned(),
                };
            }
            ExpKind::Var(name) => {
                self.last_value = self.lookup(name);
            }
            ExpKind::Binary(op, left, right) => {
                self.emit_exp(left);
                let left_value = self.last_value.clone();
                self.emit_exp(right);
                let right_value = self.last_value.clone();

                let tmp = self.new_temp("t");
                self.emit_line(&format!(
                    "  {tmp} = {} {left_value}, {right_value}",
                    binary_opcode(*op)
                ));
                self.last_value = tmp;
            }
            ExpKind::Unary(op, operand) => self.emit_unary(exp, *op, operand),
            ExpKind::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    self.emit_exp(arg);
                    values.push(self.last_value.clone());
                }
                let tmp = self.new_temp("call");
                self.emit_line(&format!("  {tmp} = call @{name}({})", values.join(", ")));
                self.last_value = tmp;
            }
            ExpKind::Assignment(name, value) => {
                self.emit_exp(value);
                let value = self.last_value.clone();
                let ssa = self.new_temp(name);
                self.emit_line(&format!("  {ssa} = mov {value}"));
                self.set_name(name, ssa.clone());
                self.last_value = ssa;
            }
        }
    }

    /// `++`/`--` on an identifier operand rebind the identifier to the new
    /// SSA temp in the current map.
    fn emit_unary(&mut self, exp: &Exp, op: UnaryOp, operand: &Exp) {
        let ident_name = match &operand.kind {
            ExpKind::Var(name) => Some(name.clone()),
            _ => None,
        };

        self.emit_exp(operand);
        let src = self.last_value.clone();
        let tmp = self.new_temp("u");
        let ty = exp.ty.unwrap_or(Type::Auto).as_str();

        match op {
            UnaryOp::Not => self.emit_line(&format!("  {tmp} = icmp.eq {src}, const.{ty}0")),
            UnaryOp::Negate => self.emit_line(&format!("  {tmp} = neg {src}")),
            UnaryOp::Inc => self.emit_line(&format!("  {tmp} = add {src}, const.{ty}1")),
            UnaryOp::Dec => self.emit_line(&format!("  {tmp} = sub {src}, const.{ty}1")),
            UnaryOp::Plus => self.emit_line(&format!("  {tmp} = plus {src}")),
        }

        if let Some(name) = ident_name {
            if op.is_incdec() {
                self.set_name(&name, tmp.clone());
            }
        }

        self.last_value = tmp;
    }

    fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Exp(exp) => {
                self.emit_exp(exp);
                self.last_value.clear();
            }
            Statement::Compound(block) => self.emit_block(block),
            Statement::VarDec(dec) => self.emit_vardec(dec),
            Statement::FunDec(dec) => self.emit_function(dec),
            Statement::Return(ret) => match &ret.value {
                Some(value) => {
                    self.emit_exp(value);
                    let value = self.last_value.clone();
                    self.emit_line(&format!("  ret {value}"));
                }
                None => self.emit_line("  ret"),
            },
            Statement::If(if_st) => self.emit_if(if_st),
            Statement::For(_) => self.emit_line("  ; for lowering not implemented"),
            Statement::Foreach(_) => self.emit_line("  ; foreach lowering not implemented"),
            Statement::Case(_) => self.emit_line("  ; case lowering not implemented"),
        }
    }

    fn emit_block(&mut self, block: &Block) {
        self.push_copy();
        for statement in &block.items {
            self.emit_statement(statement);
        }
        self.pop();
    }

    fn emit_vardec(&mut self, dec: &VarDec) {
        let ssa = self.new_temp(&dec.name);

        if let Some(init) = &dec.init {
            self.emit_exp(init);
            let value = self.last_value.clone();
            self.emit_line(&format!("  {ssa} = mov {value}"));
            self.last_value.clear();
        } else {
            self.emit_line(&format!("  {ssa} = undef"));
        }

        self.set_name(&dec.name, ssa);
    }

    /// If-else with a phi merge: both branch maps start as copies of the
    /// parent map, and every variable appearing in any of the three maps is
    /// merged at the join. Variables bound to the same SSA name on both
    /// sides skip the phi.
    fn emit_if(&mut self, if_st: &If) {
        self.emit_exp(&if_st.condition);
        let cond = self.last_value.clone();
        self.last_value.clear();

        let then_label = self.new_label("if.then");
        let else_label = if if_st.els.is_some() {
            self.new_label("if.else")
        } else {
            self.new_label("if.end")
        };
        let end_label = self.new_label("if.end");

        self.emit_line(&format!("  br {cond}, %{then_label}, %{else_label}"));

        let parent_map = self.current_map();

        self.emit_line(&format!("label %{then_label}:"));
        self.push_copy();
        self.emit_branch(&if_st.then);
        let then_map = self.current_map();
        self.pop();
        self.emit_line(&format!("  br %{end_label}"));

        self.emit_line(&format!("label %{else_label}:"));
        let else_map = match &if_st.els {
            Some(els) => {
                self.push_copy();
                self.emit_branch(els);
                let map = self.current_map();
                self.pop();
                map
            }
            None => parent_map.clone(),
        };
        self.emit_line(&format!("  br %{end_label}"));

        self.emit_line(&format!("label %{end_label}:"));

        // union of the key sets; sorted so the output is deterministic
        let mut variables = BTreeSet::new();
        variables.extend(parent_map.keys().cloned());
        variables.extend(then_map.keys().cloned());
        variables.extend(else_map.keys().cloned());

        for variable in &variables {
            let parent_ssa = parent_map
                .get(variable)
                .cloned()
                .unwrap_or_else(|| "undef".to_owned());
            let then_ssa = then_map.get(variable).cloned().unwrap_or_else(|| parent_ssa.clone());
            let else_ssa = else_map.get(variable).cloned().unwrap_or_else(|| parent_ssa.clone());

            if then_ssa == else_ssa {
                self.set_name(variable, then_ssa);
                continue;
            }

            let phi = self.new_temp(&format!("{variable}_phi"));
            self.emit_line(&format!(
                "  {phi} = phi [{then_ssa}, %{then_label}], [{else_ssa}, %{else_label}]"
            ));
            self.set_name(variable, phi);
        }
    }

    /// A block used directly as an if-branch shares the branch's own map
    /// copy instead of pushing a second one; rebindings made inside the
    /// braces must be visible to the phi merge.
    fn emit_branch(&mut self, statement: &Statement) {
        match statement {
            Statement::Compound(block) => {
                for item in &block.items {
                    self.emit_statement(item);
                }
            }
            other => self.emit_statement(other),
        }
    }

    fn emit_function(&mut self, dec: &FunDec) {
        let return_type = dec.return_type.unwrap_or(Type::Void);
        self.emit_line(&format!("func @{}() -> {}", dec.name, return_type));
        self.emit_line("{");

        self.push();

        for (index, param) in dec.params.iter().enumerate() {
            let ssa = self.new_temp(&param.name);
            self.emit_line(&format!("  {ssa} = arg {index}"));
            self.set_name(&param.name, ssa);
        }

        self.emit_block(&dec.body);

        // implicit return unless the body already ended with one
        if !self.ends_with_ret() {
            self.emit_line("  ret");
        }

        self.emit_line("}");
        self.pop();
    }

    fn ends_with_ret(&self) -> bool {
        self.output
            .lines()
            .last()
            .is_some_and(|line| line == "  ret" || line.starts_with("  ret "))
    }
}

fn binary_opcode(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "sdiv",
        BinaryOp::Mod => "srem",
        BinaryOp::Eq => "icmp.eq",
        BinaryOp::Neq => "icmp.ne",
        BinaryOp::Lt => "icmp.slt",
        BinaryOp::Lte => "icmp.sle",
        BinaryOp::Gt => "icmp.sgt",
        BinaryOp::Gte => "icmp.sge",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}
