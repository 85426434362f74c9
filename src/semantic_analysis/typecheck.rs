use super::scope::{ScopeStack, Symbol};
use super::{prelude, InnerSemanticError, Result};
use crate::ast::*;

/// Walks the tree rebuilding it with types filled in. Scopes are pushed for
/// the module, every block, for/foreach headers and function declarations;
/// each push is paired with a pop on success and error paths alike.
pub(super) struct TypeChecker {
    scopes: ScopeStack,
    return_types: Vec<Type>,
    has_return: Vec<bool>,
}

impl TypeChecker {
    pub(super) fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            return_types: Vec::new(),
            has_return: Vec::new(),
        }
    }

    pub(super) fn run(&mut self, module: Module) -> Result<Module> {
        self.scopes.enter();
        prelude::install(&mut self.scopes);

        let declarations = self.check_statements(module.declarations);
        self.scopes.exit();

        Ok(Module {
            name: module.name,
            declarations: declarations?,
        })
    }

    #[cfg(test)]
    pub(super) fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    fn check_statements(&mut self, statements: Vec<Statement>) -> Result<Vec<Statement>> {
        statements
            .into_iter()
            .map(|statement| self.check_statement(statement))
            .collect()
    }

    fn check_statement(&mut self, statement: Statement) -> Result<Statement> {
        match statement {
            Statement::Exp(exp) => self.check_exp(exp).map(Statement::Exp),
            Statement::Compound(block) => self.check_block(block).map(Statement::Compound),
            Statement::VarDec(dec) => self.check_vardec(dec).map(Statement::VarDec),
            Statement::FunDec(dec) => self.check_fundec(dec).map(Statement::FunDec),
            Statement::Return(ret) => self.check_return(ret).map(Statement::Return),
            Statement::If(if_st) => self.check_if(if_st).map(Statement::If),
            Statement::For(for_st) => self.check_for(for_st).map(Statement::For),
            Statement::Foreach(foreach) => self.check_foreach(foreach).map(Statement::Foreach),
            Statement::Case(case) => self.check_case(case).map(Statement::Case),
        }
    }

    fn check_block(&mut self, block: Block) -> Result<Block> {
        self.scopes.enter();
        let items = self.check_statements(block.items);
        self.scopes.exit();
        Ok(Block { items: items? })
    }

    fn check_vardec(&mut self, dec: VarDec) -> Result<VarDec> {
        // an explicit `auto` annotation behaves like an omitted one
        let declared = dec.declared_type.filter(|ty| *ty != Type::Auto);

        match (declared, dec.init) {
            (Some(ty), init @ Some(_)) => {
                // the variable is visible to its own initializer
                self.declare_variable(&dec.name, ty, dec.is_const, dec.loc)?;
                let init = init.map(|e| self.check_exp(e)).transpose()?;
                let init_ty = init
                    .as_ref()
                    .and_then(Exp::get_type)
                    .unwrap_or(Type::Auto);
                if !ty.compatible(init_ty) {
                    return Err(
                        InnerSemanticError::TypeMismatchInit(dec.name.clone()).at(dec.loc)
                    );
                }
                Ok(VarDec {
                    name: dec.name,
                    declared_type: dec.declared_type,
                    init,
                    is_const: dec.is_const,
                    loc: dec.loc,
                })
            }
            (Some(ty), None) => {
                self.declare_variable(&dec.name, ty, dec.is_const, dec.loc)?;
                Ok(VarDec {
                    name: dec.name,
                    declared_type: dec.declared_type,
                    init: None,
                    is_const: dec.is_const,
                    loc: dec.loc,
                })
            }
            (None, Some(init)) => {
                let init = self.check_exp(init)?;
                let ty = init.get_type().unwrap_or(Type::Auto);
                self.declare_variable(&dec.name, ty, dec.is_const, dec.loc)?;
                Ok(VarDec {
                    name: dec.name,
                    declared_type: dec.declared_type,
                    init: Some(init),
                    is_const: dec.is_const,
                    loc: dec.loc,
                })
            }
            (None, None) => {
                Err(InnerSemanticError::MissingTypeOrInit(dec.name.clone()).at(dec.loc))
            }
        }
    }

    fn declare_variable(
        &mut self,
        name: &Identifier,
        ty: Type,
        is_const: bool,
        loc: Location,
    ) -> Result<()> {
        let symbol = Symbol::variable(name.clone(), ty, is_const, loc);
        if self.scopes.declare(symbol) {
            Ok(())
        } else {
            Err(InnerSemanticError::Redeclared(name.clone()).at(loc))
        }
    }

    fn check_fundec(&mut self, dec: FunDec) -> Result<FunDec> {
        let return_type = dec.return_type.unwrap_or(Type::Void);
        let param_types: Vec<Type> = dec
            .params
            .iter()
            .map(|param| param.ty.unwrap_or(Type::Auto))
            .collect();

        let symbol = Symbol::function(dec.name.clone(), return_type, param_types, dec.loc);
        if !self.scopes.declare(symbol) {
            return Err(InnerSemanticError::FunctionRedeclared(dec.name.clone()).at(dec.loc));
        }

        // parameters occupy the function's own scope, not the body block scope
        self.return_types.push(return_type);
        self.has_return.push(false);
        self.scopes.enter();

        let mut result = Ok(());
        for param in &dec.params {
            let param_ty = param.ty.unwrap_or(Type::Auto);
            let symbol = Symbol::parameter(param.name.clone(), param_ty, dec.loc);
            if !self.scopes.declare(symbol) {
                result = Err(InnerSemanticError::ParameterRedeclared {
                    param: param.name.clone(),
                    function: dec.name.clone(),
                }
                .at(dec.loc));
                break;
            }
        }

        let body = match result {
            Ok(()) => self.check_block(dec.body),
            Err(err) => Err(err),
        };

        self.scopes.exit();
        let has_return = self.has_return.pop().unwrap_or(false);
        self.return_types.pop();

        let body = body?;
        if return_type != Type::Void && !has_return {
            return Err(InnerSemanticError::MissingReturn {
                function: dec.name.clone(),
                expected: return_type,
            }
            .at(dec.loc));
        }

        Ok(FunDec {
            name: dec.name,
            params: dec.params,
            return_type: Some(return_type),
            body,
            loc: dec.loc,
        })
    }

    fn check_return(&mut self, ret: Return) -> Result<Return> {
        let Some(&expected) = self.return_types.last() else {
            return Err(InnerSemanticError::ReturnOutsideFunction.at(ret.loc));
        };

        let value = match ret.value {
            Some(value) => {
                let value = self.check_exp(value)?;
                let got = value.get_type().unwrap_or(Type::Auto);
                if !expected.compatible(got) {
                    return Err(InnerSemanticError::ReturnMismatch { expected, got }.at(ret.loc));
                }
                Some(value)
            }
            None => {
                if expected != Type::Void {
                    return Err(InnerSemanticError::ReturnMismatch {
                        expected,
                        got: Type::Void,
                    }
                    .at(ret.loc));
                }
                None
            }
        };

        if let Some(flag) = self.has_return.last_mut() {
            *flag = true;
        }

        Ok(Return {
            value,
            loc: ret.loc,
        })
    }

    fn check_if(&mut self, if_st: If) -> Result<If> {
        let condition = self.check_exp(if_st.condition)?;
        let then = self.check_statement(*if_st.then).map(Box::new)?;
        let els = match if_st.els {
            Some(els) => Some(self.check_statement(*els).map(Box::new)?),
            None => None,
        };
        Ok(If {
            condition,
            then,
            els,
        })
    }

    fn check_for(&mut self, for_st: For) -> Result<For> {
        self.scopes.enter();
        let result = self.check_for_parts(for_st);
        self.scopes.exit();
        result
    }

    fn check_for_parts(&mut self, for_st: For) -> Result<For> {
        let init = match for_st.init {
            Some(init) => Some(self.check_statement(*init).map(Box::new)?),
            None => None,
        };
        let condition = for_st.condition.map(|e| self.check_exp(e)).transpose()?;
        let post = for_st.post.map(|e| self.check_exp(e)).transpose()?;
        let body = self.check_statement(*for_st.body).map(Box::new)?;
        Ok(For {
            init,
            condition,
            post,
            body,
        })
    }

    fn check_foreach(&mut self, foreach: Foreach) -> Result<Foreach> {
        self.scopes.enter();
        let result = self.check_foreach_parts(foreach);
        self.scopes.exit();
        result
    }

    fn check_foreach_parts(&mut self, foreach: Foreach) -> Result<Foreach> {
        let iterable = self.check_exp(foreach.iterable)?;

        // the iterator is always `auto`; element types are not inferred
        // from the iterable
        let symbol = Symbol::variable(foreach.iterator.clone(), Type::Auto, false, foreach.loc);
        if !self.scopes.declare(symbol) {
            return Err(
                InnerSemanticError::IteratorRedeclared(foreach.iterator.clone()).at(foreach.loc)
            );
        }

        let body = self.check_statement(*foreach.body).map(Box::new)?;
        Ok(Foreach {
            iterator: foreach.iterator,
            iterable,
            body,
            loc: foreach.loc,
        })
    }

    fn check_case(&mut self, case: Case) -> Result<Case> {
        let scrutinee = self.check_exp(case.scrutinee)?;
        let clauses = case
            .clauses
            .into_iter()
            .map(|clause| {
                let value = clause.value.map(|e| self.check_exp(e)).transpose()?;
                let statements = self.check_statements(clause.statements)?;
                Ok(CaseClause { value, statements })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Case { scrutinee, clauses })
    }

    fn check_exp(&mut self, exp: Exp) -> Result<Exp> {
        let loc = exp.loc;
        match exp.kind {
            ExpKind::Literal(literal) => {
                let ty = match &literal {
                    Literal::Int(_) => Type::Int,
                    Literal::Float(_) => Type::Float,
                    Literal::Str(_) => Type::String,
                    Literal::Bool(_) => Type::Bool,
                };
                Ok(Exp::literal(literal, loc).set_type(ty))
            }
            ExpKind::Var(name) => {
                let symbol = self
                    .scopes
                    .lookup(&name)
                    .ok_or_else(|| InnerSemanticError::Undefined(name.clone()).at(loc))?;
                let ty = symbol.ty;
                Ok(Exp::var(name, loc).set_type(ty))
            }
            ExpKind::Binary(op, left, right) => {
                let left = self.check_exp(*left)?;
                let right = self.check_exp(*right)?;
                let left_ty = left.get_type().unwrap_or(Type::Auto);
                let right_ty = right.get_type().unwrap_or(Type::Auto);
                if !left_ty.compatible(right_ty) {
                    return Err(InnerSemanticError::TypeMismatchBinary.at(loc));
                }
                Ok(Exp::binary(op, Box::new(left), Box::new(right), loc).set_type(left_ty))
            }
            ExpKind::Unary(op, operand) => {
                let operand = self.check_exp(*operand)?;
                let ty = operand.get_type().unwrap_or(Type::Auto);
                Ok(Exp::unary(op, Box::new(operand), loc).set_type(ty))
            }
            ExpKind::Call(name, args) => self.check_call(name, args, loc),
            ExpKind::Assignment(name, value) => {
                let value = self.check_exp(*value)?;
                let symbol = self
                    .scopes
                    .lookup(&name)
                    .ok_or_else(|| InnerSemanticError::AssignUndefined(name.clone()).at(loc))?;
                let dest = symbol.ty;
                let src = value.get_type().unwrap_or(Type::Auto);
                if !dest.compatible(src) {
                    return Err(InnerSemanticError::TypeMismatchAssign(name.clone()).at(loc));
                }
                Ok(Exp::assignment(name, Box::new(value), loc).set_type(dest))
            }
        }
    }

    fn check_call(&mut self, name: Identifier, args: Vec<Exp>, loc: Location) -> Result<Exp> {
        let args = args
            .into_iter()
            .map(|arg| self.check_exp(arg))
            .collect::<Result<Vec<_>>>()?;

        let symbol = self
            .scopes
            .lookup(&name)
            .filter(|symbol| symbol.is_function())
            .ok_or_else(|| InnerSemanticError::UndefinedFunction(name.clone()).at(loc))?;
        let return_type = symbol.ty;
        let param_types = symbol.param_types.clone();
        let is_variadic = symbol.is_variadic;

        if !param_types.is_empty() && !is_variadic && param_types.len() != args.len() {
            return Err(InnerSemanticError::ArityMismatch(name.clone()).at(loc));
        }

        for (expected, arg) in param_types.iter().zip(&args) {
            if *expected == Type::Auto {
                continue;
            }
            let got = arg.get_type().unwrap_or(Type::Auto);
            if !expected.compatible(got) {
                return Err(InnerSemanticError::ArgMismatch {
                    function: name.clone(),
                    expected: *expected,
                    got,
                }
                .at(arg.loc));
            }
        }

        Ok(Exp::call(name, args, loc).set_type(return_type))
    }
}
