use crate::ast::{Identifier, Location, Type};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
}

/// A named entity visible in some scope. Functions additionally record their
/// parameter types; builtin variadic functions accept any argument count.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: Identifier,
    pub ty: Type,
    pub param_types: Vec<Type>,
    pub is_variadic: bool,
    pub is_const: bool,
    pub loc: Location,
}

impl Symbol {
    pub fn variable(name: Identifier, ty: Type, is_const: bool, loc: Location) -> Self {
        Self {
            kind: SymbolKind::Variable,
            name,
            ty,
            param_types: Vec::new(),
            is_variadic: false,
            is_const,
            loc,
        }
    }

    pub fn parameter(name: Identifier, ty: Type, loc: Location) -> Self {
        Self {
            kind: SymbolKind::Parameter,
            name,
            ty,
            param_types: Vec::new(),
            is_variadic: false,
            is_const: false,
            loc,
        }
    }

    pub fn function(
        name: Identifier,
        return_type: Type,
        param_types: Vec<Type>,
        loc: Location,
    ) -> Self {
        Self {
            kind: SymbolKind::Function,
            name,
            ty: return_type,
            param_types,
            is_variadic: false,
            is_const: false,
            loc,
        }
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    #[inline]
    pub fn is_function(&self) -> bool {
        self.kind == SymbolKind::Function
    }
}

/// One lexical region of name bindings.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<Identifier, Symbol>,
}

impl Scope {
    /// False when `name` is already bound in this scope.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        if self.symbols.contains_key(&symbol.name) {
            return false;
        }
        self.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// The dynamic path of live scopes from the module root to the current
/// position. Indexing by depth replaces parent pointers; parent lookup is
/// just the previous element.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn exit(&mut self) {
        self.scopes.pop();
    }

    /// Declares into the innermost scope; false on a duplicate.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        match self.scopes.last_mut() {
            Some(scope) => scope.declare(symbol),
            None => false,
        }
    }

    /// Walks from the innermost scope outwards.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.lookup_local(name))
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
