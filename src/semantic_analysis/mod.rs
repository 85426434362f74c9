mod prelude;
mod scope;
mod typecheck;

use crate::ast::{Identifier, Module, Type};
use std::{error, fmt};

pub use scope::{Scope, ScopeStack, Symbol, SymbolKind};

pub type Result<T> = std::result::Result<T, SemanticError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerSemanticError {
    Undefined(Identifier),
    AssignUndefined(Identifier),
    UndefinedFunction(Identifier),
    Redeclared(Identifier),
    IteratorRedeclared(Identifier),
    FunctionRedeclared(Identifier),
    ParameterRedeclared {
        param: Identifier,
        function: Identifier,
    },
    TypeMismatchInit(Identifier),
    TypeMismatchBinary,
    TypeMismatchAssign(Identifier),
    ArgMismatch {
        function: Identifier,
        expected: Type,
        got: Type,
    },
    ArityMismatch(Identifier),
    ReturnMismatch {
        expected: Type,
        got: Type,
    },
    MissingTypeOrInit(Identifier),
    MissingReturn {
        function: Identifier,
        expected: Type,
    },
    ReturnOutsideFunction,
}

/// A semantic violation with the position of the offending node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    inner: InnerSemanticError,
    line: u64,
    column: u64,
}

impl SemanticError {
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn column(&self) -> u64 {
        self.column
    }

    pub fn kind(&self) -> &InnerSemanticError {
        &self.inner
    }
}

impl InnerSemanticError {
    pub(super) fn at(self, loc: crate::ast::Location) -> SemanticError {
        SemanticError {
            inner: self,
            line: loc.line,
            column: loc.column,
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Display for InnerSemanticError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Undefined(name) => write!(f, "Undefined identifier '{name}'"),
            Self::AssignUndefined(name) => write!(f, "Assign to undefined variable '{name}'"),
            Self::UndefinedFunction(name) => write!(f, "Call to undefined function '{name}'"),
            Self::Redeclared(name) => write!(f, "Variable '{name}' already declared"),
            Self::IteratorRedeclared(name) => {
                write!(f, "Variable '{name}' already declared in foreach")
            }
            Self::FunctionRedeclared(name) => write!(f, "Function '{name}' already declared"),
            Self::ParameterRedeclared { param, function } => {
                write!(f, "Parameter '{param}' already declared in function '{function}'")
            }
            Self::TypeMismatchInit(name) => {
                write!(f, "Type mismatch in initializer for variable '{name}'")
            }
            Self::TypeMismatchBinary => write!(f, "Type mismatch in binary expression"),
            Self::TypeMismatchAssign(name) => {
                write!(f, "Type mismatch in assignment to variable '{name}'")
            }
            Self::ArgMismatch {
                function,
                expected,
                got,
            } => write!(
                f,
                "Argument type mismatch in call to '{function}': expected {expected} got {got}"
            ),
            Self::ArityMismatch(function) => {
                write!(f, "Wrong number of arguments when calling '{function}'")
            }
            Self::ReturnMismatch { expected, got } => {
                write!(f, "Return type mismatch: expected {expected} got {got}")
            }
            Self::MissingTypeOrInit(name) => {
                write!(f, "Variable '{name}' must have type or initializer")
            }
            Self::MissingReturn { function, expected } => {
                write!(f, "Missing return in function '{function}': expected {expected}")
            }
            Self::ReturnOutsideFunction => write!(f, "Return statement outside of function"),
        }
    }
}

impl error::Error for SemanticError {}
impl error::Error for InnerSemanticError {}

/// Resolves names, infers types and validates calls and return paths.
/// Returns the same tree with every expression's type populated.
pub fn analyze(module: Module) -> Result<Module> {
    typecheck::TypeChecker::new().run(module)
}
