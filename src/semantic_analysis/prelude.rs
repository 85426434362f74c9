use super::scope::{ScopeStack, Symbol};
use crate::ast::{Location, Type};

struct StdFunction {
    name: &'static str,
    return_type: Type,
    param_types: &'static [Type],
    is_variadic: bool,
}

struct StdConstant {
    name: &'static str,
    ty: Type,
}

// An `auto` parameter accepts an argument of any type.
const STD_FUNCTIONS: [StdFunction; 8] = [
    StdFunction {
        name: "print",
        return_type: Type::Void,
        param_types: &[Type::Auto],
        is_variadic: true,
    },
    StdFunction {
        name: "println",
        return_type: Type::Void,
        param_types: &[Type::Auto],
        is_variadic: true,
    },
    StdFunction {
        name: "input",
        return_type: Type::String,
        param_types: &[Type::String],
        is_variadic: false,
    },
    StdFunction {
        name: "int",
        return_type: Type::Int,
        param_types: &[Type::Auto],
        is_variadic: false,
    },
    StdFunction {
        name: "float",
        return_type: Type::Float,
        param_types: &[Type::Auto],
        is_variadic: false,
    },
    StdFunction {
        name: "string",
        return_type: Type::String,
        param_types: &[Type::Auto],
        is_variadic: false,
    },
    StdFunction {
        name: "sqrt",
        return_type: Type::Float,
        param_types: &[Type::Float],
        is_variadic: false,
    },
    StdFunction {
        name: "abs",
        return_type: Type::Int,
        param_types: &[Type::Int],
        is_variadic: false,
    },
];

const STD_CONSTANTS: [StdConstant; 4] = [
    StdConstant {
        name: "PI",
        ty: Type::Float,
    },
    StdConstant {
        name: "E",
        ty: Type::Float,
    },
    StdConstant {
        name: "EPSILON",
        ty: Type::Float,
    },
    StdConstant {
        name: "MAX_INT",
        ty: Type::Int,
    },
];

/// Registers the standard library in the current (module) scope, so user
/// code can call `print` and friends without declaring them.
pub(super) fn install(scopes: &mut ScopeStack) {
    for func in &STD_FUNCTIONS {
        let mut symbol = Symbol::function(
            func.name.to_owned(),
            func.return_type,
            func.param_types.to_vec(),
            Location::default(),
        );
        if func.is_variadic {
            symbol = symbol.variadic();
        }
        scopes.declare(symbol);
    }

    for constant in &STD_CONSTANTS {
        let symbol = Symbol::variable(constant.name.to_owned(), constant.ty, true, Location::default());
        scopes.declare(symbol);
    }
}
