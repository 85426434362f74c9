use crate::codegen;
use crate::ir;
use crate::lexer::{self, FileContent};
use crate::logger;
use crate::parser::{self, ast_printer};
use crate::semantic_analysis;
use std::{error, fmt};

/// Per-run configuration threaded into the driver; passes themselves stay
/// pure functions and all stage printing happens here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub debug: bool,
    pub show_tokens: bool,
    pub show_ast: bool,
    pub show_ir: bool,
}

/// A pipeline failure: `where_` names the component and operation that
/// raised it, `what` is the rendered message including the module name and
/// source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerError {
    where_: String,
    what: String,
}

impl CompilerError {
    pub fn new(where_: impl Into<String>, what: impl Into<String>) -> Self {
        Self {
            where_: where_.into(),
            what: what.into(),
        }
    }

    pub fn where_tag(&self) -> &str {
        &self.where_
    }

    pub fn what(&self) -> &str {
        &self.what
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.where_, self.what)
    }
}

impl error::Error for CompilerError {}

/// Runs the full pipeline on one module: lex, parse, analyze, emit.
/// Returns the IR text, ready for a target-specific code generator.
pub fn compile(source: &FileContent, config: &Config) -> Result<String, CompilerError> {
    let module_name = source.file_name.clone();

    if config.debug {
        logger::debug(&format!("compiling module {module_name}"));
    }

    let tokens = lexer::lex(source).map_err(|err| {
        let what = format!(
            "{err} in module: {module_name} at {}:{}",
            err.line(),
            err.column()
        );
        CompilerError::new("lexer::lex", what)
    })?;
    if config.show_tokens {
        for token in &tokens {
            println!("{token}");
        }
    }

    if config.debug {
        logger::debug(&format!("building AST for module {module_name}"));
    }
    let module = parser::parse(&tokens).map_err(|err| {
        let what = format!(
            "{err} in module: {module_name} at {}:{}",
            err.line(),
            err.column()
        );
        CompilerError::new("parser::parse", what)
    })?;
    if config.show_ast {
        print!("{}", ast_printer::render(&module));
    }

    if config.debug {
        logger::debug(&format!("building symbol table for module {module_name}"));
    }
    let module = semantic_analysis::analyze(module).map_err(|err| {
        let what = format!(
            "{err} in module: {module_name} at {}:{}",
            err.line(),
            err.column()
        );
        CompilerError::new("semantic_analysis::analyze", what)
    })?;

    if config.debug {
        logger::debug(&format!("generating IR for module {module_name}"));
    }
    let ir_text = ir::emit(&module).map_err(|err| {
        CompilerError::new("ir::emit", format!("{err} in module: {module_name}"))
    })?;
    if config.show_ir {
        print!("{ir_text}");
    }

    // the x86-64 backend is an identity pass over the IR text for now
    Ok(codegen::codegen(ir_text))
}

#[cfg(test)]
mod driver_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile_source(source: &str) -> Result<String, CompilerError> {
        compile(
            &FileContent::new("main.cp", source),
            &Config::default(),
        )
    }

    #[test]
    fn test_s1_trivial_main() {
        let ir = compile_source("def main() -> int { return 42; }").unwrap();
        assert!(ir.contains("func @main() -> int"));
        assert!(ir.contains("  ret imm.i32 42"));
        assert!(ir.trim_end().ends_with('}'));
        assert!(!ir.contains("phi"));
    }

    #[test]
    fn test_s2_conditional_with_phi() {
        let source = "def f(a: int) -> int {\n\
                      \u{20} x: int = 0;\n\
                      \u{20} if (a) { x = 1; } else { x = 2; }\n\
                      \u{20} return x;\n\
                      }";
        let ir = compile_source(source).unwrap();
        assert!(ir.contains("  br %a0, %if.then0, %if.else0"));
        assert!(ir.contains("label %if.then0:"));
        assert!(ir.contains("label %if.else0:"));
        assert!(ir.contains("  %x_phi4 = phi [%x2, %if.then0], [%x3, %if.else0]"));
        assert!(ir.contains("  ret %x_phi4"));
    }

    #[test]
    fn test_s3_undefined_identifier() {
        let err = compile_source("def main() -> int { return q; }").unwrap_err();
        assert_eq!("semantic_analysis::analyze", err.where_tag());
        assert!(err.what().starts_with("Undefined identifier 'q'"));
        assert!(err.what().contains("in module: main.cp at 1:28"));
    }

    #[test]
    fn test_s4_return_type_mismatch() {
        let err = compile_source("def main() -> int { return \"s\"; }").unwrap_err();
        assert!(err
            .what()
            .starts_with("Return type mismatch: expected int got string"));
    }

    #[test]
    fn test_s5_redeclaration() {
        let err =
            compile_source("def main() -> int { x:int = 1; x:int = 2; return x; }").unwrap_err();
        assert!(err.what().starts_with("Variable 'x' already declared"));
    }

    #[test]
    fn test_s6_arity_mismatch() {
        let source = "def add(a:int, b:int) -> int { return a + b; }\n\
                      def main() -> int { return add(1); }";
        let err = compile_source(source).unwrap_err();
        assert!(err
            .what()
            .starts_with("Wrong number of arguments when calling 'add'"));
    }

    #[test]
    fn test_lex_error_reaches_driver() {
        let err = compile_source("def main() -> int { return 4@2; }").unwrap_err();
        assert_eq!("lexer::lex", err.where_tag());
        assert!(err.what().starts_with("Unexpected character '@'"));
        assert!(err.what().contains("in module: main.cp at 1:"));
    }

    #[test]
    fn test_parse_error_reaches_driver() {
        let err = compile_source("def main() -> int { return 42 }").unwrap_err();
        assert_eq!("parser::parse", err.where_tag());
        assert!(err.what().contains("in module: main.cp at 1:31"));
    }

    #[test]
    fn test_modules_compile_independently() {
        let first = compile_source("def main() -> int { return 1; }").unwrap();
        let second = compile(
            &FileContent::new("other.cp", "def main() -> int { return 2; }"),
            &Config::default(),
        )
        .unwrap();
        assert!(first.starts_with("; C+ generated IR for module main.cp"));
        assert!(second.starts_with("; C+ generated IR for module other.cp"));
        // counters restart per run
        assert!(!second.contains("%t1"));
    }
}
