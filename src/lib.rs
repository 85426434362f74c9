/*!
This crate is the front-end and middle-end of the C+ compiler: a single-pass
compiler for a small imperative language which reads one module per source
file, reports lexical, syntactic and semantic errors, and emits a textual
single-assignment intermediate representation for a later target-specific
code generator.

## Command-line options
```shell
USAGE: cplus [options] <input.cp>

OPTIONS:
  -v,  --version         Show version information
  -help, --help          Show this help message
  -d,  --debug           Enable debug mode
  -o,  --output          Output file
  -t,  --show-tokens     Show Tokens
  -a,  --show-ast        Show AST
       --show-ir         Print IR to stdout as well
```

## Compilation stages
1. **Tokenization(lexing)** - [lex](lexer::lex) scans a [FileContent](lexer::FileContent)
   for known token kinds and produces [Tokens](lexer::Tokens) - a sequence of
   [Token](lexer::Token) carrying the lexeme and its position. The stream starts with a
   synthetic `module` token naming the file and ends with `EOF`. Any unknown byte raises
   [LexError](lexer::LexError).
2. **Parsing** - [parse](parser::parse) turns the token sequence into a
   [Module](ast::Module) - the abstract syntax tree of the file. Syntactic errors raise
   [ParseError](parser::ParseError) after panic-mode resynchronization at declaration
   level.
3. **Semantic analysis** - [analyze](semantic_analysis::analyze) resolves names against a
   scope stack, infers the types of `auto` variables, validates calls and return paths
   and produces the same tree with every expression typed. Violations raise
   [SemanticError](semantic_analysis::SemanticError).
4. **IR generation** - [emit](ir::emit) walks the typed tree and renders SSA-form textual
   IR, renaming variables per assignment and inserting phi nodes where control flow
   joins. From this stage on any error means a bug in the compiler, not in the program.

Every module except [ast] is hidden behind a feature flag with the same name, so any
stage can be reused on its own (e.g. for lexing or parsing C+ from another tool).

The x86-64 code generator, assembler and linker are out of scope here; the driver hands
the finished IR text to whatever consumes it next.
*/

#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]

pub mod ast;
#[cfg(feature = "codegen")]
pub mod codegen;
#[cfg(feature = "driver")]
pub mod driver;
#[cfg(feature = "ir")]
pub mod ir;
#[cfg(feature = "lexer")]
pub mod lexer;
#[cfg(feature = "driver")]
pub mod logger;
#[cfg(feature = "parser")]
pub mod parser;
#[cfg(feature = "semantic_analysis")]
pub mod semantic_analysis;
