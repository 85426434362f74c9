use super::*;
use crate::lexer::{self, FileContent};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn tokens_for(source: &str) -> Vec<Token> {
    lexer::lex(&FileContent::new("test.cp", source)).expect("lexing should succeed")
}

fn parse_source(source: &str) -> Result<Module> {
    parse(&tokens_for(source))
}

/// Parses a bare expression, skipping the synthetic module token.
fn expression(source: &str) -> Exp {
    let tokens = tokens_for(source);
    let mut cursor = Cursor::new(&tokens[1..]);
    parse_expression(&mut cursor).expect("expression should parse")
}

/// Location-free rendering of an expression tree for shape assertions.
fn shape(e: &Exp) -> String {
    match &e.kind {
        ExpKind::Literal(Literal::Int(v)) => v.to_string(),
        ExpKind::Literal(Literal::Float(v)) => format!("{v}f"),
        ExpKind::Literal(Literal::Str(s)) => format!("{s:?}"),
        ExpKind::Literal(Literal::Bool(b)) => b.to_string(),
        ExpKind::Var(name) => name.clone(),
        ExpKind::Binary(op, left, right) => {
            format!("{op:?}({}, {})", shape(left), shape(right))
        }
        ExpKind::Unary(op, operand) => format!("{op:?}({})", shape(operand)),
        ExpKind::Call(name, args) => {
            let args: Vec<String> = args.iter().map(shape).collect();
            format!("{name}({})", args.join(", "))
        }
        ExpKind::Assignment(name, value) => format!("Assign({name}, {})", shape(value)),
    }
}

#[test]
fn test_precedence_factor_over_term() {
    assert_eq!("Add(a, Mul(b, c))", shape(&expression("a + b * c")));
    assert_eq!("Sub(Mul(1, 2), Mul(3, Add(4, 5)))", shape(&expression("1 * 2 - 3 * (4 + 5)")));
}

#[test]
fn test_precedence_comparison_chain() {
    assert_eq!("Eq(a, Lt(Add(b, c), d))", shape(&expression("a == b + c < d")));
}

#[test]
fn test_precedence_logical() {
    assert_eq!("Or(a, And(b, c))", shape(&expression("a || b && c")));
    assert_eq!("Or(And(Eq(a, 0), b), c)", shape(&expression("a == 0 && b || c")));
}

#[test]
fn test_unary_chain() {
    assert_eq!("Not(Negate(x))", shape(&expression("!-x")));
    assert_eq!("Inc(x)", shape(&expression("++x")));
    assert_eq!("Dec(x)", shape(&expression("--x")));
    assert_eq!("Plus(7)", shape(&expression("+7")));
}

#[test]
fn test_assignment_right_associative() {
    assert_eq!("Assign(a, Assign(b, c))", shape(&expression("a = b = c")));
}

#[test]
fn test_assignment_inside_expression() {
    // primary-level assignment makes this legal
    assert_eq!("Add(1, Assign(a, 2))", shape(&expression("1 + (a = 2)")));
}

#[test]
fn test_call_arguments() {
    assert_eq!("add(1, Add(2, 3))", shape(&expression("add(1, 2 + 3)")));
    assert_eq!("f()", shape(&expression("f()")));
    // a parenthesized identifier is still a valid callee
    assert_eq!("f(x)", shape(&expression("(f)(x)")));
}

#[test]
fn test_invalid_callee() {
    let tokens = tokens_for("1(2)");
    let mut cursor = Cursor::new(&tokens[1..]);
    let err = parse_expression(&mut cursor).unwrap_err();
    assert_eq!(&InnerParseError::InvalidCallee, err.kind());
}

#[test]
fn test_chained_call_is_invalid_callee() {
    let tokens = tokens_for("f(1)(2)");
    let mut cursor = Cursor::new(&tokens[1..]);
    let err = parse_expression(&mut cursor).unwrap_err();
    assert_eq!(&InnerParseError::InvalidCallee, err.kind());
}

#[test]
fn test_module_name_from_synthetic_token() {
    let module = parse_source("x = 1;").unwrap();
    assert_eq!("test.cp", module.name);
}

#[test]
fn test_function_declaration() {
    let module = parse_source("def main() -> int { return 42; }").unwrap();
    assert_eq!(1, module.declarations.len());
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!("main", func.name);
    assert_eq!(Some(Type::Int), func.return_type);
    assert!(func.params.is_empty());
    assert_eq!(1, func.body.items.len());
    assert!(matches!(func.body.items[0], Statement::Return(_)));
}

#[test]
fn test_function_parameters() {
    let module = parse_source("def add(a: int, b) -> float { return a; }").unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(2, func.params.len());
    assert_eq!(("a", Some(Type::Int)), (func.params[0].name.as_str(), func.params[0].ty));
    // untyped parameter, inferred downstream as auto
    assert_eq!(("b", None), (func.params[1].name.as_str(), func.params[1].ty));
}

#[test]
fn test_function_without_return_type() {
    let module = parse_source("def noop() {}").unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(None, func.return_type);
}

#[test]
fn test_variable_declaration_forms() {
    let module = parse_source("x: int; y: float = 1.5; z = 10; const w = 2;").unwrap();
    let decs: Vec<&VarDec> = module
        .declarations
        .iter()
        .map(|s| match s {
            Statement::VarDec(v) => v,
            other => panic!("expected a variable declaration, got {other:?}"),
        })
        .collect();

    assert_eq!((Some(Type::Int), false), (decs[0].declared_type, decs[0].init.is_some()));
    assert_eq!((Some(Type::Float), true), (decs[1].declared_type, decs[1].init.is_some()));
    assert_eq!((None, true), (decs[2].declared_type, decs[2].init.is_some()));
    assert!(decs[3].is_const);
    assert!(!decs[0].is_const);
}

#[test]
fn test_variable_declaration_location() {
    let module = parse_source("\n  answer: int = 42;").unwrap();
    let Statement::VarDec(dec) = &module.declarations[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(Location::new(2, 3), dec.loc);
}

#[test]
fn test_if_paren_tolerance() {
    for source in [
        "def f() -> void { if x { y = 1; } }",
        "def f() -> void { if (x) { y = 1; } }",
        "def f() -> void { if ((x)) { y = 1; } }",
    ] {
        let module = parse_source(source).unwrap();
        let Statement::FunDec(func) = &module.declarations[0] else {
            panic!("expected a function declaration");
        };
        assert!(
            matches!(func.body.items[0], Statement::If(_)),
            "no if statement parsed from {source}"
        );
    }
}

#[test]
fn test_if_else() {
    let module = parse_source("def f() -> void { if (x) y = 1; else y = 2; }").unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    let Statement::If(if_st) = &func.body.items[0] else {
        panic!("expected an if statement");
    };
    assert!(if_st.els.is_some());
}

#[test]
fn test_for_statement_forms() {
    // parenthesized, all three slots
    let module = parse_source("def f() -> void { for (i = 0; i < 10; ++i) { x = i; } }").unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    let Statement::For(for_st) = &func.body.items[0] else {
        panic!("expected a for statement");
    };
    assert!(for_st.init.is_some());
    assert!(for_st.condition.is_some());
    assert!(for_st.post.is_some());
    assert!(matches!(**for_st.init.as_ref().unwrap(), Statement::VarDec(_)));

    // bare form without parens
    let module = parse_source("def f() -> void { for i = 0; i < 10; ++i { x = i; } }").unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    assert!(matches!(func.body.items[0], Statement::For(_)));

    // everything omitted
    let module = parse_source("def f() -> void { for (;;) { x = 1; } }").unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    let Statement::For(for_st) = &func.body.items[0] else {
        panic!("expected a for statement");
    };
    assert!(for_st.init.is_none());
    assert!(for_st.condition.is_none());
    assert!(for_st.post.is_none());
}

#[test]
fn test_foreach_statement() {
    for source in [
        "def f() -> void { foreach (item in items) { x = item; } }",
        "def f() -> void { foreach item in items { x = item; } }",
    ] {
        let module = parse_source(source).unwrap();
        let Statement::FunDec(func) = &module.declarations[0] else {
            panic!("expected a function declaration");
        };
        let Statement::Foreach(foreach) = &func.body.items[0] else {
            panic!("expected a foreach statement in {source}");
        };
        assert_eq!("item", foreach.iterator);
    }
}

#[test]
fn test_case_statement() {
    let source = "def f() -> void { case (x) { 1: a = 1; 2: b = 2; default: c = 3; } }";
    let module = parse_source(source).unwrap();
    let Statement::FunDec(func) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    let Statement::Case(case) = &func.body.items[0] else {
        panic!("expected a case statement");
    };
    assert_eq!(3, case.clauses.len());
    assert!(case.clauses[0].value.is_some());
    assert!(case.clauses[2].value.is_none());
    assert_eq!(1, case.clauses[0].statements.len());
}

#[test]
fn test_case_clause_boundary_limitation() {
    // a bare integer literal inside a clause body starts a new clause and
    // the missing ':' is reported
    let source = "def f() -> void { case (x) { 1: a = 1; 3 + 4; default: b = 2; } }";
    let err = parse_source(source).unwrap_err();
    assert!(matches!(err.kind(), InnerParseError::ExpectedToken { .. }));
}

#[test]
fn test_return_forms() {
    let module = parse_source("def f() -> void { return; } def g() -> int { return 1; }").unwrap();
    let Statement::FunDec(f) = &module.declarations[0] else {
        panic!("expected a function declaration");
    };
    let Statement::Return(ret) = &f.body.items[0] else {
        panic!("expected a return statement");
    };
    assert!(ret.value.is_none());
}

#[test]
fn test_missing_semicolon() {
    let err = parse_source("def f() -> void { x = 1 }").unwrap_err();
    let InnerParseError::ExpectedToken {
        expected, found, ..
    } = err.kind()
    else {
        panic!("expected an ExpectedToken error, got {err:?}");
    };
    assert_eq!(&TokenKind::Semicolon, expected);
    assert_eq!(&TokenKind::CloseCurly, found);
}

#[test]
fn test_unexpected_token_in_primary() {
    let err = parse_source("def f() -> void { x = ; }").unwrap_err();
    assert_eq!(&InnerParseError::UnexpectedToken(";".to_owned()), err.kind());
    assert_eq!(1, err.line());
}

#[test]
fn test_unknown_type_name() {
    let err = parse_source("x: wibble = 1;").unwrap_err();
    assert_eq!(&InnerParseError::UnknownType("wibble".to_owned()), err.kind());
}

#[test]
fn test_first_error_survives_recovery() {
    // the second declaration is fine; the reported diagnostic is still the
    // first one encountered
    let err = parse_source("def f() -> void { x = ; }\ndef g() -> void { y = 1; }").unwrap_err();
    assert_eq!(&InnerParseError::UnexpectedToken(";".to_owned()), err.kind());
}

fn arbitrary_token() -> impl Strategy<Value = Token> {
    use TokenKind::*;
    let pool = vec![
        Token::new(Def, "def", 1, 1),
        Token::new(Const, "const", 1, 1),
        Token::new(Return, "return", 1, 1),
        Token::new(If, "if", 1, 1),
        Token::new(Else, "else", 1, 1),
        Token::new(For, "for", 1, 1),
        Token::new(Foreach, "foreach", 1, 1),
        Token::new(In, "in", 1, 1),
        Token::new(Case, "case", 1, 1),
        Token::new(KwDefault, "default", 1, 1),
        Token::new(Identifier, "x", 1, 1),
        Token::new(Identifier, "int", 1, 1),
        Token::new(Integer, "1", 1, 1),
        Token::new(Float, "1.5", 1, 1),
        Token::new(String, "\"s\"", 1, 1),
        Token::new(OpenParanth, "(", 1, 1),
        Token::new(CloseParanth, ")", 1, 1),
        Token::new(OpenCurly, "{", 1, 1),
        Token::new(CloseCurly, "}", 1, 1),
        Token::new(Colon, ":", 1, 1),
        Token::new(Semicolon, ";", 1, 1),
        Token::new(Comma, ",", 1, 1),
        Token::new(Assign, "=", 1, 1),
        Token::new(Plus, "+", 1, 1),
        Token::new(Hyphen, "-", 1, 1),
        Token::new(Asterisk, "*", 1, 1),
        Token::new(Arrow, "->", 1, 1),
        Token::new(IsEqual, "==", 1, 1),
        Token::new(LogicalAnd, "&&", 1, 1),
    ];
    proptest::sample::select(pool)
}

proptest! {
    /// For any token stream terminated by EOF the parser either returns a
    /// module or exactly one diagnostic; it never panics.
    #[test]
    fn prop_parse_totality(body in proptest::collection::vec(arbitrary_token(), 0..40)) {
        let mut tokens = vec![Token::new(TokenKind::Module, "fuzz.cp", 0, 0)];
        tokens.extend(body);
        tokens.push(Token::new(TokenKind::Eof, "", 1, 1));

        let _ = parse(&tokens);
    }
}
