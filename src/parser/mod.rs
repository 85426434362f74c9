pub mod ast_printer;
mod cursor;
mod parse_error;
#[cfg(test)]
mod parser_tests;

use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use cursor::Cursor;
pub use parse_error::{InnerParseError, ParseError, Result};

/// Consumes a token sequence into a [`Module`].
///
/// The leading synthetic module token names the module; declarations are
/// parsed until EOF. The first syntactic error aborts parsing, after
/// panic-mode resynchronization at declaration level.
pub fn parse(tokens: &[Token]) -> Result<Module> {
    let mut cursor = Cursor::new(tokens);
    let module_token = cursor.consume(TokenKind::Module, "Lexical error, expected module header")?;
    let name = module_token.lexeme;

    let mut declarations = Vec::new();
    while !cursor.is_at_end() {
        declarations.push(parse_declaration(&mut cursor)?);
    }

    Ok(Module { name, declarations })
}

/// ```text
/// declaration:
///   def function_name(param:type, ...) -> return_type { body }
///   const var_name (: type)? (= initializer)? ;
///   statement
/// ```
fn parse_declaration(cursor: &mut Cursor) -> Result<Statement> {
    let result = if cursor.matches(&[TokenKind::Def]) {
        parse_function_declaration(cursor)
    } else if cursor.matches(&[TokenKind::Const]) {
        parse_variable_declaration(cursor, true, true)
    } else {
        parse_statement(cursor)
    };

    // panic mode: discard tokens up to a safe boundary, then surface the
    // original diagnostic
    result.map_err(|err| {
        synchronize(cursor);
        err
    })
}

fn synchronize(cursor: &mut Cursor) {
    while !cursor.is_at_end() {
        if cursor.previous().kind == TokenKind::Semicolon || cursor.check(TokenKind::CloseCurly) {
            return;
        }
        if cursor.peek().kind.is_statement_start() {
            return;
        }
        cursor.advance();
    }
}

/// ```text
/// def add(a: int, b: int) -> int
/// {
///     return a + b;
/// }
/// ```
/// Parameter types may be omitted (inferred downstream as `auto`); a missing
/// return type defaults to `void`.
fn parse_function_declaration(cursor: &mut Cursor) -> Result<Statement> {
    let name_token = cursor.consume(TokenKind::Identifier, "Expected function name")?;
    let name = name_token.lexeme;
    let loc = Location::new(name_token.line, name_token.column);

    cursor.consume(TokenKind::OpenParanth, "Expected '(' after function name")?;

    let mut params = Vec::new();
    if !cursor.check(TokenKind::CloseParanth) {
        loop {
            let param_token = cursor.consume(TokenKind::Identifier, "Expected parameter name")?;
            let param_name = param_token.lexeme;
            let ty = if cursor.matches(&[TokenKind::Colon]) {
                Some(parse_type(cursor)?)
            } else {
                None
            };
            params.push(Param {
                name: param_name,
                ty,
            });
            if !cursor.matches(&[TokenKind::Comma]) {
                break;
            }
        }
    }

    cursor.consume(TokenKind::CloseParanth, "Expected ')' after parameters")?;

    let return_type = if cursor.matches(&[TokenKind::Arrow]) {
        Some(parse_type(cursor)?)
    } else {
        None
    };

    let body = parse_block(cursor)?;

    Ok(Statement::FunDec(FunDec {
        name,
        params,
        return_type,
        body,
        loc,
    }))
}

/// ```text
/// x: int;
/// x: int = 10;
/// x = 10;
/// ```
/// The type is inferred from the initializer when not explicitly given;
/// having neither is rejected downstream.
fn parse_variable_declaration(
    cursor: &mut Cursor,
    is_const: bool,
    expect_semicolon: bool,
) -> Result<Statement> {
    let name_token = cursor.consume(TokenKind::Identifier, "Expected variable name")?;
    let name = name_token.lexeme;
    let loc = Location::new(name_token.line, name_token.column);

    let declared_type = if cursor.matches(&[TokenKind::Colon]) {
        Some(parse_type(cursor)?)
    } else {
        None
    };
    let init = if cursor.matches(&[TokenKind::Assign]) {
        Some(parse_expression(cursor)?)
    } else {
        None
    };

    if expect_semicolon {
        cursor.consume(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
    }

    Ok(Statement::VarDec(VarDec {
        name,
        declared_type,
        init,
        is_const,
        loc,
    }))
}

fn parse_type(cursor: &mut Cursor) -> Result<Type> {
    let type_token = cursor.consume(TokenKind::Identifier, "Expected type name")?;
    Type::from_name(&type_token.lexeme).ok_or_else(|| {
        InnerParseError::UnknownType(type_token.lexeme.clone())
            .at(type_token.line, type_token.column)
    })
}

/// True when the next tokens read as `IDENT :` or `IDENT =`, i.e. a
/// statement-level variable declaration rather than an expression.
fn at_variable_declaration(cursor: &Cursor) -> bool {
    cursor.check(TokenKind::Identifier)
        && (cursor.check_nth(TokenKind::Colon, 1) || cursor.check_nth(TokenKind::Assign, 1))
}

fn parse_statement(cursor: &mut Cursor) -> Result<Statement> {
    if cursor.matches(&[TokenKind::If]) {
        return parse_if_statement(cursor);
    }
    if cursor.matches(&[TokenKind::For]) {
        return parse_for_statement(cursor);
    }
    if cursor.matches(&[TokenKind::Foreach]) {
        return parse_foreach_statement(cursor);
    }
    if cursor.matches(&[TokenKind::Case]) {
        return parse_case_statement(cursor);
    }
    if cursor.matches(&[TokenKind::Return]) {
        return parse_return_statement(cursor);
    }
    if cursor.check(TokenKind::OpenCurly) {
        return parse_block(cursor).map(Statement::Compound);
    }
    if at_variable_declaration(cursor) {
        return parse_variable_declaration(cursor, false, true);
    }
    parse_expression_statement(cursor)
}

/// ```text
/// {
///   statement1;
///   statement2;
/// }
/// ```
fn parse_block(cursor: &mut Cursor) -> Result<Block> {
    cursor.consume(TokenKind::OpenCurly, "Expected '{'")?;

    let mut items = Vec::new();
    while !cursor.check(TokenKind::CloseCurly) && !cursor.is_at_end() {
        items.push(parse_declaration(cursor)?);
    }

    cursor.consume(TokenKind::CloseCurly, "Expected '}'")?;
    Ok(Block { items })
}

/// ```text
/// if (condition) { then_stmt } else { else_stmt }
/// ```
/// The parentheses around the condition are sugar: zero or more opening and
/// closing parens are tolerated, so `if cond`, `if ((cond))` and even the
/// unbalanced `if (((cond` all parse.
fn parse_if_statement(cursor: &mut Cursor) -> Result<Statement> {
    while cursor.matches(&[TokenKind::OpenParanth]) && cursor.check(TokenKind::CloseParanth) {}
    let condition = parse_expression(cursor)?;
    while cursor.matches(&[TokenKind::CloseParanth]) && cursor.check(TokenKind::CloseParanth) {}

    let then = parse_statement(cursor).map(Box::new)?;
    let els = if cursor.matches(&[TokenKind::Else]) {
        Some(parse_statement(cursor).map(Box::new)?)
    } else {
        None
    };

    Ok(Statement::If(If {
        condition,
        then,
        els,
    }))
}

/// ```text
/// for (initializer; condition; increment) { body }
/// for initializer; condition; increment { body }
/// ```
/// The surrounding parentheses can be omitted; each of the three slots is
/// optional. The initializer is either a variable declaration (without its
/// own trailing semicolon) or an expression statement.
fn parse_for_statement(cursor: &mut Cursor) -> Result<Statement> {
    let has_paren = cursor.matches(&[TokenKind::OpenParanth]);

    let mut init = None;
    if !cursor.check(TokenKind::Semicolon) {
        let statement = if at_variable_declaration(cursor) {
            parse_variable_declaration(cursor, false, false)?
        } else {
            Statement::Exp(parse_expression(cursor)?)
        };
        init = Some(Box::new(statement));
    }
    cursor.consume(TokenKind::Semicolon, "Expected ';' after for loop initializer")?;

    let condition = if cursor.check(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_expression(cursor)?)
    };
    cursor.consume(TokenKind::Semicolon, "Expected ';' after for loop condition")?;

    let mut post = None;
    if !cursor.check(TokenKind::OpenCurly) && !(has_paren && cursor.check(TokenKind::CloseParanth))
    {
        post = Some(parse_expression(cursor)?);
    }
    if has_paren {
        cursor.consume(TokenKind::CloseParanth, "Expected ')' after for loop increment")?;
    }

    let body = parse_statement(cursor).map(Box::new)?;

    Ok(Statement::For(For {
        init,
        condition,
        post,
        body,
    }))
}

/// ```text
/// foreach (item in collection) { body }
/// foreach c in "Hello C+" { body }
/// ```
fn parse_foreach_statement(cursor: &mut Cursor) -> Result<Statement> {
    let has_paren = cursor.matches(&[TokenKind::OpenParanth]);
    let iterator_token = cursor.consume(TokenKind::Identifier, "Expected iterator name in foreach")?;
    let iterator = iterator_token.lexeme;
    let loc = Location::new(iterator_token.line, iterator_token.column);

    cursor.consume(TokenKind::In, "Expected 'in' after iterator in foreach")?;

    let iterable = parse_expression(cursor)?;

    if has_paren {
        cursor.consume(TokenKind::CloseParanth, "Expected ')' after foreach expression")?;
    }

    let body = parse_statement(cursor).map(Box::new)?;

    Ok(Statement::Foreach(Foreach {
        iterator,
        iterable,
        body,
        loc,
    }))
}

/// ```text
/// case (x) {
///   1: print("one");
///   2: print("two");
///   default: print("other");
/// }
/// ```
/// A clause body ends at the next integer literal or `default` token; an
/// integer literal inside a clause body therefore starts a new clause. Known
/// limitation of the clause-boundary rule.
fn parse_case_statement(cursor: &mut Cursor) -> Result<Statement> {
    cursor.consume(TokenKind::OpenParanth, "Expected '(' after 'case'")?;
    let scrutinee = parse_expression(cursor)?;
    cursor.consume(TokenKind::CloseParanth, "Expected ')' after case expression")?;
    cursor.consume(TokenKind::OpenCurly, "Expected '{' before case clauses")?;

    let mut clauses = Vec::new();
    while !cursor.check(TokenKind::CloseCurly) && !cursor.is_at_end() {
        let value = if cursor.matches(&[TokenKind::KwDefault]) {
            None
        } else {
            Some(parse_expression(cursor)?)
        };
        cursor.consume(TokenKind::Colon, "Expected ':' after case value")?;

        let mut statements = Vec::new();
        while !cursor.check(TokenKind::CloseCurly)
            && !cursor.is_at_end()
            && !(cursor.check(TokenKind::Integer) || cursor.check(TokenKind::KwDefault))
        {
            statements.push(parse_declaration(cursor)?);
        }
        clauses.push(CaseClause { value, statements });
    }

    cursor.consume(TokenKind::CloseCurly, "Expected '}' after case clauses")?;

    Ok(Statement::Case(Case { scrutinee, clauses }))
}

/// ```text
/// return expression;
/// return;
/// ```
fn parse_return_statement(cursor: &mut Cursor) -> Result<Statement> {
    let keyword = cursor.previous();
    let loc = Location::new(keyword.line, keyword.column);

    let value = if cursor.check(TokenKind::Semicolon) {
        None
    } else {
        Some(parse_expression(cursor)?)
    };

    cursor.consume(TokenKind::Semicolon, "Expected ';' after return value")?;

    Ok(Statement::Return(Return { value, loc }))
}

fn parse_expression_statement(cursor: &mut Cursor) -> Result<Statement> {
    let exp = parse_expression(cursor)?;
    cursor.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
    Ok(Statement::Exp(exp))
}

/// Precedence ladder, low to high:
/// `logical_or → logical_and → equality → comparison → term → factor →
/// unary → call → primary`. All binary levels are left-associative.
fn parse_expression(cursor: &mut Cursor) -> Result<Exp> {
    parse_logical_or(cursor)
}

fn parse_logical_or(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_logical_and(cursor)?;
    while cursor.matches(&[TokenKind::LogicalOr]) {
        let loc = expr.loc;
        let right = parse_logical_and(cursor)?;
        expr = Exp::binary(BinaryOp::Or, Box::new(expr), Box::new(right), loc);
    }
    Ok(expr)
}

fn parse_logical_and(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_equality(cursor)?;
    while cursor.matches(&[TokenKind::LogicalAnd]) {
        let loc = expr.loc;
        let right = parse_equality(cursor)?;
        expr = Exp::binary(BinaryOp::And, Box::new(expr), Box::new(right), loc);
    }
    Ok(expr)
}

fn parse_equality(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_comparison(cursor)?;
    while cursor.matches(&[TokenKind::IsEqual, TokenKind::IsNotEqual]) {
        let op = if cursor.previous().kind == TokenKind::IsEqual {
            BinaryOp::Eq
        } else {
            BinaryOp::Neq
        };
        let loc = expr.loc;
        let right = parse_comparison(cursor)?;
        expr = Exp::binary(op, Box::new(expr), Box::new(right), loc);
    }
    Ok(expr)
}

fn parse_comparison(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_term(cursor)?;
    while cursor.matches(&[
        TokenKind::IsGreaterThan,
        TokenKind::IsGreaterThanOrEqual,
        TokenKind::IsLessThan,
        TokenKind::IsLessThanOrEqual,
    ]) {
        let op = match cursor.previous().kind {
            TokenKind::IsGreaterThan => BinaryOp::Gt,
            TokenKind::IsGreaterThanOrEqual => BinaryOp::Gte,
            TokenKind::IsLessThan => BinaryOp::Lt,
            _ => BinaryOp::Lte,
        };
        let loc = expr.loc;
        let right = parse_term(cursor)?;
        expr = Exp::binary(op, Box::new(expr), Box::new(right), loc);
    }
    Ok(expr)
}

fn parse_term(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_factor(cursor)?;
    while cursor.matches(&[TokenKind::Hyphen, TokenKind::Plus]) {
        let op = if cursor.previous().kind == TokenKind::Hyphen {
            BinaryOp::Sub
        } else {
            BinaryOp::Add
        };
        let loc = expr.loc;
        let right = parse_factor(cursor)?;
        expr = Exp::binary(op, Box::new(expr), Box::new(right), loc);
    }
    Ok(expr)
}

fn parse_factor(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_unary(cursor)?;
    while cursor.matches(&[TokenKind::FSlash, TokenKind::Asterisk, TokenKind::Percent]) {
        let op = match cursor.previous().kind {
            TokenKind::FSlash => BinaryOp::Div,
            TokenKind::Asterisk => BinaryOp::Mul,
            _ => BinaryOp::Mod,
        };
        let loc = expr.loc;
        let right = parse_unary(cursor)?;
        expr = Exp::binary(op, Box::new(expr), Box::new(right), loc);
    }
    Ok(expr)
}

/// ```text
/// !expression  -expression  +expression  ++expression  --expression
/// ```
fn parse_unary(cursor: &mut Cursor) -> Result<Exp> {
    if cursor.matches(&[
        TokenKind::LogicalNot,
        TokenKind::Hyphen,
        TokenKind::Plus,
        TokenKind::Increment,
        TokenKind::Decrement,
    ]) {
        let token = cursor.previous();
        let op = match token.kind {
            TokenKind::LogicalNot => UnaryOp::Not,
            TokenKind::Hyphen => UnaryOp::Negate,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Increment => UnaryOp::Inc,
            _ => UnaryOp::Dec,
        };
        let loc = Location::new(token.line, token.column);
        let operand = parse_unary(cursor).map(Box::new)?;
        return Ok(Exp::unary(op, operand, loc));
    }
    parse_call(cursor)
}

fn parse_call(cursor: &mut Cursor) -> Result<Exp> {
    let mut expr = parse_primary(cursor)?;
    while cursor.matches(&[TokenKind::OpenParanth]) {
        expr = finish_call(cursor, expr)?;
    }
    Ok(expr)
}

fn finish_call(cursor: &mut Cursor, callee: Exp) -> Result<Exp> {
    let loc = callee.loc;
    let ExpKind::Var(name) = callee.kind else {
        return Err(InnerParseError::InvalidCallee.at(loc.line, loc.column));
    };

    let mut args = Vec::new();
    if !cursor.check(TokenKind::CloseParanth) {
        loop {
            args.push(parse_expression(cursor)?);
            if !cursor.matches(&[TokenKind::Comma]) {
                break;
            }
        }
    }

    cursor.consume(TokenKind::CloseParanth, "Expected ')' after arguments")?;
    Ok(Exp::call(name, args, loc))
}

fn parse_primary(cursor: &mut Cursor) -> Result<Exp> {
    if cursor.matches(&[TokenKind::Integer]) {
        let token = cursor.previous();
        let loc = Location::new(token.line, token.column);
        let value: i32 = token
            .lexeme
            .parse()
            .map_err(|_| InnerParseError::BadLiteral(token.lexeme.clone()).at(loc.line, loc.column))?;
        return Ok(Exp::literal(Literal::Int(value), loc));
    }

    if cursor.matches(&[TokenKind::Float]) {
        let token = cursor.previous();
        let loc = Location::new(token.line, token.column);
        let value: f32 = token
            .lexeme
            .parse()
            .map_err(|_| InnerParseError::BadLiteral(token.lexeme.clone()).at(loc.line, loc.column))?;
        return Ok(Exp::literal(Literal::Float(value), loc));
    }

    // characters reuse the string literal variant
    if cursor.matches(&[TokenKind::String, TokenKind::Character]) {
        let token = cursor.previous();
        let loc = Location::new(token.line, token.column);
        let inner = token.lexeme[1..token.lexeme.len() - 1].to_owned();
        return Ok(Exp::literal(Literal::Str(inner), loc));
    }

    if cursor.matches(&[TokenKind::Identifier]) {
        let token = cursor.previous();
        let name = token.lexeme.clone();
        let loc = Location::new(token.line, token.column);

        // primary-level assignment: `a = b = c` nests to the right
        if cursor.matches(&[TokenKind::Assign]) {
            let value = parse_expression(cursor).map(Box::new)?;
            return Ok(Exp::assignment(name, value, loc));
        }

        return Ok(Exp::var(name, loc));
    }

    if cursor.matches(&[TokenKind::OpenParanth]) {
        let expr = parse_expression(cursor)?;
        cursor.consume(TokenKind::CloseParanth, "Expected ')' after expression")?;
        return Ok(expr);
    }

    let current = cursor.peek();
    Err(InnerParseError::UnexpectedToken(current.lexeme.clone()).at(current.line, current.column))
}
