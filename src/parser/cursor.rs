use crate::lexer::{Token, TokenKind};
use crate::parser::{InnerParseError, Result};

/// Token cursor. Reads past the end yield the synthetic EOF token, so the
/// parser never has to bounds-check.
#[derive(Debug)]
pub struct Cursor<'a> {
    tokens: &'a [Token],
    position: usize,
    eof: Token,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            eof: Token::new(TokenKind::Eof, "", 0, 0),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    pub fn previous(&self) -> &Token {
        if self.position == 0 {
            return &self.eof;
        }
        self.tokens.get(self.position - 1).unwrap_or(&self.eof)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.position)
            .is_some_and(|t| t.kind == kind)
    }

    pub fn check_nth(&self, kind: TokenKind, offset: usize) -> bool {
        self.tokens
            .get(self.position + offset)
            .is_some_and(|t| t.kind == kind)
    }

    /// Consumes the next token if its kind is one of `kinds`.
    pub fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    pub fn consume(&mut self, kind: TokenKind, message: &'static str) -> Result<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let current = self.peek();
        Err(InnerParseError::ExpectedToken {
            expected: kind,
            found: current.kind,
            message,
        }
        .at(current.line, current.column))
    }
}
