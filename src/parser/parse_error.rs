use crate::lexer::TokenKind;
use std::{error, fmt};

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerParseError {
    /// A specific token kind was required; `message` names the production.
    ExpectedToken {
        expected: TokenKind,
        found: TokenKind,
        message: &'static str,
    },
    /// No primary expression starts with this token.
    UnexpectedToken(String),
    /// Only an identifier may be called.
    InvalidCallee,
    /// A type annotation named something outside the builtin table.
    UnknownType(String),
    /// A numeric literal that does not fit its 32-bit representation.
    BadLiteral(String),
}

/// A syntactic error with the position of the token that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    inner: InnerParseError,
    line: u64,
    column: u64,
}

impl ParseError {
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn column(&self) -> u64 {
        self.column
    }

    pub fn kind(&self) -> &InnerParseError {
        &self.inner
    }
}

impl InnerParseError {
    pub(super) fn at(self, line: u64, column: u64) -> ParseError {
        ParseError {
            inner: self,
            line,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Display for InnerParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ExpectedToken {
                message, found, ..
            } => write!(f, "{message}, but got {found:?}"),
            Self::UnexpectedToken(lexeme) => write!(f, "Unexpected token: {lexeme}"),
            Self::InvalidCallee => write!(f, "Invalid function call"),
            Self::UnknownType(name) => write!(f, "Unknown type name: {name}"),
            Self::BadLiteral(lexeme) => write!(f, "Malformed numeric literal: {lexeme}"),
        }
    }
}

impl error::Error for ParseError {}
impl error::Error for InnerParseError {}
