use std::{error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerLexError {
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedChar,
    EmptyChar,
}

/// A lexical error with the position of the offending lexeme start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    inner: InnerLexError,
    line: u64,
    column: u64,
}

impl LexError {
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn column(&self) -> u64 {
        self.column
    }

    pub fn kind(&self) -> &InnerLexError {
        &self.inner
    }
}

impl InnerLexError {
    pub(super) fn at(self, line: u64, column: u64) -> LexError {
        LexError {
            inner: self,
            line,
            column,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Display for InnerLexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "Unexpected character '{c}'"),
            Self::UnterminatedString => write!(f, "Unterminated string literal"),
            Self::UnterminatedChar => write!(f, "Unterminated character literal"),
            Self::EmptyChar => write!(f, "Empty character literal"),
        }
    }
}

impl error::Error for LexError {}
impl error::Error for InnerLexError {}
