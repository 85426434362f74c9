mod cursor;
mod lexer_error;
mod token;

use cursor::Cursor;
pub use lexer_error::{InnerLexError, LexError};
pub use token::{Token, TokenKind};

pub type Tokens = Vec<Token>;
pub type Result<T> = std::result::Result<T, LexError>;

/// One source module handed to the pipeline: the file path as given on the
/// command line and the raw UTF-8 text. The content must outlive the token
/// stream derived from it only in spirit; lexemes are copied out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub file_name: String,
    pub content: String,
}

impl FileContent {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Scans a source module into an ordered token sequence.
///
/// The stream always starts with a synthetic [`TokenKind::Module`] token at
/// 0:0 whose lexeme is the file name, so downstream passes discover the
/// module name uniformly, and always ends with [`TokenKind::Eof`].
pub fn lex(source: &FileContent) -> Result<Tokens> {
    let mut tokens = Tokens::new();
    tokens.push(Token::new(TokenKind::Module, source.file_name.clone(), 0, 0));

    let mut cursor = Cursor::new(&source.content);
    while !cursor.is_at_end() {
        scan_token(&mut cursor, &mut tokens)?;
    }
    tokens.push(Token::new(TokenKind::Eof, "", cursor.line(), cursor.column()));

    Ok(tokens)
}

fn scan_token(cursor: &mut Cursor, tokens: &mut Tokens) -> Result<()> {
    let c = cursor.advance();
    match c {
        // whitespace; the cursor already bumped the line on b'\n'
        b' ' | b'\r' | b'\t' | b'\n' => Ok(()),

        b'(' => add_token(cursor, tokens, TokenKind::OpenParanth, "("),
        b')' => add_token(cursor, tokens, TokenKind::CloseParanth, ")"),
        b'{' => add_token(cursor, tokens, TokenKind::OpenCurly, "{"),
        b'}' => add_token(cursor, tokens, TokenKind::CloseCurly, "}"),
        b'[' => add_token(cursor, tokens, TokenKind::OpenBracket, "["),
        b']' => add_token(cursor, tokens, TokenKind::CloseBracket, "]"),
        b'.' => add_token(cursor, tokens, TokenKind::Dot, "."),
        b',' => add_token(cursor, tokens, TokenKind::Comma, ","),
        b':' => add_token(cursor, tokens, TokenKind::Colon, ":"),
        b';' => add_token(cursor, tokens, TokenKind::Semicolon, ";"),
        b'*' => add_token(cursor, tokens, TokenKind::Asterisk, "*"),
        b'%' => add_token(cursor, tokens, TokenKind::Percent, "%"),
        b'^' => add_token(cursor, tokens, TokenKind::BitwiseXor, "^"),
        b'~' => add_token(cursor, tokens, TokenKind::Tilde, "~"),

        b'+' => {
            if cursor.match_next(b'+') {
                add_token(cursor, tokens, TokenKind::Increment, "++")
            } else {
                add_token(cursor, tokens, TokenKind::Plus, "+")
            }
        }
        b'-' => {
            if cursor.match_next(b'>') {
                add_token(cursor, tokens, TokenKind::Arrow, "->")
            } else if cursor.match_next(b'-') {
                add_token(cursor, tokens, TokenKind::Decrement, "--")
            } else {
                add_token(cursor, tokens, TokenKind::Hyphen, "-")
            }
        }
        b'!' => {
            if cursor.match_next(b'=') {
                add_token(cursor, tokens, TokenKind::IsNotEqual, "!=")
            } else {
                add_token(cursor, tokens, TokenKind::LogicalNot, "!")
            }
        }
        b'=' => {
            if cursor.match_next(b'=') {
                add_token(cursor, tokens, TokenKind::IsEqual, "==")
            } else {
                add_token(cursor, tokens, TokenKind::Assign, "=")
            }
        }
        b'<' => {
            if cursor.match_next(b'=') {
                add_token(cursor, tokens, TokenKind::IsLessThanOrEqual, "<=")
            } else {
                add_token(cursor, tokens, TokenKind::IsLessThan, "<")
            }
        }
        b'>' => {
            if cursor.match_next(b'=') {
                add_token(cursor, tokens, TokenKind::IsGreaterThanOrEqual, ">=")
            } else {
                add_token(cursor, tokens, TokenKind::IsGreaterThan, ">")
            }
        }
        b'&' => {
            if cursor.match_next(b'&') {
                add_token(cursor, tokens, TokenKind::LogicalAnd, "&&")
            } else {
                add_token(cursor, tokens, TokenKind::BitwiseAnd, "&")
            }
        }
        b'|' => {
            if cursor.match_next(b'|') {
                add_token(cursor, tokens, TokenKind::LogicalOr, "||")
            } else {
                add_token(cursor, tokens, TokenKind::BitwiseOr, "|")
            }
        }
        b'/' => {
            if cursor.match_next(b'/') {
                skip_line_comment(cursor);
                Ok(())
            } else if cursor.match_next(b'*') {
                skip_block_comment(cursor);
                Ok(())
            } else {
                add_token(cursor, tokens, TokenKind::FSlash, "/")
            }
        }

        b'"' => scan_string(cursor, tokens),
        b'\'' => scan_character(cursor, tokens),
        b'0'..=b'9' => scan_number(cursor, tokens),
        b'_' | b'a'..=b'z' | b'A'..=b'Z' => scan_identifier(cursor, tokens),

        _ => Err(InnerLexError::UnexpectedCharacter(c as char).at(cursor.line(), cursor.column())),
    }
}

/// The stored column points at the start of the lexeme.
fn add_token(cursor: &Cursor, tokens: &mut Tokens, kind: TokenKind, lexeme: &str) -> Result<()> {
    let column = cursor.column().saturating_sub(lexeme.len() as u64);
    tokens.push(Token::new(kind, lexeme, cursor.line(), column));
    Ok(())
}

fn skip_line_comment(cursor: &mut Cursor) {
    while cursor.peek() != b'\n' && !cursor.is_at_end() {
        cursor.advance();
    }
}

/// Block comments do not nest; scanning stops at the first `*/`. An
/// unterminated block comment silently swallows the rest of the file.
fn skip_block_comment(cursor: &mut Cursor) {
    while !cursor.is_at_end() {
        if cursor.peek() == b'*' && cursor.peek_next() == b'/' {
            cursor.advance();
            cursor.advance();
            break;
        }
        cursor.advance();
    }
}

/// One or more digits, optionally followed by `.` and further digits iff the
/// byte after the dot is a digit; otherwise the dot is left for `DOT`, so
/// `x.` lexes as two tokens.
fn scan_number(cursor: &mut Cursor, tokens: &mut Tokens) -> Result<()> {
    let start = cursor.position() - 1;
    let mut is_float = false;

    while cursor.peek().is_ascii_digit() {
        cursor.advance();
    }

    if cursor.peek() == b'.' && cursor.peek_next().is_ascii_digit() {
        is_float = true;
        cursor.advance();
        while cursor.peek().is_ascii_digit() {
            cursor.advance();
        }
    }

    let kind = if is_float {
        TokenKind::Float
    } else {
        TokenKind::Integer
    };
    let lexeme = cursor.slice_from(start);
    add_token(cursor, tokens, kind, lexeme)
}

fn scan_identifier(cursor: &mut Cursor, tokens: &mut Tokens) -> Result<()> {
    let start = cursor.position() - 1;

    while cursor.peek().is_ascii_alphanumeric() || cursor.peek() == b'_' {
        cursor.advance();
    }

    let lexeme = cursor.slice_from(start);
    let kind = TokenKind::from_keyword(lexeme).unwrap_or(TokenKind::Identifier);
    add_token(cursor, tokens, kind, lexeme)
}

/// Strings keep their surrounding quotes in the lexeme. A backslash consumes
/// the next byte verbatim; embedded newlines are permitted and advance the
/// line counter.
fn scan_string(cursor: &mut Cursor, tokens: &mut Tokens) -> Result<()> {
    let start = cursor.position() - 1;
    let start_line = cursor.line();
    let start_column = cursor.column() - 1;

    while cursor.peek() != b'"' && !cursor.is_at_end() {
        if cursor.peek() == b'\\' {
            cursor.advance();
            if !cursor.is_at_end() {
                cursor.advance();
            }
        } else {
            cursor.advance();
        }
    }

    if cursor.is_at_end() {
        return Err(InnerLexError::UnterminatedString.at(start_line, start_column));
    }

    cursor.advance();

    let lexeme = cursor.slice_from(start);
    add_token(cursor, tokens, TokenKind::String, lexeme)
}

fn scan_character(cursor: &mut Cursor, tokens: &mut Tokens) -> Result<()> {
    let start = cursor.position() - 1;
    let start_line = cursor.line();
    let start_column = cursor.column() - 1;

    if cursor.peek() == b'\'' {
        cursor.advance();
        return Err(InnerLexError::EmptyChar.at(start_line, start_column));
    }

    if cursor.peek() == b'\\' {
        cursor.advance();
        if !cursor.is_at_end() {
            cursor.advance();
        }
    } else {
        cursor.advance();
    }

    if cursor.peek() != b'\'' || cursor.is_at_end() {
        return Err(InnerLexError::UnterminatedChar.at(start_line, start_column));
    }

    cursor.advance();

    let lexeme = cursor.slice_from(start);
    add_token(cursor, tokens, TokenKind::Character, lexeme)
}
