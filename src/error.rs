//! Error types for the lexer and the reference driver.
//!
//! Syntax errors inside the driver never escape a parse: they become problem
//! nodes. Only lexical errors abort.

use text_size::TextSize;
use thiserror::Error;

/// A character sequence the lexer cannot turn into a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character {ch:?} at line {line}, column {column}")]
    UnexpectedChar { ch: char, line: usize, column: usize },

    #[error("unterminated {what} starting at line {line}, column {column}")]
    Unterminated {
        what: &'static str,
        line: usize,
        column: usize,
    },
}

/// Recognition failure inside the driver; caught at the nearest block item
/// or external declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found} at offset {}", u32::from(*offset))]
pub struct SyntaxError {
    pub expected: String,
    pub found: String,
    pub offset: TextSize,
}
