//! Scanner error types.

use thiserror::Error;

/// What went wrong while scanning a single token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A character that cannot start any token.
    #[error("Unhandled character: '{0}'")]
    InvalidCharacter(char),

    /// A string literal without its closing quote.
    #[error("Unterminated string literal")]
    UnterminatedString,

    /// A `/*` comment without its closing `*/`.
    #[error("Unterminated block comment")]
    UnterminatedComment,

    /// A token was required but the input ended.
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
}

impl Default for LexErrorKind {
    // Logos reports unmatched input through the default value; the scanner
    // fills in the offending character.
    fn default() -> Self {
        LexErrorKind::InvalidCharacter('\0')
    }
}

/// A scanner error, located by the byte offset where it occurred.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Index {offset}: {kind}")]
pub struct LexError {
    /// Byte offset into the source.
    pub offset: usize,
    /// The failure.
    pub kind: LexErrorKind,
}

impl LexError {
    pub fn new(offset: usize, kind: LexErrorKind) -> Self {
        Self { offset, kind }
    }
}
