//! Parser error types.
//!
//! Strict parsing stops at the first error. Partial parsing absorbs missing
//! tokens and missing expressions, so the errors it can still produce are
//! the ones no amount of tolerance can paper over (bad characters, stray
//! operators, runaway loops).

use crate::ast::Span;
use crate::lexer::{LexError, TokenKind};
use thiserror::Error;

/// A parse error with location and description.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The scanner rejected the input.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A required token was missing.
    #[error("Unexpected token {found} (expected {expected}) at {offset}")]
    UnexpectedToken {
        /// What we actually found.
        found: TokenKind,
        /// What the grammar requires here.
        expected: TokenKind,
        /// Byte offset of the unexpected token.
        offset: usize,
    },

    /// The input ended where a token was required.
    #[error("Unexpected end of expression")]
    UnexpectedEnd {
        /// Byte offset of the end of input.
        offset: usize,
    },

    /// Input remained after a complete expression or script.
    #[error("Unexpected token: {found}")]
    TrailingToken {
        /// The first token not consumed.
        found: TokenKind,
        /// Its location.
        span: Span,
    },

    /// An expression position held nothing parseable.
    #[error("No expression was parsed")]
    NoExpression {
        /// Where the expression was expected.
        offset: usize,
    },

    /// An operator appeared with no left operand.
    #[error("Unexpected operator {op} at {offset}")]
    MissingOperand {
        /// The operator token.
        op: TokenKind,
        /// Where it appeared.
        offset: usize,
    },

    /// An assignment or call statement did not start with an identifier.
    #[error("Lvalue cannot start with {found}")]
    InvalidLvalue {
        /// Description of the token found.
        found: String,
        /// Where it appeared.
        offset: usize,
    },

    /// A statement was neither a call nor followed by an assignment operator.
    #[error("Unexpected token: {found}; expected assignment operator")]
    MissingAssignOp {
        /// Description of the token found.
        found: String,
        /// Where it appeared.
        offset: usize,
    },

    /// A string literal contained an escape sequence that cannot be decoded.
    #[error("Invalid string literal: {message}")]
    InvalidString {
        /// Location of the literal.
        span: Span,
        /// What the decoder reported.
        message: String,
    },

    /// A parser loop exceeded its iteration ceiling.
    #[error("Hit loop limit")]
    LoopLimit {
        /// Where the parser was when it gave up.
        offset: usize,
    },
}

impl ParseError {
    /// Returns the span of this error.
    ///
    /// Errors located at a single offset report a zero-width span.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => Span::empty(err.offset),
            ParseError::UnexpectedToken { offset, .. }
            | ParseError::UnexpectedEnd { offset }
            | ParseError::NoExpression { offset }
            | ParseError::MissingOperand { offset, .. }
            | ParseError::InvalidLvalue { offset, .. }
            | ParseError::MissingAssignOp { offset, .. }
            | ParseError::LoopLimit { offset } => Span::empty(*offset),
            ParseError::TrailingToken { span, .. } | ParseError::InvalidString { span, .. } => {
                *span
            }
        }
    }

    /// Creates an "unexpected token" error.
    pub fn unexpected(found: TokenKind, expected: TokenKind, offset: usize) -> Self {
        ParseError::UnexpectedToken {
            found,
            expected,
            offset,
        }
    }

    /// Creates an "unexpected end" error.
    pub fn eof(offset: usize) -> Self {
        ParseError::UnexpectedEnd { offset }
    }
}
