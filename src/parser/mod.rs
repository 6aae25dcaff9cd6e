//! Parser for hydrui scripts.
//!
//! The parser transforms source text into an Abstract Syntax Tree (AST).
//! It uses recursive descent for statements and depth-based precedence
//! climbing for expressions.
//!
//! # Example
//!
//! ```
//! use hydrui_script::parser::Parser;
//!
//! let expr = Parser::new("file.size > 1000", false)
//!     .and_then(|mut p| p.parse_expression())
//!     .expect("parse failed");
//! assert_eq!(expr.source(), "file.size > 1000");
//! ```
//!
//! # Module Structure
//!
//! - [`tokens`] - Token navigation (peek, accept, expect)
//! - [`expressions`] - Precedence climbing for expressions
//! - [`statements`] - Statement dispatcher, `let` and assignments
//! - [`control_flow`] - `if`, `for` and `while`
//! - [`error`] - Parse error types
//!
//! # Partial Mode
//!
//! With `allow_partial` set, a missing required token is treated as present
//! (recorded as a zero-width span) and an empty expression position becomes
//! [`ExprKind::Placeholder`](crate::ast::ExprKind::Placeholder). This exists
//! for completion while the user is still typing; a partially parsed tree
//! must never be executed as if it were complete.

mod control_flow;
mod error;
mod expressions;
mod statements;
mod tokens;

pub use error::ParseError;

use crate::ast::{Expr, Span, Statement, StatementKind};
use crate::lexer::{LexError, LexErrorKind, Token, scan_all};

/// Iteration ceiling for every parser loop.
pub const LOOP_LIMIT: usize = 5000;

/// Parser for script source code.
pub struct Parser<'source> {
    /// The source text, for slicing accepted tokens.
    source: &'source str,
    /// The tokens to parse.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    current: usize,
    /// Tolerate missing tokens and expressions.
    allow_partial: bool,
    /// Span of the most recently accepted token.
    accepted: Span,
}

impl<'source> Parser<'source> {
    /// Creates a parser over `source`.
    ///
    /// The whole input is scanned up front, so scanner errors surface here.
    /// In strict mode an empty input is rejected immediately.
    pub fn new(source: &'source str, allow_partial: bool) -> Result<Self, ParseError> {
        let tokens = scan_all(source)?;
        if tokens.is_empty() && !allow_partial {
            return Err(LexError::new(source.len(), LexErrorKind::UnexpectedEnd).into());
        }
        log::trace!(
            "scanned {} tokens (partial: {})",
            tokens.len(),
            allow_partial
        );
        Ok(Self {
            source,
            tokens,
            current: 0,
            allow_partial,
            accepted: Span::default(),
        })
    }

    /// Parses the whole input as a single expression.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr(0)?;
        self.finish()?;
        log::debug!("parsed expression: {expr}");
        Ok(expr)
    }

    /// Parses the whole input as a script, returned as one block statement.
    pub fn parse_script(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();
        let statements = self.parse_statements()?;
        self.finish()?;
        let end = self.p();
        log::debug!("parsed script with {} statements", statements.len());
        Ok(Statement::new(
            StatementKind::Block(statements),
            Span::new(start, end),
        ))
    }

    /// Fails if any input remains.
    fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) => Err(ParseError::TrailingToken {
                found: token.kind,
                span: token.span.clone().into(),
            }),
            None => Ok(()),
        }
    }
}
