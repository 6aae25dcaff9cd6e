//! Token navigation utilities for the parser.
//!
//! This module provides the low-level token stream operations that the
//! recursive descent parser is built on:
//! - Peeking at the current token
//! - Accepting an optional token
//! - Expecting a required token (tolerated in partial mode)
//! - Tracking the cursor position `p` used for spans and placeholders

use crate::ast::Span;
use crate::lexer::{Token, TokenKind};

use super::{LOOP_LIMIT, ParseError, Parser};

impl<'source> Parser<'source> {
    // ==================== Token Navigation ====================

    /// Returns the current token without consuming it.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Returns the kind of the current token.
    pub(super) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// Returns true if every token has been consumed.
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// Checks if the current token matches the expected kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// The parser position: the start of the current token, or the end of
    /// the last token once the input is exhausted.
    pub(super) fn p(&self) -> usize {
        match self.peek() {
            Some(token) => token.span.start,
            None => self.tokens.last().map(|t| t.span.end).unwrap_or(0),
        }
    }

    /// Text of the most recently accepted token; empty after a tolerated
    /// `expect`.
    pub(super) fn accepted_text(&self) -> &'source str {
        &self.source[self.accepted.start..self.accepted.end]
    }

    /// Consumes the current token if it matches.
    pub(super) fn accept(&mut self, kind: TokenKind) -> bool {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.accepted = token.span.clone().into();
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    /// Consumes a required token.
    ///
    /// In partial mode a missing token is treated as present: the accepted
    /// span becomes zero-width at the current position and `Ok(false)` is
    /// returned. In strict mode it is an error.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.accept(kind) {
            return Ok(true);
        }
        if self.allow_partial {
            self.accepted = Span::empty(self.p());
            return Ok(false);
        }
        match self.peek() {
            Some(token) => Err(ParseError::unexpected(token.kind, kind, token.span.start)),
            None => Err(ParseError::eof(self.p())),
        }
    }

    /// Creates a span from `start` to the end of the last accepted token.
    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.accepted.end.max(start))
    }

    /// Describes the current token for error messages.
    pub(super) fn describe_current(&self) -> String {
        self.peek_kind()
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "end of script".to_string())
    }

    /// Counts one loop iteration, failing past the ceiling.
    pub(super) fn tick(&self, iterations: &mut usize) -> Result<(), ParseError> {
        *iterations += 1;
        if *iterations > LOOP_LIMIT {
            return Err(ParseError::LoopLimit { offset: self.p() });
        }
        Ok(())
    }

    /// Splits a `-N` number token into `-` and `N`.
    ///
    /// Called where an operator may follow an operand, so that `a -1`
    /// parses as a subtraction.
    pub(super) fn split_negative_number(&mut self) {
        let Some(token) = self.tokens.get(self.current) else {
            return;
        };
        if token.kind != TokenKind::Number || !token.text.starts_with('-') {
            return;
        }
        let start = token.span.start;
        let end = token.span.end;
        let digits = token.text[1..].to_string();
        self.tokens[self.current] = Token::new(TokenKind::Sub, start..start + 1, "-");
        self.tokens
            .insert(self.current + 1, Token::new(TokenKind::Number, start + 1..end, digits));
    }
}
