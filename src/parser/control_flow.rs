//! Control flow statement parsing.
//!
//! This module handles parsing of control flow constructs:
//! - `if (cond) stmt` with an optional `else stmt`
//! - `for (init; cond; iter) stmt`, where every header part is optional
//! - `while (cond) stmt`

use crate::ast::{Statement, StatementKind};
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

impl<'source> Parser<'source> {
    // ==================== IF Statement ====================

    /// Parses an `if` statement.
    pub(super) fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();
        self.accept(TokenKind::If);

        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;
        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.accept(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
            self.span_from(start),
        ))
    }

    // ==================== Loops ====================

    /// Parses a `for` statement.
    ///
    /// The initializer may be a `let`; the iterator may only be an
    /// assignment or a call.
    pub(super) fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();
        self.accept(TokenKind::For);
        self.expect(TokenKind::LeftParen)?;

        let initializer = if self.accept(TokenKind::Semicolon) {
            None
        } else {
            let init = self.parse_decl_or_assignment_or_call()?;
            self.expect(TokenKind::Semicolon)?;
            Some(Box::new(init))
        };

        let condition = if self.accept(TokenKind::Semicolon) {
            None
        } else {
            let condition = self.parse_expr(0)?;
            self.expect(TokenKind::Semicolon)?;
            Some(condition)
        };

        let iterator = if self.accept(TokenKind::RightParen) {
            None
        } else {
            let iter = self.parse_assignment_or_call()?;
            self.expect(TokenKind::RightParen)?;
            Some(Box::new(iter))
        };

        let body = Box::new(self.parse_statement()?);
        Ok(Statement::new(
            StatementKind::For {
                initializer,
                condition,
                iterator,
                body,
            },
            self.span_from(start),
        ))
    }

    /// Parses a `while` statement.
    pub(super) fn parse_while(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();
        self.accept(TokenKind::While);

        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::new(
            StatementKind::While { condition, body },
            self.span_from(start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinaryOp, ExprKind, Statement, StatementKind};
    use crate::parser::{ParseError, Parser};

    fn first(source: &str) -> Result<Statement, ParseError> {
        let block = Parser::new(source, false)?.parse_script()?;
        match block.kind {
            StatementKind::Block(mut statements) => Ok(statements.remove(0)),
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let stmt = first("if (a) b = 1; else if (c) b = 2; else b = 3;").unwrap();
        let StatementKind::If {
            else_branch: Some(else_branch),
            ..
        } = &stmt.kind
        else {
            panic!("expected if/else");
        };
        assert!(matches!(
            else_branch.kind,
            StatementKind::If {
                else_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_if_requires_parentheses() {
        let err = first("if a { }").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_for_full_header() {
        let stmt = first("for (let i = 0; i < 3; i += 1) { }").unwrap();
        let StatementKind::For {
            initializer: Some(init),
            condition: Some(condition),
            iterator: Some(_),
            ..
        } = &stmt.kind
        else {
            panic!("expected full for header");
        };
        assert!(matches!(init.kind, StatementKind::Let { .. }));
        assert!(matches!(
            condition.kind,
            ExprKind::Binary {
                op: BinaryOp::Lesser,
                ..
            }
        ));
    }

    #[test]
    fn test_for_empty_header() {
        let stmt = first("for (;;) break;").unwrap();
        let StatementKind::For {
            initializer: None,
            condition: None,
            iterator: None,
            body,
        } = &stmt.kind
        else {
            panic!("expected empty for header");
        };
        assert_eq!(body.kind, StatementKind::Break);
    }

    #[test]
    fn test_for_iterator_cannot_declare() {
        assert!(first("for (;; let i = 1) {}").is_err());
    }

    #[test]
    fn test_while_span_covers_body() {
        let stmt = first("while (x) { x -= 1; }").unwrap();
        assert_eq!(stmt.span.start, 0);
        assert_eq!(stmt.span.end, 21);
    }
}
