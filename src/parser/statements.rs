//! Statement parsing for the parser.
//!
//! This module contains the statement dispatcher, blocks, the jump
//! statements and the simple statements (`let`, assignments and calls).
//!
//! `if`, `for` and `while` are handled in [`super::control_flow`].

use std::rc::Rc;

use crate::ast::{AssignOp, BinaryOp, Expr, ExprKind, Span, Statement, StatementKind};
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

/// Assignment tokens and the operators they stand for.
const ASSIGN_OPS: &[(TokenKind, AssignOp)] = &[
    (TokenKind::Assign, AssignOp::Assign),
    (TokenKind::AddAssign, AssignOp::Add),
    (TokenKind::SubAssign, AssignOp::Sub),
    (TokenKind::MulAssign, AssignOp::Mul),
    (TokenKind::QuoAssign, AssignOp::Quo),
    (TokenKind::RemAssign, AssignOp::Rem),
    (TokenKind::AndAssign, AssignOp::And),
    (TokenKind::OrAssign, AssignOp::Or),
    (TokenKind::XorAssign, AssignOp::Xor),
    (TokenKind::ShlAssign, AssignOp::Shl),
    (TokenKind::ShrAssign, AssignOp::Shr),
    (TokenKind::AndNotAssign, AssignOp::AndNot),
];

impl<'source> Parser<'source> {
    // ==================== Statement Dispatcher ====================

    /// Parses statements until the input ends or a `}` is reached.
    pub(super) fn parse_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        let mut iterations = 0;
        while !self.is_at_end() && !self.check(TokenKind::RightBrace) {
            self.tick(&mut iterations)?;
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Parses a single statement.
    pub(super) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();

        match self.peek_kind() {
            Some(TokenKind::LeftBrace) => self.parse_block(),

            // Jumps
            Some(TokenKind::Return) => self.parse_return(start),
            Some(TokenKind::Break) => {
                self.accept(TokenKind::Break);
                self.expect(TokenKind::Semicolon)?;
                Ok(Statement::new(StatementKind::Break, self.span_from(start)))
            }
            Some(TokenKind::Continue) => {
                self.accept(TokenKind::Continue);
                self.expect(TokenKind::Semicolon)?;
                Ok(Statement::new(StatementKind::Continue, self.span_from(start)))
            }

            // Control flow (delegated to control_flow.rs)
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::For) => self.parse_for(),
            Some(TokenKind::While) => self.parse_while(),

            Some(TokenKind::Semicolon) => {
                self.accept(TokenKind::Semicolon);
                Ok(Statement::new(StatementKind::Empty, Span::empty(start)))
            }

            _ => {
                let statement = self.parse_decl_or_assignment_or_call()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(statement)
            }
        }
    }

    /// Parses `{ statements }`.
    pub(super) fn parse_block(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();
        self.expect(TokenKind::LeftBrace)?;
        let statements = self.parse_statements()?;
        self.expect(TokenKind::RightBrace)?;
        Ok(Statement::new(
            StatementKind::Block(statements),
            self.span_from(start),
        ))
    }

    /// Parses `return;` or `return value;`.
    fn parse_return(&mut self, start: usize) -> Result<Statement, ParseError> {
        self.accept(TokenKind::Return);
        if self.accept(TokenKind::Semicolon) {
            return Ok(Statement::new(
                StatementKind::Return(None),
                self.span_from(start),
            ));
        }
        let value = self.parse_expr(0)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Statement::new(
            StatementKind::Return(Some(value)),
            self.span_from(start),
        ))
    }

    // ==================== Simple Statements ====================

    /// Parses a `let` binding, an assignment or a call, without the
    /// trailing semicolon.
    pub(super) fn parse_decl_or_assignment_or_call(&mut self) -> Result<Statement, ParseError> {
        let start = self.p();
        if !self.accept(TokenKind::Let) {
            return self.parse_assignment_or_call();
        }

        self.expect(TokenKind::Identifier)?;
        let name = self.accepted_text().to_string();
        if self.is_at_end() || self.check(TokenKind::Semicolon) {
            return Ok(Statement::new(
                StatementKind::Let {
                    name,
                    initializer: None,
                },
                self.span_from(start),
            ));
        }
        self.expect(TokenKind::Assign)?;
        let initializer = self.parse_expr(0)?;
        let span = self.span_from(start).merge(&initializer.span);
        Ok(Statement::new(
            StatementKind::Let {
                name,
                initializer: Some(initializer),
            },
            span,
        ))
    }

    /// Parses an assignment or a call, without the trailing semicolon.
    pub(super) fn parse_assignment_or_call(&mut self) -> Result<Statement, ParseError> {
        let (target, is_call) = self.parse_statement_left()?;
        if is_call {
            return Ok(Statement::expression(target));
        }

        let Some(op) = ASSIGN_OPS
            .iter()
            .find(|(token, _)| self.accept(*token))
            .map(|&(_, op)| op)
        else {
            if self.allow_partial {
                return Ok(Statement::expression(target));
            }
            return Err(ParseError::MissingAssignOp {
                found: self.describe_current(),
                offset: self.p(),
            });
        };

        let value = self.parse_expr(0)?;
        let span = target.span.merge(&value.span);
        Ok(Statement::new(
            StatementKind::Assign { target, op, value },
            span,
        ))
    }

    /// Parses the left side of an assignment or call statement.
    ///
    /// It must start with a name, followed by any chain of member access,
    /// calls and subscripts. Returns the expression and whether its
    /// outermost operation is a call.
    fn parse_statement_left(&mut self) -> Result<(Expr, bool), ParseError> {
        if !self.accept(TokenKind::Identifier) {
            return Err(ParseError::InvalidLvalue {
                found: self.describe_current(),
                offset: self.p(),
            });
        }
        let mut node = Expr::new(
            ExprKind::Ident(self.accepted_text().to_string()),
            self.accepted,
        );
        let mut is_call = false;

        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            if self.accept(TokenKind::Period) {
                let member = self.parse_expr(8)?;
                node = Expr::binary(node, BinaryOp::Member, member);
                is_call = false;
            } else if self.accept(TokenKind::LeftParen) {
                let args = if self.accept(TokenKind::RightParen) {
                    Expr::new(ExprKind::Null, Span::empty(self.p()))
                } else {
                    let args = self.parse_expr(1)?;
                    self.expect(TokenKind::RightParen)?;
                    args
                };
                node = Expr::binary(node, BinaryOp::Call, args);
                is_call = true;
            } else if self.accept(TokenKind::LeftBracket) {
                let index = self.parse_expr(1)?;
                self.expect(TokenKind::RightBracket)?;
                node = Expr::binary(node, BinaryOp::Subscript, index);
                is_call = false;
            } else {
                break;
            }
        }

        Ok((node, is_call))
    }

    // ==================== Function Literals ====================

    /// Parses the rest of `function(params) { body }` after the keyword.
    pub(super) fn parse_function_tail(&mut self, start: usize) -> Result<Expr, ParseError> {
        let mut params = Vec::new();
        if self.expect(TokenKind::LeftParen)? && !self.accept(TokenKind::RightParen) {
            let mut iterations = 0;
            loop {
                self.tick(&mut iterations)?;
                if self.allow_partial && self.is_at_end() {
                    break;
                }
                if !self.expect(TokenKind::Identifier)? {
                    break;
                }
                params.push(self.accepted_text().to_string());
                if self.accept(TokenKind::RightParen) {
                    break;
                }
                if !self.expect(TokenKind::Comma)? {
                    break;
                }
            }
        }
        let body = self.parse_block()?;
        Ok(Expr::new(
            ExprKind::Function {
                params,
                body: Rc::new(body),
            },
            self.span_from(start),
        ))
    }

    /// Parses the rest of `lambda params: body` after the keyword.
    pub(super) fn parse_lambda_tail(&mut self, start: usize) -> Result<Expr, ParseError> {
        let mut params = Vec::new();
        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            if !self.expect(TokenKind::Identifier)? {
                break;
            }
            params.push(self.accepted_text().to_string());
            if self.accept(TokenKind::Colon) {
                break;
            }
            if !self.expect(TokenKind::Comma)? {
                break;
            }
        }
        let body = self.parse_expr(0)?;
        let span = self.span_from(start).merge(&body.span);
        Ok(Expr::new(
            ExprKind::Lambda {
                params,
                body: Rc::new(body),
            },
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(source: &str) -> Result<Vec<Statement>, ParseError> {
        let block = Parser::new(source, false)?.parse_script()?;
        match block.kind {
            StatementKind::Block(statements) => Ok(statements),
            other => panic!("expected block, got {other:?}"),
        }
    }

    fn partial(source: &str) -> Result<Vec<Statement>, ParseError> {
        let block = Parser::new(source, true)?.parse_script()?;
        match block.kind {
            StatementKind::Block(statements) => Ok(statements),
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_let_with_and_without_initializer() {
        let statements = script("let a; let b = 2;").unwrap();
        assert_eq!(
            statements[0].kind,
            StatementKind::Let {
                name: "a".into(),
                initializer: None
            }
        );
        let StatementKind::Let {
            initializer: Some(init),
            ..
        } = &statements[1].kind
        else {
            panic!("expected let with initializer");
        };
        assert_eq!(init.kind, ExprKind::Number(2.0));
    }

    #[test]
    fn test_let_span_starts_at_keyword() {
        let statements = script("  let x = 10;").unwrap();
        assert_eq!(statements[0].span, Span::new(2, 12));
    }

    #[test]
    fn test_compound_assignment() {
        let statements = script("total.count[0] &^= 3;").unwrap();
        let StatementKind::Assign { target, op, .. } = &statements[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::AndNot);
        assert_eq!(target.source(), "total.count[0]");
    }

    #[test]
    fn test_call_statement() {
        let statements = script("log(1, 2);").unwrap();
        assert!(matches!(statements[0].kind, StatementKind::Expression(_)));
    }

    #[test]
    fn test_member_after_call_is_assignable() {
        let statements = script("f().x = 1;").unwrap();
        assert!(matches!(statements[0].kind, StatementKind::Assign { .. }));
    }

    #[test]
    fn test_lvalue_must_start_with_identifier() {
        let err = script("1 = 2;").unwrap_err();
        assert_eq!(err.to_string(), "Lvalue cannot start with Number");
    }

    #[test]
    fn test_missing_assignment_operator() {
        let err = script("x;").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token: ;; expected assignment operator"
        );
        // Partial mode keeps the bare target for completion.
        let statements = partial("fil").unwrap();
        assert!(matches!(statements[0].kind, StatementKind::Expression(_)));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = script("let x = 1").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_return_forms() {
        let statements = script("return; return 1 + 2;").unwrap();
        assert_eq!(statements[0].kind, StatementKind::Return(None));
        assert!(matches!(statements[1].kind, StatementKind::Return(Some(_))));
    }

    #[test]
    fn test_empty_statements() {
        let statements = script(";;").unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements.iter().all(|s| s.kind == StatementKind::Empty));
    }

    #[test]
    fn test_nested_block() {
        let statements = script("{ let a = 1; { a = 2; } }").unwrap();
        let StatementKind::Block(inner) = &statements[0].kind else {
            panic!("expected block");
        };
        assert_eq!(inner.len(), 2);
        assert!(matches!(inner[1].kind, StatementKind::Block(_)));
    }

    #[test]
    fn test_unclosed_block() {
        let err = script("{ let a = 1;").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
        assert!(partial("{ let a = 1;").is_ok());
    }

    #[test]
    fn test_function_params() {
        let statements = script("let f = function(a, b) { return a; };").unwrap();
        let StatementKind::Let {
            initializer: Some(init),
            ..
        } = &statements[0].kind
        else {
            panic!("expected let");
        };
        let ExprKind::Function { params, body } = &init.kind else {
            panic!("expected function");
        };
        assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(body.kind, StatementKind::Block(_)));
    }

    #[test]
    fn test_partial_function_missing_param_does_not_spin() {
        let statements = partial("let f = function(a, ").unwrap();
        let StatementKind::Let {
            initializer: Some(init),
            ..
        } = &statements[0].kind
        else {
            panic!("expected let");
        };
        let ExprKind::Function { params, .. } = &init.kind else {
            panic!("expected function");
        };
        assert_eq!(params, &vec!["a".to_string()]);
    }
}
