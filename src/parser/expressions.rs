//! Expression parsing by depth-based precedence climbing.
//!
//! `parse_expr(depth)` parses one operand and then keeps absorbing
//! operators whose depth is greater than `depth`. Every right operand is
//! parsed at its operator's own depth, which makes all binary operators
//! left-associative.
//!
//! # Depths (loosest to tightest)
//!
//! 2. `,`
//! 3. `||`, `? :`
//! 4. `&&`
//! 5. `==`, `!=`, `<`, `<=`, `>`, `>=`
//! 6. `+`, `-`, `|`, `^`
//! 7. `*`, `/`, `%`, `<<`, `>>`, `&`, `&^` and the unary prefixes
//! 8. `.`, `()`, `[]`

use crate::ast::{BinaryOp, Expr, ExprKind, Span, TypeKeyword, UnaryOp};
use crate::lexer::TokenKind;
use crate::value::number::parse_number;

use super::{ParseError, Parser};

/// Binary operators recognised below depth 8, tightest group first.
const BINARY_LEVELS: &[(u8, &[(TokenKind, BinaryOp)])] = &[
    (
        7,
        &[
            (TokenKind::Mul, BinaryOp::Mul),
            (TokenKind::Quo, BinaryOp::Div),
            (TokenKind::Rem, BinaryOp::Rem),
            (TokenKind::Shl, BinaryOp::Lsh),
            (TokenKind::Shr, BinaryOp::Rsh),
            (TokenKind::And, BinaryOp::And),
            (TokenKind::AndNot, BinaryOp::AndNot),
        ],
    ),
    (
        6,
        &[
            (TokenKind::Add, BinaryOp::Add),
            (TokenKind::Sub, BinaryOp::Sub),
            (TokenKind::Or, BinaryOp::Or),
            (TokenKind::Xor, BinaryOp::Xor),
        ],
    ),
    (
        5,
        &[
            (TokenKind::Equal, BinaryOp::Equal),
            (TokenKind::NotEqual, BinaryOp::NotEqual),
            (TokenKind::Lesser, BinaryOp::Lesser),
            (TokenKind::LesserEqual, BinaryOp::LesserEqual),
            (TokenKind::Greater, BinaryOp::Greater),
            (TokenKind::GreaterEqual, BinaryOp::GreaterEqual),
        ],
    ),
    (4, &[(TokenKind::LogicalAnd, BinaryOp::LogicalAnd)]),
    (3, &[(TokenKind::LogicalOr, BinaryOp::LogicalOr)]),
];

const UNARY_PREFIXES: &[(TokenKind, UnaryOp)] = &[
    (TokenKind::Add, UnaryOp::Plus),
    (TokenKind::Sub, UnaryOp::Negate),
    (TokenKind::Not, UnaryOp::Not),
    (TokenKind::Xor, UnaryOp::BitNot),
];

/// What one turn of the operator loop did.
enum Step {
    /// An operator was absorbed; keep going.
    Continue(Expr),
    /// Nothing at this depth applies.
    Done(Option<Expr>),
}

impl<'source> Parser<'source> {
    // ==================== Expression Parsing ====================

    /// Parses an expression, absorbing operators deeper than `depth`.
    pub(super) fn parse_expr(&mut self, depth: u8) -> Result<Expr, ParseError> {
        let start = self.p();

        if self.accept(TokenKind::Function) {
            return self.parse_function_tail(start);
        }
        if self.accept(TokenKind::Lambda) {
            return self.parse_lambda_tail(start);
        }
        let mut node = self.parse_primary()?;

        let mut iterations = 0;
        loop {
            self.tick(&mut iterations)?;
            if node.is_some() {
                self.split_negative_number();
            }
            match self.parse_operator(node, depth, start)? {
                Step::Continue(expr) => node = Some(expr),
                Step::Done(done) => {
                    node = done;
                    break;
                }
            }
        }

        match node {
            Some(expr) => Ok(expr),
            None if self.allow_partial => {
                Ok(Expr::new(ExprKind::Placeholder, Span::empty(self.p())))
            }
            None => Err(ParseError::NoExpression { offset: self.p() }),
        }
    }

    /// Parses a literal, name, type keyword or parenthesised expression.
    ///
    /// Returns `Ok(None)` if the current token starts none of these.
    fn parse_primary(&mut self) -> Result<Option<Expr>, ParseError> {
        let Some(kind) = self.peek_kind() else {
            return Ok(None);
        };
        let kind = match kind {
            TokenKind::Identifier => {
                self.accept(kind);
                ExprKind::Ident(self.accepted_text().to_string())
            }
            TokenKind::BooleanKeyword => {
                self.accept(kind);
                ExprKind::Keyword(TypeKeyword::Boolean)
            }
            TokenKind::NumberKeyword => {
                self.accept(kind);
                ExprKind::Keyword(TypeKeyword::Number)
            }
            TokenKind::StringKeyword => {
                self.accept(kind);
                ExprKind::Keyword(TypeKeyword::String)
            }
            TokenKind::Number => {
                self.accept(kind);
                ExprKind::Number(parse_number(self.accepted_text()))
            }
            TokenKind::Boolean => {
                self.accept(kind);
                ExprKind::Boolean(self.accepted_text() == "true")
            }
            TokenKind::String => {
                self.accept(kind);
                let text = self.accepted_text();
                let value = serde_json::from_str::<String>(text).map_err(|err| {
                    ParseError::InvalidString {
                        span: self.accepted,
                        message: err.to_string(),
                    }
                })?;
                ExprKind::String(value)
            }
            TokenKind::Null => {
                self.accept(kind);
                ExprKind::Null
            }
            TokenKind::LeftParen => {
                self.accept(kind);
                let inner = self.parse_expr(1)?;
                self.expect(TokenKind::RightParen)?;
                return Ok(Some(inner));
            }
            _ => return Ok(None),
        };
        Ok(Some(Expr::new(kind, self.accepted)))
    }

    /// Tries to absorb one operator applicable at `depth`.
    fn parse_operator(
        &mut self,
        node: Option<Expr>,
        depth: u8,
        start: usize,
    ) -> Result<Step, ParseError> {
        if depth >= 8 {
            return Ok(Step::Done(node));
        }

        // Depth 8: member, call, subscript.
        let node = match node {
            Some(left) => {
                if self.accept(TokenKind::Period) {
                    let right = self.parse_expr(8)?;
                    return Ok(Step::Continue(Expr::binary(left, BinaryOp::Member, right)));
                }
                if self.accept(TokenKind::LeftParen) {
                    return self.parse_call_tail(left).map(Step::Continue);
                }
                if self.accept(TokenKind::LeftBracket) {
                    let index = self.parse_expr(1)?;
                    self.expect(TokenKind::RightBracket)?;
                    return Ok(Step::Continue(Expr::binary(left, BinaryOp::Subscript, index)));
                }
                Some(left)
            }
            None => {
                for &(token, op) in UNARY_PREFIXES {
                    if self.accept(token) {
                        let operand = self.parse_expr(7)?;
                        let span = self.span_from(start).merge(&operand.span);
                        return Ok(Step::Continue(Expr::new(
                            ExprKind::Unary {
                                op,
                                operand: Box::new(operand),
                            },
                            span,
                        )));
                    }
                }
                None
            }
        };

        // Depths 7 through 3.
        for &(level, operators) in BINARY_LEVELS {
            if depth >= level {
                return Ok(Step::Done(node));
            }
            for &(token, op) in operators {
                if self.check(token) {
                    let offset = self.p();
                    self.accept(token);
                    let left = node.ok_or(ParseError::MissingOperand { op: token, offset })?;
                    let right = self.parse_expr(level)?;
                    return Ok(Step::Continue(Expr::binary(left, op, right)));
                }
            }
            if level == 3 && self.check(TokenKind::Ternary) {
                let offset = self.p();
                self.accept(TokenKind::Ternary);
                let condition = node.ok_or(ParseError::MissingOperand {
                    op: TokenKind::Ternary,
                    offset,
                })?;
                return self.parse_ternary_tail(condition).map(Step::Continue);
            }
        }

        // Depth 2: group.
        if depth >= 2 {
            return Ok(Step::Done(node));
        }
        if self.check(TokenKind::Comma) {
            let offset = self.p();
            self.accept(TokenKind::Comma);
            let left = node.ok_or(ParseError::MissingOperand {
                op: TokenKind::Comma,
                offset,
            })?;
            let right = self.parse_expr(2)?;
            return Ok(Step::Continue(Expr::binary(left, BinaryOp::Group, right)));
        }

        Ok(Step::Done(node))
    }

    /// Parses call arguments after `(`.
    fn parse_call_tail(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        if self.accept(TokenKind::RightParen) {
            let args = Expr::new(ExprKind::Null, Span::empty(self.p()));
            return Ok(Expr::binary(callee, BinaryOp::Call, args));
        }
        let args = self.parse_expr(1)?;
        self.expect(TokenKind::RightParen)?;
        Ok(Expr::binary(callee, BinaryOp::Call, args))
    }

    /// Parses `then : else` after `condition ?`.
    fn parse_ternary_tail(&mut self, condition: Expr) -> Result<Expr, ParseError> {
        let then_expr = self.parse_expr(3)?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_expr(3)?;
        let span = condition.span.merge(&else_expr.span);
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }
}
