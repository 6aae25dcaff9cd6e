//! Expression AST nodes.
//!
//! # Expression Precedence
//!
//! The parser climbs through explicit depths. From tightest to loosest:
//!
//! 8. Member `.`, call `()`, subscript `[]`
//! 7. Unary `+ - ! ^`, then `*`, `/`, `%`, `<<`, `>>`, `&`, `&^`
//! 6. `+`, `-`, `|`, `^`
//! 5. `==`, `!=`, `<`, `<=`, `>`, `>=`
//! 4. `&&`
//! 3. `||` and the ternary `? :`
//! 2. `,` (group, also used for argument lists)

use std::fmt;
use std::rc::Rc;

use super::{Span, Statement};
use crate::value::number::format_number;

/// An expression with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The kind of expression.
    pub kind: ExprKind,
    /// Source location of this expression.
    pub span: Span,
}

impl Expr {
    /// Creates a new expression with the given kind and span.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Builds a binary node spanning both operands.
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        let span = left.span.merge(&right.span);
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    /// Regenerates source text for this expression.
    pub fn source(&self) -> String {
        self.to_string()
    }

    /// Splits a `,` chain into its operands, left to right.
    ///
    /// Call arguments are parsed as one group expression; this recovers the
    /// individual arguments.
    pub fn flatten_group(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Binary {
                left,
                op: BinaryOp::Group,
                right,
            } => {
                let mut items = left.flatten_group();
                items.extend(right.flatten_group());
                items
            }
            _ => vec![self],
        }
    }

    /// Returns true for the zero-width `null` the parser inserts for `f()`.
    pub fn is_empty_arguments(&self) -> bool {
        matches!(self.kind, ExprKind::Null) && self.span.is_empty()
    }

    /// How tightly this expression binds when printed inside another.
    fn precedence(&self) -> u8 {
        match &self.kind {
            ExprKind::Number(n) if n.is_sign_negative() => 7,
            ExprKind::Placeholder
            | ExprKind::Ident(_)
            | ExprKind::Keyword(_)
            | ExprKind::Number(_)
            | ExprKind::Boolean(_)
            | ExprKind::String(_)
            | ExprKind::Null => 9,
            ExprKind::Unary { .. } => 7,
            ExprKind::Binary { op, .. } => op.depth(),
            ExprKind::Ternary { .. } => 3,
            ExprKind::Lambda { .. } | ExprKind::Function { .. } => 1,
        }
    }

    /// True if the expression starts with a prefix operator.
    fn is_prefixed(&self) -> bool {
        match &self.kind {
            ExprKind::Unary { .. } => true,
            ExprKind::Number(n) => n.is_sign_negative(),
            _ => false,
        }
    }
}

/// The three type keywords usable as constructor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    Boolean,
    Number,
    String,
}

impl TypeKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKeyword::Boolean => "Boolean",
            TypeKeyword::Number => "Number",
            TypeKeyword::String => "String",
        }
    }
}

/// The different kinds of expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A missing sub-expression; only produced by partial parsing.
    Placeholder,

    /// Name lookup: `file`, `x`
    Ident(String),

    /// `Boolean`, `Number` or `String` used as a value
    Keyword(TypeKeyword),

    /// Number literal: `42`, `0xff`, `.5`
    Number(f64),

    /// `true` / `false`
    Boolean(bool),

    /// String literal, already unescaped
    String(String),

    /// `null`; also the empty argument list of `f()`
    Null,

    /// Prefix operation: `-x`, `!flag`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation, member access, call, subscript or group.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// `condition ? then_expr : else_expr`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// `lambda a, b: expr`
    Lambda { params: Vec<String>, body: Rc<Expr> },

    /// `function(a, b) { ... }`
    Function {
        params: Vec<String>,
        body: Rc<Statement>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Logical
    LogicalOr,
    LogicalAnd,

    // Comparison
    Equal,
    NotEqual,
    Lesser,
    LesserEqual,
    Greater,
    GreaterEqual,

    // Arithmetic and bitwise
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Lsh,
    Rsh,
    And,
    AndNot,

    // Structural
    Member,
    Call,
    Subscript,
    Group,
}

impl BinaryOp {
    /// The parser depth at which this operator is recognised.
    pub fn depth(&self) -> u8 {
        match self {
            BinaryOp::Member | BinaryOp::Call | BinaryOp::Subscript => 8,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Lsh
            | BinaryOp::Rsh
            | BinaryOp::And
            | BinaryOp::AndNot => 7,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 6,
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Lesser
            | BinaryOp::LesserEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => 5,
            BinaryOp::LogicalAnd => 4,
            BinaryOp::LogicalOr => 3,
            BinaryOp::Group => 2,
        }
    }

    /// Returns the operator's source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Lesser => "<",
            BinaryOp::LesserEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Lsh => "<<",
            BinaryOp::Rsh => ">>",
            BinaryOp::And => "&",
            BinaryOp::AndNot => "&^",
            BinaryOp::Member => ".",
            BinaryOp::Call => "()",
            BinaryOp::Subscript => "[]",
            BinaryOp::Group => ",",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`, returns the operand unchanged
    Plus,
    /// `-x`
    Negate,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
        }
    }
}

/// Writes `expr`, parenthesised when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Right operands are parsed fresh, so prefix forms never need parentheses.
fn write_right_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, depth: u8) -> fmt::Result {
    if expr.is_prefixed() {
        write!(f, "{expr}")
    } else {
        write_operand(f, expr, depth + 1)
    }
}

/// Literal text that scans back to `n`; non-finite values have no digits
/// of their own.
fn number_literal(n: f64) -> String {
    if n.is_nan() {
        "0x".to_string()
    } else if n == f64::INFINITY {
        "1e999".to_string()
    } else if n == f64::NEG_INFINITY {
        "-1e999".to_string()
    } else {
        format_number(n)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Placeholder => Ok(()),
            ExprKind::Ident(name) => f.write_str(name),
            ExprKind::Keyword(keyword) => f.write_str(keyword.as_str()),
            ExprKind::Number(n) => f.write_str(&number_literal(*n)),
            ExprKind::Boolean(b) => write!(f, "{b}"),
            ExprKind::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            ExprKind::Null if self.span.is_empty() => Ok(()),
            ExprKind::Null => f.write_str("null"),
            ExprKind::Unary { op, operand } => {
                f.write_str(op.as_str())?;
                write_operand(f, operand, 8)
            }
            ExprKind::Binary { left, op, right } => {
                let depth = op.depth();
                write_operand(f, left, depth)?;
                match op {
                    BinaryOp::Member => {
                        f.write_str(".")?;
                        write_operand(f, right, 9)
                    }
                    BinaryOp::Call => write!(f, "({right})"),
                    BinaryOp::Subscript => write!(f, "[{right}]"),
                    BinaryOp::Group => {
                        f.write_str(", ")?;
                        write_right_operand(f, right, depth)
                    }
                    _ => {
                        write!(f, " {} ", op.as_str())?;
                        write_right_operand(f, right, depth)
                    }
                }
            }
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                write_operand(f, condition, 3)?;
                f.write_str(" ? ")?;
                write_right_operand(f, then_expr, 3)?;
                f.write_str(" : ")?;
                write_right_operand(f, else_expr, 3)
            }
            ExprKind::Lambda { params, body } => {
                write!(f, "lambda {}: {body}", params.join(", "))
            }
            ExprKind::Function { params, body } => {
                write!(f, "function({}) {body}", params.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64, start: usize) -> Expr {
        Expr::new(ExprKind::Number(n), Span::new(start, start + 1))
    }

    #[test]
    fn test_binary_span_covers_operands() {
        let expr = Expr::binary(num(1.0, 0), BinaryOp::Add, num(2.0, 4));
        assert_eq!(expr.span, Span::new(0, 5));
    }

    #[test]
    fn test_binary_op_as_str() {
        assert_eq!(BinaryOp::Add.as_str(), "+");
        assert_eq!(BinaryOp::AndNot.as_str(), "&^");
        assert_eq!(BinaryOp::LogicalOr.as_str(), "||");
    }

    #[test]
    fn test_prints_parentheses_only_when_needed() {
        let sum = Expr::binary(num(1.0, 0), BinaryOp::Add, num(2.0, 4));
        let product = Expr::binary(sum, BinaryOp::Mul, num(3.0, 8));
        assert_eq!(product.source(), "(1 + 2) * 3");

        let product = Expr::binary(num(2.0, 0), BinaryOp::Mul, num(3.0, 4));
        let sum = Expr::binary(num(1.0, 0), BinaryOp::Add, product);
        assert_eq!(sum.source(), "1 + 2 * 3");
    }

    #[test]
    fn test_left_associative_printing() {
        let inner = Expr::binary(num(3.0, 4), BinaryOp::Sub, num(2.0, 8));
        let outer = Expr::binary(num(5.0, 0), BinaryOp::Sub, inner);
        assert_eq!(outer.source(), "5 - (3 - 2)");
    }

    #[test]
    fn test_empty_call_prints_empty_parens() {
        let callee = Expr::new(ExprKind::Ident("f".into()), Span::new(0, 1));
        let args = Expr::new(ExprKind::Null, Span::empty(3));
        let call = Expr::binary(callee, BinaryOp::Call, args);
        assert_eq!(call.source(), "f()");
    }

    #[test]
    fn test_ternary_prints_all_operands() {
        let expr = Expr::new(
            ExprKind::Ternary {
                condition: Box::new(Expr::new(ExprKind::Boolean(true), Span::new(0, 4))),
                then_expr: Box::new(num(1.0, 7)),
                else_expr: Box::new(num(2.0, 11)),
            },
            Span::new(0, 12),
        );
        assert_eq!(expr.source(), "true ? 1 : 2");
    }

    #[test]
    fn test_non_finite_numbers_print_as_number_literals() {
        assert_eq!(num(f64::NAN, 0).to_string(), "0x");
        assert_eq!(num(f64::INFINITY, 0).to_string(), "1e999");
        assert_eq!(num(f64::NEG_INFINITY, 0).to_string(), "-1e999");
        assert_eq!(num(0.5, 0).to_string(), "0.5");
    }

    #[test]
    fn test_string_literal_is_escaped() {
        let expr = Expr::new(ExprKind::String("a\"b".into()), Span::new(0, 6));
        assert_eq!(expr.source(), r#""a\"b""#);
    }

    #[test]
    fn test_flatten_group() {
        let group = Expr::binary(
            Expr::binary(num(1.0, 0), BinaryOp::Group, num(2.0, 3)),
            BinaryOp::Group,
            num(3.0, 6),
        );
        let items: Vec<String> = group.flatten_group().iter().map(|e| e.source()).collect();
        assert_eq!(items, vec!["1", "2", "3"]);
    }
}
