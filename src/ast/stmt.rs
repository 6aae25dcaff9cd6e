//! Statement AST nodes.
//!
//! Statements perform actions: binding, assignment and control flow. A
//! whole script parses into a single [`StatementKind::Block`].

use std::fmt;

use super::{BinaryOp, Expr, Span};

/// A statement with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The kind of statement.
    pub kind: StatementKind,
    /// Source location of this statement.
    pub span: Span,
}

impl Statement {
    /// Creates a new statement with the given kind and span.
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Wraps an expression evaluated for its effect, usually a call.
    pub fn expression(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StatementKind::Expression(expr), span)
    }

    /// Regenerates source text for this statement.
    pub fn source(&self) -> String {
        self.to_string()
    }

    /// Regenerates source text for a whole script.
    ///
    /// A script is a block; its statements print without the enclosing
    /// braces so the text parses back into the same block.
    pub fn script_source(&self) -> String {
        match &self.kind {
            StatementKind::Block(statements) => statements
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            _ => self.to_string(),
        }
    }

    /// Writes the statement without its trailing semicolon.
    ///
    /// `for` headers hold statements in positions where the separator is
    /// part of the header syntax.
    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StatementKind::Expression(expr) => write!(f, "{expr}"),
            StatementKind::Assign { target, op, value } => {
                write!(f, "{target} {} {value}", op.as_str())
            }
            StatementKind::Let {
                name,
                initializer: Some(init),
            } => write!(f, "let {name} = {init}"),
            StatementKind::Let {
                name,
                initializer: None,
            } => write!(f, "let {name}"),
            StatementKind::Return(Some(value)) => write!(f, "return {value}"),
            StatementKind::Return(None) => f.write_str("return"),
            StatementKind::Break => f.write_str("break"),
            StatementKind::Continue => f.write_str("continue"),
            StatementKind::Empty => Ok(()),
            _ => write!(f, "{self}"),
        }
    }

    /// Returns true for statements that end with a semicolon.
    fn is_simple(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Expression(_)
                | StatementKind::Assign { .. }
                | StatementKind::Let { .. }
                | StatementKind::Return(_)
                | StatementKind::Break
                | StatementKind::Continue
                | StatementKind::Empty
        )
    }
}

/// The different kinds of statements.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// An expression evaluated for its effect: `log(x);`
    Expression(Expr),

    /// Assignment: `x = 1;`, `a.b[0] += 2;`
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },

    /// Binding: `let x;`, `let x = 1;`
    Let {
        name: String,
        initializer: Option<Expr>,
    },

    /// `return;` or `return value;`
    Return(Option<Expr>),

    /// `break;`
    Break,

    /// `continue;`
    Continue,

    /// `{ ... }`; does not open a new scope
    Block(Vec<Statement>),

    /// `if (condition) then_branch else else_branch`
    If {
        condition: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },

    /// `for (initializer; condition; iterator) body`
    For {
        initializer: Option<Box<Statement>>,
        condition: Option<Expr>,
        iterator: Option<Box<Statement>>,
        body: Box<Statement>,
    },

    /// `while (condition) body`
    While {
        condition: Expr,
        body: Box<Statement>,
    },

    /// A lone `;`
    Empty,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Quo => "/=",
            AssignOp::Rem => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::AndNot => "&^=",
        }
    }

    /// The operator a compound assignment applies before storing.
    ///
    /// Returns `None` for plain `=`.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Quo => Some(BinaryOp::Div),
            AssignOp::Rem => Some(BinaryOp::Rem),
            AssignOp::And => Some(BinaryOp::And),
            AssignOp::Or => Some(BinaryOp::Or),
            AssignOp::Xor => Some(BinaryOp::Xor),
            AssignOp::Shl => Some(BinaryOp::Lsh),
            AssignOp::Shr => Some(BinaryOp::Rsh),
            AssignOp::AndNot => Some(BinaryOp::AndNot),
        }
    }
}

struct Bare<'a>(&'a Statement);

impl fmt::Display for Bare<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_bare(f)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_simple() {
            self.fmt_bare(f)?;
            return f.write_str(";");
        }
        match &self.kind {
            StatementKind::Block(statements) if statements.is_empty() => f.write_str("{}"),
            StatementKind::Block(statements) => {
                f.write_str("{\n")?;
                for statement in statements {
                    for line in statement.to_string().lines() {
                        writeln!(f, "\t{line}")?;
                    }
                }
                f.write_str("}")
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            } => write!(f, "if ({condition}) {then_branch} else {else_branch}"),
            StatementKind::If {
                condition,
                then_branch,
                else_branch: None,
            } => write!(f, "if ({condition}) {then_branch}"),
            StatementKind::For {
                initializer,
                condition,
                iterator,
                body,
            } => {
                f.write_str("for (")?;
                if let Some(init) = initializer {
                    write!(f, "{}", Bare(init))?;
                }
                f.write_str("; ")?;
                if let Some(condition) = condition {
                    write!(f, "{condition}")?;
                }
                f.write_str("; ")?;
                if let Some(iterator) = iterator {
                    write!(f, "{}", Bare(iterator))?;
                }
                write!(f, ") {body}")
            }
            StatementKind::While { condition, body } => {
                write!(f, "while ({condition}) {body}")
            }
            _ => self.fmt_bare(f),
        }
    }
}
