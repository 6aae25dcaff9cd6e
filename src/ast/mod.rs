//! Abstract Syntax Tree (AST) definitions for hydrui scripts.
//!
//! The AST represents the structure of a script or expression after parsing.
//!
//! # Structure
//!
//! ```text
//! Statement (a script is a Block)
//! ├── Let { name, initializer: Option<Expr> }
//! ├── Assign { target: Expr, op, value: Expr }
//! ├── If / For / While / Block / Return / ...
//! └── Expression(Expr)
//!     ├── Binary { left, op, right }   (also `.`, `()`, `[]` and `,`)
//!     ├── Unary / Ternary / Lambda / Function
//!     └── literals, identifiers and placeholders
//! ```
//!
//! # Design Decisions
//!
//! - **Owned nodes**: nodes own their children. Function and lambda bodies sit
//!   behind an `Rc` so the closures created at runtime can keep them alive.
//! - **Span on every node**: used for error messages and for the
//!   "replace this range" half of completion results.
//! - **Printable**: every node implements `Display`, producing source text
//!   that parses back into an equivalent tree.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

/// A half-open range of byte offsets in the source text.
///
/// # Example
///
/// ```
/// use hydrui_script::ast::Span;
///
/// let span = Span::new(0, 5);
/// assert_eq!(span.start, 0);
/// assert_eq!(span.end, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the start of the span (inclusive).
    pub start: usize,
    /// Byte offset of the end of the span (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span from start to end byte offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a zero-width span at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Creates a span that covers both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if the span covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` lies within the span, counting both ends.
    ///
    /// A cursor sitting right after an identifier is still "in" it.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A borrowed reference to either kind of node.
///
/// The evaluators accept both: a parsed expression and a parsed script.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Expr(&'a Expr),
    Statement(&'a Statement),
}

impl Node<'_> {
    pub fn span(&self) -> Span {
        match self {
            Node::Expr(expr) => expr.span,
            Node::Statement(stmt) => stmt.span,
        }
    }
}

impl<'a> From<&'a Expr> for Node<'a> {
    fn from(expr: &'a Expr) -> Self {
        Node::Expr(expr)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(stmt: &'a Statement) -> Self {
        Node::Statement(stmt)
    }
}

impl std::fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Expr(expr) => expr.fmt(f),
            Node::Statement(stmt) => stmt.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(15, 25);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 25);
    }

    #[test]
    fn test_span_from_range() {
        let span: Span = (5..10).into();
        assert_eq!(span, Span::new(5, 10));
    }

    #[test]
    fn test_span_touches_both_ends() {
        let span = Span::new(3, 6);
        assert!(span.touches(3));
        assert!(span.touches(6));
        assert!(!span.touches(7));
        assert!(Span::empty(4).touches(4));
    }
}
