//! Completion by speculative evaluation.
//!
//! [`get_suggestions`] runs a (usually partially parsed) tree the way the
//! evaluator would, but synchronously and without side effects:
//!
//! - names are read through a [`SpeculativeResolver`], so assignments only
//!   touch private copies;
//! - calls take the placeholder path, which never performs I/O;
//! - loop bodies run once, and placeholders evaluate to `null`.
//!
//! When the walk reaches the cursor, either an unknown name under it or a
//! member access after a `.`, it stops with the completions for that spot.

use std::rc::{Rc, Weak};

use futures_util::FutureExt;

use crate::ast::{BinaryOp, Expr, ExprKind, Node, Statement, StatementKind};
use crate::error::ScriptError;
use crate::eval::{FunctionBody, call_arguments, literal};
use crate::resolver::{Resolver, ScopeArena, ScopeResolver, SpeculativeResolver};
use crate::suggest::{Suggestions, fuzzy_suggest};
use crate::unwind::{Flow, Unwind};
use crate::value::{FunctionValue, Value, Variable};

/// Finds completions for the byte offset `cursor` in `node`.
///
/// Returns `Ok(None)` when the walk finishes without reaching the cursor,
/// and the error when it fails before getting there.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use hydrui_script::ast::Node;
/// use hydrui_script::infer::get_suggestions;
/// use hydrui_script::parser::Parser;
/// use hydrui_script::resolver::StandardResolver;
///
/// let expr = Parser::new("\"test\".ends", true).unwrap().parse_expression().unwrap();
/// let found = get_suggestions(Rc::new(StandardResolver::default()), Node::Expr(&expr), 11)
///     .unwrap()
///     .unwrap();
/// assert_eq!(found.identifiers, vec!["endsWith"]);
/// ```
pub fn get_suggestions(
    resolver: Rc<dyn Resolver>,
    node: Node<'_>,
    cursor: usize,
) -> Result<Option<Suggestions>, ScriptError> {
    log::trace!("inferring completions at {cursor} in {node}");
    let arena = Rc::new(ScopeArena::default());
    let inferrer = Inferrer {
        cursor,
        arena: Rc::downgrade(&arena),
    };
    match inferrer.root(resolver, node) {
        Err(Unwind::Suggest(suggestions)) => {
            log::debug!(
                "{} completions at {cursor}",
                suggestions.identifiers.len()
            );
            Ok(Some(suggestions))
        }
        Err(Unwind::Error(err)) => Err(err),
        Ok(_) | Err(Unwind::Return(_) | Unwind::Break | Unwind::Continue) => Ok(None),
    }
}

#[derive(Clone)]
struct Inferrer {
    cursor: usize,
    arena: Weak<ScopeArena>,
}

impl Inferrer {
    /// Runs a script, function body or expression behind its own shadow
    /// resolver.
    fn root(&self, resolver: Rc<dyn Resolver>, node: Node<'_>) -> Flow<Value> {
        let shadow = ScopeArena::open(&self.arena, Rc::new(SpeculativeResolver::new(resolver)));
        let result = match node {
            Node::Expr(expr) => self.expr(&shadow, expr),
            Node::Statement(stmt) => self.statement(&shadow, stmt),
        };
        match result {
            Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Break | Unwind::Continue) => Ok(Value::Null),
            other => other,
        }
    }

    fn statement(&self, resolver: &Rc<dyn Resolver>, stmt: &Statement) -> Flow<Value> {
        match &stmt.kind {
            StatementKind::Expression(expr) => self.expr(resolver, expr),
            StatementKind::Block(statements) => {
                for statement in statements {
                    self.statement(resolver, statement)?;
                }
                Ok(Value::Null)
            }
            StatementKind::Let { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.expr(resolver, init)?,
                    None => Value::Null,
                };
                resolver.assign(name, Value::Variable(Variable::new(value)));
                Ok(Value::Null)
            }
            StatementKind::Assign { target, op, value } => {
                let target = self.expr(resolver, target)?;
                let value = self.expr(resolver, value)?;
                let value = match op.binary_op() {
                    Some(op) => target.binary(op, &value)?,
                    None => value,
                };
                target.assign(value)?;
                Ok(Value::Null)
            }
            StatementKind::Return(value) => {
                let value = match value {
                    Some(value) => self.expr(resolver, value)?.snapshot(),
                    None => Value::Null,
                };
                Err(Unwind::Return(value))
            }
            StatementKind::Break => Err(Unwind::Break),
            StatementKind::Continue => Err(Unwind::Continue),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.expr(resolver, condition)?.coerce_boolean()? {
                    self.statement(resolver, then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.statement(resolver, else_branch)?;
                }
                Ok(Value::Null)
            }
            StatementKind::For {
                initializer, body, ..
            } => {
                if let Some(init) = initializer {
                    self.statement(resolver, init)?;
                }
                self.loop_body(resolver, body)
            }
            StatementKind::While { body, .. } => self.loop_body(resolver, body),
            StatementKind::Empty => Ok(Value::Null),
        }
    }

    /// One pass over a loop body.
    fn loop_body(&self, resolver: &Rc<dyn Resolver>, body: &Statement) -> Flow<Value> {
        match self.statement(resolver, body) {
            Ok(_) | Err(Unwind::Break | Unwind::Continue) => Ok(Value::Null),
            Err(other) => Err(other),
        }
    }

    fn expr(&self, resolver: &Rc<dyn Resolver>, expr: &Expr) -> Flow<Value> {
        if let Some(value) = literal(expr) {
            return Ok(value);
        }
        if let Some((params, body)) = FunctionBody::of(expr) {
            return Ok(self.speculative_function(resolver, params, body));
        }
        match &expr.kind {
            ExprKind::Placeholder => Ok(Value::Null),
            ExprKind::Ident(name) => match resolver.resolve(name) {
                Ok(value) => Ok(value),
                Err(ScriptError::NoSuchValue(_)) if expr.span.touches(self.cursor) => {
                    let identifiers = fuzzy_suggest(name, &resolver.suggestions());
                    Err(Unwind::Suggest(Suggestions::new(identifiers, expr.span)))
                }
                Err(err) => Err(err.into()),
            },
            ExprKind::Unary { op, operand } => Ok(self.expr(resolver, operand)?.unary(*op)?),
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                if self.expr(resolver, condition)?.as_boolean()? {
                    self.expr(resolver, then_expr)
                } else {
                    self.expr(resolver, else_expr)
                }
            }
            ExprKind::Binary { left, op, right } => {
                let lhs = self.expr(resolver, left)?;
                match op {
                    BinaryOp::Member => self.member(&lhs, left, right),
                    BinaryOp::Call => {
                        let args = call_arguments(right)
                            .into_iter()
                            .map(|arg| self.expr(resolver, arg))
                            .collect::<Flow<Vec<_>>>()?;
                        lhs.call_placeholder(args)
                    }
                    BinaryOp::Group => self.expr(resolver, right),
                    _ => {
                        let rhs = self.expr(resolver, right)?;
                        Ok(lhs.binary(*op, &rhs)?)
                    }
                }
            }
            _ => Ok(Value::Null),
        }
    }

    /// `lhs.member`, offering the members of `lhs` when the cursor sits
    /// between the dot and the end of the member name.
    fn member(&self, lhs: &Value, left: &Expr, right: &Expr) -> Flow<Value> {
        if left.span.end <= self.cursor && self.cursor <= right.span.end {
            let members = lhs.dot_suggest();
            let identifiers = match &right.kind {
                ExprKind::Ident(typed) => fuzzy_suggest(typed, &members),
                _ => members,
            };
            return Err(Unwind::Suggest(Suggestions::new(identifiers, right.span)));
        }
        let ExprKind::Ident(member) = &right.kind else {
            return Err(ScriptError::ExpectedMemberName.into());
        };
        Ok(lhs.dot(member)?)
    }

    /// A function value that can only be called speculatively.
    fn speculative_function(
        &self,
        resolver: &Rc<dyn Resolver>,
        params: Rc<[String]>,
        body: FunctionBody,
    ) -> Value {
        let resolver = Rc::clone(resolver);
        let inferrer = self.clone();
        Value::Function(FunctionValue::new(
            |_| async { Err::<Value, _>(ScriptError::RuntimeCall) }.boxed_local(),
            move |args| {
                let scope = ScopeResolver::with_params(Rc::clone(&resolver), &params, args);
                let scope = ScopeArena::open(&inferrer.arena, Rc::new(scope));
                inferrer.root(scope, body.node())
            },
        ))
    }
}
