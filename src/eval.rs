//! The evaluator.
//!
//! Walks a parsed tree against a resolver chain and produces a value. The
//! walk is asynchronous only because calls may be: `File(...)` asks the host
//! for metadata, and a script function's body may do the same. Everything
//! else completes without suspending.
//!
//! `return`, `break` and `continue` travel as [`Unwind`] signals; the
//! boundary of each function call and [`evaluate`] itself turn stray signals
//! into errors.

use std::rc::{Rc, Weak};

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;

use crate::ast::{BinaryOp, Expr, ExprKind, Node, Statement, StatementKind, TypeKeyword};
use crate::error::ScriptError;
use crate::resolver::{Resolver, ScopeArena, ScopeResolver};
use crate::unwind::{Flow, Unwind};
use crate::value::{Constructor, FunctionValue, Value, Variable};

/// Evaluates an expression or a script.
///
/// The resolver is wrapped in a fresh scope, so `let` bindings made by the
/// script do not leak into it. A script's result is the value of its
/// `return`, or `null` if it finishes without one.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use hydrui_script::ast::Node;
/// use hydrui_script::eval::evaluate;
/// use hydrui_script::parser::Parser;
/// use hydrui_script::resolver::StandardResolver;
/// use hydrui_script::value::Value;
///
/// let expr = Parser::new("1 + 1", false).unwrap().parse_expression().unwrap();
/// let resolver = Rc::new(StandardResolver::default());
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let value = runtime.block_on(evaluate(resolver, Node::Expr(&expr))).unwrap();
/// assert_eq!(value, Value::Number(2.0));
/// ```
pub async fn evaluate(resolver: Rc<dyn Resolver>, node: Node<'_>) -> Result<Value, ScriptError> {
    log::trace!("evaluating {node}");
    let arena = Rc::new(ScopeArena::default());
    let host = Env {
        resolver,
        arena: Rc::downgrade(&arena),
    };
    let env = host.enter(ScopeResolver::new(Rc::clone(&host.resolver)));
    settle(run(&env, node).await)
}

/// The resolver a node runs against, and the arena of its run.
#[derive(Clone)]
struct Env {
    resolver: Rc<dyn Resolver>,
    arena: Weak<ScopeArena>,
}

impl Env {
    fn enter(&self, scope: ScopeResolver) -> Env {
        Env {
            resolver: ScopeArena::open(&self.arena, Rc::new(scope)),
            arena: self.arena.clone(),
        }
    }
}

/// Converts the outcome of a function body or script into a result.
fn settle(result: Flow<Value>) -> Result<Value, ScriptError> {
    match result {
        Ok(value) | Err(Unwind::Return(value)) => Ok(value.snapshot()),
        Err(Unwind::Break) => Err(ScriptError::BreakOutsideLoop),
        Err(Unwind::Continue) => Err(ScriptError::ContinueOutsideLoop),
        // Completions only come out of inference.
        Err(Unwind::Suggest(_)) => Err(ScriptError::SpeculativeCall),
        Err(Unwind::Error(err)) => Err(err),
    }
}

fn run<'a>(env: &'a Env, node: Node<'a>) -> LocalBoxFuture<'a, Flow<Value>> {
    match node {
        Node::Expr(expr) => eval_expr(env, expr),
        Node::Statement(stmt) => exec_statement(env, stmt),
    }
}

// ==================== Shared with inference ====================

/// The body of a function or lambda, kept alive by the values made from it.
#[derive(Clone)]
pub(crate) enum FunctionBody {
    Block(Rc<Statement>),
    Expr(Rc<Expr>),
}

impl FunctionBody {
    /// Splits a function or lambda node into its parameters and body.
    pub(crate) fn of(expr: &Expr) -> Option<(Rc<[String]>, FunctionBody)> {
        match &expr.kind {
            ExprKind::Function { params, body } => {
                Some((params.as_slice().into(), FunctionBody::Block(Rc::clone(body))))
            }
            ExprKind::Lambda { params, body } => {
                Some((params.as_slice().into(), FunctionBody::Expr(Rc::clone(body))))
            }
            _ => None,
        }
    }

    pub(crate) fn node(&self) -> Node<'_> {
        match self {
            FunctionBody::Block(stmt) => Node::Statement(stmt),
            FunctionBody::Expr(expr) => Node::Expr(expr),
        }
    }
}

/// The value of a literal or type keyword; `None` for everything else.
pub(crate) fn literal(expr: &Expr) -> Option<Value> {
    let value = match &expr.kind {
        ExprKind::Keyword(TypeKeyword::Boolean) => Value::Constructor(Constructor::Boolean),
        ExprKind::Keyword(TypeKeyword::Number) => Value::Constructor(Constructor::Number),
        ExprKind::Keyword(TypeKeyword::String) => Value::Constructor(Constructor::String),
        ExprKind::Number(n) => Value::Number(*n),
        ExprKind::Boolean(b) => Value::Boolean(*b),
        ExprKind::String(s) => Value::from(s.as_str()),
        ExprKind::Null => Value::Null,
        _ => return None,
    };
    Some(value)
}

/// The argument expressions of a call; `f()` has none.
pub(crate) fn call_arguments(args: &Expr) -> Vec<&Expr> {
    if args.is_empty_arguments() {
        Vec::new()
    } else {
        args.flatten_group()
    }
}

// ==================== Statements ====================

fn exec_statement<'a>(
    env: &'a Env,
    stmt: &'a Statement,
) -> LocalBoxFuture<'a, Flow<Value>> {
    async move {
        match &stmt.kind {
            StatementKind::Expression(expr) => eval_expr(env, expr).await,
            StatementKind::Block(statements) => {
                for statement in statements {
                    exec_statement(env, statement).await?;
                }
                Ok(Value::Null)
            }
            StatementKind::Let { name, initializer } => {
                let value = match initializer {
                    Some(init) => eval_expr(env, init).await?,
                    None => Value::Null,
                };
                env.resolver.assign(name, Value::Variable(Variable::new(value)));
                Ok(Value::Null)
            }
            StatementKind::Assign { target, op, value } => {
                let target = eval_expr(env, target).await?;
                let value = eval_expr(env, value).await?;
                let value = match op.binary_op() {
                    Some(op) => target.binary(op, &value)?,
                    None => value,
                };
                target.assign(value)?;
                Ok(Value::Null)
            }
            StatementKind::Return(value) => {
                let value = match value {
                    Some(value) => eval_expr(env, value).await?.snapshot(),
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
                if eval_expr(env, condition).await?.coerce_boolean()? {
                    exec_statement(env, then_branch).await?;
                } else if let Some(else_branch) = else_branch {
                    exec_statement(env, else_branch).await?;
                }
                Ok(Value::Null)
            }
            StatementKind::For {
                initializer,
                condition,
                iterator,
                body,
            } => {
                if let Some(init) = initializer {
                    exec_statement(env, init).await?;
                }
                loop {
                    if let Some(condition) = condition
                        && !eval_expr(env, condition).await?.coerce_boolean()?
                    {
                        break;
                    }
                    match exec_statement(env, body).await {
                        Ok(_) | Err(Unwind::Continue) => {}
                        Err(Unwind::Break) => break,
                        Err(other) => return Err(other),
                    }
                    if let Some(iterator) = iterator {
                        exec_statement(env, iterator).await?;
                    }
                }
                Ok(Value::Null)
            }
            StatementKind::While { condition, body } => {
                while eval_expr(env, condition).await?.coerce_boolean()? {
                    match exec_statement(env, body).await {
                        Ok(_) | Err(Unwind::Continue) => {}
                        Err(Unwind::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(Value::Null)
            }
            StatementKind::Empty => Ok(Value::Null),
        }
    }
    .boxed_local()
}

// ==================== Expressions ====================

fn eval_expr<'a>(env: &'a Env, expr: &'a Expr) -> LocalBoxFuture<'a, Flow<Value>> {
    async move {
        if let Some(value) = literal(expr) {
            return Ok(value);
        }
        if let Some((params, body)) = FunctionBody::of(expr) {
            return Ok(runtime_function(env, params, body));
        }
        match &expr.kind {
            ExprKind::Placeholder => Err(ScriptError::Placeholder.into()),
            ExprKind::Ident(name) => Ok(env.resolver.resolve(name)?),
            ExprKind::Unary { op, operand } => {
                Ok(eval_expr(env, operand).await?.unary(*op)?)
            }
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                if eval_expr(env, condition).await?.as_boolean()? {
                    eval_expr(env, then_expr).await
                } else {
                    eval_expr(env, else_expr).await
                }
            }
            ExprKind::Binary { left, op, right } => {
                let lhs = eval_expr(env, left).await?;
                match op {
                    BinaryOp::Member => {
                        let ExprKind::Ident(member) = &right.kind else {
                            return Err(ScriptError::ExpectedMemberName.into());
                        };
                        Ok(lhs.dot(member)?)
                    }
                    BinaryOp::Call => {
                        let mut args = Vec::new();
                        for arg in call_arguments(right) {
                            args.push(eval_expr(env, arg).await?);
                        }
                        Ok(lhs.call(args).await?)
                    }
                    BinaryOp::Group => eval_expr(env, right).await,
                    _ => {
                        let rhs = eval_expr(env, right).await?;
                        Ok(lhs.binary(*op, &rhs)?)
                    }
                }
            }
            // Literals and functions are handled above.
            _ => Ok(Value::Null),
        }
    }
    .boxed_local()
}

/// A function value whose body runs in a new scope over `env`.
fn runtime_function(env: &Env, params: Rc<[String]>, body: FunctionBody) -> Value {
    let env = env.clone();
    Value::Function(FunctionValue::new(
        move |args| {
            let call = env.enter(ScopeResolver::with_params(
                Rc::clone(&env.resolver),
                &params,
                args,
            ));
            let body = body.clone();
            async move { settle(run(&call, body.node()).await) }.boxed_local()
        },
        |_| Err(ScriptError::SpeculativeCall.into()),
    ))
}
