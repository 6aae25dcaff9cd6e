//! # hydrui-script
//!
//! A small expression and scripting language for Hydrui search predicates,
//! with completion driven by speculative evaluation.
//!
//! ## Architecture
//!
//! ```text
//! Source → Scanner → Parser → AST ─┬→ evaluate (async, real calls)      → Value
//!                                  └→ get_suggestions (sync, no I/O)   → Suggestions
//! ```
//!
//! Each phase is implemented as a separate module:
//!
//! - [`lexer`] - Tokenizes source code
//! - [`parser`] - Builds the AST, strictly or tolerating incomplete input
//! - [`ast`] - AST type definitions
//! - [`value`] - Runtime values, including the `File` type
//! - [`resolver`] - Name resolution chains
//! - [`eval`] - The evaluator
//! - [`infer`] - Completion by speculative evaluation
//! - [`suggest`] - Completion results and ranking
//! - [`query`] - Filtering and sorting files with an expression
//! - [`lsp`] - Language Server Protocol implementation for editors
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use hydrui_script::prelude::*;
//!
//! let expr = Parser::new("\"sky\".padStart(5, \"-\")", false)
//!     .unwrap()
//!     .parse_expression()
//!     .unwrap();
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let value = runtime
//!     .block_on(evaluate(Rc::new(StandardResolver::default()), Node::Expr(&expr)))
//!     .unwrap();
//! assert_eq!(value, Value::from("--sky"));
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod infer;
pub mod lexer;
pub mod lsp;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod suggest;
pub mod unwind;
pub mod value;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::ast::{Expr, ExprKind, Node, Span, Statement, StatementKind};
    pub use crate::error::ScriptError;
    pub use crate::eval::evaluate;
    pub use crate::infer::get_suggestions;
    pub use crate::lexer::{Scanner, Token, TokenKind};
    pub use crate::parser::{ParseError, Parser};
    pub use crate::query::{filter_files, placeholder_resolver, sort_files};
    pub use crate::resolver::{Resolver, ScopeResolver, SpeculativeResolver, StandardResolver};
    pub use crate::suggest::{Suggestions, fuzzy_suggest};
    pub use crate::value::{FileLookup, FileMetadata, FileValue, MemoryFileStore, Value};
}
