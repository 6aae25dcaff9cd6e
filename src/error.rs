//! Runtime errors.
//!
//! [`ScriptError`] is what evaluation, inference and the query drivers
//! return to the host. It wraps the value and parse errors and adds the
//! failures that only occur while running a script.

use thiserror::Error;

use crate::parser::ParseError;
use crate::value::ValueError;
use crate::value::number::format_number;

/// An error raised while running a script.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    /// The source did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An operator, member or coercion failed.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// A name that no resolver in the chain knows.
    #[error("No such value {0}")]
    NoSuchValue(String),

    #[error("Unexpected break outside of loop")]
    BreakOutsideLoop,

    #[error("Unexpected continue outside of loop")]
    ContinueOutsideLoop,

    /// A built-in member function was called with too few arguments.
    #[error("Required argument {0} missing")]
    MissingArgument(usize),

    /// A type constructor was called with no argument.
    #[error("Missing argument in {0}() call")]
    MissingConstructorArgument(&'static str),

    #[error("Index {} not found in List", format_number(*.0))]
    IndexNotFound(f64),

    /// `some`/`every` called without a predicate.
    #[error("List.{0} requires an argument")]
    MissingPredicate(&'static str),

    #[error("Expected boolean value from predicate, got {0}")]
    PredicateResult(&'static str),

    /// `String.match` with a pattern that does not compile.
    #[error("Invalid regular expression {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A string operation would build a string past the length limit.
    #[error("Invalid string length")]
    InvalidStringLength,

    #[error("Expected identifier after dot operator")]
    ExpectedMemberName,

    /// A function created for real execution was called speculatively.
    #[error("Unexpected speculative execution of runtime procedure")]
    SpeculativeCall,

    /// A function created by inference was called for real.
    #[error("Unexpected real execution of speculative procedure")]
    RuntimeCall,

    #[error("File ID {} not found", format_number(*.0))]
    FileIdNotFound(f64),

    #[error("File hash {0} not found")]
    FileHashNotFound(String),

    #[error("Unexpected argument type {0} to File constructor")]
    FileArgument(&'static str),

    /// `File(...)` was called on a resolver with no host lookup.
    #[error("No file lookup is available")]
    NoFileLookup,

    /// The host lookup itself failed.
    #[error("File lookup failed: {0}")]
    Lookup(String),

    /// A partially parsed tree reached the real evaluator.
    #[error("Cannot evaluate an incomplete expression")]
    Placeholder,

    /// A sort expression produced something that cannot be ordered.
    #[error("Expected comparator to return number or string (got {0})")]
    SortKey(&'static str),
}
