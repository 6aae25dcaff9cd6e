//! Non-local control flow.
//!
//! `return`, `break` and `continue` travel up the tree walkers as the error
//! side of a `Result`, next to genuine errors and, during inference, the
//! completion result. Each construct catches exactly the signals it owns;
//! nothing here escapes `evaluate` or `get_suggestions`.

use crate::error::ScriptError;
use crate::suggest::Suggestions;
use crate::value::{Value, ValueError};

#[derive(Debug)]
pub enum Unwind {
    /// `return`, caught at function boundaries.
    Return(Value),
    /// `break`, caught by the nearest loop.
    Break,
    /// `continue`, caught by the nearest loop.
    Continue,
    /// Completions found at the cursor; only raised during inference.
    Suggest(Suggestions),
    Error(ScriptError),
}

impl From<ScriptError> for Unwind {
    fn from(err: ScriptError) -> Self {
        Unwind::Error(err)
    }
}

impl From<ValueError> for Unwind {
    fn from(err: ValueError) -> Self {
        Unwind::Error(err.into())
    }
}

pub type Flow<T> = Result<T, Unwind>;
