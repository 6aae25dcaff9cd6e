//! Mutable variable cells.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Value;

/// A shared, mutable slot holding a value.
///
/// `let` bindings and function parameters are variables. Clones share the
/// slot, which is how closures see later assignments to captured names.
#[derive(Clone)]
pub struct Variable(Rc<RefCell<Value>>);

impl Variable {
    /// Creates a cell holding `value`.
    ///
    /// A variable never wraps another variable; `value` is snapshotted.
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value.snapshot())))
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    /// Replaces the current value.
    pub fn set(&self, value: Value) {
        let value = value.snapshot();
        *self.0.borrow_mut() = value;
    }

    /// True if both handles refer to the same slot.
    pub fn same_slot(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&*self.0.borrow()).finish()
    }
}
