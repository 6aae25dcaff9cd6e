//! Name resolution.
//!
//! A script sees its names through a chain of resolvers. The host supplies a
//! [`StandardResolver`] with the global bindings; every function call adds a
//! [`ScopeResolver`] on top of the resolver active where the function was
//! defined; inference puts a [`SpeculativeResolver`] in front of the chain so
//! nothing it does is visible to the host.
//!
//! Resolvers are shared as `Rc<dyn Resolver>` and mutate through `RefCell`,
//! so closures can hold on to their defining scope.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::error::ScriptError;
use crate::value::{Constructor, FileLookup, Value, Variable};

/// A namespace.
pub trait Resolver {
    /// Binds `name` in this resolver, shadowing any outer binding.
    fn assign(&self, name: &str, value: Value);

    /// Looks `name` up, innermost binding first.
    fn resolve(&self, name: &str) -> Result<Value, ScriptError>;

    /// Every visible name, innermost first, without duplicates.
    fn suggestions(&self) -> Vec<String>;

    /// Drops the bindings this resolver holds itself. Host resolvers keep
    /// theirs.
    fn release(&self) {}
}

/// The resolvers opened during one run.
///
/// A function value holds the scope it was defined in, and that scope
/// usually holds the function. Dropping the arena clears every scope it
/// opened, which breaks those cycles. Functions that outlive their run see
/// empty scopes.
#[derive(Default)]
pub struct ScopeArena {
    opened: RefCell<Vec<Weak<dyn Resolver>>>,
}

impl ScopeArena {
    /// Registers `resolver` with the arena, if it is still running.
    pub fn open(arena: &Weak<ScopeArena>, resolver: Rc<dyn Resolver>) -> Rc<dyn Resolver> {
        if let Some(arena) = arena.upgrade() {
            let mut opened = arena.opened.borrow_mut();
            if opened.len() == opened.capacity() {
                opened.retain(|scope| scope.strong_count() > 0);
            }
            opened.push(Rc::downgrade(&resolver));
        }
        resolver
    }
}

impl Drop for ScopeArena {
    fn drop(&mut self) {
        for scope in self.opened.get_mut().drain(..) {
            if let Some(scope) = scope.upgrade() {
                scope.release();
            }
        }
    }
}

/// Appends the names in `more` that `names` does not hold yet.
fn merge_names(mut names: Vec<String>, more: Vec<String>) -> Vec<String> {
    for name in more {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// The global namespace.
///
/// Resolves script-level bindings, then the host's globals, then the
/// built-in `File` constructor.
pub struct StandardResolver {
    globals: BTreeMap<String, Value>,
    locals: RefCell<BTreeMap<String, Value>>,
    file_lookup: Option<Rc<dyn FileLookup>>,
}

impl StandardResolver {
    pub fn new(globals: BTreeMap<String, Value>) -> Self {
        Self {
            globals,
            locals: RefCell::new(BTreeMap::new()),
            file_lookup: None,
        }
    }

    /// Connects `File(...)` to a host file lookup.
    pub fn with_file_lookup(mut self, lookup: Rc<dyn FileLookup>) -> Self {
        self.file_lookup = Some(lookup);
        self
    }
}

impl Default for StandardResolver {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl Resolver for StandardResolver {
    fn assign(&self, name: &str, value: Value) {
        self.locals.borrow_mut().insert(name.to_string(), value);
    }

    fn resolve(&self, name: &str) -> Result<Value, ScriptError> {
        if let Some(value) = self.locals.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }
        match name {
            "File" => Ok(Value::Constructor(Constructor::File(
                self.file_lookup.clone(),
            ))),
            _ => Err(ScriptError::NoSuchValue(name.to_string())),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        let locals = self.locals.borrow().keys().cloned().collect();
        merge_names(locals, self.globals.keys().cloned().collect())
    }
}

/// A function call's local namespace.
pub struct ScopeResolver {
    parent: Rc<dyn Resolver>,
    locals: RefCell<BTreeMap<String, Value>>,
}

impl ScopeResolver {
    pub fn new(parent: Rc<dyn Resolver>) -> Self {
        Self {
            parent,
            locals: RefCell::new(BTreeMap::new()),
        }
    }

    /// A scope with each parameter bound to a fresh variable.
    ///
    /// Arguments are copied in; parameters without an argument are `null`.
    pub fn with_params(parent: Rc<dyn Resolver>, params: &[String], args: Vec<Value>) -> Self {
        let scope = Self::new(parent);
        let mut args = args.into_iter();
        for param in params {
            let value = args.next().map(|arg| arg.snapshot()).unwrap_or(Value::Null);
            scope.assign(param, Value::Variable(Variable::new(value)));
        }
        scope
    }
}

impl Resolver for ScopeResolver {
    fn assign(&self, name: &str, value: Value) {
        self.locals.borrow_mut().insert(name.to_string(), value);
    }

    fn resolve(&self, name: &str) -> Result<Value, ScriptError> {
        if let Some(value) = self.locals.borrow().get(name) {
            return Ok(value.clone());
        }
        self.parent.resolve(name)
    }

    fn suggestions(&self) -> Vec<String> {
        let locals = self.locals.borrow().keys().cloned().collect();
        merge_names(locals, self.parent.suggestions())
    }

    fn release(&self) {
        let locals = std::mem::take(&mut *self.locals.borrow_mut());
        drop(locals);
    }
}

/// A copy-on-read shadow of another resolver.
///
/// The first read of a name copies the parent's current value into a private
/// variable; every later read or write in the same run sees only that copy.
pub struct SpeculativeResolver {
    parent: Rc<dyn Resolver>,
    shadows: RefCell<BTreeMap<String, Value>>,
}

impl SpeculativeResolver {
    pub fn new(parent: Rc<dyn Resolver>) -> Self {
        Self {
            parent,
            shadows: RefCell::new(BTreeMap::new()),
        }
    }
}

impl Resolver for SpeculativeResolver {
    fn assign(&self, name: &str, value: Value) {
        self.shadows.borrow_mut().insert(name.to_string(), value);
    }

    fn resolve(&self, name: &str) -> Result<Value, ScriptError> {
        if let Some(shadow) = self.shadows.borrow().get(name) {
            return Ok(shadow.clone());
        }
        let shadow = Value::Variable(Variable::new(self.parent.resolve(name)?.snapshot()));
        self.shadows
            .borrow_mut()
            .insert(name.to_string(), shadow.clone());
        Ok(shadow)
    }

    fn suggestions(&self) -> Vec<String> {
        let shadows = self.shadows.borrow().keys().cloned().collect();
        merge_names(shadows, self.parent.suggestions())
    }

    fn release(&self) {
        let shadows = std::mem::take(&mut *self.shadows.borrow_mut());
        drop(shadows);
    }
}
