//! Lexically-scoped environment chain.
//!
//! Environments form a tree via `Rc<RefCell<…>>`, never a graph: a parent is
//! never handed a pointer back to a child. Function values retain a handle
//! to the global environment independent of the dynamic call stack, which is
//! what makes the `$id` global-sigil semantics possible without the
//! evaluator threading an explicit global reference through every call.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::error::KvazzError;
use crate::value::{BuiltinId, FunctionValue, Value};

/// An entry bound in an environment: a plain value, a user function, or a
/// built-in.
#[derive(Debug, Clone)]
pub enum EnvEntry {
    Value(Value),
    Function(FunctionValue),
    Builtin(BuiltinId),
}

#[derive(Debug)]
struct EnvironmentInner {
    table: AHashMap<String, EnvEntry>,
    parent: Option<EnvHandle>,
}

/// A shared, cloneable handle to an environment frame.
#[derive(Debug, Clone)]
pub struct EnvHandle(Rc<RefCell<EnvironmentInner>>);

impl EnvHandle {
    pub fn root() -> Self {
        Self(Rc::new(RefCell::new(EnvironmentInner {
            table: AHashMap::default(),
            parent: None,
        })))
    }

    pub fn child(parent: &EnvHandle) -> Self {
        Self(Rc::new(RefCell::new(EnvironmentInner {
            table: AHashMap::default(),
            parent: Some(parent.clone()),
        })))
    }

    pub fn ptr_eq(&self, other: &EnvHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Binds `name` in this frame. Fails if `name` already exists in this
    /// exact frame; shadowing an enclosing scope is permitted.
    pub fn declare(&self, name: impl Into<String>, entry: EnvEntry) -> Result<(), KvazzError> {
        let name = name.into();
        let mut inner = self.0.borrow_mut();
        if inner.table.contains_key(&name) {
            return Err(KvazzError::name(format!("'{name}' is already declared in this scope")));
        }
        inner.table.insert(name, entry);
        Ok(())
    }

    /// First-built-in, then innermost-outward resolution. Builtins
    /// never shadow user bindings: both live in the same
    /// per-frame table, so a normal chain walk already implements the rule
    /// as long as builtins are seeded into the global frame before any user
    /// code runs.
    pub fn lookup(&self, name: &str) -> Option<EnvEntry> {
        let inner = self.0.borrow();
        if let Some(entry) = inner.table.get(name) {
            return Some(entry.clone());
        }
        inner.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Overwrites an existing binding reachable from this frame, walking
    /// outward until the owning frame is found. Used by `AssignOp` to write
    /// into an `EnvSlot`. Declares into this frame if the name does
    /// not exist anywhere in the chain — normal top-level `var`/assignment
    /// sequencing in this language always declares before assigning, so this
    /// path is only taken for the deliberate rebind that assignment performs.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), KvazzError> {
        let mut inner = self.0.borrow_mut();
        if let Some(entry) = inner.table.get_mut(name) {
            *entry = EnvEntry::Value(value);
            return Ok(());
        }
        match inner.parent.clone() {
            Some(parent) => {
                drop(inner);
                parent.assign(name, value)
            }
            None => Err(KvazzError::name(format!("undefined variable '{name}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_is_allowed_redeclaration_is_not() {
        let global = EnvHandle::root();
        global.declare("x", EnvEntry::Value(Value::Int(1))).unwrap();
        assert!(global.declare("x", EnvEntry::Value(Value::Int(2))).is_err());

        let child = EnvHandle::child(&global);
        assert!(child.declare("x", EnvEntry::Value(Value::Int(2))).is_ok());
    }

    #[test]
    fn lookup_walks_outward() {
        let global = EnvHandle::root();
        global.declare("x", EnvEntry::Value(Value::Int(1))).unwrap();
        let child = EnvHandle::child(&global);
        match child.lookup("x") {
            Some(EnvEntry::Value(Value::Int(1))) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn assign_mutates_owning_frame() {
        let global = EnvHandle::root();
        global.declare("x", EnvEntry::Value(Value::Int(1))).unwrap();
        let child = EnvHandle::child(&global);
        child.assign("x", Value::Int(9)).unwrap();
        match global.lookup("x") {
            Some(EnvEntry::Value(Value::Int(9))) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}
