//! Lexical scope chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::Value;

/// A single scope frame: name → value bindings plus an optional reference to
/// the enclosing scope. Frames are shared (`Rc<RefCell<_>>`) because closures
/// keep their defining scope alive after the block that created it has exited.
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Create a new root environment (no enclosing scope).
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// Create a new environment nested inside `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Binds `name` in this frame, overwriting any existing binding.
    /// Redeclaration in the same scope shadows silently.
    pub fn define(&mut self, name: impl ToString, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Looks `name` up in this frame, delegating to the enclosing frame when
    /// absent. Returns `None` when no frame in the chain defines it.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .enclosing
                .as_ref()
                .and_then(|enclosing| enclosing.borrow().get(name)),
        }
    }

    /// Overwrites `name` in the nearest frame that already defines it.
    /// Returns `false` when no frame defines it; assignment never creates a
    /// binding.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else {
            match &self.enclosing {
                Some(enclosing) => enclosing.borrow_mut().assign(name, value),
                None => false,
            }
        }
    }

    /// Looks `name` up exactly `depth` frames up the chain (no search), at the
    /// distance precomputed by the resolve pass.
    pub fn get_at(env: &Rc<RefCell<Environment>>, depth: usize, name: &str) -> Option<Value> {
        Self::ancestor(env, depth).and_then(|env| env.borrow().values.get(name).cloned())
    }

    /// Overwrites `name` exactly `depth` frames up the chain.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        depth: usize,
        name: &str,
        value: Value,
    ) -> bool {
        match Self::ancestor(env, depth) {
            Some(env) => match env.borrow_mut().values.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    fn ancestor(env: &Rc<RefCell<Environment>>, depth: usize) -> Option<Rc<RefCell<Environment>>> {
        let mut env = Rc::clone(env);
        for _ in 0..depth {
            let enclosing = env.borrow().enclosing.clone()?;
            env = enclosing;
        }
        Some(env)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
