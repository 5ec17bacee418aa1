use crate::source::Span;
use crate::types::{Arity, NativeFunc, NativeFunction, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("Unbound symbol: '{0}'")]
    UnboundSymbol(String, Span), // Symbol name, span where lookup happened
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    // Rc<RefCell<...>> allows shared ownership and interior mutability,
    // needed for closures capturing their defining environment.
    outer: Option<Rc<RefCell<Environment>>>,
    bindings: HashMap<String, Value>,
}

impl Environment {
    /// Creates a new, empty top-level environment.
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            outer: None,
            bindings: HashMap::new(),
        }))
    }

    /// Creates a root environment with the native operators bound. Each call
    /// returns a fresh, independent environment; nothing is process-global.
    pub fn new_global_populated() -> Rc<RefCell<Environment>> {
        let env_ptr = Environment::new();
        {
            // Borrow mutably only inside this scope
            let mut env = env_ptr.borrow_mut();

            env.add_native("+", Arity::AtLeast(0), crate::primitives::prim_add);
            env.add_native("-", Arity::AtLeast(1), crate::primitives::prim_sub);
            env.add_native("*", Arity::AtLeast(0), crate::primitives::prim_mul);
            env.add_native("/", Arity::AtLeast(1), crate::primitives::prim_div);

            env.add_native("=", Arity::AtLeast(2), crate::primitives::prim_equals);
            env.add_native("<", Arity::AtLeast(2), crate::primitives::prim_less_than);
            env.add_native(
                "<=",
                Arity::AtLeast(2),
                crate::primitives::prim_less_than_or_equals,
            );
            env.add_native(">", Arity::AtLeast(2), crate::primitives::prim_greater_than);
            env.add_native(
                ">=",
                Arity::AtLeast(2),
                crate::primitives::prim_greater_than_or_equals,
            );

            env.add_native("head", Arity::Exactly(1), crate::primitives::prim_head);
            env.add_native("tail", Arity::Exactly(1), crate::primitives::prim_tail);
            env.add_native("length", Arity::Exactly(1), crate::primitives::prim_length);

            env.add_native("print", Arity::Exactly(1), crate::primitives::prim_print);
        }
        env_ptr
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Defines a symbol in the *current* environment frame.
    /// Replaces the value if the symbol is already bound in this frame;
    /// ancestor frames are never touched.
    pub fn define(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Looks up a symbol's value.
    /// Checks the current frame first, then walks up the outer chain.
    /// `lookup_span` is the location where the symbol was referenced, used
    /// for error reporting.
    pub fn get(&self, name: &str, lookup_span: Span) -> Result<Value, EnvError> {
        if let Some(value) = self.bindings.get(name) {
            Ok(value.clone())
        } else {
            match &self.outer {
                Some(outer_env_ptr) => outer_env_ptr.borrow().get(name, lookup_span),
                None => Err(EnvError::UnboundSymbol(name.to_string(), lookup_span)),
            }
        }
    }

    /// Helper to bind a native operator in this frame.
    fn add_native(&mut self, name: &str, arity: Arity, func: NativeFunc) {
        let value = Value::NativeFunction(NativeFunction {
            name: name.to_string(),
            arity,
            func,
        });
        self.define(name.to_string(), value);
    }

    fn add_identifiers(&self, mut identifiers: HashSet<String>) -> HashSet<String> {
        for identifier in self.bindings.keys() {
            identifiers.insert(identifier.to_string());
        }
        identifiers
    }

    /// Gets every identifier bound anywhere in the chain (for completion).
    pub fn get_identifiers(&self) -> HashSet<String> {
        let identifiers = self.bindings.keys().map(|i| i.to_string()).collect();
        match self.outer {
            Some(ref outer_env_ptr) => outer_env_ptr.borrow().add_identifiers(identifiers),
            None => identifiers,
        }
    }
}
