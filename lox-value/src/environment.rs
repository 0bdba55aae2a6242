//! Runtime scope frames.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use lox_parser::token::Token;

use crate::{RuntimeError, Value};

/// Shared handle to a scope frame. Closures and the active call stack observe the same frame.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope frame: local bindings plus a link to the enclosing frame.
/// The global frame has no enclosing frame.
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// Create the global frame.
    pub fn new_global() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Create a frame nested in `enclosing`.
    pub fn new_enclosed(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }))
    }

    /// Binds `name` in this frame, overwriting any previous binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Looks `name` up in this frame, then in the enclosing frames.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get(name),
            None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
        }
    }

    /// Assigns to an existing binding of `name` in this frame or the closest enclosing frame.
    /// Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
        }
    }

    /// Returns the frame `distance` hops up the chain from `env`.
    fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let enclosing = current.borrow().enclosing.clone()?;
            current = enclosing;
        }
        Some(current)
    }

    /// Reads `name` directly from the frame `distance` hops up, without walking further.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        let value = match Self::ancestor(env, distance) {
            Some(frame) => {
                let frame = frame.borrow();
                frame.values.get(&name.lexeme).cloned()
            }
            None => None,
        };
        value.ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })
    }

    /// Assigns `name` directly in the frame `distance` hops up.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let frame = Self::ancestor(env, distance)
            .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })?;
        let mut frame = frame.borrow_mut();
        match frame.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lox_parser::token::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 1)
    }

    #[test]
    fn test_define_overwrites() {
        let globals = Environment::new_global();
        globals.borrow_mut().define("a", Value::Number(1.0));
        globals.borrow_mut().define("a", Value::Number(2.0));
        assert_eq!(globals.borrow().get(&ident("a")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_get_walks_enclosing_frames() {
        let globals = Environment::new_global();
        globals.borrow_mut().define("a", Value::Number(1.0));
        let inner = Environment::new_enclosed(&Environment::new_enclosed(&globals));
        assert_eq!(inner.borrow().get(&ident("a")).unwrap(), Value::Number(1.0));
        assert!(matches!(
            inner.borrow().get(&ident("b")),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn test_assign_never_defines() {
        let globals = Environment::new_global();
        let inner = Environment::new_enclosed(&globals);
        let err = inner
            .borrow_mut()
            .assign(&ident("a"), Value::Nil)
            .unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable 'a'.");
        assert!(globals.borrow().get(&ident("a")).is_err());
    }

    #[test]
    fn test_assign_updates_shared_frame() {
        let globals = Environment::new_global();
        globals.borrow_mut().define("a", Value::Number(1.0));
        let first = Environment::new_enclosed(&globals);
        let second = Environment::new_enclosed(&globals);
        first
            .borrow_mut()
            .assign(&ident("a"), Value::Number(5.0))
            .unwrap();
        assert_eq!(second.borrow().get(&ident("a")).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_resolved_access() {
        let globals = Environment::new_global();
        let outer = Environment::new_enclosed(&globals);
        outer.borrow_mut().define("a", Value::Number(1.0));
        let inner = Environment::new_enclosed(&outer);
        inner.borrow_mut().define("a", Value::Number(2.0));

        assert_eq!(Environment::get_at(&inner, 0, &ident("a")).unwrap(), Value::Number(2.0));
        assert_eq!(Environment::get_at(&inner, 1, &ident("a")).unwrap(), Value::Number(1.0));

        Environment::assign_at(&inner, 1, &ident("a"), Value::Number(3.0)).unwrap();
        assert_eq!(outer.borrow().get(&ident("a")).unwrap(), Value::Number(3.0));
        assert_eq!(Environment::get_at(&inner, 0, &ident("a")).unwrap(), Value::Number(2.0));

        // the resolved path does not fall back to walking the chain
        assert!(Environment::get_at(&inner, 2, &ident("a")).is_err());
        assert!(Environment::get_at(&inner, 5, &ident("a")).is_err());
    }
}
