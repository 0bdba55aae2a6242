pub mod environment;
pub mod error;
pub mod object;

use std::fmt;
use std::rc::Rc;

use lox_parser::token::Literal;

pub use environment::{EnvRef, Environment};
pub use error::RuntimeError;

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Object(Rc<object::Obj>),
}

impl Value {
    pub fn new_string(string: impl Into<String>) -> Self {
        Self::Object(Rc::new(object::Obj::Str(string.into())))
    }

    /// Attempts to cast the `Value` into a `&str` or `None` if wrong type.
    pub fn cast_to_str(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => match &**obj {
                object::Obj::Str(string) => Some(string),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn cast_to_number(&self) -> Option<f64> {
        match self {
            Self::Number(val) => Some(*val),
            _ => None,
        }
    }

    /// `nil` and `false` are falsey, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(val) => Value::Number(*val),
            Literal::Str(val) => Value::new_string(val.as_str()),
            Literal::Bool(val) => Value::Bool(*val),
            Literal::Nil => Value::Nil,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Object(l), Value::Object(r)) => match (&**l, &**r) {
                (object::Obj::Str(l), object::Obj::Str(r)) => l == r,
                // functions are only equal to themselves
                _ => Rc::ptr_eq(l, r),
            },
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(val) => write!(f, "{}", val),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Object(val) => write!(f, "{}", val),
        }
    }
}

/// Closures can reach their own environment, so `Debug` must not recurse into it.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
