use std::fmt;
use std::rc::Rc;

use lox_parser::ast::FunctionDecl;

use crate::{EnvRef, Value};

pub type NativeFnPtr = fn(&[Value]) -> Value;

#[derive(Clone)]
pub struct NativeFn {
    pub ident: &'static str,
    pub arity: usize,
    pub func: NativeFnPtr,
}

/// A user defined function together with the environment it was declared in.
#[derive(Clone)]
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: EnvRef,
}

impl Function {
    /// Number of arguments that the function accepts.
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn ident(&self) -> &str {
        &self.declaration.name.lexeme
    }
}

#[derive(Clone)]
pub enum Obj {
    Str(String),
    Fn(Function),
    NativeFn(NativeFn),
}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obj::Str(string) => write!(f, "{}", string),
            Obj::Fn(function) => write!(f, "<fn {}>", function.ident()),
            Obj::NativeFn(_) => write!(f, "<native fn>"),
        }
    }
}
