//! Tree-walking evaluation of resolved Lox programs.

pub mod builtin_functions;
pub mod interpreter;

pub use interpreter::{Completion, Interpreter};
