//! Scanning, parsing and printing of Lox source code.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;
