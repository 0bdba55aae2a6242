use std::io;

use lox_parser::token::Token;
use thiserror::Error;

/// Errors raised while evaluating a program. Every error aborts the run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    OperandMustBeNumber { operator: Token },
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers { operator: Token },
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings { operator: Token },
    #[error("Undefined variable '{}'.", .name.lexeme)]
    UndefinedVariable { name: Token },
    #[error("Can only call functions and classes.")]
    NotCallable { paren: Token },
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        paren: Token,
        expected: usize,
        got: usize,
    },
    #[error("Could not write output: {source}")]
    Output {
        keyword: Token,
        #[source]
        source: io::Error,
    },
}

impl RuntimeError {
    /// The token the error is reported at.
    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::OperandMustBeNumber { operator }
            | RuntimeError::OperandsMustBeNumbers { operator }
            | RuntimeError::OperandsMustBeNumbersOrStrings { operator } => operator,
            RuntimeError::UndefinedVariable { name } => name,
            RuntimeError::NotCallable { paren } | RuntimeError::ArityMismatch { paren, .. } => {
                paren
            }
            RuntimeError::Output { keyword, .. } => keyword,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }
}
