//! Runs Lox source code through the whole pipeline: scan, parse, resolve, interpret.

use std::io::{self, Write};

use lox_interp::Interpreter;
use lox_parser::parser::Parser;
use lox_passes::resolve::Resolver;
use lox_source::{Source, SyntaxError};
use lox_value::RuntimeError;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoxError {
    /// Scan, parse or resolve errors. The program was not run.
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<SyntaxError>),
    #[error("{0}\n[line {}]", .0.line())]
    Runtime(#[from] RuntimeError),
}

/// An interpreter that outlives individual pieces of source code,
/// so that declarations made by one [`Session::run`] are visible to the next.
pub struct Session<W: Write = io::Stdout> {
    interpreter: Interpreter<W>,
}

impl Session<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Session<W> {
    pub fn new(out: W) -> Self {
        Self {
            interpreter: Interpreter::new(out),
        }
    }

    /// Runs `source`. Nothing is executed if it has any syntax error.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let source = Source::new(source);
        let program = Parser::from_source(&source).parse_program();

        let mut resolver = Resolver::new(&source);
        resolver.resolve_program(&program);
        if !source.has_no_errors() {
            debug!(errors = source.errors.len(), "not running program with syntax errors");
            return Err(LoxError::Syntax(source.errors.to_vec()));
        }

        self.interpreter
            .interpret(&program, resolver.into_resolved_locals())?;
        Ok(())
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    #[must_use]
    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}

/// Runs `source` in a fresh session and returns everything it printed.
pub fn interpret(source: &str) -> Result<String, LoxError> {
    let mut session = Session::new(Vec::new());
    session.run(source)?;
    Ok(String::from_utf8_lossy(&session.into_output()).into_owned())
}
