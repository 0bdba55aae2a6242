//! Source code representation and error management.

use std::{cell::RefCell, fmt};

use thiserror::Error;

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Accumulated errors.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            errors: ErrorReporter::new(),
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// The compilation phase that produced a [`SyntaxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Scan,
    Parse,
    Resolve,
}

/// Where on the reported line the error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Only the line is known (scan errors).
    Nowhere,
    /// The offending token is the end of input.
    AtEnd,
    /// The offending token, by its lexeme.
    AtLexeme(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Nowhere => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::AtLexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// Represents a syntax error (compile time error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct SyntaxError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub location: Location,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `message` reported on `line`.
    pub fn new(kind: ErrorKind, message: impl ToString, line: usize, location: Location) -> Self {
        Self {
            kind,
            message: message.to_string(),
            line,
            location,
        }
    }

    pub fn scan(message: impl ToString, line: usize) -> Self {
        Self::new(ErrorKind::Scan, message, line, Location::Nowhere)
    }
}

/// Manages all the errors.
pub struct ErrorReporter {
    errors: RefCell<Vec<SyntaxError>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: SyntaxError) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    /// Returns a copy of the accumulated errors, in the order they were reported.
    pub fn to_vec(&self) -> Vec<SyntaxError> {
        self.errors.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.borrow();
        for error in errors.iter() {
            writeln!(f, "{}", error)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let source: Source = "print;".into();
        source.errors.add_error(SyntaxError::new(
            ErrorKind::Parse,
            "Expect expression.",
            1,
            Location::AtLexeme(";".to_string()),
        ));
        source.errors.add_error(SyntaxError::scan("Unexpected character '@'.", 2));
        source.errors.add_error(SyntaxError::new(
            ErrorKind::Parse,
            "Expect ';' after value.",
            3,
            Location::AtEnd,
        ));

        assert!(!source.has_no_errors());
        assert_eq!(source.errors.len(), 3);
        assert_eq!(
            source.errors.to_string(),
            "[line 1] Error at ';': Expect expression.\n\
             [line 2] Error: Unexpected character '@'.\n\
             [line 3] Error at end: Expect ';' after value.\n"
        );
    }
}
