use crate::ast::{Expr, Stmt};
use crate::lexer::scan;
use crate::token::{Token, TokenKind};
use lox_source::{ErrorKind, Location, Source, SyntaxError};
use tracing::debug;

mod expr;
mod stmt;

/// Maximum number of arguments in a call (and parameters in a declaration).
pub const MAX_ARGS: usize = 255;

/// Marker for a grammar violation that has already been reported to the [`Source`].
/// Unwinds the parser to the enclosing declaration, which then resynchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError;

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    /// Index of the current (not yet consumed) token.
    current: usize,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over an already scanned token sequence.
    pub fn new(mut tokens: Vec<Token>, source: &'a Source<'a>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::new(TokenKind::Eof, "", None, line));
        }
        Self {
            tokens,
            current: 0,
            source,
        }
    }

    /// Scans `source` and creates a parser over the result.
    pub fn from_source(source: &'a Source<'a>) -> Self {
        Self::new(scan(source), source)
    }
}

impl<'a> Parser<'a> {
    /// Parses declarations until the end of input.
    /// Malformed declarations are reported to the [`Source`] and left out of the result.
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
        }
        debug!(count = statements.len(), "parsed statements");
        statements
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    /// Predicate that tests whether the current token is one of `kinds` and eats it if yes as a side effect.
    fn eat(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Eats a token of `kind` or reports `message` at the current token.
    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn error_at_current(&self, message: &str) -> ParseError {
        self.error(self.peek(), message)
    }

    /// Reports a parse error at `token`.
    fn error(&self, token: &Token, message: &str) -> ParseError {
        let location = match token.kind {
            TokenKind::Eof => Location::AtEnd,
            _ => Location::AtLexeme(token.lexeme.clone()),
        };
        self.source.errors.add_error(SyntaxError::new(
            ErrorKind::Parse,
            message,
            token.line,
            location,
        ));
        ParseError
    }

    /// Discards tokens until a probable statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }

            self.advance();
        }
    }
}
