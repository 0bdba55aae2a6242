//! Converts source text into [`Token`]s.

use logos::{Lexer, Logos, Skip};
use lox_source::{Source, SyntaxError};
use tracing::debug;

use crate::token::{Literal, Token, TokenKind};

#[derive(Debug, Clone, Copy)]
pub struct LexerExtras {
    /// Current line, starting at `1`.
    pub line: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LexicalError {
    #[default]
    UnexpectedCharacter,
    UnterminatedString,
}

/// Raw lexemes recognized by the generated lexer.
/// Keywords are not distinguished here; see [`TokenKind::keyword`].
#[derive(Debug, Logos, Clone, PartialEq)]
#[logos(extras = LexerExtras)]
#[logos(error = LexicalError)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"//[^\n]*")] // single line comments
enum RawToken {
    // punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token(";")]
    Semicolon,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,

    // operators
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,

    // literals
    #[token("\"", string)]
    String(String),
    #[regex("[0-9]+", number)]
    Number(f64),

    // identifiers (and keywords)
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    #[token("\n", |lex| {
        lex.extras.line += 1;
        Skip
    })]
    Newline,
}

/// Consumes the string body up to and including the closing quote.
fn string(lex: &mut Lexer<'_, RawToken>) -> Result<String, LexicalError> {
    let rest = lex.remainder();
    match rest.find('"') {
        Some(end) => {
            let body = &rest[..end];
            lex.bump(end + 1);
            lex.extras.line += body.matches('\n').count();
            Ok(body.to_string())
        }
        None => {
            // The string swallows everything up to the end of input.
            lex.bump(rest.len());
            lex.extras.line += rest.matches('\n').count();
            Err(LexicalError::UnterminatedString)
        }
    }
}

/// Extends the integer part with a fractional part, but only if a digit follows the `.`.
fn number(lex: &mut Lexer<'_, RawToken>) -> Option<f64> {
    let rest = lex.remainder().as_bytes();
    if rest.first() == Some(&b'.') && rest.get(1).map_or(false, |b| b.is_ascii_digit()) {
        let fraction = rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
        lex.bump(1 + fraction);
    }
    lex.slice().parse().ok()
}

pub struct Scanner<'a> {
    lexer: Lexer<'a, RawToken>,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self {
            lexer: RawToken::lexer_with_extras(source.content, LexerExtras::default()),
            source,
        }
    }

    /// Scans the whole source. The result always ends with a [`TokenKind::Eof`] token.
    /// Errors are reported to the [`Source`] and never stop the scan.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(raw) = self.lexer.next() {
            match raw {
                Ok(raw) => tokens.push(self.make_token(raw)),
                Err(err) => self.error(err),
            }
        }

        tokens.push(Token::new(TokenKind::Eof, "", None, self.lexer.extras.line));
        debug!(count = tokens.len(), "scanned tokens");
        tokens
    }

    fn make_token(&self, raw: RawToken) -> Token {
        let lexeme = self.lexer.slice();
        let (kind, literal) = match raw {
            RawToken::LeftParen => (TokenKind::LeftParen, None),
            RawToken::RightParen => (TokenKind::RightParen, None),
            RawToken::LeftBrace => (TokenKind::LeftBrace, None),
            RawToken::RightBrace => (TokenKind::RightBrace, None),
            RawToken::Comma => (TokenKind::Comma, None),
            RawToken::Dot => (TokenKind::Dot, None),
            RawToken::Minus => (TokenKind::Minus, None),
            RawToken::Plus => (TokenKind::Plus, None),
            RawToken::Semicolon => (TokenKind::Semicolon, None),
            RawToken::Slash => (TokenKind::Slash, None),
            RawToken::Star => (TokenKind::Star, None),
            RawToken::Bang => (TokenKind::Bang, None),
            RawToken::BangEqual => (TokenKind::BangEqual, None),
            RawToken::Equal => (TokenKind::Equal, None),
            RawToken::EqualEqual => (TokenKind::EqualEqual, None),
            RawToken::Greater => (TokenKind::Greater, None),
            RawToken::GreaterEqual => (TokenKind::GreaterEqual, None),
            RawToken::Less => (TokenKind::Less, None),
            RawToken::LessEqual => (TokenKind::LessEqual, None),
            RawToken::String(val) => (TokenKind::String, Some(Literal::Str(val))),
            RawToken::Number(val) => (TokenKind::Number, Some(Literal::Number(val))),
            RawToken::Identifier => (
                TokenKind::keyword(lexeme).unwrap_or(TokenKind::Identifier),
                None,
            ),
            RawToken::Newline => unreachable!("newlines are skipped"),
        };
        Token::new(kind, lexeme, literal, self.lexer.extras.line)
    }

    fn error(&mut self, err: LexicalError) {
        let line = self.lexer.extras.line;
        let message = match err {
            LexicalError::UnterminatedString => "Unterminated string.".to_string(),
            LexicalError::UnexpectedCharacter => {
                let span = self.lexer.span();
                match self.source.content.get(span.start..).and_then(|s| s.chars().next()) {
                    Some(c) => {
                        // Skip the whole character, not just its first byte.
                        let char_end = span.start + c.len_utf8();
                        if char_end > span.end {
                            self.lexer.bump(char_end - span.end);
                        }
                        format!("Unexpected character '{}'.", c)
                    }
                    None => "Unexpected character.".to_string(),
                }
            }
        };
        self.source.errors.add_error(SyntaxError::scan(message, line));
    }
}

/// Scans `source` into a token sequence terminated by [`TokenKind::Eof`].
pub fn scan(source: &Source) -> Vec<Token> {
    Scanner::new(source).scan_tokens()
}
