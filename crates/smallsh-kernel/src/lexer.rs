//! Lexer for smallsh command lines.
//!
//! Converts one input line into a stream of tokens using the logos lexer
//! generator. The grammar is deliberately tiny:
//!
//! - **Terminators**: newline (end of line), `&` (background), `;` (sequence)
//! - **Arguments**: any run of characters that are not whitespace or a
//!   terminator
//!
//! Spaces and tabs separate tokens and produce nothing. There is no quoting
//! or escaping, so an argument can never contain whitespace, `&` or `;`.
//! Arguments are owned `String`s and grow with the input; the only bound on
//! their size is the line length limit enforced by the reader.
//!
//! A NUL byte is the one character rejected: no argument containing it can
//! be passed to exec.

use logos::{Logos, Span};
use std::fmt;

/// A token with its span in the source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexerError {
    /// The only byte no rule matches.
    #[default]
    NulByte,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::NulByte => write!(f, "NUL byte in command line"),
        }
    }
}

impl std::error::Error for LexerError {}

/// Tokens produced by the smallsh lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexerError)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    /// End of the input line.
    #[token("\n")]
    Eol,

    /// `&`: ends a command and runs it detached.
    #[token("&")]
    Amp,

    /// `;`: ends a command and runs it in the foreground.
    #[token(";")]
    Semi,

    /// A plain word: program name or argument.
    #[regex(r"[^ \t\n&;\x00]+", |lex| lex.slice().to_string())]
    Arg(String),
}

impl Token {
    /// True for the three tokens that close a command.
    pub fn is_terminator(&self) -> bool {
        !matches!(self, Token::Arg(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eol => write!(f, "end of line"),
            Token::Amp => write!(f, "&"),
            Token::Semi => write!(f, ";"),
            Token::Arg(s) => write!(f, "{}", s),
        }
    }
}

/// Streaming tokenizer over a single line.
///
/// Yields tokens up to and including the first end of line. A line without a
/// trailing newline still ends with an `Eol` token spanning the empty range at
/// the end of the buffer, so consumers always see a final terminator. Nothing
/// after the first newline is read.
pub struct Tokenizer<'a> {
    inner: logos::SpannedIter<'a, Token>,
    len: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            inner: Token::lexer(line).spanned(),
            len: line.len(),
            done: false,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Spanned<Token>, Spanned<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.next() {
            Some((Ok(token), span)) => {
                if token == Token::Eol {
                    self.done = true;
                }
                Some(Ok(Spanned::new(token, span)))
            }
            Some((Err(err), span)) => {
                self.done = true;
                Some(Err(Spanned::new(err, span)))
            }
            None => {
                self.done = true;
                Some(Ok(Spanned::new(Token::Eol, self.len..self.len)))
            }
        }
    }
}

/// Tokenize a line into a vector of spanned tokens.
///
/// Returns errors with their positions for error messages.
pub fn tokenize(line: &str) -> Result<Vec<Spanned<Token>>, Vec<Spanned<LexerError>>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Tokenizer::new(line) {
        match item {
            Ok(token) => tokens.push(token),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
