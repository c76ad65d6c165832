//! Command grouping. Turns the token stream into launchable commands.
//!
//! ```text
//! "echo hi ; sleep 1 &\n"
//!    │
//!    ▼ Tokenizer
//! Arg(echo) Arg(hi) Semi Arg(sleep) Arg(1) Amp Eol
//!    │
//!    ▼ CommandStream
//! Command { argv: [echo, hi], mode: Foreground }
//! Command { argv: [sleep, 1], mode: Background }
//! ```
//!
//! Commands are produced lazily, one per terminator, so the kernel runs each
//! command before the rest of the line is grouped. Empty commands (a
//! terminator with no arguments in front of it) are skipped silently.

use std::fmt;

use thiserror::Error;

use crate::lexer::{LexerError, Spanned, Token, Tokenizer};

/// How a command is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Wait for the command before reading on.
    Foreground,
    /// Start the command and continue immediately.
    Background,
}

impl LaunchMode {
    /// The mode selected by a terminator token.
    fn for_terminator(token: &Token) -> Self {
        match token {
            Token::Amp => LaunchMode::Background,
            _ => LaunchMode::Foreground,
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Foreground => write!(f, "foreground"),
            LaunchMode::Background => write!(f, "background"),
        }
    }
}

/// One command ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Program name followed by its arguments. Never empty.
    pub argv: Vec<String>,
    /// Foreground or background.
    pub mode: LaunchMode,
    /// The slice of the input line covering the arguments, for job listings.
    pub text: String,
}

impl Command {
    /// The program name.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Errors found while grouping a line into commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("smallsh: {error} at byte {offset}")]
    Lex { error: LexerError, offset: usize },
    #[error("smallsh: too many arguments (limit {limit})")]
    TooManyArgs { limit: usize },
}

/// Lazy iterator of commands in one line.
pub struct CommandStream<'a> {
    line: &'a str,
    tokens: Tokenizer<'a>,
    max_args: usize,
    finished: bool,
}

impl<'a> CommandStream<'a> {
    /// Group `line` into commands of at most `max_args` arguments each.
    pub fn new(line: &'a str, max_args: usize) -> Self {
        Self {
            line,
            tokens: Tokenizer::new(line),
            max_args,
            finished: false,
        }
    }

    fn command_text(&self, first: &Spanned<Token>, last: &Spanned<Token>) -> String {
        self.line[first.span.start..last.span.end].to_string()
    }
}

impl Iterator for CommandStream<'_> {
    type Item = Result<Command, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut argv: Vec<String> = Vec::new();
        let mut first: Option<Spanned<Token>> = None;
        let mut last: Option<Spanned<Token>> = None;
        let mut overflow = false;

        while !self.finished {
            let spanned = match self.tokens.next() {
                Some(Ok(spanned)) => spanned,
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(SyntaxError::Lex {
                        error: err.token,
                        offset: err.span.start,
                    }));
                }
                None => {
                    self.finished = true;
                    break;
                }
            };

            match &spanned.token {
                Token::Arg(word) => {
                    if argv.len() < self.max_args {
                        argv.push(word.clone());
                    } else {
                        overflow = true;
                    }
                    if first.is_none() {
                        first = Some(spanned.clone());
                    }
                    last = Some(spanned);
                }
                terminator => {
                    if *terminator == Token::Eol {
                        self.finished = true;
                    }

                    if overflow {
                        return Some(Err(SyntaxError::TooManyArgs {
                            limit: self.max_args,
                        }));
                    }

                    if let (Some(first), Some(last)) = (&first, &last) {
                        let text = self.command_text(first, last);
                        return Some(Ok(Command {
                            argv,
                            mode: LaunchMode::for_terminator(terminator),
                            text,
                        }));
                    }
                    // Empty command: keep scanning the rest of the line.
                }
            }
        }

        None
    }
}
