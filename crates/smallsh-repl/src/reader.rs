//! Line acquisition for the REPL.
//!
//! Two sources: a rustyline editor for terminals and a plain buffered
//! reader for pipes and script files. Both enforce the line length limit,
//! which counts the terminating newline.

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

/// What one read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line, without its newline.
    Line(String),
    /// The line exceeded the limit and was discarded.
    TooLong,
    /// The line was not valid UTF-8 and was discarded.
    NotUtf8,
    /// Ctrl-C at the prompt.
    Interrupted,
    /// End of input.
    Eof,
}

/// A source of input lines.
pub trait LineSource {
    /// Show `prompt` and read one line of at most `max_len` bytes,
    /// newline included.
    fn read_line(&mut self, prompt: &str, max_len: usize) -> Result<ReadOutcome>;
}

/// True if a line of `len` bytes plus its newline exceeds `max_len`.
fn exceeds(len: usize, max_len: usize) -> bool {
    len + 1 > max_len
}

/// Interactive source backed by rustyline, with persistent history.
pub struct EditorSource {
    editor: Editor<(), DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl EditorSource {
    /// Create an editor and load history from the user's data directory.
    pub fn new() -> Result<Self> {
        let mut editor: Editor<(), DefaultHistory> =
            Editor::new().context("Failed to create editor")?;

        let history_path = directories::BaseDirs::new()
            .map(|b| b.data_dir().join("smallsh").join("history.txt"));

        if let Some(path) = &history_path
            && let Err(e) = editor.load_history(path)
        {
            // Only log if it's not a "file not found" error (expected on first run)
            let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound);
            if !is_not_found {
                tracing::warn!("Failed to load history: {}", e);
            }
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Save history to disk.
    pub fn save_history(&mut self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("Failed to create history directory: {}", e);
        }
        if let Err(e) = self.editor.save_history(path) {
            tracing::warn!("Failed to save history: {}", e);
        }
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str, max_len: usize) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if exceeds(line.len(), max_len) {
                    return Ok(ReadOutcome::TooLong);
                }
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e).context("failed to read line"),
        }
    }
}

/// Source over any buffered reader (stdin pipe, script file, test buffer).
///
/// Never buffers more than `max_len` bytes of one line: the rest of an
/// overlong line is skipped up to its newline.
pub struct BufReadSource<R> {
    reader: R,
    show_prompt: bool,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R, show_prompt: bool) -> Self {
        Self {
            reader,
            show_prompt,
        }
    }

    /// Discard input up to and including the next newline.
    fn skip_line(&mut self) -> io::Result<()> {
        let mut sink = Vec::new();
        loop {
            sink.clear();
            let n = Read::take(&mut self.reader, 4096).read_until(b'\n', &mut sink)?;
            if n == 0 || sink.last() == Some(&b'\n') {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, prompt: &str, max_len: usize) -> Result<ReadOutcome> {
        if self.show_prompt {
            print!("{prompt}");
            io::stdout().flush().context("failed to flush prompt")?;
        }

        let mut buf = Vec::with_capacity(max_len.min(4096));
        let n = Read::take(&mut self.reader, max_len as u64)
            .read_until(b'\n', &mut buf)
            .context("failed to read line")?;

        if n == 0 {
            return Ok(ReadOutcome::Eof);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        } else if n == max_len {
            // Limit reached without a newline.
            self.skip_line().context("failed to discard long line")?;
            return Ok(ReadOutcome::TooLong);
        }

        // A final line without a newline still counts one byte for it.
        if exceeds(buf.len(), max_len) {
            return Ok(ReadOutcome::TooLong);
        }

        // Arguments go to exec unchanged, so no lossy repair.
        match String::from_utf8(buf) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(_) => Ok(ReadOutcome::NotUtf8),
        }
    }
}
