//! smallsh REPL: the interactive front end.
//!
//! This REPL drives the smallsh kernel one line at a time.
//! It handles:
//! - Prompting and line acquisition (rustyline on a terminal, plain reads otherwise)
//! - The line length limit
//! - Printing each command's output as soon as it completes
//! - Reporting finished background jobs before each prompt
//! - Command history via rustyline

pub mod reader;

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use smallsh_kernel::{ExecResult, Kernel, KernelConfig};

pub use reader::{BufReadSource, EditorSource, LineSource, ReadOutcome};

/// REPL configuration and state.
pub struct Repl {
    kernel: Kernel,
    runtime: Runtime,
    prompt: String,
    max_line_len: usize,
    last_code: i64,
    relay: Option<JoinHandle<()>>,
}

impl Repl {
    /// Create a REPL for an interactive terminal session.
    pub fn new() -> Result<Self> {
        Self::with_config(KernelConfig::interactive())
    }

    /// Create a new REPL with a custom kernel configuration.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        // Create tokio runtime for async kernel execution
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let prompt = config.prompt.clone();
        let max_line_len = config.max_line_len;
        let kernel = Kernel::new(config);

        Ok(Self {
            kernel,
            runtime,
            prompt,
            max_line_len,
            last_code: 0,
            relay: None,
        })
    }

    /// Catch Ctrl-C and Ctrl-Z for the rest of the session and forward them
    /// to the foreground job.
    pub fn install_signal_relay(&mut self) -> Result<()> {
        if self.relay.is_none() {
            let _guard = self.runtime.enter();
            self.relay = Some(self.kernel.install_signal_relay()?);
        }
        Ok(())
    }

    /// The kernel behind this REPL.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Exit status of the last command.
    pub fn last_code(&self) -> i64 {
        self.last_code
    }

    /// Process a single line of input and collect what it printed.
    ///
    /// Returns None when the line produced no output.
    pub fn process_line(&mut self, line: &str) -> Option<String> {
        let result = self.runtime.block_on(self.kernel.execute(line));
        self.last_code = result.code;

        let output = format!("{}{}", result.out, result.err);
        if output.is_empty() { None } else { Some(output) }
    }

    /// Run a single line, printing each command's output as it completes.
    pub fn run_line(&mut self, line: &str) -> i64 {
        let result = self
            .runtime
            .block_on(self.kernel.execute_streaming(line, &mut print_result));
        self.last_code = result.code;
        result.code
    }

    /// Prompt-cycle maintenance. Returns notices about finished jobs.
    pub fn poll(&mut self) -> Vec<String> {
        self.runtime.block_on(self.kernel.poll())
    }

    /// Read and run lines from `source` until end of input.
    ///
    /// Returns the status of the last command run.
    pub fn run_loop(&mut self, source: &mut dyn LineSource) -> Result<i64> {
        loop {
            for notice in self.poll() {
                print!("{notice}");
            }

            match source.read_line(&self.prompt, self.max_line_len)? {
                ReadOutcome::Line(line) => {
                    self.run_line(&line);
                }
                ReadOutcome::TooLong => eprintln!("smallsh: input line too long"),
                ReadOutcome::NotUtf8 => eprintln!("smallsh: input line is not valid UTF-8"),
                ReadOutcome::Interrupted => println!("^C"),
                ReadOutcome::Eof => break,
            }
        }

        Ok(self.last_code)
    }
}

/// Print a result's output streams.
fn print_result(result: &ExecResult) {
    if !result.out.is_empty() {
        print!("{}", result.out);
        let _ = io::stdout().flush();
    }
    if !result.err.is_empty() {
        eprint!("{}", result.err);
    }
}

/// Run the interactive REPL on stdin. Returns at end of input.
pub fn run() -> Result<()> {
    let mut repl = Repl::new()?;
    repl.install_signal_relay()?;

    if io::stdin().is_terminal() {
        let mut editor = EditorSource::new()?;
        let result = repl.run_loop(&mut editor);
        editor.save_history();
        result?;
    } else {
        let stdin = io::stdin();
        let mut source = BufReadSource::new(stdin.lock(), true);
        repl.run_loop(&mut source)?;
    }

    Ok(())
}
