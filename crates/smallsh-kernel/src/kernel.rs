//! The Kernel, the heart of smallsh.
//!
//! The Kernel owns and coordinates all core components:
//! - Tool registry (the job-control built-ins)
//! - Job manager (the job table)
//! - Launcher (process groups and foreground waits)
//! - Foreground register and stop notice shared with the signal relay
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          Kernel                            │
//! │  line ─▶ CommandStream ─▶ dispatch ─┬─▶ ToolRegistry       │
//! │                                     └─▶ Launcher           │
//! │  ┌──────────────────────────────┐  ┌──────────────────┐    │
//! │  │  JobManager (job table)      │  │  SignalRelay     │    │
//! │  └──────────────────────────────┘  └──────────────────┘    │
//! │          ▲  ForegroundGroup / StopNotice (atomics) ▲       │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use nix::unistd::Pid;
use tokio::task::JoinHandle;

use smallsh_types::ExecResult;

use crate::dispatch::{Command, CommandStream};
use crate::process::{ProcessControl, UnixProcessControl};
use crate::scheduler::{JobManager, Launcher};
use crate::signal::{ForegroundGroup, SignalRelay, StopNotice};
use crate::tools::{ExecContext, ToolRegistry, ToolSchema, register_builtins};

/// Longest accepted input line, in bytes, including the newline.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Most arguments one command may carry, program name included.
pub const DEFAULT_MAX_ARGS: usize = 512;

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Name of this kernel (for identification).
    pub name: String,

    /// Prompt printed before each read.
    pub prompt: String,

    /// Longest accepted input line, newline included. Enforced by the reader.
    pub max_line_len: usize,

    /// Most arguments per command.
    pub max_args: usize,

    /// Hand the terminal to foreground groups.
    ///
    /// Only takes effect when stdin is a terminal.
    pub job_control: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            prompt: "Command> ".to_string(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_args: DEFAULT_MAX_ARGS,
            job_control: false,
        }
    }
}

impl KernelConfig {
    /// Config for an interactive session on a terminal.
    pub fn interactive() -> Self {
        Self {
            name: "repl".to_string(),
            job_control: true,
            ..Self::default()
        }
    }

    /// Create a kernel config with the given name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn with_max_args(mut self, max_args: usize) -> Self {
        self.max_args = max_args;
        self
    }

    pub fn with_job_control(mut self, job_control: bool) -> Self {
        self.job_control = job_control;
        self
    }
}

/// The command interpreter core.
pub struct Kernel {
    name: String,
    max_args: usize,
    tools: Arc<ToolRegistry>,
    jobs: Arc<JobManager>,
    launcher: Arc<Launcher>,
    foreground: Arc<ForegroundGroup>,
    stops: Arc<StopNotice>,
    control: Arc<dyn ProcessControl>,
    exec_ctx: ExecContext,
}

impl Kernel {
    /// Create a kernel driving real processes.
    pub fn new(config: KernelConfig) -> Self {
        let control = Arc::new(UnixProcessControl::new(config.job_control));
        Self::with_control(config, control)
    }

    /// Create a kernel over a custom process-control implementation.
    pub fn with_control(config: KernelConfig, control: Arc<dyn ProcessControl>) -> Self {
        let jobs = Arc::new(JobManager::new());
        let foreground = Arc::new(ForegroundGroup::new());
        let stops = Arc::new(StopNotice::new());
        let launcher = Arc::new(Launcher::new(
            control.clone(),
            jobs.clone(),
            foreground.clone(),
            stops.clone(),
        ));

        let mut tools = ToolRegistry::new();
        register_builtins(&mut tools);

        let exec_ctx = ExecContext::new(jobs.clone(), launcher.clone());

        Self {
            name: config.name,
            max_args: config.max_args,
            tools: Arc::new(tools),
            jobs,
            launcher,
            foreground,
            stops,
            control,
            exec_ctx,
        }
    }

    /// Execute one input line and return the aggregate result.
    pub async fn execute(&self, line: &str) -> ExecResult {
        self.execute_streaming(line, &mut |_| {}).await
    }

    /// Execute one input line with a per-command callback.
    ///
    /// Each command's result is passed to `on_output` as soon as it
    /// completes, so a background launch notice prints before the next
    /// command on the same line runs. The returned aggregate carries the
    /// last command's exit code.
    #[tracing::instrument(level = "debug", skip(self, on_output), fields(kernel = %self.name, line_len = line.len()))]
    pub async fn execute_streaming(
        &self,
        line: &str,
        on_output: &mut dyn FnMut(&ExecResult),
    ) -> ExecResult {
        let mut total = ExecResult::default();

        for item in CommandStream::new(line, self.max_args) {
            let result = match item {
                Ok(command) => self.dispatch(&command).await,
                Err(e) => ExecResult::failure(2, format!("{}\n", e)),
            };
            on_output(&result);
            total.absorb(result);
        }

        total
    }

    /// Run one command: a built-in if one has the name, otherwise a child.
    pub async fn dispatch(&self, command: &Command) -> ExecResult {
        match self.tools.get(command.program()) {
            Some(tool) => {
                tracing::debug!(builtin = tool.name(), "dispatch");
                tool.execute(command.args(), &self.exec_ctx).await
            }
            None => self.launcher.launch(command).await,
        }
    }

    /// Prompt-cycle maintenance: reap children. Returns the notices to
    /// print before the next prompt.
    ///
    /// Stop notices are only applied when a foreground wait settles; one
    /// still pending here is stale and must not override a later `bg`.
    pub async fn poll(&self) -> Vec<String> {
        self.launcher.reap().await
    }

    /// A relay wired to this kernel's foreground register.
    pub fn signal_relay(&self) -> SignalRelay {
        SignalRelay::new(
            self.foreground.clone(),
            self.stops.clone(),
            self.control.clone(),
        )
    }

    /// Start relaying SIGINT and SIGTSTP to the foreground group.
    ///
    /// Must be called from within the runtime that executes lines.
    pub fn install_signal_relay(&self) -> Result<JoinHandle<()>> {
        let handle = self
            .signal_relay()
            .install()
            .context("failed to install signal relay")?;
        tracing::info!("signal relay installed");
        Ok(handle)
    }

    /// Get the job manager.
    pub fn jobs(&self) -> Arc<JobManager> {
        self.jobs.clone()
    }

    /// The process group currently waited on, if any.
    pub fn foreground(&self) -> Option<Pid> {
        self.foreground.get()
    }

    /// Get all tool schemas.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools.schemas()
    }
}
