//! smallsh-kernel: the job-control and execution engine of smallsh.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes command lines using logos
//! - **Dispatch**: Groups tokens into foreground/background commands
//! - **Scheduler**: The job table and the process-group launcher
//! - **Signal**: Relays Ctrl-C / Ctrl-Z to the foreground process group
//! - **Process**: The OS seam (spawn, signal, wait, terminal ownership)
//! - **Tools**: The `jobs`, `bg`, `fg` and `kill` built-ins

pub mod dispatch;
pub mod error;
pub mod kernel;
pub mod lexer;
pub mod process;
pub mod scheduler;
pub mod signal;
pub mod tools;

pub use dispatch::{Command, CommandStream, LaunchMode, SyntaxError};
pub use error::{ProcessError, ProcessResult};
pub use kernel::{DEFAULT_MAX_ARGS, DEFAULT_MAX_LINE_LEN, Kernel, KernelConfig};
pub use process::{ChildEvent, ProcessControl, UnixProcessControl, WaitOutcome};
pub use scheduler::{JobManager, JobTable, Launcher};
pub use signal::{ForegroundGroup, RelaySignal, SignalRelay, StopNotice};

// Shared value types, re-exported for embedders.
pub use smallsh_types::{ExecResult, JobId, JobInfo, JobStatus};

pub use nix::unistd::Pid;
