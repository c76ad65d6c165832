//! Process control: the seam between the job engine and the OS.
//!
//! The kernel never calls `fork`, `kill` or `waitpid` directly. Everything
//! goes through [`ProcessControl`], which has one real implementation
//! ([`UnixProcessControl`]) and a recording fake for tests.
//!
//! ```text
//! Launcher / builtins / SignalRelay
//!              │
//!              ▼
//!       ProcessControl
//!   ┌──────────┴───────────┐
//!   │                      │
//! UnixProcessControl   FakeProcessControl (tests)
//! (std Command + nix)
//! ```

mod unix;

#[cfg(test)]
pub mod testing;

use std::io;

use nix::sys::signal::Signal;
use nix::unistd::Pid;

use crate::dispatch::LaunchMode;
use crate::error::{ProcessError, ProcessResult};

pub use unix::UnixProcessControl;

/// A state change of a child process or process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Exited normally with a status code.
    Exited(i32),
    /// Killed by a signal.
    Signaled(Signal),
    /// Stopped by a signal (Ctrl-Z, SIGTTIN, SIGSTOP, ...).
    Stopped(Signal),
    /// Resumed by SIGCONT.
    Continued,
}

impl WaitOutcome {
    /// Shell-style exit code: the status for an exit, `128 + signo` otherwise.
    pub fn exit_code(&self) -> i64 {
        match self {
            WaitOutcome::Exited(code) => *code as i64,
            WaitOutcome::Signaled(sig) | WaitOutcome::Stopped(sig) => 128 + *sig as i64,
            WaitOutcome::Continued => 0,
        }
    }

    /// True once the process is gone for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WaitOutcome::Exited(_) | WaitOutcome::Signaled(_))
    }
}

/// A state change reported by a non-blocking sweep of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildEvent {
    pub pid: Pid,
    pub outcome: WaitOutcome,
}

/// OS primitives the job engine needs.
///
/// `wait_group` blocks; callers on the async path run it on the blocking
/// pool.
pub trait ProcessControl: Send + Sync {
    /// Start `argv` as the leader of a new process group and return its pid,
    /// which is also the group id. A foreground child claims the terminal
    /// for its group before exec when job control is active.
    fn spawn(&self, argv: &[String], mode: LaunchMode) -> ProcessResult<Pid>;

    /// Send `signal` to every process in the group.
    fn signal_group(&self, pgid: Pid, signal: Signal) -> ProcessResult<()>;

    /// Block until a member of the group exits, dies or stops.
    fn wait_group(&self, pgid: Pid) -> ProcessResult<WaitOutcome>;

    /// Collect every pending child state change without blocking.
    fn poll_children(&self) -> Vec<ChildEvent>;

    /// Make `pgid` the terminal's foreground group. No-op without job control.
    fn give_terminal(&self, pgid: Pid) -> ProcessResult<()>;

    /// Take the terminal back for the interpreter. No-op without job control.
    fn reclaim_terminal(&self) -> ProcessResult<()>;
}

/// Sort a failed spawn into "could not create a child" versus "could not
/// run this program".
pub(crate) fn classify_spawn_error(program: &str, err: io::Error) -> ProcessError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory => ProcessError::Spawn(err),
        _ => ProcessError::Exec {
            program: program.to_string(),
            source: err,
        },
    }
}
