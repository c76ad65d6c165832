//! Error types for process control.

use std::io;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use thiserror::Error;

/// Failures from the process-control layer.
///
/// None of these is fatal to the interpreter: each is reported for the
/// command that caused it and the prompt comes back.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be executed (not found, not executable, ...).
    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The system refused to create a child (process or memory limits).
    #[error("smallsh: cannot create process: {0}")]
    Spawn(#[source] io::Error),

    /// Delivering a signal to a process group failed.
    #[error("cannot send {signal} to process group {pgid}: {source}")]
    Signal {
        pgid: Pid,
        signal: Signal,
        #[source]
        source: Errno,
    },

    /// Waiting on a process group failed.
    #[error("cannot wait for process group {pgid}: {source}")]
    Wait {
        pgid: Pid,
        #[source]
        source: Errno,
    },

    /// Moving terminal ownership failed.
    #[error("terminal control: {0}")]
    Terminal(#[source] Errno),

    /// The blocking wait task was lost.
    #[error("wait task failed: {0}")]
    WaitTask(#[from] tokio::task::JoinError),
}

impl ProcessError {
    /// Exit code reported for this failure, following shell conventions.
    pub fn exit_code(&self) -> i64 {
        match self {
            ProcessError::Exec { source, .. } if source.kind() == io::ErrorKind::NotFound => 127,
            ProcessError::Exec { .. } => 126,
            _ => 1,
        }
    }
}

/// Result alias for process-control operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_error_names_the_program() {
        let err = ProcessError::Exec {
            program: "nosuchprog".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("nosuchprog: "));
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn permission_denied_is_126() {
        let err = ProcessError::Exec {
            program: "/etc/passwd".to_string(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.exit_code(), 126);
    }

    #[test]
    fn signal_error_mentions_group() {
        let err = ProcessError::Signal {
            pgid: Pid::from_raw(4242),
            signal: Signal::SIGKILL,
            source: Errno::EPERM,
        };
        let text = err.to_string();
        assert!(text.contains("4242"), "{text}");
        assert!(text.contains("SIGKILL"), "{text}");
    }
}
