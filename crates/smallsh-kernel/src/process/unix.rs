//! Real process control on Unix: `std::process::Command` for spawning,
//! `nix` for signals, waits and terminal ownership.

use std::io::{self, IsTerminal};
use std::os::fd::BorrowedFd;
use std::os::unix::process::CommandExt;
use std::process::Command;

use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal, killpg};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{self, Pid};

use super::{ChildEvent, ProcessControl, WaitOutcome, classify_spawn_error};
use crate::dispatch::LaunchMode;
use crate::error::{ProcessError, ProcessResult};

/// Signals a child must see with their default disposition, whatever the
/// interpreter installed or ignored for itself.
const CHILD_DEFAULT_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGTSTP,
    Signal::SIGQUIT,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Terminal ownership state, present only when job control is active.
#[derive(Debug)]
struct TerminalState {
    /// The interpreter's own process group.
    shell_pgid: Pid,
}

impl TerminalState {
    /// Claim the controlling terminal for the interpreter's process group.
    fn acquire() -> ProcessResult<Self> {
        // SAFETY: installing SIG_IGN runs no code in signal context.
        unsafe {
            signal::signal(Signal::SIGTTOU, SigHandler::SigIgn).map_err(ProcessError::Terminal)?;
            signal::signal(Signal::SIGTTIN, SigHandler::SigIgn).map_err(ProcessError::Terminal)?;
        }

        let shell_pgid = unistd::getpgrp();
        unistd::tcsetpgrp(io::stdin(), shell_pgid).map_err(ProcessError::Terminal)?;
        Ok(Self { shell_pgid })
    }
}

/// Process control backed by the running OS.
#[derive(Debug)]
pub struct UnixProcessControl {
    terminal: Option<TerminalState>,
}

impl UnixProcessControl {
    /// Create a controller. Terminal handover is enabled only when
    /// `job_control` is requested and stdin is a terminal.
    pub fn new(job_control: bool) -> Self {
        let terminal = if job_control && io::stdin().is_terminal() {
            match TerminalState::acquire() {
                Ok(state) => {
                    tracing::debug!(shell_pgid = %state.shell_pgid, "job control enabled");
                    Some(state)
                }
                Err(e) => {
                    tracing::warn!("job control disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self { terminal }
    }

    /// True when foreground groups are handed the terminal.
    pub fn has_job_control(&self) -> bool {
        self.terminal.is_some()
    }
}

impl ProcessControl for UnixProcessControl {
    fn spawn(&self, argv: &[String], mode: LaunchMode) -> ProcessResult<Pid> {
        let Some((program, args)) = argv.split_first() else {
            return Err(classify_spawn_error(
                "",
                io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
            ));
        };

        let mut cmd = Command::new(program);
        cmd.args(args).process_group(0);

        let claim_terminal = self.terminal.is_some() && mode == LaunchMode::Foreground;

        // SAFETY: the hook only calls getpid, tcsetpgrp and sigaction, all
        // async-signal-safe, and allocates nothing.
        unsafe {
            cmd.pre_exec(move || {
                // Take the terminal from this side too, so a read before the
                // parent's handover does not raise SIGTTIN. SIGTTOU is still
                // ignored here. The parent retries, so a failure is harmless.
                if claim_terminal {
                    let tty = BorrowedFd::borrow_raw(nix::libc::STDIN_FILENO);
                    let _ = unistd::tcsetpgrp(tty, unistd::getpid());
                }
                for sig in CHILD_DEFAULT_SIGNALS {
                    signal::signal(sig, SigHandler::SigDfl)?;
                }
                Ok(())
            });
        }

        match cmd.spawn() {
            Ok(child) => {
                let pid = Pid::from_raw(child.id() as i32);
                tracing::debug!(%pid, program = %program, "spawned");
                Ok(pid)
            }
            Err(e) => Err(classify_spawn_error(program, e)),
        }
    }

    fn signal_group(&self, pgid: Pid, signal: Signal) -> ProcessResult<()> {
        tracing::debug!(%pgid, %signal, "signal group");
        killpg(pgid, signal).map_err(|source| ProcessError::Signal {
            pgid,
            signal,
            source,
        })
    }

    fn wait_group(&self, pgid: Pid) -> ProcessResult<WaitOutcome> {
        let members = Pid::from_raw(-pgid.as_raw());
        loop {
            match waitpid(members, Some(WaitPidFlag::WUNTRACED)) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(WaitOutcome::Exited(code)),
                Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(WaitOutcome::Signaled(sig)),
                Ok(WaitStatus::Stopped(_, sig)) => return Ok(WaitOutcome::Stopped(sig)),
                Ok(_) | Err(Errno::EINTR) => continue,
                Err(source) => return Err(ProcessError::Wait { pgid, source }),
            }
        }
    }

    fn poll_children(&self) -> Vec<ChildEvent> {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        let mut events = Vec::new();

        loop {
            let (pid, outcome) = match waitpid(Pid::from_raw(-1), Some(flags)) {
                Ok(WaitStatus::Exited(pid, code)) => (pid, WaitOutcome::Exited(code)),
                Ok(WaitStatus::Signaled(pid, sig, _)) => (pid, WaitOutcome::Signaled(sig)),
                Ok(WaitStatus::Stopped(pid, sig)) => (pid, WaitOutcome::Stopped(sig)),
                Ok(WaitStatus::Continued(pid)) => (pid, WaitOutcome::Continued),
                Ok(WaitStatus::StillAlive) => break,
                Ok(_) | Err(Errno::EINTR) => continue,
                // ECHILD: nothing left to reap.
                Err(_) => break,
            };
            events.push(ChildEvent { pid, outcome });
        }

        events
    }

    fn give_terminal(&self, pgid: Pid) -> ProcessResult<()> {
        if self.terminal.is_none() {
            return Ok(());
        }
        unistd::tcsetpgrp(io::stdin(), pgid).map_err(ProcessError::Terminal)
    }

    fn reclaim_terminal(&self) -> ProcessResult<()> {
        match &self.terminal {
            Some(state) => {
                unistd::tcsetpgrp(io::stdin(), state.shell_pgid).map_err(ProcessError::Terminal)
            }
            None => Ok(()),
        }
    }
}
