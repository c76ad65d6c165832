//! Recording process control for unit tests.
//!
//! Nothing is spawned. Calls are logged, wait results come from a script,
//! and signals succeed unless told otherwise.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use nix::sys::signal::Signal;
use nix::unistd::Pid;

use super::{ChildEvent, ProcessControl, WaitOutcome, classify_spawn_error};
use crate::dispatch::LaunchMode;
use crate::error::{ProcessError, ProcessResult};

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Spawn(Vec<String>, LaunchMode),
    Signal(Pid, Signal),
    Wait(Pid),
    GiveTerminal(Pid),
    ReclaimTerminal,
}

type WaitHook = Box<dyn FnMut(Pid) + Send>;
type SignalHook = Box<dyn FnMut(Pid, Signal) + Send>;

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    waits: VecDeque<WaitOutcome>,
    events: Vec<ChildEvent>,
    spawn_error: Option<io::ErrorKind>,
    fail_signals: bool,
    next_pid: i32,
}

/// Fake [`ProcessControl`] that records everything it is asked to do.
pub struct FakeProcessControl {
    state: Mutex<FakeState>,
    on_wait: Mutex<Option<WaitHook>>,
    on_signal: Mutex<Option<SignalHook>>,
}

impl Default for FakeProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProcessControl {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_pid: 1000,
                ..FakeState::default()
            }),
            on_wait: Mutex::new(None),
            on_signal: Mutex::new(None),
        }
    }

    /// Queue the outcome of the next `wait_group`. Unscripted waits report
    /// `Exited(0)`.
    pub fn push_wait(&self, outcome: WaitOutcome) {
        self.state.lock().unwrap().waits.push_back(outcome);
    }

    /// Queue an event for the next `poll_children`.
    pub fn push_event(&self, pid: Pid, outcome: WaitOutcome) {
        self.state
            .lock()
            .unwrap()
            .events
            .push(ChildEvent { pid, outcome });
    }

    /// Make every later spawn fail with `kind`.
    pub fn fail_spawn(&self, kind: io::ErrorKind) {
        self.state.lock().unwrap().spawn_error = Some(kind);
    }

    /// Make every later signal delivery fail with ESRCH.
    pub fn fail_signals(&self) {
        self.state.lock().unwrap().fail_signals = true;
    }

    /// Run `hook` inside the next wait, before its outcome is returned.
    pub fn on_wait(&self, hook: impl FnMut(Pid) + Send + 'static) {
        *self.on_wait.lock().unwrap() = Some(Box::new(hook));
    }

    /// Run `hook` on every later signal delivery, before it is recorded.
    pub fn on_signal(&self, hook: impl FnMut(Pid, Signal) + Send + 'static) {
        *self.on_signal.lock().unwrap() = Some(Box::new(hook));
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Signals delivered so far.
    pub fn signals(&self) -> Vec<(Pid, Signal)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Signal(pgid, sig) => Some((pgid, sig)),
                _ => None,
            })
            .collect()
    }

    /// Argument vectors spawned so far.
    pub fn spawned(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Spawn(argv, _) => Some(argv),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl ProcessControl for FakeProcessControl {
    fn spawn(&self, argv: &[String], mode: LaunchMode) -> ProcessResult<Pid> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Spawn(argv.to_vec(), mode));
        if let Some(kind) = state.spawn_error {
            return Err(classify_spawn_error(&argv[0], io::Error::from(kind)));
        }
        let pid = Pid::from_raw(state.next_pid);
        state.next_pid += 1;
        Ok(pid)
    }

    fn signal_group(&self, pgid: Pid, signal: Signal) -> ProcessResult<()> {
        if let Some(hook) = self.on_signal.lock().unwrap().as_mut() {
            hook(pgid, signal);
        }

        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Signal(pgid, signal));
        if state.fail_signals {
            return Err(ProcessError::Signal {
                pgid,
                signal,
                source: nix::errno::Errno::ESRCH,
            });
        }
        Ok(())
    }

    fn wait_group(&self, pgid: Pid) -> ProcessResult<WaitOutcome> {
        self.record(Call::Wait(pgid));

        let hook = self.on_wait.lock().unwrap().take();
        if let Some(mut hook) = hook {
            hook(pgid);
        }

        let outcome = self.state.lock().unwrap().waits.pop_front();
        Ok(outcome.unwrap_or(WaitOutcome::Exited(0)))
    }

    fn poll_children(&self) -> Vec<ChildEvent> {
        std::mem::take(&mut self.state.lock().unwrap().events)
    }

    fn give_terminal(&self, pgid: Pid) -> ProcessResult<()> {
        self.record(Call::GiveTerminal(pgid));
        Ok(())
    }

    fn reclaim_terminal(&self) -> ProcessResult<()> {
        self.record(Call::ReclaimTerminal);
        Ok(())
    }
}
