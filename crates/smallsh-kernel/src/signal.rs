//! Keyboard signal relay.
//!
//! The interpreter never dies from Ctrl-C or stops on Ctrl-Z. Both signals
//! are caught here and forwarded to the foreground process group, if there
//! is one. With nothing in the foreground they are absorbed.
//!
//! Two single-slot registers connect the relay to the main path:
//!
//! - [`ForegroundGroup`] holds the group currently being waited on. The
//!   launcher sets it before waiting and clears it afterwards.
//! - [`StopNotice`] is posted by the relay just before it forwards a stop.
//!   The main path drains it when the foreground wait ends, so the job table
//!   is only ever touched from one side. Posting first means the stop that
//!   ends a wait can never land ahead of its notice.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;

use crate::process::ProcessControl;

/// The process group that currently owns the foreground, if any.
#[derive(Debug, Default)]
pub struct ForegroundGroup(AtomicI32);

impl ForegroundGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, pgid: Pid) {
        self.0.store(pgid.as_raw(), Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<Pid> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }
}

/// "A foreground group was just stopped." Holds at most one group.
#[derive(Debug, Default)]
pub struct StopNotice(AtomicI32);

impl StopNotice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `pgid` was sent a stop. Overwrites any unread notice.
    pub fn post(&self, pgid: Pid) {
        self.0.store(pgid.as_raw(), Ordering::SeqCst);
    }

    /// Withdraw a notice for `pgid` if it is still unread.
    pub fn retract(&self, pgid: Pid) -> bool {
        self.0
            .compare_exchange(pgid.as_raw(), 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Read and clear the notice.
    pub fn take(&self) -> Option<Pid> {
        match self.0.swap(0, Ordering::SeqCst) {
            0 => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }
}

/// The two keyboard signals the relay handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaySignal {
    /// Ctrl-C.
    Interrupt,
    /// Ctrl-Z.
    Suspend,
}

impl RelaySignal {
    /// The signal forwarded to the foreground group.
    pub fn forwarded(self) -> Signal {
        match self {
            RelaySignal::Interrupt => Signal::SIGINT,
            RelaySignal::Suspend => Signal::SIGTSTP,
        }
    }
}

/// Forwards keyboard signals to the foreground group.
#[derive(Clone)]
pub struct SignalRelay {
    foreground: Arc<ForegroundGroup>,
    stops: Arc<StopNotice>,
    control: Arc<dyn ProcessControl>,
}

impl SignalRelay {
    pub fn new(
        foreground: Arc<ForegroundGroup>,
        stops: Arc<StopNotice>,
        control: Arc<dyn ProcessControl>,
    ) -> Self {
        Self {
            foreground,
            stops,
            control,
        }
    }

    /// Handle one keyboard signal. Returns the group it was forwarded to.
    pub fn deliver(&self, sig: RelaySignal) -> Option<Pid> {
        let Some(pgid) = self.foreground.get() else {
            tracing::trace!(?sig, "no foreground group, signal absorbed");
            return None;
        };

        let suspend = sig == RelaySignal::Suspend;
        if suspend {
            self.stops.post(pgid);
        }

        match self.control.signal_group(pgid, sig.forwarded()) {
            Ok(()) => Some(pgid),
            Err(e) => {
                if suspend {
                    self.stops.retract(pgid);
                }
                tracing::warn!("signal relay: {}", e);
                None
            }
        }
    }

    /// Catch SIGINT and SIGTSTP for the life of the runtime and relay them.
    ///
    /// Must be called from within a tokio runtime. Once this returns, neither
    /// signal can terminate or stop the interpreter.
    pub fn install(self) -> io::Result<JoinHandle<()>> {
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut suspend = signal(SignalKind::from_raw(nix::libc::SIGTSTP))?;

        Ok(tokio::spawn(async move {
            loop {
                let sig = tokio::select! {
                    got = interrupt.recv() => match got {
                        Some(()) => RelaySignal::Interrupt,
                        None => break,
                    },
                    got = suspend.recv() => match got {
                        Some(()) => RelaySignal::Suspend,
                        None => break,
                    },
                };
                self.deliver(sig);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::FakeProcessControl;

    fn relay() -> (SignalRelay, Arc<ForegroundGroup>, Arc<StopNotice>, Arc<FakeProcessControl>) {
        let fg = Arc::new(ForegroundGroup::new());
        let stops = Arc::new(StopNotice::new());
        let fake = Arc::new(FakeProcessControl::new());
        let relay = SignalRelay::new(fg.clone(), stops.clone(), fake.clone());
        (relay, fg, stops, fake)
    }

    #[test]
    fn idle_signals_are_absorbed() {
        let (relay, _fg, stops, fake) = relay();
        assert_eq!(relay.deliver(RelaySignal::Interrupt), None);
        assert_eq!(relay.deliver(RelaySignal::Suspend), None);
        assert!(fake.signals().is_empty());
        assert_eq!(stops.take(), None);
    }

    #[test]
    fn interrupt_goes_to_the_foreground_group() {
        let (relay, fg, stops, fake) = relay();
        fg.set(Pid::from_raw(77));
        assert_eq!(relay.deliver(RelaySignal::Interrupt), Some(Pid::from_raw(77)));
        assert_eq!(fake.signals(), vec![(Pid::from_raw(77), Signal::SIGINT)]);
        assert_eq!(stops.take(), None);
    }

    #[test]
    fn suspend_posts_a_stop_notice() {
        let (relay, fg, stops, fake) = relay();
        fg.set(Pid::from_raw(88));
        relay.deliver(RelaySignal::Suspend);
        assert_eq!(fake.signals(), vec![(Pid::from_raw(88), Signal::SIGTSTP)]);
        assert_eq!(stops.take(), Some(Pid::from_raw(88)));
        assert_eq!(stops.take(), None);
    }

    #[test]
    fn failed_forward_posts_nothing() {
        let (relay, fg, stops, fake) = relay();
        fake.fail_signals();
        fg.set(Pid::from_raw(99));
        assert_eq!(relay.deliver(RelaySignal::Suspend), None);
        assert_eq!(stops.take(), None);
    }

    #[test]
    fn notice_is_posted_before_the_stop_is_sent() {
        let (relay, fg, stops, fake) = relay();
        fg.set(Pid::from_raw(66));
        let seen = stops.clone();
        fake.on_signal(move |_, _| {
            assert_eq!(seen.take(), Some(Pid::from_raw(66)));
        });

        relay.deliver(RelaySignal::Suspend);

        assert_eq!(fake.signals(), vec![(Pid::from_raw(66), Signal::SIGTSTP)]);
    }

    #[test]
    fn retract_only_clears_its_own_group() {
        let stops = StopNotice::new();
        stops.post(Pid::from_raw(10));
        assert!(!stops.retract(Pid::from_raw(11)));
        assert!(stops.retract(Pid::from_raw(10)));
        assert_eq!(stops.take(), None);
    }

    #[test]
    fn cleared_foreground_absorbs() {
        let (relay, fg, _stops, fake) = relay();
        fg.set(Pid::from_raw(5));
        fg.clear();
        assert_eq!(fg.get(), None);
        relay.deliver(RelaySignal::Interrupt);
        assert!(fake.signals().is_empty());
    }
}
