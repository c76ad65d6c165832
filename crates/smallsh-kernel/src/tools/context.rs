//! Execution context for tools.

use std::sync::Arc;

use crate::process::ProcessControl;
use crate::scheduler::{JobManager, Launcher};

/// Execution context passed to tools.
///
/// Gives built-ins the job table and the launcher, which owns the
/// process-control primitives.
#[derive(Clone)]
pub struct ExecContext {
    /// Job table shared with the launcher.
    pub jobs: Arc<JobManager>,
    /// Launcher, for foreground waits.
    pub launcher: Arc<Launcher>,
}

impl ExecContext {
    pub fn new(jobs: Arc<JobManager>, launcher: Arc<Launcher>) -> Self {
        Self { jobs, launcher }
    }

    /// Process-control primitives, for sending signals.
    pub fn control(&self) -> &Arc<dyn ProcessControl> {
        self.launcher.control()
    }
}
