//! Child launch and foreground waits.

use std::sync::Arc;

use nix::sys::signal::Signal;
use nix::unistd::Pid;

use smallsh_types::{ExecResult, JobInfo, JobStatus};

use super::JobManager;
use crate::dispatch::{Command, LaunchMode};
use crate::error::ProcessResult;
use crate::process::{ProcessControl, WaitOutcome};
use crate::signal::{ForegroundGroup, StopNotice};

/// Starts commands as process-group leaders and waits on foreground groups.
pub struct Launcher {
    control: Arc<dyn ProcessControl>,
    jobs: Arc<JobManager>,
    foreground: Arc<ForegroundGroup>,
    stops: Arc<StopNotice>,
}

impl Launcher {
    pub fn new(
        control: Arc<dyn ProcessControl>,
        jobs: Arc<JobManager>,
        foreground: Arc<ForegroundGroup>,
        stops: Arc<StopNotice>,
    ) -> Self {
        Self {
            control,
            jobs,
            foreground,
            stops,
        }
    }

    /// The process-control primitives this launcher drives.
    pub fn control(&self) -> &Arc<dyn ProcessControl> {
        &self.control
    }

    /// Launch `command` in a new process group.
    ///
    /// Background commands are tracked as `Running` and return at once.
    /// Foreground commands are waited on; one that stops is tracked as
    /// `Stopped`.
    #[tracing::instrument(level = "debug", skip(self, command), fields(program = %command.program(), mode = %command.mode))]
    pub async fn launch(&self, command: &Command) -> ExecResult {
        let pgid = match self.control.spawn(&command.argv, command.mode) {
            Ok(pgid) => pgid,
            Err(e) => {
                tracing::debug!("launch failed: {}", e);
                return ExecResult::failure(e.exit_code(), format!("{}\n", e));
            }
        };

        match command.mode {
            LaunchMode::Background => {
                self.jobs
                    .insert(pgid, command.text.as_str(), JobStatus::Running)
                    .await;
                ExecResult::success(format!("[Process id {}]\n", pgid))
            }
            LaunchMode::Foreground => match self.run_in_foreground(pgid, false).await {
                Ok(outcome) => self.settle(pgid, &command.text, outcome).await,
                Err(e) => ExecResult::failure(e.exit_code(), format!("smallsh: {}\n", e)),
            },
        }
    }

    /// Continue a tracked job in the foreground and wait for it.
    pub async fn resume_foreground(&self, job: &JobInfo) -> ExecResult {
        let pgid = Pid::from_raw(job.pgid);
        self.jobs.set_status(pgid, JobStatus::Running).await;

        match self.run_in_foreground(pgid, true).await {
            Ok(outcome) => self.settle(pgid, &job.command, outcome).await,
            Err(e) => {
                self.jobs.set_status(pgid, job.status).await;
                ExecResult::failure(e.exit_code(), format!("fg: {}\n", e))
            }
        }
    }

    /// Register `pgid` as the foreground group, optionally continue it, and
    /// block until it exits or stops. The register is clear again on return.
    pub async fn run_in_foreground(&self, pgid: Pid, resume: bool) -> ProcessResult<WaitOutcome> {
        // A notice from a relay that fired after the previous wait settled.
        if let Some(stale) = self.stops.take() {
            tracing::trace!(%stale, "discarding stale stop notice");
        }
        self.foreground.set(pgid);
        if let Err(e) = self.control.give_terminal(pgid) {
            tracing::warn!("failed to give terminal to {}: {}", pgid, e);
        }

        let result = self.continue_and_wait(pgid, resume).await;

        if let Err(e) = self.control.reclaim_terminal() {
            tracing::warn!("failed to reclaim terminal: {}", e);
        }
        self.foreground.clear();
        result
    }

    async fn continue_and_wait(&self, pgid: Pid, resume: bool) -> ProcessResult<WaitOutcome> {
        if resume {
            self.control.signal_group(pgid, Signal::SIGCONT)?;
        }

        let control = self.control.clone();
        let outcome = tokio::task::spawn_blocking(move || control.wait_group(pgid)).await??;
        tracing::debug!(%pgid, ?outcome, "foreground wait finished");
        Ok(outcome)
    }

    /// Record what a foreground wait observed.
    async fn settle(&self, pgid: Pid, command: &str, outcome: WaitOutcome) -> ExecResult {
        let result = match outcome {
            WaitOutcome::Stopped(_) => {
                self.jobs.insert(pgid, command, JobStatus::Stopped).await;
                ExecResult::from_output(
                    outcome.exit_code(),
                    format!("[Process {} stopped]\n", pgid),
                    "",
                )
            }
            WaitOutcome::Exited(_) | WaitOutcome::Signaled(_) => {
                self.jobs.remove(pgid).await;
                ExecResult::from_output(outcome.exit_code(), "", "")
            }
            WaitOutcome::Continued => ExecResult::success(""),
        };

        self.jobs.apply_stop_notice(&self.stops).await;
        result
    }

    /// Non-blocking sweep of children. Updates the table and returns a
    /// notice line for each tracked job that finished.
    pub async fn reap(&self) -> Vec<String> {
        let mut notices = Vec::new();

        for event in self.control.poll_children() {
            let Some(job) = self.jobs.get_by_group(event.pid).await else {
                tracing::trace!(pid = %event.pid, outcome = ?event.outcome, "untracked child");
                continue;
            };

            match event.outcome {
                WaitOutcome::Exited(_) => {
                    self.jobs.remove(event.pid).await;
                    notices.push(format!("[{}] Done\t{}\n", job.id, job.command));
                }
                WaitOutcome::Signaled(sig) => {
                    self.jobs.remove(event.pid).await;
                    notices.push(format!("[{}] Terminated ({})\t{}\n", job.id, sig, job.command));
                }
                WaitOutcome::Stopped(_) => {
                    self.jobs.set_status(event.pid, JobStatus::Stopped).await;
                }
                WaitOutcome::Continued => {
                    self.jobs.set_status(event.pid, JobStatus::Running).await;
                }
            }
        }

        notices
    }
}
