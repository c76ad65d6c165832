//! Job identification and status types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Display identifier for a tracked job.
///
/// Assigned from a monotonic counter starting at 1 and never reused, even
/// after the job is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a job id argument is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}: invalid job id")]
pub struct ParseJobIdError(pub String);

impl FromStr for JobId {
    type Err = ParseJobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(0) | Err(_) => Err(ParseJobIdError(s.to_string())),
            Ok(n) => Ok(JobId(n)),
        }
    }
}

/// Status of a tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Job is currently running.
    Running,
    /// Job was stopped by a signal (e.g., Ctrl-Z / SIGTSTP).
    Stopped,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Snapshot of a job for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job ID.
    pub id: JobId,
    /// OS process group ID (equal to the leader's pid).
    pub pgid: i32,
    /// Command text as typed.
    pub command: String,
    /// Current status.
    pub status: JobStatus,
}
