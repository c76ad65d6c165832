//! Job table for smallsh.
//!
//! Every child that outlives its launch step (started with `&`, or stopped
//! while in the foreground) is tracked here until it exits or is killed.
//! The table is the single source of truth for job status.

use std::collections::{BTreeMap, HashMap};

use nix::unistd::Pid;
use tokio::sync::Mutex;

use smallsh_types::{JobId, JobInfo, JobStatus};

use crate::signal::StopNotice;

/// A tracked job.
#[derive(Debug, Clone)]
struct Job {
    id: JobId,
    pgid: Pid,
    command: String,
    status: JobStatus,
}

impl Job {
    fn info(&self) -> JobInfo {
        JobInfo {
            id: self.id,
            pgid: self.pgid.as_raw(),
            command: self.command.clone(),
            status: self.status,
        }
    }
}

/// Ordered table of jobs, keyed by id, with a process-group index.
///
/// Holds at most one job per process group. Ids come from a counter that
/// starts at 1 and only grows, so an id is never handed out twice.
#[derive(Debug)]
pub struct JobTable {
    next_id: u64,
    jobs: BTreeMap<JobId, Job>,
    by_group: HashMap<Pid, JobId>,
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            jobs: BTreeMap::new(),
            by_group: HashMap::new(),
        }
    }

    /// Track `pgid`. If the group is already tracked its job is updated in
    /// place and keeps its id.
    pub fn insert(&mut self, pgid: Pid, command: impl Into<String>, status: JobStatus) -> JobId {
        let command = command.into();

        if let Some(&id) = self.by_group.get(&pgid)
            && let Some(job) = self.jobs.get_mut(&id)
        {
            job.command = command;
            job.status = status;
            return id;
        }

        let id = JobId(self.next_id);
        self.next_id += 1;
        self.jobs.insert(
            id,
            Job {
                id,
                pgid,
                command,
                status,
            },
        );
        self.by_group.insert(pgid, id);
        id
    }

    /// Stop tracking `pgid`. Returns the removed job, if there was one.
    pub fn remove(&mut self, pgid: Pid) -> Option<JobInfo> {
        let id = self.by_group.remove(&pgid)?;
        self.jobs.remove(&id).map(|job| job.info())
    }

    pub fn find(&self, id: JobId) -> Option<JobInfo> {
        self.jobs.get(&id).map(Job::info)
    }

    pub fn find_by_group(&self, pgid: Pid) -> Option<JobInfo> {
        let id = self.by_group.get(&pgid)?;
        self.find(*id)
    }

    /// Update the status of `pgid`'s job. Returns false if it is not tracked.
    pub fn set_status(&mut self, pgid: Pid, status: JobStatus) -> bool {
        let Some(id) = self.by_group.get(&pgid) else {
            return false;
        };
        match self.jobs.get_mut(id) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }

    /// Snapshot of every job in id order.
    pub fn list(&self) -> Vec<JobInfo> {
        self.jobs.values().map(Job::info).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the job table.
///
/// Every mutation goes through here on the interpreter's main path; the
/// signal relay only posts a [`StopNotice`], which is applied with
/// [`JobManager::apply_stop_notice`].
pub struct JobManager {
    table: Mutex<JobTable>,
}

impl JobManager {
    /// Create a new, empty job manager.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(JobTable::new()),
        }
    }

    /// Track a job and return its id.
    pub async fn insert(&self, pgid: Pid, command: impl Into<String>, status: JobStatus) -> JobId {
        let id = self.table.lock().await.insert(pgid, command, status);
        tracing::debug!(%id, %pgid, %status, "job tracked");
        id
    }

    /// Stop tracking a process group.
    pub async fn remove(&self, pgid: Pid) -> Option<JobInfo> {
        let removed = self.table.lock().await.remove(pgid);
        if let Some(job) = &removed {
            tracing::debug!(id = %job.id, %pgid, "job removed");
        }
        removed
    }

    /// Get info for a specific job.
    pub async fn get(&self, id: JobId) -> Option<JobInfo> {
        self.table.lock().await.find(id)
    }

    /// Get the job for a process group.
    pub async fn get_by_group(&self, pgid: Pid) -> Option<JobInfo> {
        self.table.lock().await.find_by_group(pgid)
    }

    pub async fn set_status(&self, pgid: Pid, status: JobStatus) -> bool {
        self.table.lock().await.set_status(pgid, status)
    }

    /// List all jobs with their status.
    pub async fn list(&self) -> Vec<JobInfo> {
        self.table.lock().await.list()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.is_empty()
    }

    /// Drain a pending stop notice and mark its job stopped.
    ///
    /// Returns the affected job. A notice for an untracked group (it exited
    /// before the stop landed) is discarded.
    pub async fn apply_stop_notice(&self, stops: &StopNotice) -> Option<JobInfo> {
        let pgid = stops.take()?;
        let mut table = self.table.lock().await;
        if table.set_status(pgid, JobStatus::Stopped) {
            table.find_by_group(pgid)
        } else {
            tracing::trace!(%pgid, "stop notice for untracked group");
            None
        }
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}
