//! Scheduler module for smallsh: the job table and the launcher.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Launcher                             │
//! │  launch(cmd) ── spawn ──▶ new process group                 │
//! │     │ background: insert Running, return                    │
//! │     │ foreground: set register, wait (blocking pool),       │
//! │     │             clear register, settle outcome            │
//! │  reap() ── poll children ──▶ Done notices                   │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      JobManager                             │
//! │  table: BTreeMap<JobId, Job> + pgid index                   │
//! │  - insert(pgid, cmd, status) → JobId                        │
//! │  - remove(pgid) / set_status(pgid, status)                  │
//! │  - get(JobId) / get_by_group(pgid) / list()                 │
//! │  - apply_stop_notice(&StopNotice)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod job;
mod launcher;

pub use job::{JobManager, JobTable};
pub use launcher::Launcher;
