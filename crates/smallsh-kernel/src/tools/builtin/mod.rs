//! Built-in tools for smallsh.
//!
//! These tools are always available and take precedence over programs of
//! the same name.

mod bg;
mod fg;
mod jobs;
mod kill;

use smallsh_types::{ExecResult, JobId, JobInfo};

use super::{ExecContext, Tool, ToolRegistry};

/// Register all built-in tools with the registry.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(bg::Bg);
    registry.register(fg::Fg);
    registry.register(jobs::Jobs);
    registry.register(kill::Kill);
}

/// Resolve the single `<job-id>` argument of `bg`, `fg` and `kill`.
///
/// Failures come back as the result to report: a usage error (code 2) for
/// a wrong argument count, and code 1 for a malformed id or a missing job.
async fn resolve_job(tool: &dyn Tool, args: &[String], ctx: &ExecContext) -> Result<JobInfo, ExecResult> {
    let name = tool.name();

    let [arg] = args else {
        return Err(ExecResult::failure(
            2,
            format!("{}: usage: {}\n", name, tool.schema().usage()),
        ));
    };

    let id: JobId = arg
        .parse()
        .map_err(|e| ExecResult::failure(1, format!("{}: {}\n", name, e)))?;

    ctx.jobs
        .get(id)
        .await
        .ok_or_else(|| ExecResult::failure(1, format!("{}: {}: no such job\n", name, id)))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::process::testing::FakeProcessControl;
    use crate::scheduler::{JobManager, Launcher};
    use crate::signal::{ForegroundGroup, StopNotice};
    use crate::tools::ExecContext;

    /// A context wired to a recording fake.
    pub fn context() -> (ExecContext, Arc<FakeProcessControl>) {
        let fake = Arc::new(FakeProcessControl::new());
        let jobs = Arc::new(JobManager::new());
        let launcher = Arc::new(Launcher::new(
            fake.clone(),
            jobs.clone(),
            Arc::new(ForegroundGroup::new()),
            Arc::new(StopNotice::new()),
        ));
        (ExecContext::new(jobs, launcher), fake)
    }

    pub fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }
}
