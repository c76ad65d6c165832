//! kill: Terminate a job.

use async_trait::async_trait;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

use smallsh_types::ExecResult;

use super::resolve_job;
use crate::tools::{ExecContext, Tool, ToolSchema};

/// Kill tool: SIGKILL a job's whole process group and forget the job.
///
/// SIGKILL takes effect on stopped groups too, so no SIGCONT is needed.
pub struct Kill;

#[async_trait]
impl Tool for Kill {
    fn name(&self) -> &str {
        "kill"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("kill", "Terminate a job's process group")
            .synopsis("<job-id>")
    }

    async fn execute(&self, args: &[String], ctx: &ExecContext) -> ExecResult {
        let job = match resolve_job(self, args, ctx).await {
            Ok(job) => job,
            Err(result) => return result,
        };

        let pgid = Pid::from_raw(job.pgid);
        if let Err(e) = ctx.control().signal_group(pgid, Signal::SIGKILL) {
            return ExecResult::failure(1, format!("kill: {}\n", e));
        }

        ctx.jobs.remove(pgid).await;
        ExecResult::success("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::testing::{args, context};
    use smallsh_types::{JobId, JobStatus};

    #[tokio::test]
    async fn removes_exactly_that_job() {
        let (ctx, fake) = context();
        ctx.jobs.insert(Pid::from_raw(10), "sleep 10", JobStatus::Running).await;
        ctx.jobs.insert(Pid::from_raw(20), "sleep 20", JobStatus::Stopped).await;
        ctx.jobs.insert(Pid::from_raw(30), "sleep 30", JobStatus::Running).await;

        let result = Kill.execute(&args(&["2"]), &ctx).await;

        assert!(result.ok(), "{}", result.err);
        assert_eq!(fake.signals(), vec![(Pid::from_raw(20), Signal::SIGKILL)]);
        let left: Vec<JobId> = ctx.jobs.list().await.into_iter().map(|j| j.id).collect();
        assert_eq!(left, vec![JobId(1), JobId(3)]);
    }

    #[tokio::test]
    async fn signal_failure_keeps_the_job() {
        let (ctx, fake) = context();
        ctx.jobs.insert(Pid::from_raw(10), "sleep 10", JobStatus::Running).await;
        fake.fail_signals();

        let result = Kill.execute(&args(&["1"]), &ctx).await;

        assert_eq!(result.code, 1);
        assert_eq!(ctx.jobs.len().await, 1);
    }

    #[tokio::test]
    async fn missing_argument_is_a_usage_error() {
        let (ctx, _) = context();
        let result = Kill.execute(&[], &ctx).await;
        assert_eq!(result.code, 2);
        assert_eq!(result.err, "kill: usage: kill <job-id>\n");
    }
}
