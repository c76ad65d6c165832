//! bg: Resume a stopped job in the background.

use async_trait::async_trait;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

use smallsh_types::{ExecResult, JobStatus};

use super::resolve_job;
use crate::tools::{ExecContext, Tool, ToolSchema};

/// Bg tool: resume a stopped job in the background.
pub struct Bg;

#[async_trait]
impl Tool for Bg {
    fn name(&self) -> &str {
        "bg"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("bg", "Resume a stopped job in the background")
            .synopsis("<job-id>")
    }

    async fn execute(&self, args: &[String], ctx: &ExecContext) -> ExecResult {
        let job = match resolve_job(self, args, ctx).await {
            Ok(job) => job,
            Err(result) => return result,
        };

        let pgid = Pid::from_raw(job.pgid);
        if let Err(e) = ctx.control().signal_group(pgid, Signal::SIGCONT) {
            return ExecResult::failure(1, format!("bg: {}\n", e));
        }

        ctx.jobs.set_status(pgid, JobStatus::Running).await;
        ExecResult::success(format!("[{}] {} &\n", job.id, job.command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::testing::{args, context};

    #[tokio::test]
    async fn continues_and_marks_running() {
        let (ctx, fake) = context();
        let pgid = Pid::from_raw(400);
        let id = ctx.jobs.insert(pgid, "sleep 50", JobStatus::Stopped).await;

        let result = Bg.execute(&args(&["1"]), &ctx).await;

        assert!(result.ok(), "{}", result.err);
        assert_eq!(result.out, "[1] sleep 50 &\n");
        assert_eq!(fake.signals(), vec![(pgid, Signal::SIGCONT)]);
        let job = ctx.jobs.get(id).await.expect("bg does not remove the job");
        assert_eq!(job.status, JobStatus::Running);
    }

    #[tokio::test]
    async fn signal_failure_leaves_table_unchanged() {
        let (ctx, fake) = context();
        let id = ctx.jobs.insert(Pid::from_raw(400), "sleep 50", JobStatus::Stopped).await;
        fake.fail_signals();

        let result = Bg.execute(&args(&["1"]), &ctx).await;

        assert_eq!(result.code, 1);
        assert!(result.err.starts_with("bg: "), "{}", result.err);
        assert_eq!(ctx.jobs.get(id).await.unwrap().status, JobStatus::Stopped);
    }

    #[tokio::test]
    async fn missing_job_sends_nothing() {
        let (ctx, fake) = context();
        let result = Bg.execute(&args(&["3"]), &ctx).await;
        assert_eq!(result.err, "bg: 3: no such job\n");
        assert!(fake.signals().is_empty());
    }
}
