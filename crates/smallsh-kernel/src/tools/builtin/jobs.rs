//! jobs: List tracked jobs.

use async_trait::async_trait;

use smallsh_types::ExecResult;

use crate::tools::{ExecContext, Tool, ToolSchema};

/// Jobs tool: list every tracked job in id order.
pub struct Jobs;

#[async_trait]
impl Tool for Jobs {
    fn name(&self) -> &str {
        "jobs"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("jobs", "List background and stopped jobs")
    }

    async fn execute(&self, _args: &[String], ctx: &ExecContext) -> ExecResult {
        let mut text = String::new();
        for job in ctx.jobs.list().await {
            text.push_str(&format!("[{}] {}\t{}\n", job.id, job.status, job.command));
        }
        ExecResult::success(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::testing::context;
    use nix::unistd::Pid;
    use smallsh_types::JobStatus;

    #[tokio::test]
    async fn empty_table_prints_nothing() {
        let (ctx, _) = context();
        let result = Jobs.execute(&[], &ctx).await;
        assert!(result.ok());
        assert_eq!(result.out, "");
    }

    #[tokio::test]
    async fn lists_in_id_order_with_status() {
        let (ctx, _) = context();
        ctx.jobs.insert(Pid::from_raw(20), "sleep 20", JobStatus::Running).await;
        ctx.jobs.insert(Pid::from_raw(10), "vi notes", JobStatus::Stopped).await;

        let result = Jobs.execute(&[], &ctx).await;

        assert_eq!(result.out, "[1] Running\tsleep 20\n[2] Stopped\tvi notes\n");
    }
}
