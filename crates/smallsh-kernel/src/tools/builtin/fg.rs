//! fg: Resume a job in the foreground.

use async_trait::async_trait;

use smallsh_types::ExecResult;

use super::resolve_job;
use crate::tools::{ExecContext, Tool, ToolSchema};

/// Fg tool: continue a job in the foreground and wait for it.
pub struct Fg;

#[async_trait]
impl Tool for Fg {
    fn name(&self) -> &str {
        "fg"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("fg", "Resume a job in the foreground")
            .synopsis("<job-id>")
    }

    async fn execute(&self, args: &[String], ctx: &ExecContext) -> ExecResult {
        match resolve_job(self, args, ctx).await {
            Ok(job) => ctx.launcher.resume_foreground(&job).await,
            Err(result) => result,
        }
    }
}
