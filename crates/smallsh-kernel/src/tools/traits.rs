//! Core tool traits and types.

use async_trait::async_trait;

use smallsh_types::ExecResult;

use super::context::ExecContext;

/// Schema describing a tool's interface.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Argument synopsis, e.g. `<job-id>`.
    pub synopsis: String,
}

impl ToolSchema {
    /// Create a new tool schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            synopsis: String::new(),
        }
    }

    /// Set the argument synopsis.
    pub fn synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = synopsis.into();
        self
    }

    /// One-line usage, e.g. `fg <job-id>`.
    pub fn usage(&self) -> String {
        if self.synopsis.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.synopsis)
        }
    }
}

/// A built-in command that runs inside the interpreter.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name (used for lookup).
    fn name(&self) -> &str;

    /// Get the tool's schema.
    fn schema(&self) -> ToolSchema;

    /// Execute the tool. `args` excludes the tool's own name.
    async fn execute(&self, args: &[String], ctx: &ExecContext) -> ExecResult;
}
