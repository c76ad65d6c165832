//! Tool system for smallsh.
//!
//! Built-ins are the commands the interpreter handles itself instead of
//! launching a child. All of them operate on the job table.
//!
//! # Architecture
//!
//! ```text
//! ToolRegistry
//! └── Builtins (jobs, bg, fg, kill)
//!        │
//!        ▼
//!   ExecContext ── JobManager
//!               └─ Launcher ── ProcessControl
//! ```

mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::ExecContext;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolSchema};
