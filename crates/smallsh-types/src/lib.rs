//! Pure data types for smallsh: job identity, job status and command results.
//!
//! This crate is a leaf dependency with no async runtime and no I/O, so the
//! REPL and any embedder can talk about jobs without pulling in the kernel.

pub mod job;
pub mod result;

pub use job::*;
pub use result::*;
