//! ExecResult: the structured result of every dispatch step.
//!
//! Built-ins produce their report text in `out`/`err`. Foreground external
//! commands write straight to the terminal, so their result only carries the
//! exit code.

/// The result of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Text for standard output.
    pub out: String,
    /// Text for standard error.
    pub err: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    /// Create a result from raw output streams.
    pub fn from_output(code: i64, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            out: stdout.into(),
            err: stderr.into(),
        }
    }

    /// Create a result carrying only a child's exit code.
    pub fn from_exit(code: i32) -> Self {
        Self::from_output(code as i64, String::new(), String::new())
    }

    /// True if the command succeeded (exit code 0).
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Fold another result into this one, keeping the later exit code.
    ///
    /// Used when a line holds several commands and the caller wants a single
    /// aggregate.
    pub fn absorb(&mut self, next: ExecResult) {
        self.code = next.code;
        self.out.push_str(&next.out);
        self.err.push_str(&next.err);
    }
}

impl Default for ExecResult {
    fn default() -> Self {
        Self::success("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_creates_ok_result() {
        let result = ExecResult::success("hello world");
        assert!(result.ok());
        assert_eq!(result.code, 0);
        assert_eq!(result.out, "hello world");
        assert!(result.err.is_empty());
    }

    #[test]
    fn failure_creates_non_ok_result() {
        let result = ExecResult::failure(1, "no such job");
        assert!(!result.ok());
        assert_eq!(result.code, 1);
        assert_eq!(result.err, "no such job");
    }

    #[test]
    fn absorb_concatenates_and_keeps_last_code() {
        let mut total = ExecResult::success("[Process id 10]\n");
        total.absorb(ExecResult::failure(127, "nope: not found\n"));
        assert_eq!(total.code, 127);
        assert_eq!(total.out, "[Process id 10]\n");
        assert_eq!(total.err, "nope: not found\n");

        total.absorb(ExecResult::from_exit(0));
        assert!(total.ok());
    }
}
