//! Centralized command execution.
//!
//! Every external query goes through [`Cmd`], which captures stdout and
//! stderr and kills the child if the future running it is dropped. That
//! last property is what lets callers bound a query with
//! `tokio::time::timeout` without leaking processes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status of the command.
    pub status: ExitStatus,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Builder for configuring command execution.
///
/// A non-zero exit is not an error here; callers inspect
/// [`CommandResult::success`] and decide. Only a failure to spawn or wait
/// on the child is reported as `Err`.
pub struct Cmd {
    program: PathBuf,
    args: Vec<String>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Run the command and capture output.
    ///
    /// Stdin is closed so a misbehaving tool can't block on the terminal.
    pub async fn run(self) -> Result<CommandResult> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = cmd.output().await.with_context(|| {
            format!(
                "Failed to execute '{}'. Is it installed?",
                self.program.display()
            )
        })?;

        Ok(CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_success() {
        let result = Cmd::new("echo").arg("hello").run().await.unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_captures_stderr() {
        let result = Cmd::new("ls")
            .arg("/nonexistent_path_12345")
            .run()
            .await
            .unwrap();

        assert!(!result.success());
        assert!(!result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let err = Cmd::new("/nonexistent/bin/tool_12345")
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Is it installed?"));
    }

    #[tokio::test]
    async fn test_cmd_args_iterator() {
        let result = Cmd::new("echo")
            .args(["one", "two", "three"])
            .run()
            .await
            .unwrap();

        assert_eq!(result.stdout.trim(), "one two three");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_returned() {
        let result = Cmd::new("false").run().await.unwrap();

        assert!(!result.success());
        assert_eq!(result.code(), 1);
    }

    #[tokio::test]
    async fn test_timeout_drops_child() {
        let run = Cmd::new("sleep").arg("5").run();
        let outcome = tokio::time::timeout(Duration::from_millis(100), run).await;
        assert!(outcome.is_err());
    }
}
