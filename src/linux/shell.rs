//! [`CommandRunner`] implementation that goes through `bash -lc`.
//!
//! Commands are passed as a single string so the configured commands may use
//! pipes and redirections, exactly as they would be typed in a shell.

use crate::traits::CommandRunner;
use log::debug;
use std::process::{Command, Stdio};

/// Runs commands through a login `bash`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    flag: &'static str,
}

/// Errors produced by [`ShellRunner`].
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
    },
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellRunner {
    pub fn new() -> Self {
        Self {
            shell: "bash".into(),
            flag: "-lc",
        }
    }

    /// Use `shell` (invoked as `<shell> -c <command>`, no login profile)
    /// instead of `bash -lc`.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            flag: "-c",
        }
    }

    fn command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg(self.flag).arg(command).stdin(Stdio::null());
        cmd
    }
}

impl CommandRunner for ShellRunner {
    type Error = RunnerError;

    fn run(&self, command: &str) -> Result<String, RunnerError> {
        let output = self
            .command(command)
            .stderr(Stdio::null())
            .output()
            .map_err(|source| RunnerError::Spawn {
                command: command.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(RunnerError::Exit {
                command: command.to_string(),
                status: output.status,
            });
        }
        // Invalid bytes become U+FFFD so one badly encoded line cannot
        // hide the rest of the output.
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn(&self, command: &str) -> Result<(), RunnerError> {
        let mut child = self
            .command(command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                command: command.to_string(),
                source,
            })?;
        // Reap the child off-thread so it does not linger as a zombie.
        let command = command.to_string();
        std::thread::spawn(move || match child.wait() {
            Ok(status) => debug!("`{}` finished with {}", command, status),
            Err(e) => debug!("`{}` could not be waited on: {}", command, e),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captures_stdout() {
        let out = ShellRunner::with_shell("sh").run("printf 'a\\nb\\n'").unwrap();
        assert_eq!(out, "a\nb\n");
    }

    #[test]
    fn run_decodes_invalid_utf8_lossily() {
        let out = ShellRunner::with_shell("sh")
            .run("printf 'Notification 1: ok\\n  App name: A\\nNotification 2: caf\\351\\n'")
            .unwrap();
        let records = crate::notification::parse_history(&out);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].app, "A");
        assert_eq!(records[1].summary, "caf\u{FFFD}");
    }

    #[test]
    fn run_reports_nonzero_exit() {
        let err = ShellRunner::with_shell("sh").run("exit 3").unwrap_err();
        assert!(matches!(err, RunnerError::Exit { .. }));
    }

    #[test]
    fn run_reports_missing_shell() {
        let err = ShellRunner::with_shell("/nonexistent/hubd-shell")
            .run("true")
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[test]
    fn spawn_does_not_wait() {
        let start = std::time::Instant::now();
        ShellRunner::with_shell("sh").spawn("sleep 2").unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }
}
