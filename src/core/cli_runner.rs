//! Subprocess execution for the agent CLI.
//!
//! Both external commands (the status probe and compaction) go through
//! [`run_command`], which enforces a timeout and kills the child when it
//! expires.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{GuardError, Result};

/// Output from a CLI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliOutput {
    /// Check if command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, joined by a newline.
    #[must_use]
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Render `program args...` for messages and log fields.
#[must_use]
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a CLI command with timeout.
///
/// A non-zero exit is not an error here; callers decide what it means.
///
/// # Errors
///
/// Returns error if:
/// - Command not found ([`GuardError::CliNotFound`])
/// - Command times out ([`GuardError::Timeout`]); the child is killed
/// - Command fails to execute or its output cannot be read
pub async fn run_command(
    program: &str,
    args: &[String],
    timeout_duration: Duration,
) -> Result<CliOutput> {
    let command = display_command(program, args);
    tracing::debug!(command = %command, timeout_secs = timeout_duration.as_secs(), "Spawning");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GuardError::CliNotFound {
                    name: program.to_string(),
                }
            } else {
                GuardError::CommandFailed {
                    command: command.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

    let result = timeout(timeout_duration, async {
        // Drain both pipes at once so a chatty child cannot block on a full buffer.
        let stdout_handle = async {
            let mut stdout = String::new();
            if let Some(mut out) = child.stdout.take() {
                out.read_to_string(&mut stdout).await?;
            }
            Ok::<_, std::io::Error>(stdout)
        };

        let stderr_handle = async {
            let mut stderr = String::new();
            if let Some(mut err) = child.stderr.take() {
                err.read_to_string(&mut stderr).await?;
            }
            Ok::<_, std::io::Error>(stderr)
        };

        let (stdout_result, stderr_result) = tokio::join!(stdout_handle, stderr_handle);
        let stdout = stdout_result?;
        let stderr = stderr_result?;

        let status = child.wait().await?;

        Ok::<_, std::io::Error>(CliOutput {
            stdout,
            stderr,
            exit_code: status.code().unwrap_or(-1),
        })
    })
    .await;

    match result {
        Ok(Ok(output)) => {
            tracing::debug!(command = %command, exit_code = output.exit_code, "Command finished");
            Ok(output)
        }
        Ok(Err(e)) => Err(GuardError::CommandFailed {
            command,
            reason: e.to_string(),
        }),
        Err(_) => {
            let _ = child.kill().await;
            let _ = child.wait().await;
            Err(GuardError::Timeout {
                command,
                seconds: timeout_duration.as_secs(),
            })
        }
    }
}
