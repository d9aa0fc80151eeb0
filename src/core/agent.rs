//! The monitored agent, seen from the guardian.
//!
//! [`AgentClient`] is the only way the guardian talks to the agent: one call
//! reads status text, the other asks for compaction. [`CommandAgent`] runs
//! the agent's CLI; tests substitute a scripted fake.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::cli_runner::{display_command, run_command};
use crate::error::{GuardError, Result};
use crate::storage::config::{AgentCommand, ResolvedConfig};

/// Operations the guardian needs from the monitored agent.
pub trait AgentClient {
    /// Read the agent's status report.
    ///
    /// Returns stdout and stderr combined. The exit code is ignored because
    /// some agents print usage even when they exit non-zero.
    fn probe(&self) -> impl Future<Output = Result<String>> + Send;

    /// Ask the agent to compact its context. `Ok` only on a zero exit.
    fn compact(&self) -> impl Future<Output = Result<()>> + Send;

    /// How the probe is invoked, for messages.
    fn describe_probe(&self) -> String {
        "status probe".to_string()
    }

    /// How compaction is invoked, for messages.
    fn describe_compact(&self) -> String {
        "compaction".to_string()
    }
}

/// Agent driven through its command-line interface.
#[derive(Debug, Clone)]
pub struct CommandAgent {
    command: AgentCommand,
    status_timeout: Duration,
    compact_timeout: Duration,
}

impl CommandAgent {
    #[must_use]
    pub const fn new(command: AgentCommand, status_timeout: Duration, compact_timeout: Duration) -> Self {
        Self {
            command,
            status_timeout,
            compact_timeout,
        }
    }

    /// Build from resolved settings.
    #[must_use]
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.agent.clone(), config.status_timeout, config.compact_timeout)
    }

    /// Where the agent program resolves on `PATH`, if anywhere.
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.command.program).ok()
    }

}

impl AgentClient for CommandAgent {
    async fn probe(&self) -> Result<String> {
        match self.locate() {
            Some(path) => tracing::debug!(path = %path.display(), "Probing agent"),
            None => tracing::debug!(program = %self.command.program, "Agent not found on PATH"),
        }
        let output = run_command(
            &self.command.program,
            &self.command.status_args,
            self.status_timeout,
        )
        .await?;

        if !output.success() {
            tracing::debug!(
                exit_code = output.exit_code,
                "Status probe exited non-zero, parsing output anyway"
            );
        }
        Ok(output.combined())
    }

    async fn compact(&self) -> Result<()> {
        let output = run_command(
            &self.command.program,
            &self.command.compact_args,
            self.compact_timeout,
        )
        .await?;

        if output.success() {
            Ok(())
        } else {
            Err(GuardError::CompactionFailed {
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    fn describe_probe(&self) -> String {
        display_command(&self.command.program, &self.command.status_args)
    }

    fn describe_compact(&self) -> String {
        display_command(&self.command.program, &self.command.compact_args)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh_agent(status_script: &str, compact_script: &str) -> CommandAgent {
        CommandAgent::new(
            AgentCommand {
                program: "sh".to_string(),
                status_args: vec!["-c".to_string(), status_script.to_string()],
                compact_args: vec!["-c".to_string(), compact_script.to_string()],
            },
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn probe_ignores_exit_code_and_merges_streams() {
        let agent = sh_agent("echo 'main'; echo '84k/200k (42%)' >&2; exit 4", "true");
        let text = agent.probe().await.unwrap();
        assert!(text.contains("main"));
        assert!(text.contains("84k/200k (42%)"));
    }

    #[tokio::test]
    async fn compact_non_zero_is_failure_with_stderr() {
        let agent = sh_agent("true", "echo 'session locked' >&2; exit 2");
        match agent.compact().await {
            Err(GuardError::CompactionFailed { exit_code, stderr }) => {
                assert_eq!(exit_code, 2);
                assert_eq!(stderr, "session locked");
            }
            other => panic!("expected compaction failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn compact_zero_exit_is_success() {
        let agent = sh_agent("true", "exit 0");
        assert!(agent.compact().await.is_ok());
    }

    #[test]
    fn locate_finds_shell_and_misses_unknown() {
        assert!(sh_agent("true", "true").locate().is_some());
        let mut missing = sh_agent("true", "true");
        missing.command.program = "ctxguard-no-such-agent-binary".to_string();
        assert!(missing.locate().is_none());
    }

    #[test]
    fn describes_both_commands() {
        let agent = CommandAgent::new(
            AgentCommand {
                program: "openclaw".to_string(),
                status_args: vec!["status".to_string()],
                compact_args: vec!["compact".to_string()],
            },
            Duration::from_secs(10),
            Duration::from_secs(60),
        );
        assert_eq!(agent.describe_probe(), "openclaw status");
        assert_eq!(agent.describe_compact(), "openclaw compact");
    }
}
