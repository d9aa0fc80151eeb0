//! CLI argument parsing and command dispatch.

pub mod args;
pub mod check;
pub mod history;
pub mod status;
pub mod threshold;

pub use args::{Cli, Commands, OutputFormat};

use crate::core::agent::CommandAgent;
use crate::core::guardian::Guardian;
use crate::error::{ExitCode, Result};
use crate::storage::config::ResolvedConfig;
use crate::util::env::should_use_color;

/// Rendered command output and the exit code it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: ExitCode,
}

impl CommandOutput {
    #[must_use]
    pub const fn success(text: String) -> Self {
        Self {
            text,
            exit_code: ExitCode::Success,
        }
    }

    #[must_use]
    pub const fn failure(text: String) -> Self {
        Self {
            text,
            exit_code: ExitCode::Failure,
        }
    }

    /// Write the text to stdout and hand back the exit code.
    pub fn emit(self) -> ExitCode {
        if self.text.ends_with('\n') {
            print!("{}", self.text);
        } else {
            println!("{}", self.text);
        }
        self.exit_code
    }
}

/// Whether colors are off after looking at the flag, `NO_COLOR` and the terminal.
#[must_use]
pub fn effective_no_color(config: &ResolvedConfig) -> bool {
    !should_use_color(config.no_color)
}

/// Guardian wired to the real agent CLI.
#[must_use]
pub fn build_guardian(config: ResolvedConfig) -> Guardian<CommandAgent> {
    let agent = CommandAgent::from_config(&config);
    Guardian::new(config, agent)
}

/// Run `command` (status when none is given).
///
/// # Errors
///
/// Returns an error for an invalid threshold, a failed history save, or a
/// rendering failure. Probe and remediation failures are reported through
/// the exit code instead.
pub async fn dispatch(command: Option<Commands>, config: ResolvedConfig) -> Result<ExitCode> {
    let command = command.unwrap_or(Commands::Status);
    tracing::debug!(command = command.name(), "Dispatching");

    let output = match command {
        Commands::Status => status::run(&build_guardian(config)).await?,
        Commands::Check => check::run(&mut build_guardian(config)).await?,
        Commands::History(args) => history::run(&build_guardian(config), &args)?,
        Commands::SetThreshold(args) => threshold::run(&mut build_guardian(config), &args)?,
    };
    Ok(output.emit())
}
