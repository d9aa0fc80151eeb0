//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Default number of events shown by `history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Context Guardian - keep an agent's context window below its ceiling.
#[derive(Parser, Debug)]
#[command(name = "ctxguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warning, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    // === Guardian settings ===
    /// Config file to load instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// History file to read and write
    #[arg(long, value_name = "PATH", global = true)]
    pub history_file: Option<PathBuf>,

    /// Agent CLI to probe and compact
    #[arg(long, value_name = "PROGRAM", global = true)]
    pub agent_bin: Option<String>,

    /// Decide and record, but never run the compaction command
    #[arg(long, global = true)]
    pub dry_run: bool,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Available commands.
///
/// Running `ctxguard` with no subcommand runs `status`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show threshold, current usage and the number of recorded events (default command)
    Status,

    /// Run one check cycle, compacting if usage is at or above the threshold
    Check,

    /// Show recent events, most recent first
    History(HistoryArgs),

    /// Set and persist the compaction threshold (50-95)
    SetThreshold(SetThresholdArgs),
}

impl Commands {
    /// Name used in output envelopes.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Check => "check",
            Self::History(_) => "history",
            Self::SetThreshold(_) => "set-threshold",
        }
    }
}

/// Arguments for the `history` command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct HistoryArgs {
    /// Number of events to show
    #[arg(value_name = "LIMIT", conflicts_with = "limit")]
    pub count: Option<usize>,

    /// Number of events to show
    #[arg(short = 'n', long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

impl HistoryArgs {
    /// Effective limit, defaulting to [`DEFAULT_HISTORY_LIMIT`].
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.or(self.count).unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

/// Arguments for the `set-threshold` command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct SetThresholdArgs {
    /// Threshold percentage
    #[arg(value_name = "PERCENTAGE", allow_negative_numbers = true)]
    pub percentage: i64,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown output
    Md,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn history_limit_defaults_to_ten() {
        let cli = Cli::try_parse_from(["ctxguard", "history"]).unwrap();
        let Some(Commands::History(args)) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.effective_limit(), 10);
    }

    #[test]
    fn history_limit_positional_and_flag() {
        let cli = Cli::try_parse_from(["ctxguard", "history", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::History(HistoryArgs {
                count: Some(3),
                limit: None
            }))
        );

        let cli = Cli::try_parse_from(["ctxguard", "history", "--limit", "5"]).unwrap();
        let Some(Commands::History(args)) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.effective_limit(), 5);
    }

    #[test]
    fn set_threshold_accepts_negative_values() {
        let cli = Cli::try_parse_from(["ctxguard", "set-threshold", "-5"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::SetThreshold(SetThresholdArgs { percentage: -5 }))
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ctxguard", "check", "--dry-run", "--json"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.effective_format(), OutputFormat::Json);
        assert_eq!(cli.command.as_ref().map(Commands::name), Some("check"));
    }
}
