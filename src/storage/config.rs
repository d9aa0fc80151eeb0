//! Configuration file loading and resolution.
//!
//! Loads configuration from:
//! - Linux: `~/.config/ctxguard/config.toml`
//! - macOS: `~/Library/Application Support/ctxguard/config.toml`
//! - Windows: `%APPDATA%/ctxguard/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Threshold persisted in the history file (threshold only)
//! 5. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `CTXGUARD_CONFIG`: Override config file path
//! - `CTXGUARD_THRESHOLD`: Compaction threshold (50-95)
//! - `CTXGUARD_HISTORY_FILE`: History file path
//! - `CTXGUARD_DRY_RUN`: Never run compaction (1, true, yes, on)
//! - `CTXGUARD_AGENT_BIN`: Agent CLI program
//! - `CTXGUARD_CHECK_INTERVAL`: Seconds between scheduled checks
//! - `CTXGUARD_STATUS_TIMEOUT`: Probe timeout in seconds
//! - `CTXGUARD_COMPACT_TIMEOUT`: Compaction timeout in seconds
//! - `CTXGUARD_LOG`: Log level

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::logging::{self, LogLevel};
use crate::error::{GuardError, Result};
use crate::util::env::{env_non_empty, is_truthy};

// =============================================================================
// Constants
// =============================================================================

/// Lowest accepted threshold.
pub const MIN_THRESHOLD: i64 = 50;
/// Highest accepted threshold.
pub const MAX_THRESHOLD: i64 = 95;
/// Threshold used when nothing else sets one.
pub const DEFAULT_THRESHOLD: u8 = 75;
/// Seconds between scheduled checks.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
/// Probe timeout in seconds.
pub const DEFAULT_STATUS_TIMEOUT_SECS: u64 = 10;
/// Compaction timeout in seconds.
pub const DEFAULT_COMPACT_TIMEOUT_SECS: u64 = 60;
/// Upper bound for either command timeout.
pub const MAX_TIMEOUT_SECS: u64 = 600;
/// Agent CLI invoked when none is configured.
pub const DEFAULT_AGENT_PROGRAM: &str = "openclaw";

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "CTXGUARD_CONFIG";
/// Environment variable for the compaction threshold.
pub const ENV_THRESHOLD: &str = "CTXGUARD_THRESHOLD";
/// Environment variable for the history file path.
pub const ENV_HISTORY_FILE: &str = "CTXGUARD_HISTORY_FILE";
/// Environment variable for dry-run mode.
pub const ENV_DRY_RUN: &str = "CTXGUARD_DRY_RUN";
/// Environment variable for the agent CLI program.
pub const ENV_AGENT_BIN: &str = "CTXGUARD_AGENT_BIN";
/// Environment variable for the check interval in seconds.
pub const ENV_CHECK_INTERVAL: &str = "CTXGUARD_CHECK_INTERVAL";
/// Environment variable for the probe timeout in seconds.
pub const ENV_STATUS_TIMEOUT: &str = "CTXGUARD_STATUS_TIMEOUT";
/// Environment variable for the compaction timeout in seconds.
pub const ENV_COMPACT_TIMEOUT: &str = "CTXGUARD_COMPACT_TIMEOUT";

/// Validate a threshold against the accepted range.
///
/// # Errors
///
/// Returns [`GuardError::InvalidThreshold`] outside `50..=95`.
pub fn validate_threshold(value: i64) -> Result<u8> {
    if (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&value) {
        u8::try_from(value).map_err(|_| GuardError::InvalidThreshold(value))
    } else {
        Err(GuardError::InvalidThreshold(value))
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// How to invoke the agent CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments for the status probe.
    pub status_args: Vec<String>,
    /// Arguments for compaction.
    pub compact_args: Vec<String>,
}

/// Fully resolved configuration after merging CLI, env vars, and config file.
///
/// Built once per invocation and passed by reference. `threshold` can only
/// change through [`ResolvedConfig::set_threshold`], which validates first.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    threshold: u8,
    /// Interval an external scheduler should run `check` at.
    pub check_interval: Duration,
    /// History document location.
    pub history_file: PathBuf,
    /// Effective log level.
    pub log_level: LogLevel,
    /// Skip the compaction command but record the attempt.
    pub dry_run: bool,
    /// Agent CLI invocation.
    pub agent: AgentCommand,
    /// Probe timeout.
    pub status_timeout: Duration,
    /// Compaction timeout.
    pub compact_timeout: Duration,
    /// Output format.
    pub format: OutputFormat,
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
    /// Whether to disable colored output.
    pub no_color: bool,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub threshold: ConfigSource,
    pub check_interval: ConfigSource,
    pub history_file: ConfigSource,
    pub log_level: ConfigSource,
    pub dry_run: ConfigSource,
    pub agent: ConfigSource,
    pub status_timeout: ConfigSource,
    pub compact_timeout: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag or command.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Threshold persisted in the history file.
    History,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::History => write!(f, "history file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file exists but is invalid
    /// - Any resolved value is invalid (e.g., threshold out of range)
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let paths = AppPaths::new();
        let config = Self::load_config(cli, &paths)?;
        config.validate()?;
        Self::resolve_with(cli, &config, &paths)
    }

    /// Resolve against an already loaded config file.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable or CLI flag holds an
    /// invalid value.
    pub fn resolve_with(cli: &Cli, config: &Config, paths: &AppPaths) -> Result<Self> {
        let mut resolved = Self::from_config(config, paths);
        resolved.apply_env()?;
        resolved.apply_cli(cli)?;
        Ok(resolved)
    }

    /// Configuration from a config file and defaults alone.
    ///
    /// Values the file does not set come from the built-in defaults; the
    /// file is assumed to have passed [`Config::validate`].
    #[must_use]
    pub fn from_config(config: &Config, paths: &AppPaths) -> Self {
        let mut sources = ConfigSources::default();
        let defaults = Config::default();

        let file_or_default = |differs: bool| {
            if differs {
                ConfigSource::ConfigFile
            } else {
                ConfigSource::Default
            }
        };

        let threshold = config
            .guardian
            .threshold
            .and_then(|t| validate_threshold(t).ok())
            .map_or(DEFAULT_THRESHOLD, |t| {
                sources.threshold = ConfigSource::ConfigFile;
                t
            });

        sources.check_interval = file_or_default(
            config.guardian.check_interval_secs != defaults.guardian.check_interval_secs,
        );
        sources.dry_run = file_or_default(config.guardian.dry_run);
        sources.agent = file_or_default(config.agent != defaults.agent);
        sources.status_timeout = file_or_default(
            config.agent.status_timeout_secs != defaults.agent.status_timeout_secs,
        );
        sources.compact_timeout = file_or_default(
            config.agent.compact_timeout_secs != defaults.agent.compact_timeout_secs,
        );

        let history_file = config.storage.history_file.clone().map_or_else(
            || paths.history_file(),
            |path| {
                sources.history_file = ConfigSource::ConfigFile;
                path
            },
        );

        let log_level = config
            .general
            .log_level
            .as_deref()
            .and_then(LogLevel::from_arg)
            .map_or(LogLevel::default(), |level| {
                sources.log_level = ConfigSource::ConfigFile;
                level
            });

        Self {
            threshold,
            check_interval: Duration::from_secs(config.guardian.check_interval_secs),
            history_file,
            log_level,
            dry_run: config.guardian.dry_run,
            agent: AgentCommand {
                program: config.agent.program.clone(),
                status_args: config.agent.status_args.clone(),
                compact_args: config.agent.compact_args.clone(),
            },
            status_timeout: Duration::from_secs(config.agent.status_timeout_secs),
            compact_timeout: Duration::from_secs(config.agent.compact_timeout_secs),
            format: OutputFormat::Human,
            pretty: false,
            no_color: false,
            sources,
        }
    }

    /// Load config file, respecting `--config` and `CTXGUARD_CONFIG`.
    fn load_config(cli: &Cli, paths: &AppPaths) -> Result<Config> {
        if let Some(path) = &cli.config {
            Config::load_from(path)
        } else if let Some(path) = env_non_empty(ENV_CONFIG) {
            Config::load_from(Path::new(&path))
        } else {
            Config::load_from(&paths.config_file())
        }
    }

    /// Layer environment variables over the current values.
    fn apply_env(&mut self) -> Result<()> {
        if let Some(value) = env_non_empty(ENV_THRESHOLD) {
            let parsed = value.trim().parse::<i64>().map_err(|_| {
                GuardError::Config(format!("{ENV_THRESHOLD} must be an integer, got '{value}'"))
            })?;
            self.threshold = validate_threshold(parsed)?;
            self.sources.threshold = ConfigSource::Env;
        }

        if let Some(path) = env_non_empty(ENV_HISTORY_FILE) {
            self.history_file = PathBuf::from(path);
            self.sources.history_file = ConfigSource::Env;
        }

        if let Ok(value) = std::env::var(ENV_DRY_RUN) {
            self.dry_run = is_truthy(&value);
            self.sources.dry_run = ConfigSource::Env;
        }

        if let Some(program) = env_non_empty(ENV_AGENT_BIN) {
            self.agent.program = program;
            self.sources.agent = ConfigSource::Env;
        }

        if let Some(secs) = Self::env_secs(ENV_CHECK_INTERVAL, 1, u64::MAX) {
            self.check_interval = Duration::from_secs(secs);
            self.sources.check_interval = ConfigSource::Env;
        }

        if let Some(secs) = Self::env_secs(ENV_STATUS_TIMEOUT, 1, MAX_TIMEOUT_SECS) {
            self.status_timeout = Duration::from_secs(secs);
            self.sources.status_timeout = ConfigSource::Env;
        }

        if let Some(secs) = Self::env_secs(ENV_COMPACT_TIMEOUT, 1, MAX_TIMEOUT_SECS) {
            self.compact_timeout = Duration::from_secs(secs);
            self.sources.compact_timeout = ConfigSource::Env;
        }

        if let Some(level) = logging::parse_log_level_from_env() {
            self.log_level = level;
            self.sources.log_level = ConfigSource::Env;
        }

        Ok(())
    }

    /// Seconds from an env var, ignored (with a warning) when unparsable or
    /// outside `min..=max`.
    fn env_secs(var: &str, min: u64, max: u64) -> Option<u64> {
        let value = env_non_empty(var)?;
        match value.trim().parse::<u64>() {
            Ok(secs) if (min..=max).contains(&secs) => Some(secs),
            _ => {
                tracing::warn!(var, value = %value, min, max, "Ignoring invalid duration");
                None
            }
        }
    }

    /// Layer CLI flags over the current values.
    fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(path) = &cli.history_file {
            self.history_file.clone_from(path);
            self.sources.history_file = ConfigSource::Cli;
        }

        if cli.dry_run {
            self.dry_run = true;
            self.sources.dry_run = ConfigSource::Cli;
        }

        if let Some(program) = &cli.agent_bin {
            self.agent.program.clone_from(program);
            self.sources.agent = ConfigSource::Cli;
        }

        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_arg(level).ok_or_else(|| {
                GuardError::Config(format!(
                    "Invalid log level '{level}'. Valid levels: trace, debug, info, warning, error"
                ))
            })?;
            self.sources.log_level = ConfigSource::Cli;
        }
        if cli.verbose {
            self.log_level = self.log_level.with_verbose(true);
            self.sources.log_level = ConfigSource::Cli;
        }

        self.format = cli.effective_format();
        self.pretty = cli.pretty;
        self.no_color = cli.no_color;
        Ok(())
    }

    /// Current compaction threshold.
    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Change the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidThreshold`] outside `50..=95`; the current
    /// value is left untouched.
    pub fn set_threshold(&mut self, value: i64) -> Result<()> {
        self.threshold = validate_threshold(value)?;
        self.sources.threshold = ConfigSource::Cli;
        Ok(())
    }

    /// Adopt a threshold read back from the history file.
    ///
    /// Only replaces the built-in default. Out-of-range values are ignored.
    /// Returns whether the value was adopted.
    pub fn apply_persisted_threshold(&mut self, persisted: Option<i64>) -> bool {
        let Some(value) = persisted else {
            return false;
        };
        if self.sources.threshold != ConfigSource::Default {
            return false;
        }
        match validate_threshold(value) {
            Ok(threshold) => {
                self.threshold = threshold;
                self.sources.threshold = ConfigSource::History;
                true
            }
            Err(e) => {
                tracing::warn!(persisted = value, error = %e, "Ignoring persisted threshold");
                false
            }
        }
    }
}

// =============================================================================
// Config File Model
// =============================================================================

/// Application configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Threshold and scheduling.
    pub guardian: GuardianConfig,
    /// Agent CLI invocation.
    pub agent: AgentConfig,
    /// File locations.
    pub storage: StorageConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default log level (trace, debug, info, warning, error).
    pub log_level: Option<String>,
}

/// Guardian decision settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Compaction threshold in percent (50-95).
    pub threshold: Option<i64>,
    /// Seconds between scheduled checks.
    pub check_interval_secs: u64,
    /// Never run the compaction command.
    pub dry_run: bool,
}

/// Agent CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Program name or path.
    pub program: String,
    /// Arguments for the status probe.
    pub status_args: Vec<String>,
    /// Arguments for compaction.
    pub compact_args: Vec<String>,
    /// Probe timeout in seconds.
    pub status_timeout_secs: u64,
    /// Compaction timeout in seconds.
    pub compact_timeout_secs: u64,
}

/// File locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// History document path.
    pub history_file: Option<PathBuf>,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            dry_run: false,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_AGENT_PROGRAM.to_string(),
            status_args: vec!["status".to_string()],
            compact_args: vec!["compact".to_string()],
            status_timeout_secs: DEFAULT_STATUS_TIMEOUT_SECS,
            compact_timeout_secs: DEFAULT_COMPACT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::ConfigParse`] for invalid TOML and an I/O error
    /// if the file exists but cannot be read.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GuardError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Validate configuration values.
    ///
    /// Checks that:
    /// - The threshold is within 50-95
    /// - Timeouts are within 1-600 seconds
    /// - The check interval is positive
    /// - The agent program is not empty
    /// - The log level is recognised
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.guardian.threshold {
            validate_threshold(threshold)?;
        }

        for (name, secs) in [
            ("status_timeout_secs", self.agent.status_timeout_secs),
            ("compact_timeout_secs", self.agent.compact_timeout_secs),
        ] {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(GuardError::Config(format!(
                    "{name} must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {secs}"
                )));
            }
        }

        if self.guardian.check_interval_secs == 0 {
            return Err(GuardError::Config(
                "check_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.agent.program.trim().is_empty() {
            return Err(GuardError::Config("agent program must not be empty".to_string()));
        }

        if let Some(level) = &self.general.log_level {
            if LogLevel::from_arg(level).is_none() {
                return Err(GuardError::Config(format!(
                    "Invalid log level \"{level}\". Valid levels: trace, debug, info, warning, error"
                )));
            }
        }

        Ok(())
    }
}
