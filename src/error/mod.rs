//! Error types for ctxguard.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized by where they originate in a check cycle:
//! - **Probe**: the status probe failed to run or produced no usage line
//! - **Remediation**: the compaction command failed or timed out
//! - **Persistence**: the history file could not be written
//! - **Configuration**: invalid thresholds, timeouts, or config files
//! - **Environment**: missing binaries or permissions
//! - **Internal**: unexpected errors
//!
//! Each error has a stable error code (e.g., `CTXG-P001`) for programmatic handling.
//! Probe and remediation errors never escape the guardian; they are folded into
//! the cycle's success flag and logged where they happen.

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The status probe could not be run or its output was indeterminate.
    Probe,
    /// The compaction command failed.
    Remediation,
    /// History could not be read or written.
    Persistence,
    /// Configuration values or files are invalid.
    Configuration,
    /// Missing binaries, permissions, or system requirements.
    Environment,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Probe => "Probe error",
            Self::Remediation => "Remediation error",
            Self::Persistence => "Persistence error",
            Self::Configuration => "Configuration error",
            Self::Environment => "Environment error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Probe => "P",
            Self::Remediation => "R",
            Self::Persistence => "S",
            Self::Configuration => "C",
            Self::Environment => "E",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes: 0 on success, 1 on any failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Probe failure, remediation failure, invalid threshold, or anything else
    Failure = 1,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

/// Main error type for ctxguard operations.
#[derive(Error, Debug)]
pub enum GuardError {
    // ==========================================================================
    // Probe errors
    // ==========================================================================
    /// The probe ran but no `<used>/<limit> (<pct>%)` line was found.
    #[error("no context usage found in `{command}` output")]
    UsageNotFound { command: String },

    /// An external command could not be started or its output could not be read.
    #[error("`{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// An external command exceeded its timeout and was killed.
    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    // ==========================================================================
    // Remediation errors
    // ==========================================================================
    /// The compaction command exited non-zero.
    #[error("compaction failed with exit code {exit_code}: {stderr}")]
    CompactionFailed { exit_code: i32, stderr: String },

    // ==========================================================================
    // Persistence errors
    // ==========================================================================
    /// The history document could not be written.
    #[error("failed to write history file {path}: {reason}")]
    HistoryWrite { path: String, reason: String },

    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Threshold outside the accepted range.
    #[error("threshold must be 50-95%, got {0}%")]
    InvalidThreshold(i64),

    /// Error parsing the configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    // ==========================================================================
    // Environment errors
    // ==========================================================================
    /// The agent CLI is not installed or not in PATH.
    #[error("CLI tool not found: {name}")]
    CliNotFound { name: String },

    // ==========================================================================
    // Internal errors
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuardError {
    /// Every failure exits with 1.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        ExitCode::Failure
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UsageNotFound { .. } | Self::CommandFailed { .. } | Self::Timeout { .. } => {
                ErrorCategory::Probe
            }
            Self::CompactionFailed { .. } => ErrorCategory::Remediation,
            Self::HistoryWrite { .. } => ErrorCategory::Persistence,
            Self::InvalidThreshold(_) | Self::ConfigParse { .. } | Self::Config(_) => {
                ErrorCategory::Configuration
            }
            Self::CliNotFound { .. } => ErrorCategory::Environment,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `CTXG-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UsageNotFound { .. } => "CTXG-P001",
            Self::CommandFailed { .. } => "CTXG-P002",
            Self::Timeout { .. } => "CTXG-P003",
            Self::CompactionFailed { .. } => "CTXG-R001",
            Self::HistoryWrite { .. } => "CTXG-S001",
            Self::InvalidThreshold(_) => "CTXG-C001",
            Self::ConfigParse { .. } => "CTXG-C002",
            Self::Config(_) => "CTXG-C003",
            Self::CliNotFound { .. } => "CTXG-E001",
            Self::Io(_) => "CTXG-X001",
            Self::Json(_) => "CTXG-X002",
        }
    }

    /// Whether the next scheduled cycle might succeed without intervention.
    ///
    /// The guardian never retries on its own; this only informs log output.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::UsageNotFound { .. }
                | Self::CompactionFailed { .. }
                | Self::HistoryWrite { .. }
        )
    }

    /// Returns actionable fix suggestions for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use ctxguard::error::GuardError;
    ///
    /// let err = GuardError::CliNotFound { name: "openclaw".to_string() };
    /// let suggestions = err.fix_suggestions();
    /// assert!(!suggestions.is_empty());
    /// ```
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::UsageNotFound { command } => suggestions::usage_not_found_suggestions(command),
            Self::CommandFailed { command, reason } => {
                suggestions::command_failed_suggestions(command, reason)
            }
            Self::Timeout { command, seconds } => {
                suggestions::timeout_suggestions(command, *seconds)
            }
            Self::CompactionFailed { exit_code, .. } => {
                suggestions::compaction_failed_suggestions(*exit_code)
            }
            Self::HistoryWrite { path, .. } => suggestions::history_write_suggestions(path),
            Self::InvalidThreshold(value) => suggestions::invalid_threshold_suggestions(*value),
            Self::ConfigParse { path, .. } => suggestions::config_parse_suggestions(path),
            Self::Config(_) => suggestions::config_suggestions(),
            Self::CliNotFound { name } => suggestions::cli_not_found_suggestions(name),
            Self::Io(_) | Self::Json(_) => Vec::new(),
        }
    }
}

/// Result type alias for ctxguard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_variants() -> Vec<GuardError> {
        vec![
            GuardError::UsageNotFound {
                command: "openclaw status".to_string(),
            },
            GuardError::CommandFailed {
                command: "openclaw status".to_string(),
                reason: "broken pipe".to_string(),
            },
            GuardError::Timeout {
                command: "openclaw status".to_string(),
                seconds: 10,
            },
            GuardError::CompactionFailed {
                exit_code: 2,
                stderr: "session locked".to_string(),
            },
            GuardError::HistoryWrite {
                path: "/tmp/h.json".to_string(),
                reason: "disk full".to_string(),
            },
            GuardError::InvalidThreshold(96),
            GuardError::ConfigParse {
                path: "config.toml".to_string(),
                message: "expected `=`".to_string(),
            },
            GuardError::Config("bad".to_string()),
            GuardError::CliNotFound {
                name: "openclaw".to_string(),
            },
            GuardError::Io(std::io::Error::other("boom")),
        ]
    }

    #[test]
    fn every_error_exits_with_one() {
        for err in all_variants() {
            assert_eq!(i32::from(err.exit_code()), 1, "{err}");
        }
    }

    #[test]
    fn error_codes_follow_format() {
        for err in all_variants() {
            let code = err.error_code();
            assert!(code.starts_with("CTXG-"), "{code}");
            assert_eq!(code.len(), 9, "{code}");
            assert_eq!(&code[5..6], err.category().code_prefix(), "{code}");
        }
    }

    #[test]
    fn error_codes_are_unique() {
        let codes: Vec<&str> = all_variants().iter().map(GuardError::error_code).collect();
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes should be unique");
    }

    #[test]
    fn threshold_message_names_range_and_value() {
        let err = GuardError::InvalidThreshold(49);
        assert_eq!(err.to_string(), "threshold must be 50-95%, got 49%");
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn retryable_errors() {
        assert!(
            GuardError::Timeout {
                command: "x".to_string(),
                seconds: 1
            }
            .is_retryable()
        );
        assert!(
            GuardError::UsageNotFound {
                command: "x".to_string()
            }
            .is_retryable()
        );
        assert!(!GuardError::InvalidThreshold(10).is_retryable());
        assert!(
            !GuardError::CliNotFound {
                name: "x".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn user_facing_errors_have_suggestions() {
        for err in all_variants() {
            if err.category() == ErrorCategory::Internal {
                continue;
            }
            assert!(
                !err.fix_suggestions().is_empty(),
                "missing suggestions for {err:?}"
            );
        }
    }

    #[test]
    fn category_display() {
        assert_eq!(ErrorCategory::Probe.to_string(), "Probe error");
        assert_eq!(ErrorCategory::Persistence.to_string(), "Persistence error");
    }
}
