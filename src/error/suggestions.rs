//! Fix suggestion database for ctxguard errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

// =============================================================================
// Suggestion Generators
// =============================================================================

/// Suggestions when the probe output carried no usage line.
#[must_use]
pub fn usage_not_found_suggestions(command: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![command.to_string(), "ctxguard status --log-level debug".to_string()],
            format!(
                "`{command}` ran but its output contained no `<used>/<limit> (<pct>%)` \
                 session line. The agent may have no active session, or its output \
                 format changed."
            ),
        )
        .with_prevention(
            "An indeterminate reading is never recorded as 0% usage; the next scheduled \
             check will try again.",
        ),
    ]
}

/// Suggestions when a command could not be run.
#[must_use]
pub fn command_failed_suggestions(command: &str, reason: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![command.to_string()],
        format!("Running `{command}` failed: {reason}. Try running it by hand to see the error."),
    )]
}

/// Suggestions for timeouts of either external command.
#[must_use]
pub fn timeout_suggestions(command: &str, seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                format!("CTXGUARD_STATUS_TIMEOUT={} ctxguard status", seconds * 2),
                format!("CTXGUARD_COMPACT_TIMEOUT={} ctxguard check", seconds * 2),
            ],
            format!(
                "`{command}` did not finish within {seconds}s and was killed. The agent \
                 may be busy or unresponsive."
            ),
        )
        .with_prevention(
            "Raise `status_timeout_secs` / `compact_timeout_secs` in the [agent] section \
             of config.toml if the agent is routinely slow.",
        ),
    ]
}

/// Suggestions when compaction exited non-zero.
#[must_use]
pub fn compaction_failed_suggestions(exit_code: i32) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["ctxguard history 5".to_string(), "ctxguard --dry-run check".to_string()],
            format!(
                "The compaction command exited with code {exit_code}. The observation was \
                 still recorded, along with a `compact` event marking the attempt."
            ),
        )
        .with_prevention("Use --dry-run to exercise the decision logic without compacting."),
    ]
}

/// Suggestions when the history file cannot be written.
#[must_use]
pub fn history_write_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            format!("ls -ld \"$(dirname {path})\""),
            "ctxguard --history-file ~/.local/state/ctxguard.json check".to_string(),
        ],
        format!(
            "History could not be written to {path}. Check free disk space and directory \
             permissions, or point --history-file somewhere writable."
        ),
    )]
}

/// Suggestions for an out-of-range threshold.
#[must_use]
pub fn invalid_threshold_suggestions(value: i64) -> Vec<FixSuggestion> {
    let nearest = value.clamp(50, 95);
    vec![
        FixSuggestion::new(
            vec![format!("ctxguard set-threshold {nearest}")],
            format!(
                "{value}% is outside the accepted 50-95% range. Below 50% compaction would \
                 fire constantly; above 95% it would fire too late to help."
            ),
        )
        .with_prevention("The default of 75% compacts well before the 80% warning band."),
    ]
}

/// Suggestions for config file parse errors.
#[must_use]
pub fn config_parse_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("cat {path}"), format!("mv {path} {path}.bak")],
        format!("The config file at {path} is not valid TOML. Fix the syntax or move it aside to use defaults."),
    )]
}

/// Suggestions for generic configuration errors.
#[must_use]
pub fn config_suggestions() -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["ctxguard status".to_string()],
        "A configuration value is invalid. `ctxguard status` shows the resolved settings and where each came from.",
    )]
}

/// Suggestions when the agent CLI is not installed.
#[must_use]
pub fn cli_not_found_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                format!("which {name}"),
                format!("CTXGUARD_AGENT_BIN=/path/to/{name} ctxguard status"),
            ],
            format!("The agent CLI `{name}` was not found in PATH."),
        )
        .with_prevention("Set `program` in the [agent] section of config.toml to an absolute path."),
    ]
}
