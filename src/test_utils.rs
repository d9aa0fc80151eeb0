//! Test utilities for ctxguard.
//!
//! Provides shared helpers, test data factories, and a scripted stand-in for
//! the agent CLI.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ctxguard::test_utils::*;
//!
//! let dir = TestDir::new();
//! let agent = ScriptedAgent::reporting(status_output(190_000, 200_000, 95));
//! let mut guardian = Guardian::new(test_config(dir.history_path()), agent);
//! ```

use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::agent::AgentClient;
use crate::core::models::{Event, EventAction, UsageRecord};
use crate::error::{GuardError, Result};
use crate::storage::config::{Config, ResolvedConfig};
use crate::storage::paths::AppPaths;

// =============================================================================
// Test Data Factories
// =============================================================================

/// Create a `UsageRecord` with the given numbers.
#[must_use]
pub const fn make_test_usage_record(used: u64, limit: u64, percentage: u32) -> UsageRecord {
    UsageRecord {
        used,
        limit,
        percentage,
    }
}

/// Create an event at `timestamp` for a 200k-token window.
#[must_use]
pub fn make_test_event(timestamp: &str, percentage: u32, action: EventAction) -> Event {
    let usage = make_test_usage_record(u64::from(percentage) * 2_000, 200_000, percentage);
    Event::from_usage(timestamp, &usage, action)
}

/// Render a token count the way the agent's session table does.
fn agent_tokens(value: u64) -> String {
    if value >= 1_000_000 && value % 100_000 == 0 {
        let tenths = value / 100_000;
        if tenths % 10 == 0 {
            format!("{}m", tenths / 10)
        } else {
            format!("{}.{}m", tenths / 10, tenths % 10)
        }
    } else if value >= 1_000 && value % 1_000 == 0 {
        format!("{}k", value / 1_000)
    } else {
        value.to_string()
    }
}

/// Status text as printed by the agent, with one session row.
///
/// # Examples
///
/// ```rust,ignore
/// let text = status_output(84_000, 200_000, 42);
/// assert!(text.contains("84k/200k (42%)"));
/// ```
#[must_use]
pub fn status_output(used: u64, limit: u64, percentage: u32) -> String {
    format!(
        "OpenClaw status\n\nSessions\n\
         │ Key                 │ Tokens              │\n\
         ├─────────────────────┼─────────────────────┤\n\
         │ agent:main:main     │ {}/{} ({percentage}%) │\n",
        agent_tokens(used),
        agent_tokens(limit),
    )
}

/// Resolved defaults writing history to `history_file`.
#[must_use]
pub fn test_config(history_file: impl Into<PathBuf>) -> ResolvedConfig {
    let history_file = history_file.into();
    let runtime = history_file
        .parent()
        .map_or_else(std::env::temp_dir, Path::to_path_buf);
    let paths = AppPaths {
        config: runtime.join("config"),
        runtime,
    };
    let mut config = ResolvedConfig::from_config(&Config::default(), &paths);
    config.history_file = history_file;
    config
}

/// Sample config TOML content.
#[must_use]
pub fn make_test_config_toml() -> String {
    r#"[general]
log_level = "info"

[guardian]
threshold = 80
check_interval_secs = 300
dry_run = false

[agent]
program = "openclaw"
status_timeout_secs = 10
compact_timeout_secs = 60
"#
    .to_string()
}

// =============================================================================
// Scripted Agent
// =============================================================================

/// What the scripted probe does.
#[derive(Debug, Clone)]
pub enum ProbeScript {
    /// Print this text.
    Output(String),
    /// Time out after the given seconds.
    Timeout(u64),
    /// The CLI is not installed.
    Missing,
}

/// What scripted compaction does.
#[derive(Debug, Clone, Copy)]
pub enum CompactScript {
    /// Exit zero.
    Succeed,
    /// Exit with this non-zero code.
    Exit(i32),
    /// Time out after the given seconds.
    Timeout(u64),
}

/// In-process [`AgentClient`] that follows a script and counts calls.
#[derive(Debug)]
pub struct ScriptedAgent {
    probe: ProbeScript,
    compact: CompactScript,
    probe_calls: AtomicUsize,
    compact_calls: AtomicUsize,
}

impl ScriptedAgent {
    /// An agent whose probe prints `output` and whose compaction succeeds.
    #[must_use]
    pub fn reporting(output: impl Into<String>) -> Self {
        Self::new(ProbeScript::Output(output.into()), CompactScript::Succeed)
    }

    #[must_use]
    pub const fn new(probe: ProbeScript, compact: CompactScript) -> Self {
        Self {
            probe,
            compact,
            probe_calls: AtomicUsize::new(0),
            compact_calls: AtomicUsize::new(0),
        }
    }

    /// Make compaction exit with `exit_code`.
    #[must_use]
    pub const fn failing_compaction(mut self, exit_code: i32) -> Self {
        self.compact = CompactScript::Exit(exit_code);
        self
    }

    /// Make compaction time out.
    #[must_use]
    pub const fn timing_out_compaction(mut self, seconds: u64) -> Self {
        self.compact = CompactScript::Timeout(seconds);
        self
    }

    /// Number of probes run so far.
    #[must_use]
    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Number of compactions requested so far.
    #[must_use]
    pub fn compact_calls(&self) -> usize {
        self.compact_calls.load(Ordering::SeqCst)
    }
}

impl AgentClient for ScriptedAgent {
    async fn probe(&self) -> Result<String> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        match &self.probe {
            ProbeScript::Output(text) => Ok(text.clone()),
            ProbeScript::Timeout(seconds) => Err(GuardError::Timeout {
                command: self.describe_probe(),
                seconds: *seconds,
            }),
            ProbeScript::Missing => Err(GuardError::CliNotFound {
                name: "openclaw".to_string(),
            }),
        }
    }

    async fn compact(&self) -> Result<()> {
        self.compact_calls.fetch_add(1, Ordering::SeqCst);
        match self.compact {
            CompactScript::Succeed => Ok(()),
            CompactScript::Exit(exit_code) => Err(GuardError::CompactionFailed {
                exit_code,
                stderr: "compaction refused".to_string(),
            }),
            CompactScript::Timeout(seconds) => Err(GuardError::Timeout {
                command: self.describe_compact(),
                seconds,
            }),
        }
    }

    fn describe_probe(&self) -> String {
        "openclaw status".to_string()
    }

    fn describe_compact(&self) -> String {
        "openclaw compact".to_string()
    }
}

// =============================================================================
// Temporary Directories
// =============================================================================

/// An isolated temporary directory, removed on drop.
///
/// # Examples
///
/// ```rust,ignore
/// use ctxguard::test_utils::TestDir;
///
/// let dir = TestDir::new();
/// dir.create_file("config.toml", "[guardian]\nthreshold = 80");
/// assert!(dir.file_exists("config.toml"));
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Default history file location inside the directory.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.inner.path().join("history.json")
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// Read a file from the temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    /// Check if a file exists in the temporary directory.
    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    /// Get the full path to a file in the temporary directory.
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Check if a string contains ANSI escape sequences.
#[must_use]
pub fn has_ansi_codes(text: &str) -> bool {
    text.contains('\x1b')
}

/// Strip ANSI escape codes from a string.
#[must_use]
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
