//! Core data models.
//!
//! A [`UsageRecord`] is what one probe reading yields; an [`Event`] is what the
//! history keeps; a [`HistoryDocument`] is the unit persisted to disk;
//! [`RobotOutput`] wraps command results for JSON output.

use serde::{Deserialize, Serialize};

use crate::core::severity::SeverityLevel;

// =============================================================================
// Usage Record
// =============================================================================

/// Context usage parsed from one probe reading.
///
/// `percentage` is taken verbatim from the probe, not recomputed from
/// `used / limit`; the probe's own rounding is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Tokens currently used.
    pub used: u64,
    /// Token limit (always positive).
    pub limit: u64,
    /// Usage percentage as reported.
    pub percentage: u32,
}

impl UsageRecord {
    /// Severity level for this reading.
    #[must_use]
    pub const fn level(&self) -> SeverityLevel {
        SeverityLevel::classify(self.percentage)
    }

    /// Whether this reading is at or above `threshold`.
    #[must_use]
    pub const fn crosses(&self, threshold: u8) -> bool {
        self.percentage >= threshold as u32
    }
}

// =============================================================================
// Events
// =============================================================================

/// What an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    /// A successful usage observation.
    Check,
    /// The threshold was crossed and compaction was attempted.
    Compact,
}

impl EventAction {
    /// Name as written to the history file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Compact => "compact",
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub used: u64,
    pub limit: u64,
    pub percentage: u32,
    pub action: EventAction,
}

impl Event {
    /// Build an event carrying the numbers of `usage`.
    #[must_use]
    pub fn from_usage(timestamp: impl Into<String>, usage: &UsageRecord, action: EventAction) -> Self {
        Self {
            timestamp: timestamp.into(),
            used: usage.used,
            limit: usage.limit,
            percentage: usage.percentage,
            action,
        }
    }

    /// Severity level of the recorded reading.
    #[must_use]
    pub const fn level(&self) -> SeverityLevel {
        SeverityLevel::classify(self.percentage)
    }
}

// =============================================================================
// History Document
// =============================================================================

/// The persisted history file.
///
/// Events are kept in append order. `threshold` is the threshold configured
/// when the document was last written; `None` in a fresh document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default)]
    pub events: Vec<Event>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

// =============================================================================
// Robot Output
// =============================================================================

/// Schema identifier stamped on every JSON envelope.
pub const SCHEMA_VERSION: &str = "ctxguard.v1";

/// Top-level JSON envelope for machine-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: String,
    pub command: String,
    pub data: T,

    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self::with_errors(command, data, Vec::new())
    }

    /// Create with errors.
    pub fn with_errors(command: impl Into<String>, data: T, errors: Vec<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: crate::util::time::now_timestamp(),
            command: command.into(),
            data,
            errors,
        }
    }
}
