//! The guardian controller.
//!
//! One [`Guardian::check`] is one cycle:
//!
//! ```text
//! Idle -> Probing -> Deciding -> (Remediating) -> Recorded
//!            \           \             \
//!             `-----------`-------------`--> Failed
//! ```
//!
//! A probe that fails or prints no usage line ends the cycle with nothing
//! recorded. Once usage is known a `check` event is always appended; crossing
//! the threshold adds a `compact` event whatever the compaction outcome.
//! Nothing is retried here. The next scheduled invocation is the retry.

use serde::Serialize;

use crate::core::agent::AgentClient;
use crate::core::models::{Event, EventAction, UsageRecord};
use crate::core::parser::parse_status_output;
use crate::core::severity::SeverityLevel;
use crate::error::{GuardError, Result};
use crate::storage::config::{ConfigSource, ResolvedConfig};
use crate::storage::history::HistoryStore;
use crate::util::time::now_timestamp;

// =============================================================================
// Reports
// =============================================================================

/// Terminal state of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    /// Usage was observed and every required action succeeded.
    Recorded,
    /// The probe, the parse, or compaction failed.
    Failed,
}

/// What happened when the threshold was crossed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RemediationOutcome {
    /// Compaction exited zero.
    Succeeded,
    /// Compaction failed, timed out, or could not be started.
    Failed { reason: String },
    /// Dry run: compaction was not invoked.
    DryRun,
}

/// A failure that ended or spoiled a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleFailure {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&GuardError> for CycleFailure {
    fn from(err: &GuardError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Outcome of one check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub phase: CyclePhase,
    pub threshold: u8,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<SeverityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<RemediationOutcome>,
    pub events_appended: Vec<Event>,
    /// Whether every appended event reached disk.
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CycleFailure>,
}

impl CycleReport {
    const fn new(threshold: u8, dry_run: bool) -> Self {
        Self {
            phase: CyclePhase::Recorded,
            threshold,
            dry_run,
            usage: None,
            level: None,
            remediation: None,
            events_appended: Vec::new(),
            persisted: true,
            failure: None,
        }
    }

    fn fail(mut self, err: &GuardError) -> Self {
        self.phase = CyclePhase::Failed;
        self.failure = Some(CycleFailure::from(err));
        self
    }

    /// The cycle's success signal; drives the process exit code.
    #[must_use]
    pub fn success(&self) -> bool {
        self.phase == CyclePhase::Recorded
    }

    /// Whether compaction was attempted (or would have been, in a dry run).
    #[must_use]
    pub const fn threshold_crossed(&self) -> bool {
        self.remediation.is_some()
    }
}

/// One-shot usage read without remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub threshold: u8,
    pub threshold_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<SeverityLevel>,
    /// Whether a `check` now would compact.
    pub would_compact: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_error: Option<CycleFailure>,
    pub history_events: usize,
    pub history_file: String,
    pub check_interval_secs: u64,
    pub dry_run: bool,
}

// =============================================================================
// Guardian
// =============================================================================

/// Orchestrates probe, decision, remediation, and history.
#[derive(Debug)]
pub struct Guardian<A> {
    config: ResolvedConfig,
    agent: A,
    store: HistoryStore,
}

impl<A: AgentClient> Guardian<A> {
    /// Load history and adopt any threshold persisted there.
    #[must_use]
    pub fn new(config: ResolvedConfig, agent: A) -> Self {
        let store = HistoryStore::load(&config.history_file);
        Self::with_store(config, agent, store)
    }

    /// Use an already loaded store.
    #[must_use]
    pub fn with_store(mut config: ResolvedConfig, agent: A, mut store: HistoryStore) -> Self {
        if config.apply_persisted_threshold(store.persisted_threshold()) {
            tracing::debug!(threshold = config.threshold(), "Using threshold from history file");
        }
        // An env or config-file threshold applies to this run only; the saved
        // value stays for later runs.
        match config.sources.threshold {
            ConfigSource::Env | ConfigSource::ConfigFile => {}
            ConfigSource::Cli | ConfigSource::History | ConfigSource::Default => {
                store.set_threshold(config.threshold());
            }
        }
        Self {
            config,
            agent,
            store,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    #[must_use]
    pub const fn agent(&self) -> &A {
        &self.agent
    }

    #[must_use]
    pub const fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Probe the agent and parse its output.
    ///
    /// # Errors
    ///
    /// Returns the probe's error, or [`GuardError::UsageNotFound`] when the
    /// output holds no usage line.
    pub async fn read_usage(&self) -> Result<UsageRecord> {
        let output = self.agent.probe().await?;
        parse_status_output(&output).ok_or_else(|| GuardError::UsageNotFound {
            command: self.agent.describe_probe(),
        })
    }

    /// Run one check cycle.
    pub async fn check(&mut self) -> CycleReport {
        let threshold = self.config.threshold();
        let mut report = CycleReport::new(threshold, self.config.dry_run);

        // Probing
        let usage = match self.read_usage().await {
            Ok(usage) => usage,
            Err(e) => {
                tracing::error!(error = %e, code = e.error_code(), "Could not read context usage");
                return report.fail(&e);
            }
        };
        let level = usage.level();
        report.usage = Some(usage);
        report.level = Some(level);

        // Deciding
        tracing::info!(
            percentage = usage.percentage,
            used = usage.used,
            limit = usage.limit,
            level = %level,
            threshold,
            "Context usage"
        );
        self.record(&mut report, &usage, EventAction::Check);

        if !usage.crosses(threshold) {
            return report;
        }

        // Remediating
        tracing::warn!(
            percentage = usage.percentage,
            threshold,
            "Context at or above threshold, compacting"
        );
        let outcome = if self.config.dry_run {
            tracing::info!("Dry run: skipping compaction");
            RemediationOutcome::DryRun
        } else {
            tracing::info!(command = %self.agent.describe_compact(), "Running compaction");
            match self.agent.compact().await {
                Ok(()) => {
                    tracing::info!("Compaction completed");
                    RemediationOutcome::Succeeded
                }
                Err(e) => {
                    tracing::error!(error = %e, code = e.error_code(), "Compaction failed");
                    report = report.fail(&e);
                    RemediationOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };
        report.remediation = Some(outcome);
        self.record(&mut report, &usage, EventAction::Compact);

        report
    }

    /// Append an event; a failed write is logged and noted, never fatal.
    fn record(&mut self, report: &mut CycleReport, usage: &UsageRecord, action: EventAction) {
        let event = Event::from_usage(now_timestamp(), usage, action);
        if let Err(e) = self.store.append(event.clone()) {
            tracing::error!(error = %e, action = %action, "Failed to persist history");
            report.persisted = false;
        }
        report.events_appended.push(event);
    }

    /// Read usage once, without remediation or recording.
    pub async fn status(&self) -> StatusReport {
        let threshold = self.config.threshold();
        let (usage, probe_error) = match self.read_usage().await {
            Ok(usage) => (Some(usage), None),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read context usage");
                (None, Some(CycleFailure::from(&e)))
            }
        };

        StatusReport {
            threshold,
            threshold_source: self.config.sources.threshold.to_string(),
            level: usage.as_ref().map(UsageRecord::level),
            would_compact: usage.is_some_and(|u| u.crosses(threshold)),
            usage,
            probe_error,
            history_events: self.store.len(),
            history_file: self.store.path().display().to_string(),
            check_interval_secs: self.config.check_interval.as_secs(),
            dry_run: self.config.dry_run,
        }
    }

    /// The `limit` most recent events, newest first.
    #[must_use]
    pub fn history(&self, limit: usize) -> Vec<Event> {
        self.store.query(limit)
    }

    /// Validate and persist a new threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidThreshold`] without changing anything when
    /// `value` is outside 50-95, or [`GuardError::HistoryWrite`] when the new
    /// value could not be saved.
    pub fn set_threshold(&mut self, value: i64) -> Result<u8> {
        self.config.set_threshold(value)?;
        let threshold = self.config.threshold();
        self.store.set_threshold(threshold);
        self.store.save()?;
        tracing::info!(threshold, "Threshold updated");
        Ok(threshold)
    }
}
