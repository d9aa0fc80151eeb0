//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use serde_json::json;

use crate::cli::args::OutputFormat;
use crate::core::guardian::{CycleReport, StatusReport};
use crate::core::models::Event;
use crate::error::Result;

/// Render the `status` command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_status(
    report: &StatusReport,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_status(report, no_color)),
        OutputFormat::Json => {
            let errors = report.probe_error.iter().map(|e| e.message.clone()).collect();
            robot::render_envelope("status", report, errors, pretty)
        }
        OutputFormat::Md => Ok(robot::render_status_md(report)),
    }
}

/// Render the `check` command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_check(
    report: &CycleReport,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_check(report, no_color)),
        OutputFormat::Json => {
            let errors = report.failure.iter().map(|f| f.message.clone()).collect();
            robot::render_envelope("check", report, errors, pretty)
        }
        OutputFormat::Md => Ok(robot::render_check_md(report)),
    }
}

/// Render the `history` command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_history(
    events: &[Event],
    limit: usize,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_history(events, limit, no_color)),
        OutputFormat::Json => robot::render_envelope(
            "history",
            json!({ "limit": limit, "events": events }),
            Vec::new(),
            pretty,
        ),
        OutputFormat::Md => Ok(robot::render_history_md(events)),
    }
}

/// Render the `set-threshold` command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_threshold_set(
    threshold: u8,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(human::render_threshold_set(threshold, no_color)),
        OutputFormat::Json => robot::render_envelope(
            "set-threshold",
            json!({ "threshold": threshold }),
            Vec::new(),
            pretty,
        ),
        OutputFormat::Md => Ok(robot::render_threshold_md(threshold)),
    }
}
