//! Robot-mode output (JSON and Markdown).
//!
//! JSON output is always wrapped in a [`RobotOutput`] envelope so consumers
//! can key off `schemaVersion` and `command`.

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::guardian::{CycleReport, RemediationOutcome, StatusReport};
use crate::core::models::{Event, RobotOutput};
use crate::error::Result;

/// Render any value as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json<T: Serialize>(output: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(output)?)
    } else {
        Ok(serde_json::to_string(output)?)
    }
}

/// Wrap `data` in an envelope and render it.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_envelope<T: Serialize>(
    command: &str,
    data: T,
    errors: Vec<String>,
    pretty: bool,
) -> Result<String> {
    render_json(&RobotOutput::with_errors(command, data, errors), pretty)
}

/// Render `status` as Markdown.
#[must_use]
pub fn render_status_md(report: &StatusReport) -> String {
    let mut output = String::from("## Context Guardian Status\n\n");
    let _ = writeln!(output, "- threshold: {}% ({})", report.threshold, report.threshold_source);
    match (&report.usage, report.level) {
        (Some(usage), Some(level)) => {
            let _ = writeln!(output, "- usage: {}%", usage.percentage);
            let _ = writeln!(output, "- tokens: {}/{}", usage.used, usage.limit);
            let _ = writeln!(output, "- level: {level}");
            let _ = writeln!(output, "- would_compact: {}", report.would_compact);
        }
        _ => output.push_str("- usage: unavailable\n"),
    }
    let _ = writeln!(output, "- history_events: {}", report.history_events);
    let _ = writeln!(output, "- check_interval_secs: {}", report.check_interval_secs);
    let _ = writeln!(output, "- dry_run: {}", report.dry_run);
    output
}

/// Render `check` as Markdown.
#[must_use]
pub fn render_check_md(report: &CycleReport) -> String {
    let mut output = String::from("## Check\n\n");
    let _ = writeln!(output, "- success: {}", report.success());
    let _ = writeln!(output, "- threshold: {}%", report.threshold);
    if let (Some(usage), Some(level)) = (&report.usage, report.level) {
        let _ = writeln!(output, "- usage: {}% ({}/{})", usage.percentage, usage.used, usage.limit);
        let _ = writeln!(output, "- level: {level}");
    }
    let remediation = match &report.remediation {
        None => "none".to_string(),
        Some(RemediationOutcome::Succeeded) => "compacted".to_string(),
        Some(RemediationOutcome::DryRun) => "dry_run".to_string(),
        Some(RemediationOutcome::Failed { reason }) => format!("failed ({reason})"),
    };
    let _ = writeln!(output, "- remediation: {remediation}");
    let _ = writeln!(output, "- events_appended: {}", report.events_appended.len());
    if let Some(failure) = &report.failure {
        let _ = writeln!(output, "- error: {} {}", failure.code, failure.message);
    }
    output
}

/// Render `history` as a Markdown table.
#[must_use]
pub fn render_history_md(events: &[Event]) -> String {
    let mut output = String::from("## Recent Events\n\n");
    if events.is_empty() {
        output.push_str("_No events recorded._\n");
        return output;
    }
    output.push_str("| timestamp | action | percentage | used | limit | level |\n");
    output.push_str("|---|---|---|---|---|---|\n");
    for event in events {
        let _ = writeln!(
            output,
            "| {} | {} | {}% | {} | {} | {} |",
            event.timestamp,
            event.action,
            event.percentage,
            event.used,
            event.limit,
            event.level()
        );
    }
    output
}

/// Render `set-threshold` as Markdown.
#[must_use]
pub fn render_threshold_md(threshold: u8) -> String {
    format!("## Threshold\n\n- threshold: {threshold}%\n")
}
