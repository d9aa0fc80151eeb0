//! Human-readable output.
//!
//! Severity drives the icon and color of every usage line.

use colored::Colorize;

use crate::core::guardian::{CycleReport, RemediationOutcome, StatusReport};
use crate::core::models::{Event, UsageRecord};
use crate::core::severity::SeverityLevel;
use crate::util::format::{format_percent, format_usage};
use crate::util::time::{format_relative_time, parse_timestamp};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Color `text` for `level` unless colors are off.
fn paint(text: &str, level: SeverityLevel, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        text.color(level.color()).to_string()
    }
}

fn bold(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        text.bold().to_string()
    }
}

/// `⚠ 85% (170.0K/200.0K tokens) warning`
fn usage_line(usage: &UsageRecord, no_color: bool) -> String {
    let level = usage.level();
    let text = format!(
        "{} {} ({} tokens) {}",
        level.icon(),
        format_percent(usage.percentage),
        format_usage(usage.used, usage.limit),
        level
    );
    paint(&text, level, no_color)
}

/// Render the `status` command.
#[must_use]
pub fn render_status(report: &StatusReport, no_color: bool) -> String {
    let mut lines = vec![
        String::new(),
        rule(),
        bold("Context Guardian Status", no_color),
        rule(),
        format!(
            "Threshold: {} ({})",
            format_percent(u32::from(report.threshold)),
            report.threshold_source
        ),
    ];

    match &report.usage {
        Some(usage) => {
            lines.push(format!("Usage: {}", usage_line(usage, no_color)));
            if report.would_compact {
                lines.push(format!(
                    "       at or above threshold, next check will {}",
                    if report.dry_run { "record a dry-run compaction" } else { "compact" }
                ));
            }
        }
        None => lines.push("Usage: Unable to parse context".to_string()),
    }

    lines.push(format!("History events: {}", report.history_events));
    lines.push(format!("History file: {}", report.history_file));
    lines.push(format!("Check interval: {}s", report.check_interval_secs));
    if report.dry_run {
        lines.push("Dry run: on".to_string());
    }
    lines.push(rule());
    lines.push(String::new());
    lines.join("\n")
}

/// Render the `check` command.
#[must_use]
pub fn render_check(report: &CycleReport, no_color: bool) -> String {
    let Some(usage) = &report.usage else {
        let reason = report
            .failure
            .as_ref()
            .map_or("unknown error", |f| f.message.as_str());
        return paint(
            &format!("{} Check failed: {reason}", SeverityLevel::Critical.icon()),
            SeverityLevel::Critical,
            no_color,
        ) + "\n";
    };

    let mut lines = vec![format!("Context: {}", usage_line(usage, no_color))];
    let threshold = format_percent(u32::from(report.threshold));

    match &report.remediation {
        None => lines.push(format!("Below threshold ({threshold}), no action needed")),
        Some(RemediationOutcome::Succeeded) => {
            lines.push(format!("At or above threshold ({threshold}), compacted"));
        }
        Some(RemediationOutcome::DryRun) => {
            lines.push(format!(
                "At or above threshold ({threshold}), dry run: compaction skipped"
            ));
        }
        Some(RemediationOutcome::Failed { reason }) => {
            lines.push(paint(
                &format!(
                    "{} At or above threshold ({threshold}), compaction failed: {reason}",
                    SeverityLevel::Critical.icon()
                ),
                SeverityLevel::Critical,
                no_color,
            ));
        }
    }

    if !report.persisted {
        lines.push("Warning: history could not be saved".to_string());
    }

    lines.join("\n") + "\n"
}

/// Time-of-day part of a timestamp (`12:00:00.123456`).
fn clock_part(timestamp: &str) -> &str {
    timestamp
        .split_once('T')
        .map_or(timestamp, |(_, time)| time.trim_end_matches('Z'))
}

/// Render the `history` command.
#[must_use]
pub fn render_history(events: &[Event], limit: usize, no_color: bool) -> String {
    let mut lines = vec![
        String::new(),
        rule(),
        bold(&format!("Recent Events (Last {limit})"), no_color),
        rule(),
    ];

    if events.is_empty() {
        lines.push("No events recorded".to_string());
    }

    for (i, event) in events.iter().enumerate() {
        let level = event.level();
        let ago = parse_timestamp(&event.timestamp)
            .map(|t| format!(" ({})", format_relative_time(t)))
            .unwrap_or_default();
        let row = format!(
            "{}. [{}] {}: {} {}{ago}",
            i + 1,
            clock_part(&event.timestamp),
            event.action,
            paint(&format_percent(event.percentage), level, no_color),
            level.icon(),
        );
        lines.push(row);
    }

    lines.push(rule());
    lines.push(String::new());
    lines.join("\n")
}

/// Render the `set-threshold` command.
#[must_use]
pub fn render_threshold_set(threshold: u8, no_color: bool) -> String {
    paint(
        &format!(
            "{} Threshold set to {}",
            SeverityLevel::Healthy.icon(),
            format_percent(u32::from(threshold))
        ),
        SeverityLevel::Healthy,
        no_color,
    ) + "\n"
}
