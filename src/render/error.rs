//! Error rendering for ctxguard.
//!
//! Colored output with fix suggestions on a terminal, plain text otherwise,
//! and a JSON object for machine formats.

use colored::Colorize;

use crate::cli::args::OutputFormat;
use crate::error::{FixSuggestion, GuardError};
use crate::util::env::{should_use_color, stderr_is_tty};

// =============================================================================
// Public API
// =============================================================================

/// Render an error for stderr.
///
/// Human format uses colors and the full suggestion block only when `no_color`
/// is unset and stderr is a terminal. JSON and Markdown formats get a JSON
/// object.
#[must_use]
pub fn render_error(error: &GuardError, format: OutputFormat, no_color: bool, pretty: bool) -> String {
    match format {
        OutputFormat::Json => return render_error_json(error, pretty),
        OutputFormat::Md => return render_error_json(error, true),
        OutputFormat::Human => {}
    }

    if should_use_color(no_color) && stderr_is_tty() {
        render_rich(error)
    } else {
        render_simple(error)
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &GuardError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_simple(error))
}

// =============================================================================
// Terminal Rendering
// =============================================================================

/// Render error with colors and the full suggestion block.
fn render_rich(error: &GuardError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = vec![
        format!("{} {}", error.category().to_string().red().bold(), format!("[{}]", error.error_code()).dimmed()),
        format!("  {}", error.to_string().red()),
    ];

    if !suggestions.is_empty() {
        lines.push(String::new());
        lines.push(render_suggestions_section(&suggestions));
    }

    if let Some(context) = suggestions.first().map(|s| &s.context) {
        if !context.is_empty() {
            lines.push(String::new());
            lines.push("Why this happened:".yellow().to_string());
            lines.extend(wrap_text(context, 68).into_iter().map(|l| format!("  {l}")));
        }
    }

    if let Some(prevention) = suggestions.first().and_then(|s| s.prevention.as_ref()) {
        lines.push(String::new());
        lines.push("Prevention:".green().to_string());
        lines.extend(wrap_text(prevention, 68).into_iter().map(|l| format!("  {l}")));
    }

    lines.join("\n")
}

fn render_suggestions_section(suggestions: &[FixSuggestion]) -> String {
    let mut lines = vec!["How to fix:".bold().to_string()];

    for (i, suggestion) in suggestions.iter().enumerate() {
        for (j, cmd) in suggestion.commands.iter().enumerate() {
            let prefix = if j == 0 {
                format!("  {}. ", i + 1)
            } else {
                "     Or: ".to_string()
            };
            lines.push(format!("{prefix}{}", cmd.cyan()));
        }
    }

    lines.join("\n")
}

// =============================================================================
// Simple Text Rendering
// =============================================================================

/// Render error as plain text (no ANSI codes).
fn render_simple(error: &GuardError) -> String {
    let mut lines = vec![format!("✗ Error [{}]: {}", error.error_code(), error)];

    if let Some(cmd) = error
        .fix_suggestions()
        .first()
        .and_then(|s| s.commands.first())
    {
        lines.push(format!("Fix: {cmd}"));
    }

    lines.join("\n")
}

// =============================================================================
// JSON Rendering
// =============================================================================

/// JSON representation of an error for machine consumption.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorJson {
    error_code: String,
    category: String,
    message: String,
    is_retryable: bool,
    suggestions: Vec<SuggestionJson>,
}

#[derive(serde::Serialize)]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &GuardError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Greedy word wrap.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_render_includes_error_code_and_fix() {
        let err = GuardError::CliNotFound {
            name: "openclaw".to_string(),
        };
        let output = render_simple(&err);
        assert!(output.contains("CTXG-E001"));
        assert!(output.contains("Fix: which openclaw"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn threshold_error_matches_cli_wording() {
        let output = render_simple(&GuardError::InvalidThreshold(96));
        assert!(output.starts_with("✗ Error [CTXG-C001]: threshold must be 50-95%, got 96%"));
    }

    #[test]
    fn json_render_has_code_and_suggestions() {
        let err = GuardError::Timeout {
            command: "openclaw status".to_string(),
            seconds: 10,
        };
        let value: serde_json::Value = serde_json::from_str(&render_error_json(&err, false)).unwrap();
        assert_eq!(value["errorCode"], "CTXG-P003");
        assert_eq!(value["category"], "Probe error");
        assert_eq!(value["isRetryable"], true);
        assert!(value["suggestions"][0]["commands"].is_array());
    }

    #[test]
    fn machine_formats_render_json() {
        let err = GuardError::InvalidThreshold(10);
        for format in [OutputFormat::Json, OutputFormat::Md] {
            let output = render_error(&err, format, true, false);
            assert!(serde_json::from_str::<serde_json::Value>(&output).is_ok());
        }
    }

    #[test]
    fn no_color_human_is_plain() {
        let output = render_error(&GuardError::InvalidThreshold(10), OutputFormat::Human, true, false);
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn wrap_text_respects_width() {
        let lines = wrap_text("one two three four five six", 9);
        assert!(lines.iter().all(|l| l.len() <= 9), "{lines:?}");
        assert_eq!(lines.join(" "), "one two three four five six");
    }
}
