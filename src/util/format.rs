//! Number formatting utilities.

/// Format a whole percentage.
#[must_use]
pub fn format_percent(value: u32) -> String {
    format!("{value}%")
}

/// Format a token count compactly (`84.0K`, `1.5M`).
#[must_use]
pub fn format_tokens(value: u64) -> String {
    fn format_compact(value: u64, divisor: u64, suffix: &str) -> String {
        let major = value / divisor;
        let minor = (value % divisor) / (divisor / 10);
        format!("{major}.{minor}{suffix}")
    }

    if value >= 1_000_000 {
        format_compact(value, 1_000_000, "M")
    } else if value >= 1_000 {
        format_compact(value, 1_000, "K")
    } else {
        value.to_string()
    }
}

/// Format `used/limit` the way the agent prints it.
#[must_use]
pub fn format_usage(used: u64, limit: u64) -> String {
    format!("{}/{}", format_tokens(used), format_tokens(limit))
}
