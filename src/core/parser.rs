//! Usage extraction from agent status output.
//!
//! The status probe prints a session table with a cell such as
//! `84k/200k (42%)`. The first such cell anywhere in the combined
//! stdout/stderr text is taken as the current context usage.
//!
//! Token counts are scaled by their unit (`k` = 1,000, `m` = 1,000,000,
//! none = 1, case-insensitive) and truncated, never rounded. Scaling is done
//! in exact decimal arithmetic so `84.5k` is always 84,500 and `0.29k` is
//! always 290.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::models::UsageRecord;

/// `<number><unit?>/<number><unit?> (<pct>%)`
static USAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d*)?|\.\d+)([km])?/(\d+(?:\.\d*)?|\.\d+)([km])?\s*\((\d+)%\)")
        .expect("usage pattern is a valid regex")
});

/// Parse combined probe output into a usage record.
///
/// Returns `None` when the text holds no usage cell (including empty text).
/// Never panics on malformed input.
#[must_use]
pub fn parse_status_output(output: &str) -> Option<UsageRecord> {
    let caps = USAGE_PATTERN.captures(output)?;

    let unit = |idx: usize| caps.get(idx).map_or("", |m| m.as_str());
    let used = parse_token_count(&caps[1], unit(2))?;
    let limit = parse_token_count(&caps[3], unit(4))?;
    // All digits, so the only possible failure is overflow.
    let percentage = caps[5].parse::<u32>().unwrap_or(u32::MAX);

    if limit == 0 {
        tracing::debug!(matched = &caps[0], "usage line has a zero limit, ignoring");
        return None;
    }

    tracing::trace!(used, limit, percentage, matched = &caps[0], "parsed usage line");
    Some(UsageRecord {
        used,
        limit,
        percentage,
    })
}

/// Convert a token count with an optional unit letter to an integer.
///
/// `value` is a plain decimal such as `84`, `84.5` or `.5`; `unit` is `k`,
/// `m` (either case) or empty. Returns `None` for anything else. Values too
/// large for `u64` saturate.
#[must_use]
pub fn parse_token_count(value: &str, unit: &str) -> Option<u64> {
    let exponent: u32 = match unit.to_ascii_lowercase().as_str() {
        "" => 0,
        "k" => 3,
        "m" => 6,
        _ => return None,
    };

    let value = value.trim();
    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let places = exponent as usize;
    let whole = digits_to_u128(int_part).saturating_mul(10u128.pow(exponent));

    // Only the first `places` fractional digits survive truncation.
    let mut frac_digits: String = frac_part.chars().take(places).collect();
    while frac_digits.len() < places {
        frac_digits.push('0');
    }
    let fraction = digits_to_u128(&frac_digits);

    Some(u64::try_from(whole.saturating_add(fraction)).unwrap_or(u64::MAX))
}

fn digits_to_u128(digits: &str) -> u128 {
    digits.bytes().fold(0u128, |acc, b| {
        acc.saturating_mul(10).saturating_add(u128::from(b - b'0'))
    })
}
