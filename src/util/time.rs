//! Timestamps and time formatting.
//!
//! Event timestamps are RFC 3339 UTC strings with microsecond precision,
//! e.g. `2026-01-01T12:00:00.123456Z`. They come from a process-wide clock
//! that never goes backwards, so strings produced by one process sort
//! lexicographically in the order they were taken.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Timelike, Utc};

/// Wall clock clamped to never decrease.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Current time, or the last returned time if the wall clock stepped back.
    pub fn now(&self) -> DateTime<Utc> {
        let now = truncate_to_micros(Utc::now());
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = last.map_or(now, |prev| prev.max(now));
        *last = Some(next);
        next
    }

    /// [`Self::now`] formatted as an event timestamp.
    pub fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

static PROCESS_CLOCK: MonotonicClock = MonotonicClock::new();

/// Event timestamp from the process-wide clock.
#[must_use]
pub fn now_timestamp() -> String {
    PROCESS_CLOCK.timestamp()
}

/// Format a time as an event timestamp.
#[must_use]
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 timestamp into UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn truncate_to_micros(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(time.nanosecond() / 1_000 * 1_000)
        .unwrap_or(time)
}

/// Format a relative time (past or future).
#[must_use]
pub fn format_relative_time(target: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(target);

    if duration.num_seconds().abs() < 60 {
        return "just now".to_string();
    }

    let minutes = duration.num_minutes().abs();
    let hours = duration.num_hours().abs();
    let days = duration.num_days().abs();

    let suffix = if duration.num_seconds() > 0 {
        "ago"
    } else {
        "from now"
    };

    if days > 0 {
        format!("{days} day{} {suffix}", if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("{hours} hour{} {suffix}", if hours == 1 { "" } else { "s" })
    } else {
        format!(
            "{minutes} minute{} {suffix}",
            if minutes == 1 { "" } else { "s" }
        )
    }
}
