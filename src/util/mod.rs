//! Utility functions.

pub mod env;
pub mod format;
pub mod time;

pub use format::{format_percent, format_tokens, format_usage};
pub use time::{format_relative_time, now_timestamp};
