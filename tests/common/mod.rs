//! Shared helpers for integration tests.
//!
//! - `fixtures`: status text and history documents under `tests/fixtures/`,
//!   plus a fake agent script for end-to-end runs
//! - `log_capture`: in-memory tracing capture for asserting on logs

pub mod fixtures;
pub mod log_capture;
