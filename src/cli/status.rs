//! Status command implementation.

use crate::cli::{CommandOutput, effective_no_color};
use crate::core::agent::AgentClient;
use crate::core::guardian::Guardian;
use crate::error::Result;
use crate::render;

/// Show threshold, current usage and the number of recorded events.
///
/// Always succeeds when rendering does; an unreadable agent is shown, not
/// treated as a failure.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub async fn run<A: AgentClient>(guardian: &Guardian<A>) -> Result<CommandOutput> {
    let config = guardian.config();
    let report = guardian.status().await;
    let text = render::render_status(
        &report,
        config.format,
        config.pretty,
        effective_no_color(config),
    )?;
    Ok(CommandOutput::success(text))
}
