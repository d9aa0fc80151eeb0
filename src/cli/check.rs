//! Check command implementation.

use crate::cli::{CommandOutput, effective_no_color};
use crate::core::agent::AgentClient;
use crate::core::guardian::Guardian;
use crate::error::Result;
use crate::render;

/// Run one guardian cycle and render its report.
///
/// The exit code is non-zero when the probe, parse or compaction failed.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub async fn run<A: AgentClient>(guardian: &mut Guardian<A>) -> Result<CommandOutput> {
    let report = guardian.check().await;
    let config = guardian.config();
    let text = render::render_check(
        &report,
        config.format,
        config.pretty,
        effective_no_color(config),
    )?;

    Ok(if report.success() {
        CommandOutput::success(text)
    } else {
        CommandOutput::failure(text)
    })
}
