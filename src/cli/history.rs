//! History command implementation.

use crate::cli::args::HistoryArgs;
use crate::cli::{CommandOutput, effective_no_color};
use crate::core::agent::AgentClient;
use crate::core::guardian::Guardian;
use crate::error::Result;
use crate::render;

/// Show the most recent events, newest first.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run<A: AgentClient>(guardian: &Guardian<A>, args: &HistoryArgs) -> Result<CommandOutput> {
    let limit = args.effective_limit();
    let events = guardian.history(limit);
    tracing::debug!(limit, shown = events.len(), total = guardian.store().len(), "History query");

    let config = guardian.config();
    let text = render::render_history(
        &events,
        limit,
        config.format,
        config.pretty,
        effective_no_color(config),
    )?;
    Ok(CommandOutput::success(text))
}
