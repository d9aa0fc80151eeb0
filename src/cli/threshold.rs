//! Set-threshold command implementation.

use crate::cli::args::SetThresholdArgs;
use crate::cli::{CommandOutput, effective_no_color};
use crate::core::agent::AgentClient;
use crate::core::guardian::Guardian;
use crate::error::Result;
use crate::render;

/// Validate, apply and persist a new threshold.
///
/// # Errors
///
/// Returns [`crate::error::GuardError::InvalidThreshold`] outside 50-95, or a
/// history write error when the value could not be saved.
pub fn run<A: AgentClient>(guardian: &mut Guardian<A>, args: &SetThresholdArgs) -> Result<CommandOutput> {
    let threshold = guardian.set_threshold(args.percentage)?;
    let config = guardian.config();
    let text = render::render_threshold_set(
        threshold,
        config.format,
        config.pretty,
        effective_no_color(config),
    )?;
    Ok(CommandOutput::success(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardError;
    use crate::storage::config::ConfigSource;
    use crate::test_utils::{ScriptedAgent, TestDir, test_config};

    fn guardian(dir: &TestDir) -> Guardian<ScriptedAgent> {
        Guardian::new(test_config(dir.history_path()), ScriptedAgent::reporting(""))
    }

    #[test]
    fn accepts_bounds_and_persists() {
        let dir = TestDir::new();
        for value in [50, 95] {
            let mut g = guardian(&dir);
            let output = run(&mut g, &SetThresholdArgs { percentage: value }).unwrap();
            assert!(output.text.contains(&format!("Threshold set to {value}%")));
        }

        let g = guardian(&dir);
        assert_eq!(g.config().threshold(), 95);
        assert_eq!(g.config().sources.threshold, ConfigSource::History);
    }

    #[test]
    fn rejects_out_of_range_without_writing() {
        let dir = TestDir::new();
        for value in [49, 96, -5] {
            let mut g = guardian(&dir);
            let err = run(&mut g, &SetThresholdArgs { percentage: value }).unwrap_err();
            assert!(matches!(err, GuardError::InvalidThreshold(v) if v == value));
            assert_eq!(g.config().threshold(), 75);
        }
        assert!(!dir.history_path().exists());
    }
}
