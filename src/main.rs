//! ctxguard - Context Guardian
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use ctxguard::cli::{self, Cli};
use ctxguard::core::logging::{self, LogFormat, LogLevel};
use ctxguard::error::GuardError;
use ctxguard::render::error::render_error;
use ctxguard::storage::ResolvedConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = cli.effective_format();
    let no_color = cli.no_color;
    let pretty = cli.pretty;
    let log_format = if cli.json_output {
        LogFormat::Json
    } else {
        logging::parse_log_format_from_env().unwrap_or_default()
    };
    let log_file = logging::parse_log_file_from_env();

    let config = match ResolvedConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            // Config is unusable; log with whatever the flags and env say.
            let level = cli
                .log_level
                .as_deref()
                .and_then(LogLevel::from_arg)
                .or_else(logging::parse_log_level_from_env)
                .unwrap_or_default()
                .with_verbose(cli.verbose);
            logging::init(level, log_format, log_file);
            return report_error(&e, format, no_color, pretty);
        }
    };

    logging::init(config.log_level, log_format, log_file);
    tracing::debug!(
        threshold = config.threshold(),
        history_file = %config.history_file.display(),
        agent = %config.agent.program,
        dry_run = config.dry_run,
        "Resolved configuration"
    );

    match cli::dispatch(cli.command, config).await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => report_error(&e, format, no_color, pretty),
    }
}

fn report_error(
    error: &GuardError,
    format: cli::OutputFormat,
    no_color: bool,
    pretty: bool,
) -> ExitCode {
    tracing::error!(code = error.error_code(), "{}", error);
    eprintln!("{}", render_error(error, format, no_color, pretty));
    ExitCode::from(error.exit_code() as u8)
}
