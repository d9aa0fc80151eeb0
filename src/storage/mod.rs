//! Storage for configuration and event history.

pub mod config;
pub mod history;
pub mod paths;

pub use config::{
    AgentCommand, Config, ConfigSource, ConfigSources, ResolvedConfig, validate_threshold,
    DEFAULT_THRESHOLD, ENV_AGENT_BIN, ENV_CHECK_INTERVAL, ENV_COMPACT_TIMEOUT, ENV_CONFIG,
    ENV_DRY_RUN, ENV_HISTORY_FILE, ENV_STATUS_TIMEOUT, ENV_THRESHOLD, MAX_THRESHOLD,
    MIN_THRESHOLD,
};
pub use history::HistoryStore;
pub use paths::AppPaths;
