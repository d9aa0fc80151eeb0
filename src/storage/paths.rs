//! Application paths for config and runtime data.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
    /// Runtime directory; the history file lives here by default.
    pub runtime: PathBuf,
}

impl AppPaths {
    /// Create paths for the ctxguard application.
    ///
    /// The runtime directory is the platform runtime dir (`$XDG_RUNTIME_DIR`
    /// on Linux) when there is one, else a `ctxguard` folder in the temp dir.
    #[must_use]
    pub fn new() -> Self {
        let fallback_runtime = std::env::temp_dir().join("ctxguard");
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ctxguard") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
                runtime: proj_dirs
                    .runtime_dir()
                    .map_or(fallback_runtime, std::path::Path::to_path_buf),
            }
        } else {
            Self {
                config: PathBuf::from(".ctxguard"),
                runtime: fallback_runtime,
            }
        }
    }

    /// Path to the config file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Default path to the history document.
    #[must_use]
    pub fn history_file(&self) -> PathBuf {
        self.runtime.join("history.json")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
