#![allow(dead_code)]

//! Fixture loading and a scriptable fake agent CLI.
//!
//! ```rust,ignore
//! use common::fixtures::*;
//!
//! let text = load_status_fixture("critical");
//! let agent = FakeAgent::install(dir.path(), &text, 0);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

/// Path to `tests/fixtures`.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Load `tests/fixtures/status/<name>.txt`.
///
/// # Panics
///
/// Panics if the fixture is missing.
pub fn load_status_fixture(name: &str) -> String {
    let path = fixtures_dir().join("status").join(format!("{name}.txt"));
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Copy `tests/fixtures/history/<name>.json` to `dest`.
///
/// # Panics
///
/// Panics if the fixture cannot be copied.
pub fn install_history_fixture(name: &str, dest: &Path) {
    let src = fixtures_dir().join("history").join(format!("{name}.json"));
    fs::copy(&src, dest)
        .unwrap_or_else(|e| panic!("failed to copy fixture {}: {e}", src.display()));
}

/// A shell script standing in for the agent CLI.
///
/// `status` prints the configured text; `compact` appends a line to a log
/// file and exits with the configured code.
#[cfg(unix)]
pub struct FakeAgent {
    pub program: PathBuf,
    pub compact_log: PathBuf,
}

#[cfg(unix)]
impl FakeAgent {
    /// Write the script into `dir`.
    ///
    /// # Panics
    ///
    /// Panics if the script cannot be written.
    pub fn install(dir: &Path, status_text: &str, compact_exit: i32) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let status_file = dir.join("agent-status.txt");
        let compact_log = dir.join("agent-compact.log");
        let program = dir.join("fake-agent");
        fs::write(&status_file, status_text).expect("write status text");

        let script = format!(
            "#!/bin/sh\n\
             case \"$1\" in\n\
               status) cat '{status}' ;;\n\
               compact) echo compacted >> '{log}'; \
                 [ {code} -ne 0 ] && echo 'compaction refused' >&2; exit {code} ;;\n\
               *) echo \"unknown command: $1\" >&2; exit 64 ;;\n\
             esac\n",
            status = status_file.display(),
            log = compact_log.display(),
            code = compact_exit,
        );
        fs::write(&program, script).expect("write fake agent");
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).expect("chmod fake agent");

        Self {
            program,
            compact_log,
        }
    }

    /// How many times `compact` was invoked.
    pub fn compact_count(&self) -> usize {
        fs::read_to_string(&self.compact_log).map_or(0, |s| s.lines().count())
    }
}
