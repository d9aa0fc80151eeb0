//! Event history storage layer.
//!
//! The history is one pretty-printed JSON document:
//!
//! ```json
//! {
//!   "events": [
//!     { "timestamp": "...", "used": 84000, "limit": 200000, "percentage": 42, "action": "check" }
//!   ],
//!   "threshold": 75,
//!   "updated": "2026-01-01T12:00:00.000000Z"
//! }
//! ```
//!
//! The document is loaded once, held in memory, and rewritten whole on every
//! append, through a temporary file renamed into place so a failed write never
//! truncates what was already saved. There is no file locking: two processes appending to the same file
//! can lose each other's events (last writer wins).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::models::{Event, HistoryDocument};
use crate::error::{GuardError, Result};
use crate::util::time::now_timestamp;

/// In-memory history backed by a JSON file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    document: HistoryDocument,
}

impl HistoryStore {
    /// Load the history document at `path`.
    ///
    /// Never fails: a missing, unreadable, or malformed file yields an empty
    /// history (logged at warn unless the file simply does not exist).
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = Self::read_document(&path).unwrap_or_default();
        tracing::debug!(
            path = %path.display(),
            events = document.events.len(),
            persisted_threshold = ?document.threshold,
            "Loaded history"
        );
        Self { path, document }
    }

    fn read_document(path: &Path) -> Option<HistoryDocument> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read history, starting empty");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "History file is malformed, starting empty");
                None
            }
        }
    }

    /// History file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory document.
    #[must_use]
    pub const fn document(&self) -> &HistoryDocument {
        &self.document
    }

    /// All events in append order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.document.events
    }

    /// Number of events held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.document.events.len()
    }

    /// Whether no events are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.events.is_empty()
    }

    /// Threshold recorded in the document, if any.
    #[must_use]
    pub const fn persisted_threshold(&self) -> Option<i64> {
        self.document.threshold
    }

    /// Record `threshold` as the one in effect. Written on the next save.
    pub fn set_threshold(&mut self, threshold: u8) {
        self.document.threshold = Some(i64::from(threshold));
    }

    /// Append an event and persist the whole document.
    ///
    /// The event stays in memory even when the write fails, so later appends
    /// in the same process keep accumulating.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::HistoryWrite`] if the document could not be written.
    pub fn append(&mut self, event: Event) -> Result<()> {
        tracing::debug!(
            action = %event.action,
            percentage = event.percentage,
            timestamp = %event.timestamp,
            "Appending event"
        );
        self.document.events.push(event);
        self.save()
    }

    /// Write the document, stamping `updated` and creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::HistoryWrite`] if the document could not be written.
    pub fn save(&mut self) -> Result<()> {
        self.document.updated = Some(now_timestamp());

        let write_error = |reason: String| GuardError::HistoryWrite {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(&self.document).map_err(|e| write_error(e.to_string()))?;
        write_atomic(&self.path, content.as_bytes()).map_err(|e| write_error(e.to_string()))?;

        tracing::trace!(path = %self.path.display(), events = self.len(), "History saved");
        Ok(())
    }

    /// The `limit` most recent events, newest first.
    ///
    /// Ordered by timestamp descending; equal timestamps keep the most
    /// recently appended first.
    #[must_use]
    pub fn query(&self, limit: usize) -> Vec<Event> {
        let mut indexed: Vec<(usize, &Event)> = self.document.events.iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
        indexed
            .into_iter()
            .take(limit)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

/// Temporary sibling that `path` is written through.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("history.json");
    path.with_file_name(format!(".{name}.tmp.{}", std::process::id()))
}

/// Write to a temporary file in the same directory, then rename over `path`.
///
/// A failed write leaves the previous document untouched.
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let temp = temp_path(path);
    let written = fs::File::create(&temp).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&temp, path)) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}
