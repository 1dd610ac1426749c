//! Persistence layer for the ranked *command history* file.
//!
//! The history is stored at `~/.vscode-shell-filter-history` as a single
//! pretty-printed JSON array, one object per distinct filter command:
//!
//! ````text
//! [
//!   {
//!     "command": "sort -u",
//!     "count": 4
//!   }
//! ]
//! ````
//!
//! The whole file is rewritten on every save, sorted by descending `count`
//! and capped at [`MAX_PERSISTED_ENTRIES`] records. Nothing is locked: two
//! invocations racing on the same file simply overwrite each other and the
//! last writer wins.
//!
//! I/O and parse failures are logged and swallowed. A file that is not a
//! JSON array behaves like an empty one, a malformed record inside the array
//! is skipped on its own, and a failed save leaves the previous file in
//! place.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;
use crate::config_types::HistoryPersistence;
use crate::error::Result;

/// Upper bound on the number of records written to disk.
pub const MAX_PERSISTED_ENTRIES: usize = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Literal shell command text. Never parsed or normalised.
    pub command: String,
    /// Number of successful runs recorded for `command`.
    pub count: u64,
}

impl HistoryEntry {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            count: 1,
        }
    }
}

/// In-memory view of the history file, owned by whoever drives a filter
/// invocation and passed by reference into [`update`](Self::update) and
/// [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct CommandHistory {
    path: PathBuf,
    persistence: HistoryPersistence,
    entries: Vec<HistoryEntry>,
}

impl CommandHistory {
    /// Loads the history file named by `config`.
    pub fn load(config: &Config) -> Self {
        let mut history = Self::load_from_path(&config.history_file);
        history.persistence = config.history.persistence;
        history
    }

    /// Loads `path`. Missing, unreadable or malformed files all produce an
    /// empty history.
    pub fn load_from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            persistence: HistoryPersistence::SaveAll,
            entries,
        }
    }

    /// Builds a history backed by `path` without touching the filesystem.
    pub fn with_entries(path: impl Into<PathBuf>, entries: Vec<HistoryEntry>) -> Self {
        Self {
            path: path.into(),
            persistence: HistoryPersistence::SaveAll,
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in their current in-memory order: insertion order until the
    /// first [`save`](Self::save), rank order afterwards.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, command: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.command == command)
    }

    /// Records one successful run of `command`: bumps the count of an exact
    /// match or appends a fresh entry with a count of one.
    pub fn update(&mut self, command: &str) {
        update_entries(&mut self.entries, command);
    }

    /// Ranks the in-memory entries and writes the top
    /// [`MAX_PERSISTED_ENTRIES`] to disk. Failures are logged, never returned;
    /// use [`try_save`](Self::try_save) to observe them.
    pub fn save(&mut self) {
        if let Err(e) = self.try_save() {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to save command history");
        }
    }

    /// Same as [`save`](Self::save) but propagates the failure.
    pub fn try_save(&mut self) -> Result<()> {
        rank_entries(&mut self.entries);

        match self.persistence {
            HistoryPersistence::SaveAll => {}
            HistoryPersistence::None => {
                tracing::debug!("history persistence disabled; skipping save");
                return Ok(());
            }
        }

        let top = &self.entries[..self.entries.len().min(MAX_PERSISTED_ENTRIES)];
        write_entries(&self.path, top)
    }
}

/// Stable sort by descending `count`; equal counts keep their relative order.
pub fn rank_entries(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
}

fn update_entries(entries: &mut Vec<HistoryEntry>, command: &str) {
    match entries.iter_mut().find(|entry| entry.command == command) {
        Some(existing) => existing.count += 1,
        None => entries.push(HistoryEntry::new(command)),
    }
}

fn load_entries(path: &Path) -> Vec<HistoryEntry> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to read command history");
            return Vec::new();
        }
    };

    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to parse command history");
            return Vec::new();
        }
    };

    // A bad record is dropped on its own so the next save keeps the rest.
    records
        .into_iter()
        .filter_map(|record| match entry_from_value(&record) {
            Some(entry) => Some(entry),
            None => {
                tracing::warn!(%record, path = %path.display(), "skipping malformed history entry");
                None
            }
        })
        .collect()
}

fn entry_from_value(record: &serde_json::Value) -> Option<HistoryEntry> {
    if let Ok(entry) = HistoryEntry::deserialize(record) {
        return Some(entry);
    }

    // Counts written as integral floats (`2.0`) are still counts.
    let command = record.get("command")?.as_str()?;
    let count = record.get("count")?.as_f64()?;
    if count < 0.0 || count.fract() != 0.0 || count > u64::MAX as f64 {
        return None;
    }
    Some(HistoryEntry {
        command: command.to_string(),
        count: count as u64,
    })
}

/// Writes `entries` to a temporary file next to `path` and renames it into
/// place, so an interrupted or failed write never truncates the old file.
///
/// A symlinked history file is followed, so the rename replaces the link's
/// target and the link itself survives. The previous file's permissions are
/// carried over; a new file gets the temp file's 0o600 on Unix.
fn write_entries(path: &Path, entries: &[HistoryEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;

    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    if let Ok(existing) = std::fs::metadata(&target) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.persist(&target).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), entries = entries.len(), "saved command history");
    Ok(())
}
