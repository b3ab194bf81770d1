//! JSON file persistence for the clipboard history
//!
//! The whole history is the unit of durability: every save rewrites the file.
//! Writes go through a temporary file in the same directory followed by an
//! atomic rename, so a reader sees either the old list or the new one.

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::interface::ClipboardEntry;
use crate::models::StoredEntry;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialize(serde_json::Error),
    #[error("Malformed history file: {0}")]
    Malformed(serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable store bound to a single history file
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the history. Never fails:
    /// - missing file: created holding `[]`
    /// - malformed file (bad JSON or not UTF-8): overwritten with `[]`
    /// - unreadable file: logged, treated as empty
    ///
    /// Entries repeating an earlier `creationTime` are dropped.
    pub fn load(&self) -> Vec<ClipboardEntry> {
        match self.read() {
            Ok(entries) => self.drop_duplicate_ids(entries),
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "history file missing, creating it");
                self.reset();
                Vec::new()
            }
            Err(StoreError::Malformed(e)) => {
                warn!(path = %self.path.display(), error = %e, "history file is malformed, resetting to empty");
                self.reset();
                Vec::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history file unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Read and parse the file, surfacing every failure
    fn read(&self) -> StoreResult<Vec<ClipboardEntry>> {
        let raw = fs::read(&self.path)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let stored: Vec<StoredEntry> = serde_json::from_slice(&raw).map_err(StoreError::Malformed)?;
        Ok(stored.into_iter().map(ClipboardEntry::from).collect())
    }

    /// Keep the first entry for each `creationTime`
    fn drop_duplicate_ids(&self, mut entries: Vec<ClipboardEntry>) -> Vec<ClipboardEntry> {
        let before = entries.len();
        let mut seen = HashSet::with_capacity(before);
        entries.retain(|e| seen.insert(e.creation_time));
        let dropped = before - entries.len();
        if dropped > 0 {
            warn!(path = %self.path.display(), dropped, "history file repeats creation times, keeping first occurrence");
        }
        entries
    }

    fn reset(&self) {
        if let Err(e) = self.save(&[]) {
            warn!(path = %self.path.display(), error = %e, "failed to reset history file");
        }
    }

    /// Serialize the full history and atomically replace the file.
    /// The temporary file is removed on every error path (NamedTempFile drop).
    pub fn save(&self, entries: &[ClipboardEntry]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let stored: Vec<StoredEntry> = entries.iter().map(StoredEntry::from).collect();

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            stored.serialize(&mut ser).map_err(StoreError::Serialize)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), entries = entries.len(), "history saved");
        Ok(())
    }
}
