//! Event export — one JSON file per sealed record.
//!
//! Each record is stored as `{seq:010}.json` inside the base directory so
//! that a directory listing sorts in log order. Off-chain indexers tail
//! this directory instead of reading the full snapshot.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "record": { ... EventRecord ... }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::event::EventRecord;

use super::write_atomic;

// ── File format constants ─────────────────────────────────────────────────────

const EVENT_FILE_VERSION: u32 = 1;

// ── On-disk structure ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct EventFile {
    version: u32,
    record: EventRecord,
}

// ── EventStore ────────────────────────────────────────────────────────────────

/// Filesystem-backed export of event records.
///
/// Exports are written under the home's lock; see
/// [`LedgerHome::export_events`](super::LedgerHome::export_events).
pub struct EventStore {
    base_dir: PathBuf,
}

impl EventStore {
    /// Create a store rooted at `base_dir`, creating the directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Write one record atomically. An existing file for the same `seq` is
    /// replaced.
    pub fn save(&self, record: &EventRecord) -> Result<()> {
        let file = EventFile {
            version: EVENT_FILE_VERSION,
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
        write_atomic(&self.record_path(record.seq), json.as_bytes())
    }

    pub fn load(&self, seq: u64) -> Result<EventRecord> {
        let path = self.record_path(seq);
        let bytes = std::fs::read(&path)?;
        let file: EventFile = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFileFormat(format!(
                "failed to parse event file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.record)
    }

    /// Sequence numbers of all stored records, ascending.
    pub fn list(&self) -> Result<Vec<u64>> {
        let mut seqs = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(seq) = name_str
                .strip_suffix(".json")
                .and_then(|stem| stem.parse::<u64>().ok())
            {
                seqs.push(seq);
            }
        }
        seqs.sort_unstable();
        Ok(seqs)
    }

    /// Load every stored record in sequence order.
    pub fn load_all(&self) -> Result<Vec<EventRecord>> {
        self.list()?.into_iter().map(|seq| self.load(seq)).collect()
    }

    /// Write the records not yet exported. Returns how many were written.
    pub fn sync(&self, records: &[EventRecord]) -> Result<usize> {
        let next = self.list()?.last().map_or(0, |seq| seq + 1);
        let mut written = 0;
        for record in records.iter().filter(|r| r.seq >= next) {
            self.save(record)?;
            written += 1;
        }
        Ok(written)
    }

    fn record_path(&self, seq: u64) -> PathBuf {
        self.base_dir.join(format!("{seq:010}.json"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
