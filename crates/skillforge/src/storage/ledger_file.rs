//! Ledger snapshot file.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "format": "skillforge-ledger",
//!     "snapshot": { ... LedgerSnapshot ... }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ledger::LedgerSnapshot;

use super::write_atomic;

// ── File format constants ─────────────────────────────────────────────────────

const LEDGER_FILE_VERSION: u32 = 1;
const LEDGER_FILE_FORMAT: &str = "skillforge-ledger";

// ── On-disk structure ─────────────────────────────────────────────────────────

/// Wrapper written to disk around a snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerFile {
    pub version: u32,
    pub format: String,
    pub snapshot: LedgerSnapshot,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Save a snapshot to `path`, replacing any previous file atomically.
pub fn save_snapshot(snapshot: &LedgerSnapshot, path: &Path) -> Result<()> {
    let file = LedgerFile {
        version: LEDGER_FILE_VERSION,
        format: LEDGER_FILE_FORMAT.to_string(),
        snapshot: snapshot.clone(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Load a snapshot from `path`.
///
/// # Errors
///
/// `InvalidFileFormat` if the file cannot be parsed or carries an unknown
/// format or version, `Io` for filesystem errors.
pub fn load_snapshot(path: &Path) -> Result<LedgerSnapshot> {
    let bytes = std::fs::read(path)?;
    let file: LedgerFile = serde_json::from_slice(&bytes).map_err(|e| {
        LedgerError::InvalidFileFormat(format!(
            "failed to parse ledger file {}: {e}",
            path.display()
        ))
    })?;

    if file.format != LEDGER_FILE_FORMAT {
        return Err(LedgerError::InvalidFileFormat(format!(
            "unexpected format {:?}",
            file.format
        )));
    }
    if file.version != LEDGER_FILE_VERSION {
        return Err(LedgerError::InvalidFileFormat(format!(
            "unsupported version {}",
            file.version
        )));
    }
    Ok(file.snapshot)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
