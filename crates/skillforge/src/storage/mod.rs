//! Storage layer for ledger snapshots, the sealing key, and event exports.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.skillforge/` (see
//! [`crate::config::resolve_home`]):
//!
//! ```text
//! ~/.skillforge/
//! ├── ledger.json        versioned snapshot of all tables and the log
//! ├── ledger.lock        advisory lock held while a host mutates
//! ├── sealing.key        hex Ed25519 signing key (0600 on unix)
//! └── events/
//!     └── {seq}.json     one exported record per file
//! ```
//!
//! # Modules
//!
//! - [`ledger_file`] — snapshot save/load with atomic replace.
//! - [`key_file`] — sealing key save/load.
//! - [`event_store`] — per-record export for off-chain indexers.
//! - [`home`] — the directory as a whole: create, open, and locked
//!   transactions.

pub mod event_store;
pub mod home;
pub mod key_file;
pub mod ledger_file;

pub use event_store::EventStore;
pub use home::LedgerHome;
pub use key_file::{load_key, save_key};
pub use ledger_file::{load_snapshot, save_snapshot, LedgerFile};

use std::io::Write as _;
use std::path::Path;

use crate::error::Result;

/// Write `data` to `path` atomically through a uniquely named sibling
/// temporary file.
///
/// Creates the parent directory if it does not exist. Readers see either
/// the old file or the new one, and concurrent writers never share a
/// temporary file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
