//! Event log — the audit trail of committed state changes.
//!
//! Every successful mutation appends exactly the events it emits, after
//! the change is applied. Each event is sealed into an [`EventRecord`]
//! that is hash-chained to its predecessor and signed with the ledger's
//! sealing key, so an exported log can be verified offline with
//! [`verify_log`]. Replaying a log with [`replay`] rebuilds every table it
//! describes.

pub mod chain;
pub mod record;
pub mod replay;
pub mod types;
pub mod verify;

pub use chain::EventLog;
pub use record::{EventId, EventRecord};
pub use replay::{replay, ReplayedTables};
pub use types::{EventKind, LedgerEvent};
pub use verify::{verify_log, verify_record, LogVerification};
