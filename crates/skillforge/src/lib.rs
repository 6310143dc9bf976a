//! SkillForge — a role-gated XP ledger and skill credential registry.
//!
//! Provides a fungible point ledger (XP) with mint, tip, burn, transfers
//! and allowances; non-fungible skill credentials with single and batch
//! issuance; role-based access control with a global pause gate; and a
//! signed, hash-chained log of every committed event.

pub mod access;
pub mod account;
pub mod config;
pub mod credential;
pub mod crypto;
pub mod error;
pub mod event;
pub mod ledger;
pub mod pause;
pub mod query;
pub mod storage;
pub mod time;
pub mod units;
pub mod xp;

// Re-export primary types
pub use access::{Role, RoleRegistry};
pub use account::Account;
pub use config::LedgerConfig;
pub use credential::{CredentialCategory, SkillCredential};
pub use error::{LedgerError, Result};
pub use event::{EventKind, EventRecord, LedgerEvent, LogVerification};
pub use ledger::{LedgerSnapshot, SkillLedger};
pub use pause::PauseState;
pub use query::{EventQuery, SortOrder};
pub use storage::LedgerHome;
