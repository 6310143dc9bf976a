//! XP — the fungible point ledger.
//!
//! Balance bookkeeping only: role and pause checks happen in
//! [`crate::ledger::SkillLedger`] before any of these tables are touched.
//! Every method here validates fully before writing, so an `Err` leaves the
//! tables unchanged.

pub mod ledger;

pub use ledger::XpLedger;
