//! Query engine for the event log.
//!
//! [`EventQuery`] / [`query_events`] filter and sort sealed records by
//! event kind, mentioned account, sequence range, and result limit.
//!
//! ## Query execution model
//!
//! 1. Start from the full record slice (already in sequence order).
//! 2. Apply every specified filter in turn; filters combine with AND.
//! 3. Sort according to [`SortOrder`].
//! 4. Apply an optional result limit.

use crate::account::Account;
use crate::event::{EventKind, EventRecord};

// ── SortOrder ─────────────────────────────────────────────────────────────────

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently committed record first (descending sequence).
    #[default]
    NewestFirst,
    /// Oldest record first (ascending sequence).
    OldestFirst,
}

// ── EventQuery ────────────────────────────────────────────────────────────────

/// Query parameters for filtering [`EventRecord`]s.
///
/// All fields are optional. Unset fields impose no restriction.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Restrict results to events of this kind.
    pub kind: Option<EventKind>,
    /// Restrict results to events that mention this account in any role
    /// (recipient, sender, owner, spender, grantee, or pauser).
    pub account: Option<Account>,
    /// Restrict results to records whose `seq` falls within `[from, to]`.
    pub seq_range: Option<(u64, u64)>,
    /// Maximum number of records to return (applied after sorting).
    pub limit: Option<usize>,
    pub sort: SortOrder,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    pub fn seq_range(mut self, from: u64, to: u64) -> Self {
        self.seq_range = Some((from, to));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

// ── query_events ──────────────────────────────────────────────────────────────

/// Execute an [`EventQuery`] against records in sequence order.
pub fn query_events<'a>(records: &'a [EventRecord], query: &EventQuery) -> Vec<&'a EventRecord> {
    let mut matches: Vec<&EventRecord> = records
        .iter()
        .filter(|r| query.kind.map_or(true, |k| r.event.kind() == k))
        .filter(|r| {
            query
                .account
                .as_ref()
                .map_or(true, |a| r.event.involves(a))
        })
        .filter(|r| {
            query
                .seq_range
                .map_or(true, |(from, to)| r.seq >= from && r.seq <= to)
        })
        .collect();

    if query.sort == SortOrder::NewestFirst {
        matches.reverse();
    }

    if let Some(limit) = query.limit {
        matches.truncate(limit);
    }

    matches
}
