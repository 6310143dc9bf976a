//! Append-only event log, chained by record hash.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use super::record::EventRecord;
use super::types::LedgerEvent;

/// Ordered sequence of sealed records. Records are never removed or
/// reordered once appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records loaded from storage. Callers verify them first.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        Self { records }
    }

    /// Seal `event` onto the end of the log and return the new record.
    pub fn append(
        &mut self,
        event: LedgerEvent,
        recorded_at: u64,
        signing_key: &SigningKey,
    ) -> &EventRecord {
        let seq = self.records.len() as u64;
        let previous_hash = self.records.last().map(|r| r.record_hash.clone());
        let record = EventRecord::seal(seq, event, recorded_at, previous_hash, signing_key);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
