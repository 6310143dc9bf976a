//! Sealed event records — a signed, hash-chained envelope per event.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::crypto::signing;

use super::types::LedgerEvent;

/// Unique identifier for an event record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One committed event, in log order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// Position in the log, starting at 0.
    pub seq: u64,
    pub event: LedgerEvent,
    /// Commit time (microseconds since epoch).
    pub recorded_at: u64,
    /// `record_hash` of the preceding record; `None` for the first.
    pub previous_hash: Option<String>,
    pub record_hash: String,
    /// Base64 Ed25519 signature over `record_hash`.
    pub signature: String,
}

impl EventRecord {
    /// Seal `event` as record number `seq`.
    pub fn seal(
        seq: u64,
        event: LedgerEvent,
        recorded_at: u64,
        previous_hash: Option<String>,
        signing_key: &SigningKey,
    ) -> Self {
        let record_hash = content_hash(seq, &event, recorded_at, previous_hash.as_deref());

        let id_hash = Sha256::digest(record_hash.as_bytes());
        let id = EventId(format!(
            "aevt_{}",
            bs58::encode(&id_hash[..16]).into_string()
        ));

        let signature = signing::seal_hash(signing_key, &record_hash);

        Self {
            id,
            seq,
            event,
            recorded_at,
            previous_hash,
            record_hash,
            signature,
        }
    }

    /// Recompute the hash from the record's content fields.
    pub fn compute_hash(&self) -> String {
        content_hash(
            self.seq,
            &self.event,
            self.recorded_at,
            self.previous_hash.as_deref(),
        )
    }
}

fn content_hash(
    seq: u64,
    event: &LedgerEvent,
    recorded_at: u64,
    previous_hash: Option<&str>,
) -> String {
    let hash_input = format!(
        "{}:{}:{}:{}:{}",
        seq,
        event.tag(),
        serde_json::to_string(event).unwrap_or_default(),
        recorded_at,
        previous_hash.unwrap_or(""),
    );
    hex::encode(Sha256::digest(hash_input.as_bytes()))
}
