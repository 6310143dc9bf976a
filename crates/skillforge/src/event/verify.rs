//! Event log verification.
//!
//! Verifies a sequence of records (oldest first) against the ledger's
//! sealing key by recomputing each hash, checking each signature, and
//! walking the `previous_hash` links.

use ed25519_dalek::VerifyingKey;

use crate::crypto::signing;
use crate::error::{LedgerError, Result};

use super::record::EventRecord;

/// Result of verifying an event log.
#[derive(Debug, Clone)]
pub struct LogVerification {
    pub records_checked: usize,
    pub hashes_valid: bool,
    pub signatures_valid: bool,
    /// Sequence numbers are contiguous from the first record and every
    /// `previous_hash` matches its predecessor.
    pub chain_valid: bool,
    pub is_valid: bool,
    /// One line per problem found, in log order.
    pub errors: Vec<String>,
    pub verified_at: u64,
}

impl LogVerification {
    /// Convert a failed verification into the matching error.
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid {
            return Ok(self);
        }
        if !self.signatures_valid && self.hashes_valid && self.chain_valid {
            return Err(LedgerError::SignatureInvalid);
        }
        Err(LedgerError::InvalidChain(
            self.errors.first().cloned().unwrap_or_default(),
        ))
    }
}

/// Verify a single record's hash and signature.
pub fn verify_record(record: &EventRecord, verifying_key: &VerifyingKey) -> Result<()> {
    if record.compute_hash() != record.record_hash {
        return Err(LedgerError::InvalidChain(format!(
            "record {} hash mismatch",
            record.seq
        )));
    }
    signing::verify_seal(verifying_key, &record.record_hash, &record.signature)
}

/// Verify a full log, or a contiguous slice of one.
///
/// Problems are collected rather than returned early, so the report
/// lists every damaged record.
pub fn verify_log(records: &[EventRecord], verifying_key: &VerifyingKey) -> LogVerification {
    let mut hashes_valid = true;
    let mut signatures_valid = true;
    let mut chain_valid = true;
    let mut errors = Vec::new();

    for (i, record) in records.iter().enumerate() {
        if record.compute_hash() != record.record_hash {
            hashes_valid = false;
            errors.push(format!("record {}: hash mismatch", record.seq));
        }

        if signing::verify_seal(verifying_key, &record.record_hash, &record.signature).is_err() {
            signatures_valid = false;
            errors.push(format!("record {}: bad signature", record.seq));
        }

        if i == 0 {
            // A slice may start mid-log; only a log from seq 0 must be unlinked.
            if record.seq == 0 && record.previous_hash.is_some() {
                chain_valid = false;
                errors.push("record 0: unexpected previous hash".to_string());
            }
            continue;
        }

        let prev = &records[i - 1];
        if record.seq != prev.seq + 1 {
            chain_valid = false;
            errors.push(format!(
                "record {}: expected seq {}",
                record.seq,
                prev.seq + 1
            ));
        }
        if record.previous_hash.as_deref() != Some(prev.record_hash.as_str()) {
            chain_valid = false;
            errors.push(format!("record {}: broken link", record.seq));
        }
    }

    LogVerification {
        records_checked: records.len(),
        hashes_valid,
        signatures_valid,
        chain_valid,
        is_valid: hashes_valid && signatures_valid && chain_valid,
        errors,
        verified_at: crate::time::now_micros(),
    }
}
