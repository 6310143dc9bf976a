//! Seals over event record hashes.
//!
//! A seal is the base64 Ed25519 signature of a record's hex hash, made with
//! the ledger's sealing key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{LedgerError, Result};

/// Seal `record_hash`.
pub fn seal_hash(signing_key: &SigningKey, record_hash: &str) -> String {
    STANDARD.encode(signing_key.sign(record_hash.as_bytes()).to_bytes())
}

/// Check that `seal` was made over `record_hash` by the holder of
/// `verifying_key`. A seal that does not decode to 64 bytes is as invalid
/// as a forged one.
pub fn verify_seal(verifying_key: &VerifyingKey, record_hash: &str, seal: &str) -> Result<()> {
    let bytes: [u8; 64] = STANDARD
        .decode(seal)
        .ok()
        .and_then(|raw| raw.try_into().ok())
        .ok_or(LedgerError::SignatureInvalid)?;
    verifying_key
        .verify(record_hash.as_bytes(), &Signature::from_bytes(&bytes))
        .map_err(|_| LedgerError::SignatureInvalid)
}
