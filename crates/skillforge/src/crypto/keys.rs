//! Ed25519 key pair generation and encoding.
//!
//! The ledger holds one Ed25519 key pair (the sealing key) and signs every
//! committed event record with it.

use base64::Engine as _;
use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::error::{LedgerError, Result};

/// An Ed25519 key pair for signing operations.
///
/// The signing key is zeroized on drop to prevent private key leakage.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from a hex-encoded signing key.
    pub fn from_signing_key_hex(encoded: &str) -> Result<Self> {
        let mut raw = hex::decode(encoded.trim())
            .map_err(|e| LedgerError::InvalidKey(format!("invalid hex signing key: {e}")))?;
        let mut bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
            LedgerError::InvalidKey(format!("signing key must be 32 bytes, got {}", raw.len()))
        })?;
        raw.zeroize();
        let kp = Self::from_signing_key_bytes(&bytes);
        bytes.zeroize();
        Ok(kp)
    }

    /// Reconstruct a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(bytes)
            .map_err(|e| LedgerError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    /// Decode a base64 verifying key.
    pub fn verifying_key_from_base64(encoded: &str) -> Result<VerifyingKey> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| LedgerError::InvalidKey(format!("invalid base64 verifying key: {e}")))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| LedgerError::InvalidKey("verifying key must be 32 bytes".into()))?;
        Self::verifying_key_from_bytes(&bytes)
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the signing key bytes. Caller must zeroize after use.
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Hex-encode the signing key for storage. Caller must zeroize after use.
    pub fn signing_key_hex(&self) -> String {
        let mut bytes = self.signing_key_bytes();
        let encoded = hex::encode(bytes);
        bytes.zeroize();
        encoded
    }

    /// Return the verifying key as base64.
    pub fn verifying_key_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.verifying_key.to_bytes())
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        // SigningKey stores bytes internally; zeroize via conversion
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
