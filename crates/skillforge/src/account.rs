//! Account identifiers.
//!
//! An account is an opaque, address-like string. Accounts derived from an
//! Ed25519 public key use the format `acct_` + base58 of the first 16 bytes
//! of SHA-256(public_key).

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};

/// Stable identifier for a ledger participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(pub String);

impl Account {
    /// Wrap a string without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse and validate an account identifier.
    ///
    /// Rejects empty identifiers and identifiers containing whitespace.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let account = Self(id.into());
        account.validate()?;
        Ok(account)
    }

    /// Compute an account ID from a verifying (public) key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let hash = Sha256::digest(key.as_bytes());
        let encoded = bs58::encode(&hash[..16]).into_string();
        Self(format!("acct_{encoded}"))
    }

    /// Check that this identifier can hold balances and credentials.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() || self.0.chars().any(char::is_whitespace) {
            return Err(LedgerError::InvalidAccount(self.0.clone()));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
