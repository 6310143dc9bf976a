//! Sealing key file — hex-encoded Ed25519 signing key.
//!
//! The key never appears in the snapshot. On unix the file is created with
//! mode `0600`.

use std::path::Path;

use zeroize::Zeroize;

use crate::crypto::keys::Ed25519KeyPair;
use crate::error::{LedgerError, Result};

use super::write_atomic;

/// Write the signing half of `key` to `path`.
pub fn save_key(key: &Ed25519KeyPair, path: &Path) -> Result<()> {
    let mut encoded = key.signing_key_hex();
    let result = write_atomic(path, encoded.as_bytes());
    encoded.zeroize();
    result?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Read a key written by [`save_key`].
pub fn load_key(path: &Path) -> Result<Ed25519KeyPair> {
    let mut contents = std::fs::read_to_string(path)?;
    let key = Ed25519KeyPair::from_signing_key_hex(contents.trim()).map_err(|e| {
        LedgerError::InvalidKey(format!("{}: {e}", path.display()))
    });
    contents.zeroize();
    key
}
