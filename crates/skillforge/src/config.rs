//! Ledger configuration and data directory resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::units::{self, serde_amount};

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "SKILLFORGE_HOME";

/// Directory name used under `$HOME` when no override is set.
pub const DEFAULT_DIR_NAME: &str = ".skillforge";

/// Deployment parameters. Fixed for the lifetime of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Supply minted to the deployer, in whole units.
    #[serde(with = "serde_amount")]
    pub initial_supply: u128,
    /// Upper bound on `batch_mint` input length.
    pub max_batch_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "Skill XP".to_string(),
            symbol: "XP".to_string(),
            decimals: 18,
            initial_supply: 1_000_000,
            max_batch_size: 100,
        }
    }
}

impl LedgerConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFileFormat(format!(
                "failed to parse config {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(LedgerError::InvalidFileFormat(
                "name and symbol must be non-empty".into(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(LedgerError::InvalidFileFormat(
                "max_batch_size must be at least 1".into(),
            ));
        }
        self.initial_supply_units()?;
        Ok(())
    }

    /// `initial_supply * 10^decimals`.
    pub fn initial_supply_units(&self) -> Result<u128> {
        units::scale_whole(self.initial_supply, self.decimals)
    }
}

/// Resolve the data directory: explicit path, then `$SKILLFORGE_HOME`,
/// then `$HOME/.skillforge`, then `./.skillforge`.
pub fn resolve_home(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home).join(DEFAULT_DIR_NAME),
        None => PathBuf::from(DEFAULT_DIR_NAME),
    }
}
