//! A ledger's data directory.
//!
//! Hosts mutate a home through [`LedgerHome::transact`], which holds an
//! exclusive advisory lock on `ledger.lock` from load to commit. Separate
//! `sfx` and MCP processes sharing a home therefore apply their calls one
//! after another, and a commit from a handle whose ledger fell behind the
//! file is refused instead of overwriting newer events.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::account::Account;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::ledger::SkillLedger;

use super::event_store::EventStore;
use super::key_file::{load_key, save_key};
use super::ledger_file::{load_snapshot, save_snapshot};

const LEDGER_FILE: &str = "ledger.json";
const KEY_FILE: &str = "sealing.key";
const LOCK_FILE: &str = "ledger.lock";
const EVENTS_DIR: &str = "events";

/// Exclusive hold on a ledger home. Released when dropped.
#[derive(Debug)]
pub struct HomeLock {
    _file: File,
}

/// Paths of one ledger home and the operations hosts run against it.
#[derive(Debug, Clone)]
pub struct LedgerHome {
    root: PathBuf,
}

impl LedgerHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn key_path(&self) -> PathBuf {
        self.root.join(KEY_FILE)
    }

    pub fn events_dir(&self) -> PathBuf {
        self.root.join(EVENTS_DIR)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Return `true` if a ledger has been deployed here.
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    /// Deploy a new ledger into this directory.
    ///
    /// # Errors
    ///
    /// `StorageError` if a ledger already exists here.
    pub fn create(&self, config: LedgerConfig, deployer: Account) -> Result<SkillLedger> {
        std::fs::create_dir_all(&self.root)?;
        let _lock = self.lock()?;
        if self.exists() {
            return Err(LedgerError::StorageError(format!(
                "ledger already exists at {}",
                self.ledger_path().display()
            )));
        }
        let ledger = SkillLedger::deploy(config, deployer)?;
        save_key(ledger.sealing_key(), &self.key_path())?;
        self.commit_locked(&ledger)?;
        log::info!("created ledger at {}", self.root.display());
        Ok(ledger)
    }

    /// Load and verify the ledger stored here.
    pub fn open(&self) -> Result<SkillLedger> {
        self.require_ledger()?;
        let snapshot = load_snapshot(&self.ledger_path())?;
        let key = load_key(&self.key_path())?;
        SkillLedger::from_snapshot(snapshot, key)
    }

    /// Block until this handle holds the home's exclusive lock.
    pub fn lock(&self) -> Result<HomeLock> {
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        FileExt::lock_exclusive(&file).map_err(|e| {
            LedgerError::StorageError(format!("failed to lock {}: {e}", path.display()))
        })?;
        Ok(HomeLock { _file: file })
    }

    /// Load the ledger, apply one mutation and commit it, all under the
    /// home's lock. Nothing is written if `apply` fails.
    pub fn transact<T>(
        &self,
        apply: impl FnOnce(&mut SkillLedger) -> Result<T>,
    ) -> Result<(SkillLedger, T)> {
        self.require_ledger()?;
        let _lock = self.lock()?;
        let mut ledger = self.open()?;
        let out = apply(&mut ledger)?;
        self.commit_locked(&ledger)?;
        Ok((ledger, out))
    }

    /// Persist the ledger's current state.
    ///
    /// # Errors
    ///
    /// `StorageError` if the stored log is not a prefix of `ledger`'s log,
    /// i.e. another handle committed since this one was loaded.
    pub fn commit(&self, ledger: &SkillLedger) -> Result<()> {
        let _lock = self.lock()?;
        self.commit_locked(ledger)
    }

    /// Export records not yet present in the events directory.
    pub fn export_events(&self, ledger: &SkillLedger) -> Result<usize> {
        let _lock = self.lock()?;
        EventStore::new(self.events_dir())?.sync(ledger.events())
    }

    fn require_ledger(&self) -> Result<()> {
        if self.exists() {
            return Ok(());
        }
        Err(LedgerError::StorageError(format!(
            "no ledger at {} (run `sfx init` first)",
            self.root.display()
        )))
    }

    fn commit_locked(&self, ledger: &SkillLedger) -> Result<()> {
        if self.exists() {
            let stored = load_snapshot(&self.ledger_path())?.events;
            let ours = ledger.events();
            let extends = stored.len() <= ours.len()
                && stored
                    .last()
                    .map_or(true, |last| last.record_hash == ours[stored.len() - 1].record_hash);
            if !extends {
                return Err(LedgerError::StorageError(format!(
                    "ledger at {} changed since it was loaded ({} events stored, {} in memory)",
                    self.root.display(),
                    stored.len(),
                    ours.len()
                )));
            }
        }
        save_snapshot(&ledger.snapshot(), &self.ledger_path())?;
        log::debug!("committed {} events", ledger.events().len());
        Ok(())
    }
}
