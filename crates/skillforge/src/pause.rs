//! Pause gate — the global halt switch.
//!
//! Two states, `Active` (initial) and `Paused`, cycling indefinitely.
//! Pausing a paused gate or unpausing an active one fails with
//! `InvalidStateTransition`; the caller's role is checked by the ledger
//! before the gate is touched.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::{LedgerError, Result};

/// Process-wide pause state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseState {
    #[default]
    Active,
    Paused,
}

impl PauseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

impl std::fmt::Display for PauseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The gate consulted by every ledger and registry mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseGate {
    state: PauseState,
    /// Who last toggled the gate, and when (microseconds since epoch).
    last_change: Option<(Account, u64)>,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PauseState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    pub fn last_change(&self) -> Option<&(Account, u64)> {
        self.last_change.as_ref()
    }

    /// Fail with `OperationPaused` unless the gate is `Active`.
    pub fn require_active(&self) -> Result<()> {
        match self.state {
            PauseState::Active => Ok(()),
            PauseState::Paused => Err(LedgerError::OperationPaused),
        }
    }

    /// Move `Active` → `Paused`.
    pub fn pause(&mut self, by: &Account, at: u64) -> Result<()> {
        self.transition(PauseState::Active, PauseState::Paused, by, at)
    }

    /// Move `Paused` → `Active`.
    pub fn unpause(&mut self, by: &Account, at: u64) -> Result<()> {
        self.transition(PauseState::Paused, PauseState::Active, by, at)
    }

    fn transition(&mut self, from: PauseState, to: PauseState, by: &Account, at: u64) -> Result<()> {
        if self.state != from {
            return Err(LedgerError::InvalidStateTransition(format!(
                "cannot move to {to} from {}",
                self.state
            )));
        }
        self.state = to;
        self.last_change = Some((by.clone(), at));
        Ok(())
    }
}
