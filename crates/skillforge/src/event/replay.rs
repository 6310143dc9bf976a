//! Rebuilding the ledger tables from an event log.
//!
//! Every table a snapshot stores is a function of its log: applying the
//! events in order to empty tables must reproduce the stored tables
//! exactly. Roles are applied without authority checks; the log was only
//! written after those checks passed, and its records are sealed.

use crate::access::RoleRegistry;
use crate::credential::{CredentialRegistry, CredentialRequest};
use crate::error::{LedgerError, Result};
use crate::pause::PauseGate;
use crate::xp::XpLedger;

use super::record::EventRecord;
use super::types::LedgerEvent;

/// Tables produced by replaying a log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayedTables {
    pub roles: RoleRegistry,
    pub gate: PauseGate,
    pub xp: XpLedger,
    pub credentials: CredentialRegistry,
}

/// Apply `records` in order to empty tables.
///
/// # Errors
///
/// `InvalidChain` naming the first record that cannot be applied, e.g. a
/// burn larger than the balance it draws on or a token id out of order.
pub fn replay(records: &[EventRecord]) -> Result<ReplayedTables> {
    let mut tables = ReplayedTables::default();
    for record in records {
        tables.apply(record).map_err(|e| {
            LedgerError::InvalidChain(format!("record {} does not replay: {e}", record.seq))
        })?;
    }
    Ok(tables)
}

impl ReplayedTables {
    /// Apply one record's event.
    pub fn apply(&mut self, record: &EventRecord) -> Result<()> {
        let at = record.recorded_at;
        match &record.event {
            LedgerEvent::XpMinted { to, amount, .. } | LedgerEvent::XpTipped { to, amount, .. } => {
                self.xp.credit(to, *amount)?;
            }
            LedgerEvent::XpBurned { from, amount } => {
                self.xp.debit(from, *amount)?;
            }
            LedgerEvent::XpTransferred {
                from,
                to,
                amount,
                spender: None,
            } => self.xp.move_balance(from, to, *amount)?,
            LedgerEvent::XpTransferred {
                from,
                to,
                amount,
                spender: Some(spender),
            } => self.xp.spend_allowance(spender, from, to, *amount)?,
            LedgerEvent::XpApproval {
                owner,
                spender,
                amount,
            } => self.xp.set_allowance(owner, spender, *amount)?,
            LedgerEvent::SkillMinted {
                to,
                token_id,
                skill_label,
                metadata_uri,
                category,
                issued_by,
            } => {
                let request = CredentialRequest {
                    recipient: to.clone(),
                    skill_label: skill_label.clone(),
                    metadata_uri: metadata_uri.clone(),
                    category: *category,
                };
                let issued = self.credentials.issue(request, issued_by, at)?;
                if issued.token_id != *token_id {
                    return Err(LedgerError::InvalidChain(format!(
                        "token {token_id} would be issued as {}",
                        issued.token_id
                    )));
                }
            }
            LedgerEvent::CredentialTransferred { from, to, token_id } => {
                self.credentials.transfer(from, to, *token_id)?;
            }
            LedgerEvent::RoleGranted { role, account, .. } => {
                if !self.roles.insert_member(role, account) {
                    return Err(LedgerError::InvalidChain(format!(
                        "{account} already holds {role}"
                    )));
                }
            }
            LedgerEvent::RoleRevoked { role, account, .. } => {
                if !self.roles.remove_member(role, account)? {
                    return Err(LedgerError::InvalidChain(format!(
                        "{account} does not hold {role}"
                    )));
                }
            }
            LedgerEvent::RoleAdminChanged {
                role,
                previous,
                new,
            } => {
                let replaced = self.roles.assign_admin_role(role, new.clone());
                if &replaced != previous {
                    return Err(LedgerError::InvalidChain(format!(
                        "admin of {role} was {replaced}, not {previous}"
                    )));
                }
            }
            LedgerEvent::Paused { account } => self.gate.pause(account, at)?,
            LedgerEvent::Unpaused { account } => self.gate.unpause(account, at)?,
        }
        Ok(())
    }
}
