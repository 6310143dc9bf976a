//! Credential registry — token table and id allocation.
//!
//! Role and pause checks happen in the ledger before the registry is
//! touched. The registry itself guarantees that ids are gapless and that a
//! rejected issuance, single or batch, leaves the table unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::{LedgerError, Result};

use super::types::{CredentialRequest, SkillCredential};

/// Table of issued credentials keyed by token id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRegistry {
    tokens: BTreeMap<u64, SkillCredential>,
    next_token_id: u64,
}

impl CredentialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next issued credential will receive.
    pub fn next_token_id(&self) -> u64 {
        self.next_token_id
    }

    /// Number of credentials ever issued.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, token_id: u64) -> Result<&SkillCredential> {
        self.tokens
            .get(&token_id)
            .ok_or(LedgerError::TokenNotFound(token_id))
    }

    pub fn owner_of(&self, token_id: u64) -> Result<&Account> {
        self.get(token_id).map(|c| &c.owner)
    }

    pub fn token_uri(&self, token_id: u64) -> Result<&str> {
        self.get(token_id).map(|c| c.metadata_uri.as_str())
    }

    pub fn skill_level(&self, token_id: u64) -> Result<&str> {
        self.get(token_id).map(|c| c.skill_label.as_str())
    }

    /// Credentials currently held by `owner`, in token id order.
    pub fn credentials_of(&self, owner: &Account) -> Vec<&SkillCredential> {
        self.tokens.values().filter(|c| &c.owner == owner).collect()
    }

    pub fn count_of(&self, owner: &Account) -> usize {
        self.tokens.values().filter(|c| &c.owner == owner).count()
    }

    /// All credentials in token id order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillCredential> {
        self.tokens.values()
    }

    /// Issue a single credential and return it.
    pub fn issue(
        &mut self,
        request: CredentialRequest,
        issued_by: &Account,
        issued_at: u64,
    ) -> Result<SkillCredential> {
        request.recipient.validate()?;
        self.allocate(request, issued_by, issued_at)
    }

    /// Issue every request or none.
    ///
    /// Recipients receive consecutive ids in input order starting at
    /// [`next_token_id`](Self::next_token_id). An empty batch issues nothing.
    ///
    /// # Errors
    ///
    /// `BatchTooLarge` when `requests.len() > max_batch`, or
    /// `InvalidAccount` for the first malformed recipient. Nothing is
    /// issued in either case.
    pub fn issue_batch(
        &mut self,
        requests: Vec<CredentialRequest>,
        max_batch: usize,
        issued_by: &Account,
        issued_at: u64,
    ) -> Result<Vec<SkillCredential>> {
        if requests.len() > max_batch {
            return Err(LedgerError::BatchTooLarge {
                size: requests.len(),
                max: max_batch,
            });
        }
        for request in &requests {
            request.recipient.validate()?;
        }
        self.next_token_id
            .checked_add(requests.len() as u64)
            .ok_or(LedgerError::SupplyOverflow)?;

        requests
            .into_iter()
            .map(|request| self.allocate(request, issued_by, issued_at))
            .collect()
    }

    /// Hand `token_id` from `from` to `to`.
    pub fn transfer(&mut self, from: &Account, to: &Account, token_id: u64) -> Result<()> {
        to.validate()?;
        let credential = self
            .tokens
            .get_mut(&token_id)
            .ok_or(LedgerError::TokenNotFound(token_id))?;
        if &credential.owner != from {
            return Err(LedgerError::NotTokenOwner {
                account: from.clone(),
                token_id,
            });
        }
        credential.owner = to.clone();
        Ok(())
    }

    fn allocate(
        &mut self,
        request: CredentialRequest,
        issued_by: &Account,
        issued_at: u64,
    ) -> Result<SkillCredential> {
        let token_id = self.next_token_id;
        let next = token_id.checked_add(1).ok_or(LedgerError::SupplyOverflow)?;

        let credential = SkillCredential {
            token_id,
            owner: request.recipient,
            skill_label: request.skill_label,
            metadata_uri: request.metadata_uri,
            category: request.category,
            issued_by: issued_by.clone(),
            issued_at,
        };
        self.tokens.insert(token_id, credential.clone());
        self.next_token_id = next;
        Ok(credential)
    }
}
