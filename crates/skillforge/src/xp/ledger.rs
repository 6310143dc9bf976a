//! Balance and allowance tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::{LedgerError, Result};
use crate::units::{serde_amount, serde_amount_map};

/// Allowances granted by one owner, keyed by spender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
struct AllowanceBook(#[serde(with = "serde_amount_map")] BTreeMap<Account, u128>);

/// Fungible balances with `sum(balances) == total_supply`.
///
/// Zero balances are not stored, so [`XpLedger::holders`] lists only
/// accounts that currently hold XP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpLedger {
    #[serde(with = "serde_amount_map")]
    balances: BTreeMap<Account, u128>,
    #[serde(with = "serde_amount")]
    total_supply: u128,
    #[serde(default)]
    allowances: BTreeMap<Account, AllowanceBook>,
}

impl XpLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Account) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Accounts with a non-zero balance, in stable order.
    pub fn holders(&self) -> impl Iterator<Item = (&Account, u128)> {
        self.balances.iter().map(|(a, b)| (a, *b))
    }

    /// Sum of all balances. Equal to `total_supply` whenever the ledger is
    /// consistent.
    pub fn sum_of_balances(&self) -> Option<u128> {
        self.balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
    }

    pub fn allowance(&self, owner: &Account, spender: &Account) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|book| book.0.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amount` new units in `to`'s balance.
    pub fn credit(&mut self, to: &Account, amount: u128) -> Result<u128> {
        require_positive(amount)?;
        to.validate()?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        // Cannot overflow: a single balance never exceeds the supply.
        let balance = self.balance_of(to) + amount;

        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        Ok(balance)
    }

    /// Destroy `amount` units from `from`'s balance.
    pub fn debit(&mut self, from: &Account, amount: u128) -> Result<u128> {
        require_positive(amount)?;
        let balance = self.require_balance(from, amount)?;
        let remaining = balance - amount;

        self.total_supply -= amount;
        self.set_balance(from, remaining);
        Ok(remaining)
    }

    /// Move `amount` units between two accounts; supply is unchanged.
    pub fn move_balance(&mut self, from: &Account, to: &Account, amount: u128) -> Result<()> {
        require_positive(amount)?;
        to.validate()?;
        let balance = self.require_balance(from, amount)?;

        self.set_balance(from, balance - amount);
        let credited = self.balance_of(to) + amount;
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    /// Set the allowance `spender` may draw from `owner`. Zero clears it.
    pub fn set_allowance(&mut self, owner: &Account, spender: &Account, amount: u128) -> Result<()> {
        spender.validate()?;
        let book = self.allowances.entry(owner.clone()).or_default();
        if amount == 0 {
            book.0.remove(spender);
            if book.0.is_empty() {
                self.allowances.remove(owner);
            }
        } else {
            book.0.insert(spender.clone(), amount);
        }
        Ok(())
    }

    /// Move `amount` from `owner` to `to` on behalf of `spender`, consuming
    /// allowance. Both the allowance and the balance are checked before
    /// either table is written.
    pub fn spend_allowance(
        &mut self,
        spender: &Account,
        owner: &Account,
        to: &Account,
        amount: u128,
    ) -> Result<()> {
        require_positive(amount)?;
        to.validate()?;
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                spender: spender.clone(),
                allowance,
                requested: amount,
            });
        }
        self.require_balance(owner, amount)?;

        self.move_balance(owner, to, amount)?;
        self.set_allowance(owner, spender, allowance - amount)
    }

    fn require_balance(&self, account: &Account, amount: u128) -> Result<u128> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.clone(),
                balance,
                requested: amount,
            });
        }
        Ok(balance)
    }

    fn set_balance(&mut self, account: &Account, balance: u128) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), balance);
        }
    }
}

fn require_positive(amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}
