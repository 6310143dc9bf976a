//! Role membership registry.
//!
//! Every role has an admin role whose holders may grant and revoke it.
//! Unless reassigned with [`RoleRegistry::set_role_admin`], that admin role
//! is `ADMIN`; `ADMIN` holders keep authority over every role either way.
//! The registry refuses any change that would leave `ADMIN` without members.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::{LedgerError, Result};

use super::role::Role;

/// Membership relation between roles and accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    members: BTreeMap<Role, BTreeSet<Account>>,
    /// Admin role overrides; roles absent here are administered by `ADMIN`.
    admin_roles: BTreeMap<Role, Role>,
}

impl RoleRegistry {
    /// Create a registry whose only member is `admin`, holding `ADMIN`.
    pub fn bootstrap(admin: Account) -> Self {
        let mut members = BTreeMap::new();
        members.insert(Role::admin(), BTreeSet::from([admin]));
        Self {
            members,
            admin_roles: BTreeMap::new(),
        }
    }

    /// Return `true` if `account` holds `role`.
    pub fn has_role(&self, role: &Role, account: &Account) -> bool {
        self.members
            .get(role)
            .is_some_and(|set| set.contains(account))
    }

    /// Fail with `Unauthorized` unless `account` holds `role`.
    pub fn require(&self, role: &Role, account: &Account) -> Result<()> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                account: account.clone(),
                role: role.clone(),
            })
        }
    }

    /// Fail with `Unauthorized` unless `caller` may grant and revoke `role`:
    /// it holds `ADMIN` or the role's admin role.
    pub fn require_grantor(&self, role: &Role, caller: &Account) -> Result<()> {
        if self.has_role(&Role::admin(), caller) {
            return Ok(());
        }
        self.require(&self.role_admin(role), caller)
    }

    /// The role whose holders may grant and revoke `role`.
    pub fn role_admin(&self, role: &Role) -> Role {
        self.admin_roles
            .get(role)
            .cloned()
            .unwrap_or_else(Role::admin)
    }

    /// Members of `role` in stable (sorted) order.
    pub fn members(&self, role: &Role) -> Vec<Account> {
        self.members
            .get(role)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn member_count(&self, role: &Role) -> usize {
        self.members.get(role).map_or(0, BTreeSet::len)
    }

    /// Roles held by `account`.
    pub fn roles_of(&self, account: &Account) -> Vec<Role> {
        self.members
            .iter()
            .filter(|(_, set)| set.contains(account))
            .map(|(role, _)| role.clone())
            .collect()
    }

    /// Every role that has ever had members or an admin override.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: BTreeSet<Role> = self.members.keys().cloned().collect();
        roles.extend(self.admin_roles.keys().cloned());
        roles.into_iter().collect()
    }

    /// Grant `role` to `account`. Returns `false` if it was already held.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` holds neither `ADMIN` nor the role's admin role,
    /// `InvalidAccount` if `account` is malformed.
    pub fn grant(&mut self, caller: &Account, role: &Role, account: &Account) -> Result<bool> {
        self.require_grantor(role, caller)?;
        account.validate()?;
        Ok(self.insert_member(role, account))
    }

    /// Revoke `role` from `account`. Returns `false` if it was not held.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` holds neither `ADMIN` nor the role's admin role, `LastAdmin`
    /// if this would empty `ADMIN`.
    pub fn revoke(&mut self, caller: &Account, role: &Role, account: &Account) -> Result<bool> {
        self.require_grantor(role, caller)?;
        self.remove_member(role, account)
    }

    /// Drop `role` from the caller's own memberships.
    ///
    /// # Errors
    ///
    /// `LastAdmin` if the caller is the only `ADMIN`.
    pub fn renounce(&mut self, caller: &Account, role: &Role) -> Result<bool> {
        self.remove_member(role, caller)
    }

    /// Reassign the admin role of `role`. Returns the previous admin role.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` holds `ADMIN`; `InvalidStateTransition`
    /// when trying to re-home `ADMIN` itself.
    pub fn set_role_admin(&mut self, caller: &Account, role: &Role, admin_role: Role) -> Result<Role> {
        self.require(&Role::admin(), caller)?;
        if role.is_admin() {
            return Err(LedgerError::InvalidStateTransition(
                "ADMIN is always administered by itself".into(),
            ));
        }
        Ok(self.assign_admin_role(role, admin_role))
    }

    /// Add `account` to `role` without an authority check.
    pub(crate) fn insert_member(&mut self, role: &Role, account: &Account) -> bool {
        self.members
            .entry(role.clone())
            .or_default()
            .insert(account.clone())
    }

    /// Point `role` at `admin_role` without an authority check. Returns the
    /// previous admin role.
    pub(crate) fn assign_admin_role(&mut self, role: &Role, admin_role: Role) -> Role {
        let previous = self.role_admin(role);
        if admin_role.is_admin() {
            self.admin_roles.remove(role);
        } else {
            self.admin_roles.insert(role.clone(), admin_role);
        }
        previous
    }

    pub(crate) fn remove_member(&mut self, role: &Role, account: &Account) -> Result<bool> {
        if !self.has_role(role, account) {
            return Ok(false);
        }
        if role.is_admin() && self.member_count(role) == 1 {
            return Err(LedgerError::LastAdmin(role.clone()));
        }
        let Some(set) = self.members.get_mut(role) else {
            return Ok(false);
        };
        let removed = set.remove(account);
        if set.is_empty() {
            self.members.remove(role);
        }
        Ok(removed)
    }
}
