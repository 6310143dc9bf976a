//! The ledger state container — the only mutation surface.
//!
//! [`SkillLedger`] owns the role registry, the pause gate, the XP tables,
//! the credential table and the event log. Every mutating operation
//! checks, in order: the caller's role, the pause gate, then its inputs.
//! Nothing is written until all checks pass, and events are appended only
//! after the state change is applied, so a failed call leaves the ledger
//! and its log untouched.

use serde::{Deserialize, Serialize};

use crate::access::{Role, RoleRegistry};
use crate::account::Account;
use crate::config::LedgerConfig;
use crate::credential::{CredentialRegistry, CredentialRequest, SkillCredential};
use crate::crypto::keys::Ed25519KeyPair;
use crate::error::{LedgerError, Result};
use crate::event::{replay, verify_log, EventLog, EventRecord, LedgerEvent, LogVerification};
use crate::pause::{PauseGate, PauseState};
use crate::query::{query_events, EventQuery};
use crate::xp::XpLedger;

/// Reason attached to the deployment mint.
pub const INITIAL_SUPPLY_REASON: &str = "initial supply";

// ── LedgerSnapshot ────────────────────────────────────────────────────────────

/// Serializable image of a ledger, minus the private sealing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub config: LedgerConfig,
    pub deployer: Account,
    pub deployed_at: u64,
    /// Base64 public half of the sealing key.
    pub verifying_key: String,
    pub roles: RoleRegistry,
    pub pause: PauseGate,
    pub xp: XpLedger,
    pub credentials: CredentialRegistry,
    pub events: Vec<EventRecord>,
}

// ── SkillLedger ───────────────────────────────────────────────────────────────

/// XP balances, skill credentials, roles and the pause gate, with a sealed
/// audit log of every committed change.
pub struct SkillLedger {
    config: LedgerConfig,
    deployer: Account,
    deployed_at: u64,
    roles: RoleRegistry,
    gate: PauseGate,
    xp: XpLedger,
    credentials: CredentialRegistry,
    log: EventLog,
    sealing_key: Ed25519KeyPair,
}

impl SkillLedger {
    /// Deploy a new ledger with a freshly generated sealing key.
    ///
    /// The deployer receives `ADMIN` and the initial supply.
    pub fn deploy(config: LedgerConfig, deployer: Account) -> Result<Self> {
        Self::deploy_with_key(config, deployer, Ed25519KeyPair::generate())
    }

    /// Deploy a new ledger that seals its events with `sealing_key`.
    pub fn deploy_with_key(
        config: LedgerConfig,
        deployer: Account,
        sealing_key: Ed25519KeyPair,
    ) -> Result<Self> {
        config.validate()?;
        deployer.validate()?;
        let supply = config.initial_supply_units()?;
        let now = crate::time::now_micros();

        let mut ledger = Self {
            roles: RoleRegistry::bootstrap(deployer.clone()),
            gate: PauseGate::new(),
            xp: XpLedger::new(),
            credentials: CredentialRegistry::new(),
            log: EventLog::new(),
            config,
            deployer: deployer.clone(),
            deployed_at: now,
            sealing_key,
        };

        ledger.emit(
            LedgerEvent::RoleGranted {
                role: Role::admin(),
                account: deployer.clone(),
                sender: deployer.clone(),
            },
            now,
        );
        if supply > 0 {
            ledger.xp.credit(&deployer, supply)?;
            ledger.emit(
                LedgerEvent::XpMinted {
                    to: deployer.clone(),
                    amount: supply,
                    reason: INITIAL_SUPPLY_REASON.to_string(),
                },
                now,
            );
        }

        log::info!(
            "deployed {} ({}) for {deployer} with supply {supply}",
            ledger.config.name,
            ledger.config.symbol
        );
        Ok(ledger)
    }

    /// Rebuild a ledger from a snapshot and its sealing key.
    ///
    /// The event log is verified and then replayed; the stored tables must
    /// equal the replayed ones.
    ///
    /// # Errors
    ///
    /// `InvalidKey` if the key does not match the snapshot,
    /// `InvalidChain` / `SignatureInvalid` if the event log fails
    /// verification or cannot be replayed, `InvalidFileFormat` if a stored
    /// table or the deployment record disagrees with the log.
    pub fn from_snapshot(snapshot: LedgerSnapshot, sealing_key: Ed25519KeyPair) -> Result<Self> {
        if sealing_key.verifying_key_base64() != snapshot.verifying_key {
            return Err(LedgerError::InvalidKey(
                "sealing key does not match ledger".into(),
            ));
        }
        let Some(genesis) = snapshot.events.first() else {
            return Err(LedgerError::InvalidChain("event log is empty".into()));
        };
        if genesis.seq != 0 {
            return Err(LedgerError::InvalidChain(
                "event log does not start at seq 0".into(),
            ));
        }
        verify_log(&snapshot.events, sealing_key.verifying_key()).into_result()?;

        let deployment = LedgerEvent::RoleGranted {
            role: Role::admin(),
            account: snapshot.deployer.clone(),
            sender: snapshot.deployer.clone(),
        };
        if genesis.event != deployment || genesis.recorded_at != snapshot.deployed_at {
            return Err(LedgerError::InvalidFileFormat(
                "deployer does not match the first event".into(),
            ));
        }

        let tables = replay(&snapshot.events)?;
        for (table, matches) in [
            ("role", tables.roles == snapshot.roles),
            ("pause", tables.gate == snapshot.pause),
            ("balance", tables.xp == snapshot.xp),
            ("credential", tables.credentials == snapshot.credentials),
        ] {
            if !matches {
                return Err(LedgerError::InvalidFileFormat(format!(
                    "{table} table does not match the event log"
                )));
            }
        }

        log::debug!("restored ledger with {} events", snapshot.events.len());
        Ok(Self {
            config: snapshot.config,
            deployer: snapshot.deployer,
            deployed_at: snapshot.deployed_at,
            roles: tables.roles,
            gate: tables.gate,
            xp: tables.xp,
            credentials: tables.credentials,
            log: EventLog::from_records(snapshot.events),
            sealing_key,
        })
    }

    /// Capture the full public state for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            config: self.config.clone(),
            deployer: self.deployer.clone(),
            deployed_at: self.deployed_at,
            verifying_key: self.sealing_key.verifying_key_base64(),
            roles: self.roles.clone(),
            pause: self.gate.clone(),
            xp: self.xp.clone(),
            credentials: self.credentials.clone(),
            events: self.log.records().to_vec(),
        }
    }

    // ── Metadata ──────────────────────────────────────────────────────────────

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    pub fn deployer(&self) -> &Account {
        &self.deployer
    }

    pub fn deployed_at(&self) -> u64 {
        self.deployed_at
    }

    pub fn sealing_key(&self) -> &Ed25519KeyPair {
        &self.sealing_key
    }

    // ── XP queries ────────────────────────────────────────────────────────────

    pub fn balance_of(&self, account: &Account) -> u128 {
        self.xp.balance_of(account)
    }

    pub fn total_supply(&self) -> u128 {
        self.xp.total_supply()
    }

    pub fn allowance(&self, owner: &Account, spender: &Account) -> u128 {
        self.xp.allowance(owner, spender)
    }

    /// Accounts with a non-zero balance.
    pub fn holders(&self) -> Vec<(Account, u128)> {
        self.xp.holders().map(|(a, b)| (a.clone(), b)).collect()
    }

    // ── Credential queries ────────────────────────────────────────────────────

    pub fn owner_of(&self, token_id: u64) -> Result<&Account> {
        self.credentials.owner_of(token_id)
    }

    pub fn token_uri(&self, token_id: u64) -> Result<&str> {
        self.credentials.token_uri(token_id)
    }

    /// The skill label recorded for `token_id`.
    pub fn skill_level(&self, token_id: u64) -> Result<&str> {
        self.credentials.skill_level(token_id)
    }

    pub fn credential(&self, token_id: u64) -> Result<&SkillCredential> {
        self.credentials.get(token_id)
    }

    pub fn next_token_id(&self) -> u64 {
        self.credentials.next_token_id()
    }

    pub fn credentials_of(&self, owner: &Account) -> Vec<&SkillCredential> {
        self.credentials.credentials_of(owner)
    }

    pub fn credential_count(&self, owner: &Account) -> usize {
        self.credentials.count_of(owner)
    }

    pub fn all_credentials(&self) -> impl Iterator<Item = &SkillCredential> {
        self.credentials.iter()
    }

    // ── Role and gate queries ─────────────────────────────────────────────────

    pub fn has_role(&self, role: &Role, account: &Account) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn role_admin(&self, role: &Role) -> Role {
        self.roles.role_admin(role)
    }

    pub fn members(&self, role: &Role) -> Vec<Account> {
        self.roles.members(role)
    }

    pub fn roles_of(&self, account: &Account) -> Vec<Role> {
        self.roles.roles_of(account)
    }

    pub fn pause_state(&self) -> PauseState {
        self.gate.state()
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    // ── Event queries ─────────────────────────────────────────────────────────

    pub fn events(&self) -> &[EventRecord] {
        self.log.records()
    }

    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.log.since(seq)
    }

    pub fn query_events(&self, query: &EventQuery) -> Vec<&EventRecord> {
        query_events(self.log.records(), query)
    }

    /// Verify the whole log against this ledger's sealing key.
    pub fn verify_events(&self) -> LogVerification {
        verify_log(self.log.records(), self.sealing_key.verifying_key())
    }

    // ── XP mutations ──────────────────────────────────────────────────────────

    /// Issue `amount` new XP to `to`. Returns the new balance.
    pub fn mint(&mut self, caller: &Account, to: &Account, amount: u128, reason: &str) -> Result<u128> {
        self.require_issuer(caller)?;
        let balance = self.xp.credit(to, amount)?;
        log::info!("{caller} minted {amount} to {to}: {reason}");
        self.emit_now(LedgerEvent::XpMinted {
            to: to.clone(),
            amount,
            reason: reason.to_string(),
        });
        Ok(balance)
    }

    /// Reward `to` with `amount` new XP. Same effects as [`mint`](Self::mint)
    /// with a distinct event.
    pub fn tip(&mut self, caller: &Account, to: &Account, amount: u128, reason: &str) -> Result<u128> {
        self.require_issuer(caller)?;
        let balance = self.xp.credit(to, amount)?;
        log::info!("{caller} tipped {amount} to {to}: {reason}");
        self.emit_now(LedgerEvent::XpTipped {
            to: to.clone(),
            amount,
            reason: reason.to_string(),
        });
        Ok(balance)
    }

    /// Destroy `amount` XP held by `from`. Returns the remaining balance.
    pub fn burn(&mut self, caller: &Account, from: &Account, amount: u128) -> Result<u128> {
        self.require_issuer(caller)?;
        let remaining = self.xp.debit(from, amount)?;
        log::info!("{caller} burned {amount} from {from}");
        self.emit_now(LedgerEvent::XpBurned {
            from: from.clone(),
            amount,
        });
        Ok(remaining)
    }

    /// Move `amount` of the caller's own XP to `to`.
    pub fn transfer(&mut self, caller: &Account, to: &Account, amount: u128) -> Result<()> {
        self.gate.require_active()?;
        self.xp.move_balance(caller, to, amount)?;
        log::info!("{caller} transferred {amount} to {to}");
        self.emit_now(LedgerEvent::XpTransferred {
            from: caller.clone(),
            to: to.clone(),
            amount,
            spender: None,
        });
        Ok(())
    }

    /// Let `spender` move up to `amount` of the caller's XP. Replaces any
    /// previous allowance; zero revokes it.
    pub fn approve(&mut self, caller: &Account, spender: &Account, amount: u128) -> Result<()> {
        self.gate.require_active()?;
        caller.validate()?;
        self.xp.set_allowance(caller, spender, amount)?;
        log::info!("{caller} approved {spender} for {amount}");
        self.emit_now(LedgerEvent::XpApproval {
            owner: caller.clone(),
            spender: spender.clone(),
            amount,
        });
        Ok(())
    }

    /// Move `amount` from `from` to `to`, drawing on the caller's allowance.
    pub fn transfer_from(
        &mut self,
        caller: &Account,
        from: &Account,
        to: &Account,
        amount: u128,
    ) -> Result<()> {
        self.gate.require_active()?;
        self.xp.spend_allowance(caller, from, to, amount)?;
        log::info!("{caller} moved {amount} from {from} to {to}");
        self.emit_now(LedgerEvent::XpTransferred {
            from: from.clone(),
            to: to.clone(),
            amount,
            spender: Some(caller.clone()),
        });
        Ok(())
    }

    // ── Credential mutations ──────────────────────────────────────────────────

    /// Issue a skill credential to `to`. Returns its token id.
    pub fn mint_skill(
        &mut self,
        caller: &Account,
        to: &Account,
        skill_label: &str,
        metadata_uri: &str,
    ) -> Result<u64> {
        self.issue_one(
            caller,
            CredentialRequest::skill(to.clone(), skill_label, metadata_uri),
        )
    }

    /// Issue a language-mastery credential to `to`. Returns its token id.
    pub fn mint_language_hero(
        &mut self,
        caller: &Account,
        to: &Account,
        language: &str,
        metadata_uri: &str,
    ) -> Result<u64> {
        self.issue_one(
            caller,
            CredentialRequest::language_hero(to.clone(), language, metadata_uri),
        )
    }

    /// Issue one skill credential per index of three parallel sequences.
    ///
    /// `recipients[i]` receives token `next_token_id() + i`. The batch is
    /// all-or-nothing; three empty sequences issue nothing and emit nothing.
    ///
    /// # Errors
    ///
    /// `ArrayLengthMismatch` unless all three lengths agree, `BatchTooLarge`,
    /// or `InvalidAccount` for any malformed recipient.
    pub fn batch_mint<S, U>(
        &mut self,
        caller: &Account,
        recipients: &[Account],
        skills: &[S],
        metadata_uris: &[U],
    ) -> Result<Vec<u64>>
    where
        S: AsRef<str>,
        U: AsRef<str>,
    {
        self.require_issuer(caller)?;
        if recipients.len() != skills.len() || recipients.len() != metadata_uris.len() {
            return Err(LedgerError::ArrayLengthMismatch {
                recipients: recipients.len(),
                skills: skills.len(),
                uris: metadata_uris.len(),
            });
        }

        let requests = recipients
            .iter()
            .zip(skills)
            .zip(metadata_uris)
            .map(|((to, skill), uri)| {
                CredentialRequest::skill(to.clone(), skill.as_ref(), uri.as_ref())
            })
            .collect();

        let now = crate::time::now_micros();
        let issued =
            self.credentials
                .issue_batch(requests, self.config.max_batch_size, caller, now)?;
        log::info!("{caller} batch-minted {} credentials", issued.len());

        let mut ids = Vec::with_capacity(issued.len());
        for credential in issued {
            ids.push(credential.token_id);
            self.emit(skill_minted(credential), now);
        }
        Ok(ids)
    }

    /// Hand a credential the caller owns to `to`.
    pub fn transfer_credential(&mut self, caller: &Account, to: &Account, token_id: u64) -> Result<()> {
        self.gate.require_active()?;
        self.credentials.transfer(caller, to, token_id)?;
        log::info!("{caller} transferred credential {token_id} to {to}");
        self.emit_now(LedgerEvent::CredentialTransferred {
            from: caller.clone(),
            to: to.clone(),
            token_id,
        });
        Ok(())
    }

    // ── Role mutations ────────────────────────────────────────────────────────

    /// Grant `role` to `account`. Returns `false` (and emits nothing) if it
    /// was already held.
    pub fn grant_role(&mut self, caller: &Account, role: &Role, account: &Account) -> Result<bool> {
        let granted = self.roles.grant(caller, role, account)?;
        if granted {
            log::info!("{caller} granted {role} to {account}");
            self.emit_now(LedgerEvent::RoleGranted {
                role: role.clone(),
                account: account.clone(),
                sender: caller.clone(),
            });
        }
        Ok(granted)
    }

    /// Revoke `role` from `account`. Returns `false` (and emits nothing) if
    /// it was not held.
    pub fn revoke_role(&mut self, caller: &Account, role: &Role, account: &Account) -> Result<bool> {
        let revoked = self.roles.revoke(caller, role, account)?;
        if revoked {
            log::info!("{caller} revoked {role} from {account}");
            self.emit_now(LedgerEvent::RoleRevoked {
                role: role.clone(),
                account: account.clone(),
                sender: caller.clone(),
            });
        }
        Ok(revoked)
    }

    /// Drop one of the caller's own roles.
    pub fn renounce_role(&mut self, caller: &Account, role: &Role) -> Result<bool> {
        let renounced = self.roles.renounce(caller, role)?;
        if renounced {
            log::info!("{caller} renounced {role}");
            self.emit_now(LedgerEvent::RoleRevoked {
                role: role.clone(),
                account: caller.clone(),
                sender: caller.clone(),
            });
        }
        Ok(renounced)
    }

    /// Make `admin_role` the role that grants and revokes `role`.
    pub fn set_role_admin(&mut self, caller: &Account, role: &Role, admin_role: &Role) -> Result<()> {
        let previous = self.roles.set_role_admin(caller, role, admin_role.clone())?;
        log::info!("{caller} set admin of {role} to {admin_role} (was {previous})");
        self.emit_now(LedgerEvent::RoleAdminChanged {
            role: role.clone(),
            previous,
            new: admin_role.clone(),
        });
        Ok(())
    }

    // ── Pause gate ────────────────────────────────────────────────────────────

    /// Halt every gated operation.
    pub fn pause(&mut self, caller: &Account) -> Result<()> {
        self.roles.require(&Role::admin(), caller)?;
        let now = crate::time::now_micros();
        self.gate.pause(caller, now)?;
        log::warn!("ledger paused by {caller}");
        self.emit(
            LedgerEvent::Paused {
                account: caller.clone(),
            },
            now,
        );
        Ok(())
    }

    /// Resume gated operations.
    pub fn unpause(&mut self, caller: &Account) -> Result<()> {
        self.roles.require(&Role::admin(), caller)?;
        let now = crate::time::now_micros();
        self.gate.unpause(caller, now)?;
        log::info!("ledger unpaused by {caller}");
        self.emit(
            LedgerEvent::Unpaused {
                account: caller.clone(),
            },
            now,
        );
        Ok(())
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// QUIZMASTER role, then the pause gate.
    fn require_issuer(&self, caller: &Account) -> Result<()> {
        self.roles.require(&Role::quizmaster(), caller)?;
        self.gate.require_active()
    }

    fn issue_one(&mut self, caller: &Account, request: CredentialRequest) -> Result<u64> {
        self.require_issuer(caller)?;
        let now = crate::time::now_micros();
        let credential = self.credentials.issue(request, caller, now)?;
        let token_id = credential.token_id;
        log::info!(
            "{caller} issued {} credential {token_id} to {}",
            credential.category,
            credential.owner
        );
        self.emit(skill_minted(credential), now);
        Ok(token_id)
    }

    fn emit_now(&mut self, event: LedgerEvent) {
        self.emit(event, crate::time::now_micros());
    }

    fn emit(&mut self, event: LedgerEvent, at: u64) {
        let record = self.log.append(event, at, self.sealing_key.signing_key());
        log::debug!("event {} seq={} {}", record.id, record.seq, record.event.tag());
    }
}

fn skill_minted(credential: SkillCredential) -> LedgerEvent {
    LedgerEvent::SkillMinted {
        to: credential.owner,
        token_id: credential.token_id,
        skill_label: credential.skill_label,
        metadata_uri: credential.metadata_uri,
        category: credential.category,
        issued_by: credential.issued_by,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
