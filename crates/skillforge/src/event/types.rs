//! Event payloads.

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::account::Account;
use crate::credential::CredentialCategory;
use crate::units::serde_amount;

/// A state change observable by off-chain consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    XpMinted {
        to: Account,
        #[serde(with = "serde_amount")]
        amount: u128,
        reason: String,
    },
    XpTipped {
        to: Account,
        #[serde(with = "serde_amount")]
        amount: u128,
        reason: String,
    },
    XpBurned {
        from: Account,
        #[serde(with = "serde_amount")]
        amount: u128,
    },
    XpTransferred {
        from: Account,
        to: Account,
        #[serde(with = "serde_amount")]
        amount: u128,
        /// Set when the move drew on an allowance.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spender: Option<Account>,
    },
    XpApproval {
        owner: Account,
        spender: Account,
        #[serde(with = "serde_amount")]
        amount: u128,
    },
    SkillMinted {
        to: Account,
        token_id: u64,
        skill_label: String,
        metadata_uri: String,
        category: CredentialCategory,
        issued_by: Account,
    },
    CredentialTransferred {
        from: Account,
        to: Account,
        token_id: u64,
    },
    RoleGranted {
        role: Role,
        account: Account,
        sender: Account,
    },
    RoleRevoked {
        role: Role,
        account: Account,
        sender: Account,
    },
    RoleAdminChanged {
        role: Role,
        previous: Role,
        new: Role,
    },
    Paused {
        account: Account,
    },
    Unpaused {
        account: Account,
    },
}

/// Discriminant of a [`LedgerEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    XpMinted,
    XpTipped,
    XpBurned,
    XpTransferred,
    XpApproval,
    SkillMinted,
    CredentialTransferred,
    RoleGranted,
    RoleRevoked,
    RoleAdminChanged,
    Paused,
    Unpaused,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        Self::XpMinted,
        Self::XpTipped,
        Self::XpBurned,
        Self::XpTransferred,
        Self::XpApproval,
        Self::SkillMinted,
        Self::CredentialTransferred,
        Self::RoleGranted,
        Self::RoleRevoked,
        Self::RoleAdminChanged,
        Self::Paused,
        Self::Unpaused,
    ];

    /// Return a stable string tag for this kind.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::XpMinted => "xp_minted",
            Self::XpTipped => "xp_tipped",
            Self::XpBurned => "xp_burned",
            Self::XpTransferred => "xp_transferred",
            Self::XpApproval => "xp_approval",
            Self::SkillMinted => "skill_minted",
            Self::CredentialTransferred => "credential_transferred",
            Self::RoleGranted => "role_granted",
            Self::RoleRevoked => "role_revoked",
            Self::RoleAdminChanged => "role_admin_changed",
            Self::Paused => "paused",
            Self::Unpaused => "unpaused",
        }
    }

    /// Parse a tag as produced by [`as_tag`](Self::as_tag).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_tag() == tag)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::XpMinted { .. } => EventKind::XpMinted,
            Self::XpTipped { .. } => EventKind::XpTipped,
            Self::XpBurned { .. } => EventKind::XpBurned,
            Self::XpTransferred { .. } => EventKind::XpTransferred,
            Self::XpApproval { .. } => EventKind::XpApproval,
            Self::SkillMinted { .. } => EventKind::SkillMinted,
            Self::CredentialTransferred { .. } => EventKind::CredentialTransferred,
            Self::RoleGranted { .. } => EventKind::RoleGranted,
            Self::RoleRevoked { .. } => EventKind::RoleRevoked,
            Self::RoleAdminChanged { .. } => EventKind::RoleAdminChanged,
            Self::Paused { .. } => EventKind::Paused,
            Self::Unpaused { .. } => EventKind::Unpaused,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.kind().as_tag()
    }

    /// Every account the event mentions.
    pub fn accounts(&self) -> Vec<&Account> {
        match self {
            Self::XpMinted { to, .. } | Self::XpTipped { to, .. } => vec![to],
            Self::XpBurned { from, .. } => vec![from],
            Self::XpTransferred {
                from,
                to,
                spender: Some(spender),
                ..
            } => vec![from, to, spender],
            Self::XpTransferred { from, to, .. } | Self::CredentialTransferred { from, to, .. } => {
                vec![from, to]
            }
            Self::XpApproval { owner, spender, .. } => vec![owner, spender],
            Self::SkillMinted { to, issued_by, .. } => vec![to, issued_by],
            Self::RoleGranted {
                account, sender, ..
            }
            | Self::RoleRevoked {
                account, sender, ..
            } => vec![account, sender],
            Self::RoleAdminChanged { .. } => Vec::new(),
            Self::Paused { account } | Self::Unpaused { account } => vec![account],
        }
    }

    /// Return `true` if the event mentions `account`.
    pub fn involves(&self, account: &Account) -> bool {
        self.accounts().into_iter().any(|a| a == account)
    }
}
