//! Data structures for skill credentials.

use serde::{Deserialize, Serialize};

use crate::account::Account;

/// What kind of achievement a credential certifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialCategory {
    /// A general skill (e.g., "Solidity Mastery").
    #[default]
    Skill,
    /// Mastery of a natural or programming language.
    LanguageHero,
}

impl CredentialCategory {
    /// Return a stable string tag for hashing and display.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::LanguageHero => "language_hero",
        }
    }
}

impl std::fmt::Display for CredentialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// An issued credential. Only `owner` changes after issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCredential {
    pub token_id: u64,
    pub owner: Account,
    pub skill_label: String,
    pub metadata_uri: String,
    pub category: CredentialCategory,
    /// Account that issued the credential (a QUIZMASTER).
    pub issued_by: Account,
    /// Issuance timestamp (microseconds since epoch).
    pub issued_at: u64,
}

/// One credential to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequest {
    pub recipient: Account,
    pub skill_label: String,
    pub metadata_uri: String,
    pub category: CredentialCategory,
}

impl CredentialRequest {
    /// A general skill credential.
    pub fn skill(
        recipient: Account,
        skill_label: impl Into<String>,
        metadata_uri: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            skill_label: skill_label.into(),
            metadata_uri: metadata_uri.into(),
            category: CredentialCategory::Skill,
        }
    }

    /// A language-mastery credential; the language is the label.
    pub fn language_hero(
        recipient: Account,
        language: impl Into<String>,
        metadata_uri: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            skill_label: language.into(),
            metadata_uri: metadata_uri.into(),
            category: CredentialCategory::LanguageHero,
        }
    }
}
