//! Skill credentials — non-fungible records of earned skills.
//!
//! The credential module provides:
//! - Credential records (general skills and language-mastery heroes)
//! - Gapless token id allocation shared by single and batch issuance
//! - All-or-nothing batch issuance from parallel input sequences
//! - Owner transfers and per-owner enumeration

pub mod registry;
pub mod types;

pub use registry::CredentialRegistry;
pub use types::{CredentialCategory, CredentialRequest, SkillCredential};
