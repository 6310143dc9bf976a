//! Role identifiers.

use serde::{Deserialize, Serialize};

/// A capability class held by accounts (e.g., `ADMIN`, `QUIZMASTER`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role(pub String);

impl Role {
    pub const ADMIN: &'static str = "ADMIN";
    pub const QUIZMASTER: &'static str = "QUIZMASTER";

    /// Create a role from any identifier.
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    /// The root role. Administers every role unless reassigned.
    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    /// The role allowed to issue XP and credentials.
    pub fn quizmaster() -> Self {
        Self::new(Self::QUIZMASTER)
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    /// Role names are case-insensitive on input and stored upper-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim().to_ascii_uppercase()))
    }
}
