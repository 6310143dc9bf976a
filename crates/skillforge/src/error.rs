//! Error types for SkillForge.
//!
//! Every failed operation aborts the whole call with no partial effect.
//! Hosts distinguish failures through the variant (or [`LedgerError::kind`]).

use crate::access::Role;
use crate::account::Account;

/// Ledger error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Unauthorized: {account} lacks role {role}")]
    Unauthorized { account: Account, role: Role },

    #[error("Operation paused")]
    OperationPaused,

    #[error("Array length mismatch: {recipients} recipients, {skills} skills, {uris} metadata URIs")]
    ArrayLengthMismatch {
        recipients: usize,
        skills: usize,
        uris: usize,
    },

    #[error("Insufficient balance for {account}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        account: Account,
        balance: u128,
        requested: u128,
    },

    #[error("Insufficient allowance for {spender}: allowance {allowance}, requested {requested}")]
    InsufficientAllowance {
        spender: Account,
        allowance: u128,
        requested: u128,
    },

    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Cannot remove the last {0} holder")]
    LastAdmin(Role),

    #[error("Invalid account: {0:?}")]
    InvalidAccount(String),

    #[error("Batch too large: {size} items, maximum {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Token not found: {0}")]
    TokenNotFound(u64),

    #[error("{account} does not own token {token_id}")]
    NotTokenOwner { account: Account, token_id: u64 },

    #[error("Supply overflow")]
    SupplyOverflow,

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid event chain: {0}")]
    InvalidChain(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Stable snake_case tag for the error kind, used by hosts on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::OperationPaused => "operation_paused",
            Self::ArrayLengthMismatch { .. } => "array_length_mismatch",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidStateTransition(_) => "invalid_state_transition",
            Self::LastAdmin(_) => "last_admin",
            Self::InvalidAccount(_) => "invalid_account",
            Self::BatchTooLarge { .. } => "batch_too_large",
            Self::TokenNotFound(_) => "token_not_found",
            Self::NotTokenOwner { .. } => "not_token_owner",
            Self::SupplyOverflow => "supply_overflow",
            Self::SignatureInvalid => "signature_invalid",
            Self::InvalidKey(_) => "invalid_key",
            Self::InvalidChain(_) => "invalid_chain",
            Self::InvalidFileFormat(_) => "invalid_file_format",
            Self::SerializationError(_) => "serialization_error",
            Self::StorageError(_) => "storage_error",
            Self::Io(_) => "io",
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, LedgerError>;
