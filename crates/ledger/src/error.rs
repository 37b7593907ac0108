//! Error types for collaborator ledger operations

use thiserror::Error;

/// Error types for collaborator ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller is not the bound governance identity
    #[error("only the governance identity may perform this operation")]
    OnlyGovernance,

    /// Balance does not cover the requested amount
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Allowance does not cover the requested amount
    #[error("insufficient allowance")]
    InsufficientAllowance,

    /// Transaction information string exceeds the maximum length
    #[error("information string exceeds {0} bytes")]
    InvalidInformationLength(usize),

    /// Unlock time is not in the future
    #[error("unlock time must be in the future")]
    InvalidUnlockTime,

    /// The account already holds an active lock
    #[error("account already holds an active lock")]
    LockAlreadyExists,

    /// The account holds no lock to withdraw
    #[error("account holds no lock")]
    NoActiveLock,

    /// The lock's unlock time has not passed yet
    #[error("the lock has not expired yet")]
    LockNotExpired,
}

/// Result type for collaborator ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
