//! Error types for governance operations

use thiserror::Error;

/// Error types for governance operations
///
/// Every failure is a named condition that aborts the triggering operation
/// with no partial effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// Proposer weight is below the proposal threshold
    #[error("proposer weight is below the proposal threshold")]
    ReputationBelowThreshold,

    /// Operation arrays are empty, unbalanced, or exceed the maximum
    #[error("operation batch is empty, unbalanced, or exceeds the maximum")]
    InvalidOperationNumber,

    /// Proposal does not exist, or is not in the state the operation needs
    #[error("proposal {0} does not exist or is not open for voting")]
    InvalidProposalId(u64),

    /// Caller holds no voting weight
    #[error("caller holds no voting weight")]
    OnlyMember,

    /// Caller already has a receipt for this proposal
    #[error("caller already voted on this proposal")]
    InvalidDoubleVoting,

    /// Unknown vote type on the wire
    #[error("unknown vote type {0}")]
    InvalidVoteType(u8),

    /// Only the proposer may cancel a proposal
    #[error("only the proposer may cancel a proposal")]
    NotProposalOwner,

    /// Proposal was already canceled or executed
    #[error("proposal was already canceled or executed")]
    ProposalAlreadyResolved,

    /// Proposal has not succeeded (or was already executed)
    #[error("proposal has not succeeded")]
    NotSucceededProposal,

    /// The execution timelock has not elapsed yet
    #[error("the execution timelock has not elapsed")]
    TimelockActive,

    /// A forwarded operation failed; the whole batch was aborted
    #[error("operation {index} failed: {reason}")]
    OperationFailed { index: usize, reason: String },
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
