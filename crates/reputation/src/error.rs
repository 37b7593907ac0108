//! Error types for reputation ledger operations

use thiserror::Error;

/// Error types for reputation ledger operations
///
/// Every failure is a named condition that aborts the triggering operation
/// with no partial effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReputationError {
    /// Caller is not the bound governance identity
    #[error("only the governance identity may perform this operation")]
    OnlyGovernance,

    /// Evaluator set exceeds the configured maximum
    #[error("evaluator set exceeds the maximum of {0}")]
    InvalidEvaluatorsNumber(usize),

    /// Caller is not an eligible evaluator, or already submitted this round
    #[error("caller is not an eligible evaluator for this round")]
    OnlyEvaluator,

    /// No round exists with the given id
    #[error("evaluation round {0} does not exist")]
    InvalidRoundId(u64),

    /// The round's evaluation window has closed
    #[error("the evaluation period for this round has ended")]
    OnlyEvaluationPeriod,

    /// Evaluation batch is oversized or includes the caller
    #[error("invalid evaluation batch")]
    InvalidEvaluation,

    /// Targets and reasons differ in length
    #[error("targets and reasons must have the same length")]
    InvalidArrayLength,
}

/// Result type for reputation ledger operations
pub type ReputationResult<T> = Result<T, ReputationError>;
