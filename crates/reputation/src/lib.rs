//! Reputation ledger for Civitas
//!
//! This crate provides the decaying, peer-evaluated reputation ledger:
//! per-account reputation as a sum of time-boxed grants, evaluator-based
//! minting rounds, and an irreversible slashing flag. The ledger doubles as
//! the governance engine's weight source through the
//! [`civitas_common::WeightProvider`] seam.

pub mod error;
pub mod grant;
pub mod ledger;

// Re-exports
pub use error::{ReputationError, ReputationResult};
pub use grant::{EvaluationRound, ReputationGrant};
pub use ledger::{ReputationConfig, ReputationEvent, ReputationLedger};
