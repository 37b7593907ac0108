//! Governance engine for Civitas
//!
//! This crate provides the proposal lifecycle engine: proposal storage,
//! status derivation from stored fields and current block height, weighted
//! vote tallying, and all-or-nothing execution of passed proposals under a
//! timelock. Voting weight comes from whichever
//! [`civitas_common::WeightProvider`] the engine is bound to.

pub mod engine;
pub mod error;
pub mod execution;
pub mod proposal;

// Re-exports
pub use engine::{GovernanceConfig, GovernanceEngine, GovernanceEvent};
pub use error::{GovernanceError, GovernanceResult};
pub use execution::{LoggingDispatcher, OperationDispatcher};
pub use proposal::{Operation, Proposal, ProposalStatus, VoteReceipt, VoteType};
