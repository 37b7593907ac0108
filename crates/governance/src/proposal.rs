//! Proposals, receipts, and derived status

use serde::{Deserialize, Serialize};

use civitas_common::AccountId;

use crate::error::GovernanceError;

/// Lifecycle status of a proposal
///
/// Never stored: always derived from the proposal's fields and the current
/// block height, so stored and true status cannot drift apart.
/// Discriminants follow the original wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Voting has not opened yet
    Pending = 0,
    /// Open for voting
    Active = 1,
    /// Voting closed with more weight for than against
    Succeeded = 2,
    /// Voting closed without a majority for
    Defeated = 3,
    /// Canceled by its proposer
    Canceled = 4,
    /// Executed in full
    Executed = 5,
}

/// Direction of a cast vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteType {
    /// Weight counts against the proposal
    Against = 0,
    /// Weight counts for the proposal
    For = 1,
    /// Weight is recorded but sways neither way
    Abstain = 2,
}

impl TryFrom<u8> for VoteType {
    type Error = GovernanceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteType::Against),
            1 => Ok(VoteType::For),
            2 => Ok(VoteType::Abstain),
            other => Err(GovernanceError::InvalidVoteType(other)),
        }
    }
}

/// One opaque operation of a proposal batch
///
/// Forwarded verbatim to the target on execution; the engine attaches no
/// meaning to the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// External address the call is forwarded to
    pub target: AccountId,
    /// Value attached to the call
    pub value: u64,
    /// Opaque payload
    pub calldata: Vec<u8>,
}

/// A governance proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Monotonic id, starting at 1
    pub id: u64,
    /// The account that created the proposal
    pub proposer: AccountId,
    /// Operation batch executed if the proposal passes
    pub operations: Vec<Operation>,
    /// Human-readable description
    pub description: String,
    /// First block of the voting window
    pub start_block: u64,
    /// Last block of the voting window
    pub end_block: u64,
    /// First block at which execution is allowed
    pub execute_block: u64,
    /// Accumulated weight for
    pub for_votes: u64,
    /// Accumulated weight against
    pub against_votes: u64,
    /// Accumulated abstaining weight
    pub abstain_votes: u64,
    /// Set at most once, mutually exclusive with `executed`
    pub canceled: bool,
    /// Set at most once, mutually exclusive with `canceled`
    pub executed: bool,
}

impl Proposal {
    /// Derive the status at the given block height; first match wins
    pub fn status_at(&self, block: u64) -> ProposalStatus {
        if self.canceled {
            ProposalStatus::Canceled
        } else if self.executed {
            ProposalStatus::Executed
        } else if block < self.start_block {
            ProposalStatus::Pending
        } else if block <= self.end_block {
            ProposalStatus::Active
        } else if self.for_votes <= self.against_votes {
            ProposalStatus::Defeated
        } else {
            ProposalStatus::Succeeded
        }
    }
}

/// Record of one account's vote on one proposal
///
/// The weight is captured once, at cast time, and never recomputed even if
/// the voter's reputation later changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// Whether the account has voted
    pub has_voted: bool,
    /// Direction of the vote
    pub support: VoteType,
    /// Weight captured at cast time
    pub votes: u64,
}
