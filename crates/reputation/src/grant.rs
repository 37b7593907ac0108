//! Reputation grants and evaluation rounds

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use civitas_common::{day_floor, AccountId};

/// One unit of minted reputation
///
/// Immutable once created; invalidated implicitly by time (expiry) or
/// explicitly by slashing its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationGrant {
    /// The round the grant originated from (0 for genesis mints)
    pub round_id: u64,
    /// The granting evaluator, `None` for genesis mints
    pub from: Option<AccountId>,
    /// The recipient
    pub to: AccountId,
    /// The fixed amount minted per grant
    pub amount: u64,
    /// Evaluator-supplied justification
    pub reason: String,
    /// Day-floored mint timestamp
    pub minted_at: u64,
    /// First second at which the grant no longer counts
    pub expires_at: u64,
}

impl ReputationGrant {
    /// Whether the grant still counts at the given time
    pub fn is_active_at(&self, timestamp_secs: u64) -> bool {
        day_floor(timestamp_secs) < self.expires_at
    }
}

/// A bounded window in which a fixed evaluator set may grant reputation
///
/// Terminal once `end_block` passes; rounds are never deleted so the
/// provenance of every grant stays queryable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRound {
    /// Monotonic round id, starting at 1
    pub round_id: u64,
    /// Accounts allowed to evaluate in this round
    pub evaluators: Vec<AccountId>,
    /// Block at which the round opened
    pub start_block: u64,
    /// Last block at which evaluations are accepted
    pub end_block: u64,
    /// Evaluators that already submitted in this round
    pub evaluated_by: HashSet<AccountId>,
}

impl EvaluationRound {
    /// Whether the account belongs to this round's evaluator set
    pub fn is_evaluator(&self, account: &AccountId) -> bool {
        self.evaluators.contains(account)
    }

    /// Whether the account already submitted an evaluation this round
    pub fn has_evaluated(&self, account: &AccountId) -> bool {
        self.evaluated_by.contains(account)
    }

    /// Whether the round still accepts evaluations at the given block
    pub fn is_open_at(&self, block: u64) -> bool {
        block <= self.end_block
    }
}
