//! Voting weight seam
//!
//! Two generations of weight sources exist: the lock vault (weight from
//! locked tokens and lock duration) and the reputation ledger (weight from
//! unexpired peer-evaluated grants). The governance engine is written
//! against this trait only, so either generation can be substituted.

use async_trait::async_trait;

use crate::identity::AccountId;

/// A source of voting weight
#[async_trait]
pub trait WeightProvider: Send + Sync {
    /// The account's current voting weight
    async fn weight_of(&self, account: &AccountId) -> u64;
}
