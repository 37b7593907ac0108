//! Events emitted by the collaborator ledgers

use civitas_common::AccountId;

/// Events emitted by the collaborator ledgers
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    /// Tokens moved between accounts
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
    /// A spender allowance was set
    Approved {
        owner: AccountId,
        spender: AccountId,
        amount: u64,
    },
    /// Tokens were locked for voting weight
    LockCreated {
        account: AccountId,
        amount: u64,
        unlock_time: u64,
    },
    /// A lock was withdrawn after expiry
    LockWithdrawn { account: AccountId, amount: u64 },
    /// Funds arrived at the treasury
    FundsDeposited {
        transaction_id: u64,
        source: AccountId,
        amount: u64,
        information: String,
    },
    /// The treasury sent funds out under a governance decision
    FundsSent {
        transaction_id: u64,
        target: AccountId,
        amount: u64,
        information: String,
    },
}
