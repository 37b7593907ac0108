//! The treasury
//!
//! Custody of the DAO's funds with a full deposit/send transaction log.
//! Anyone may deposit; only the bound governance identity may send, which
//! in practice means a passed proposal whose execution targets the
//! treasury.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use civitas_common::AccountId;

use crate::error::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;

/// Longest accepted transaction information string, in bytes
pub const MAX_INFORMATION_LENGTH: usize = 256;

/// One logged treasury transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRecord {
    /// Monotonic transaction id, starting at 1
    pub id: u64,
    /// Source of the funds
    pub src: AccountId,
    /// Destination of the funds
    pub dst: AccountId,
    /// Amount moved
    pub amt: u64,
    /// Free-form reference
    pub info: String,
}

/// Funds and transaction log, mutated together
struct TreasuryBook {
    total_funds: u64,
    records: Vec<TxRecord>,
}

/// The treasury
pub struct Treasury {
    /// The single identity trusted to send funds
    governance: AccountId,
    /// The treasury's own account, recorded as src/dst in the log
    account: AccountId,
    /// Tokens the treasury accepts for deposits
    acceptable_tokens: HashSet<AccountId>,
    /// Funds and transaction log
    book: RwLock<TreasuryBook>,
    /// Event sender
    events: mpsc::Sender<LedgerEvent>,
}

impl Treasury {
    /// Create a new treasury bound to a governance identity
    pub fn new(
        governance: AccountId,
        account: AccountId,
        acceptable_tokens: Vec<AccountId>,
        events: mpsc::Sender<LedgerEvent>,
    ) -> Self {
        Self {
            governance,
            account,
            acceptable_tokens: acceptable_tokens.into_iter().collect(),
            book: RwLock::new(TreasuryBook {
                total_funds: 0,
                records: Vec::new(),
            }),
            events,
        }
    }

    /// Whether the token is accepted for deposits
    pub fn is_acceptable_token(&self, token: &AccountId) -> bool {
        self.acceptable_tokens.contains(token)
    }

    /// Funds currently held
    pub async fn total_funds(&self) -> u64 {
        self.book.read().await.total_funds
    }

    /// Number of logged transactions
    pub async fn record_count(&self) -> u64 {
        self.book.read().await.records.len() as u64
    }

    /// Look up a logged transaction by id
    pub async fn tx_record(&self, id: u64) -> Option<TxRecord> {
        let book = self.book.read().await;
        if id == 0 {
            return None;
        }
        book.records.get((id - 1) as usize).cloned()
    }

    /// Send an event, logging delivery failures instead of aborting
    async fn emit(&self, event: LedgerEvent) {
        if let Err(e) = self.events.send(event).await {
            warn!("failed to deliver treasury event: {}", e);
        }
    }

    /// Deposit funds into the treasury
    ///
    /// Open to anyone; the source and reference land in the transaction
    /// log. Returns the transaction id.
    pub async fn deposit(
        &self,
        source: &AccountId,
        amount: u64,
        information: String,
    ) -> LedgerResult<u64> {
        if information.len() > MAX_INFORMATION_LENGTH {
            return Err(LedgerError::InvalidInformationLength(MAX_INFORMATION_LENGTH));
        }

        let mut book = self.book.write().await;
        book.total_funds += amount;
        let id = book.records.len() as u64 + 1;
        book.records.push(TxRecord {
            id,
            src: source.clone(),
            dst: self.account.clone(),
            amt: amount,
            info: information.clone(),
        });
        drop(book);

        info!("treasury received {} from {} (tx {})", amount, source, id);
        self.emit(LedgerEvent::FundsDeposited {
            transaction_id: id,
            source: source.clone(),
            amount,
            information,
        })
        .await;
        Ok(id)
    }

    /// Send funds out of the treasury
    ///
    /// Only the bound governance identity may call this. Returns the
    /// transaction id.
    pub async fn send(
        &self,
        caller: &AccountId,
        target: &AccountId,
        amount: u64,
        information: String,
    ) -> LedgerResult<u64> {
        if caller != &self.governance {
            return Err(LedgerError::OnlyGovernance);
        }
        if information.len() > MAX_INFORMATION_LENGTH {
            return Err(LedgerError::InvalidInformationLength(MAX_INFORMATION_LENGTH));
        }

        let mut book = self.book.write().await;
        if book.total_funds < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        book.total_funds -= amount;
        let id = book.records.len() as u64 + 1;
        book.records.push(TxRecord {
            id,
            src: self.account.clone(),
            dst: target.clone(),
            amt: amount,
            info: information.clone(),
        });
        drop(book);

        info!("treasury sent {} to {} (tx {})", amount, target, id);
        self.emit(LedgerEvent::FundsSent {
            transaction_id: id,
            target: target.clone(),
            amount,
            information,
        })
        .await;
        Ok(id)
    }
}
