//! The lock vault
//!
//! The earlier voting-weight generation: members lock tokens for a chosen
//! duration and receive voting weight proportional to amount and duration.
//! The vault implements [`WeightProvider`], so it can stand behind the
//! governance engine in place of the reputation ledger.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use civitas_common::{day_floor, days, AccountId, ChainHost, WeightProvider};

use crate::error::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;
use crate::token::TokenLedger;

/// Vault display name
const LOCK_NAME: &str = "locked Non-profit DAO Token";
/// Vault symbol
const LOCK_SYMBOL: &str = "loNPO";
/// Vault decimal places
const LOCK_DECIMALS: u8 = 18;

/// Longest lock duration; a full-length lock yields weight equal to the
/// locked amount
pub const MAX_LOCK_DURATION_SECS: u64 = days(365);

/// One account's active lock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLock {
    /// Locked token amount
    pub amount: u64,
    /// Day-floored lock creation time
    pub locked_at: u64,
    /// Time at which the tokens can be withdrawn
    pub unlock_time: u64,
}

/// The lock vault
pub struct LockVault {
    /// The token ledger the vault pulls from and pays back into
    token: Arc<TokenLedger>,
    /// The vault's own account on the token ledger
    vault_account: AccountId,
    /// Host chain view
    host: Arc<dyn ChainHost>,
    /// Active locks per account
    locks: RwLock<HashMap<AccountId, TokenLock>>,
    /// Total amount currently locked
    total_locked: RwLock<u64>,
    /// Event sender
    events: mpsc::Sender<LedgerEvent>,
}

impl LockVault {
    /// Create a new lock vault bound to a token ledger
    pub fn new(
        token: Arc<TokenLedger>,
        vault_account: AccountId,
        host: Arc<dyn ChainHost>,
        events: mpsc::Sender<LedgerEvent>,
    ) -> Self {
        Self {
            token,
            vault_account,
            host,
            locks: RwLock::new(HashMap::new()),
            total_locked: RwLock::new(0),
            events,
        }
    }

    /// Vault display name
    pub fn name(&self) -> &'static str {
        LOCK_NAME
    }

    /// Vault symbol
    pub fn symbol(&self) -> &'static str {
        LOCK_SYMBOL
    }

    /// Vault decimal places
    pub fn decimals(&self) -> u8 {
        LOCK_DECIMALS
    }

    /// Total amount currently locked
    pub async fn total_locked(&self) -> u64 {
        *self.total_locked.read().await
    }

    /// Send an event, logging delivery failures instead of aborting
    async fn emit(&self, event: LedgerEvent) {
        if let Err(e) = self.events.send(event).await {
            warn!("failed to deliver lock event: {}", e);
        }
    }

    /// Lock tokens until `unlock_time`
    ///
    /// Pulls the amount from the caller's token balance through the
    /// caller's allowance to the vault account. One active lock per
    /// account.
    pub async fn create_lock(
        &self,
        caller: &AccountId,
        amount: u64,
        unlock_time: u64,
    ) -> LedgerResult<()> {
        let now = self.host.timestamp_secs();
        if unlock_time <= now {
            return Err(LedgerError::InvalidUnlockTime);
        }

        let mut locks = self.locks.write().await;
        if locks.contains_key(caller) {
            return Err(LedgerError::LockAlreadyExists);
        }

        self.token
            .transfer_from(&self.vault_account, caller, &self.vault_account, amount)
            .await?;

        locks.insert(
            caller.clone(),
            TokenLock {
                amount,
                locked_at: day_floor(now),
                unlock_time,
            },
        );
        *self.total_locked.write().await += amount;
        drop(locks);

        debug!("{} locked {} until {}", caller, amount, unlock_time);
        self.emit(LedgerEvent::LockCreated {
            account: caller.clone(),
            amount,
            unlock_time,
        })
        .await;
        Ok(())
    }

    /// The account's active lock, if any
    pub async fn lock_of(&self, account: &AccountId) -> Option<TokenLock> {
        self.locks.read().await.get(account).cloned()
    }

    /// The account's current voting weight
    ///
    /// `amount × lockDuration / maxLockDuration`, with the duration counted
    /// from the day-floored lock start and capped at the maximum; zero once
    /// the lock has expired.
    pub async fn balance_of(&self, account: &AccountId) -> u64 {
        let locks = self.locks.read().await;
        let Some(lock) = locks.get(account) else {
            return 0;
        };

        let now = self.host.timestamp_secs();
        if now >= lock.unlock_time {
            return 0;
        }

        let duration = (lock.unlock_time - lock.locked_at).min(MAX_LOCK_DURATION_SECS);
        lock.amount * duration / MAX_LOCK_DURATION_SECS
    }

    /// Withdraw an expired lock's tokens back to the caller
    pub async fn withdraw(&self, caller: &AccountId) -> LedgerResult<u64> {
        let mut locks = self.locks.write().await;
        let lock = locks.get(caller).ok_or(LedgerError::NoActiveLock)?;
        if self.host.timestamp_secs() < lock.unlock_time {
            return Err(LedgerError::LockNotExpired);
        }

        let amount = lock.amount;
        self.token.transfer(&self.vault_account, caller, amount).await?;
        locks.remove(caller);
        *self.total_locked.write().await -= amount;
        drop(locks);

        debug!("{} withdrew {} from the vault", caller, amount);
        self.emit(LedgerEvent::LockWithdrawn {
            account: caller.clone(),
            amount,
        })
        .await;
        Ok(amount)
    }
}

#[async_trait]
impl WeightProvider for LockVault {
    async fn weight_of(&self, account: &AccountId) -> u64 {
        self.balance_of(account).await
    }
}
