//! The fungible token ledger
//!
//! A fixed-supply transferable balance ledger with the usual
//! balance/allowance surface. The governance core itself never moves
//! tokens; the lock vault pulls them through allowances.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use civitas_common::AccountId;

use crate::error::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;

/// Token display name
const TOKEN_NAME: &str = "Non-profit DAO Token";
/// Token symbol
const TOKEN_SYMBOL: &str = "NPO";
/// Token decimal places
const TOKEN_DECIMALS: u8 = 18;

/// The fungible token ledger
pub struct TokenLedger {
    /// Fixed total supply
    total_supply: u64,
    /// Balances per account
    balances: RwLock<HashMap<AccountId, u64>>,
    /// Allowances per (owner, spender)
    allowances: RwLock<HashMap<(AccountId, AccountId), u64>>,
    /// Event sender
    events: mpsc::Sender<LedgerEvent>,
}

impl TokenLedger {
    /// Create a new ledger with the whole supply on the deployer's account
    pub fn new(initial_supply: u64, deployer: AccountId, events: mpsc::Sender<LedgerEvent>) -> Self {
        let mut balances = HashMap::new();
        balances.insert(deployer, initial_supply);
        Self {
            total_supply: initial_supply,
            balances: RwLock::new(balances),
            allowances: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Token display name
    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    /// Token symbol
    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    /// Token decimal places
    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }

    /// Fixed total supply
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Balance of an account
    pub async fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.read().await.get(account).copied().unwrap_or(0)
    }

    /// Remaining allowance from owner to spender
    pub async fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.allowances
            .read()
            .await
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Send an event, logging delivery failures instead of aborting
    async fn emit(&self, event: LedgerEvent) {
        if let Err(e) = self.events.send(event).await {
            warn!("failed to deliver token event: {}", e);
        }
    }

    /// Move a balance between two accounts
    fn move_balance(
        balances: &mut HashMap<AccountId, u64>,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> LedgerResult<()> {
        let from_balance = balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        balances.insert(from.clone(), from_balance - amount);
        *balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    /// Transfer tokens from the caller's balance
    pub async fn transfer(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> LedgerResult<()> {
        {
            let mut balances = self.balances.write().await;
            Self::move_balance(&mut balances, caller, to, amount)?;
        }

        debug!("{} transferred {} to {}", caller, amount, to);
        self.emit(LedgerEvent::Transferred {
            from: caller.clone(),
            to: to.clone(),
            amount,
        })
        .await;
        Ok(())
    }

    /// Set the spender's allowance over the caller's balance
    pub async fn approve(
        &self,
        caller: &AccountId,
        spender: &AccountId,
        amount: u64,
    ) -> LedgerResult<()> {
        self.allowances
            .write()
            .await
            .insert((caller.clone(), spender.clone()), amount);

        self.emit(LedgerEvent::Approved {
            owner: caller.clone(),
            spender: spender.clone(),
            amount,
        })
        .await;
        Ok(())
    }

    /// Transfer tokens out of `from`'s balance on their allowance to the caller
    pub async fn transfer_from(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> LedgerResult<()> {
        {
            let mut allowances = self.allowances.write().await;
            let key = (from.clone(), caller.clone());
            let allowed = allowances.get(&key).copied().unwrap_or(0);
            if allowed < amount {
                return Err(LedgerError::InsufficientAllowance);
            }

            let mut balances = self.balances.write().await;
            Self::move_balance(&mut balances, from, to, amount)?;
            allowances.insert(key, allowed - amount);
        }

        debug!("{} moved {} from {} to {}", caller, amount, from, to);
        self.emit(LedgerEvent::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
        })
        .await;
        Ok(())
    }
}
