//! The reputation ledger
//!
//! Stores per-account reputation as a sum of time-boxed grants, manages
//! evaluator-based minting rounds, and carries the irreversible slashing
//! flag. All privileged mutation (starting a round, slashing) is accepted
//! only from the single governance identity bound at construction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use civitas_common::{day_floor, days, AccountId, ChainHost, WeightProvider};

use crate::error::{ReputationError, ReputationResult};
use crate::grant::{EvaluationRound, ReputationGrant};

/// Configuration for the reputation ledger
#[derive(Debug, Clone)]
pub struct ReputationConfig {
    /// Fixed amount minted per grant
    pub grant_amount: u64,
    /// Validity window of a grant in seconds (day-aligned)
    pub valid_period_secs: u64,
    /// Maximum evaluator-set size per round
    pub max_evaluators: usize,
    /// Maximum targets per evaluation call
    pub max_evaluation: usize,
    /// Length of an evaluation round in blocks
    pub evaluation_period_blocks: u64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            grant_amount: 100,
            valid_period_secs: days(100),
            max_evaluators: 10,
            max_evaluation: 5,
            evaluation_period_blocks: 19_938,
        }
    }
}

/// Events emitted by the reputation ledger
#[derive(Debug, Clone)]
pub enum ReputationEvent {
    /// A grant was minted
    ReputationMinted {
        round_id: u64,
        from: Option<AccountId>,
        to: AccountId,
        amount: u64,
        expires_at: u64,
        reason: String,
    },
    /// An evaluation round was opened
    EvaluationStarted {
        round_id: u64,
        evaluators: Vec<AccountId>,
        start_block: u64,
        end_block: u64,
    },
}

/// The reputation ledger
pub struct ReputationLedger {
    /// Ledger configuration
    config: ReputationConfig,
    /// The single identity trusted for privileged mutation
    governance: AccountId,
    /// Host chain view
    host: Arc<dyn ChainHost>,
    /// Grants per recipient
    grants: RwLock<HashMap<AccountId, Vec<ReputationGrant>>>,
    /// Rounds by id, retained permanently
    rounds: RwLock<HashMap<u64, EvaluationRound>>,
    /// Highest round id handed out so far
    latest_round: RwLock<u64>,
    /// Accounts whose reputation is permanently voided
    slashed: RwLock<HashSet<AccountId>>,
    /// Event sender
    events: mpsc::Sender<ReputationEvent>,
}

impl ReputationLedger {
    /// Create a new ledger and mint the genesis grants
    ///
    /// Each initial member receives one grant of the fixed amount with
    /// `round_id = 0` and no granter.
    pub async fn new(
        config: ReputationConfig,
        initial_members: Vec<AccountId>,
        governance: AccountId,
        host: Arc<dyn ChainHost>,
        events: mpsc::Sender<ReputationEvent>,
    ) -> Self {
        let ledger = Self {
            config,
            governance,
            host,
            grants: RwLock::new(HashMap::new()),
            rounds: RwLock::new(HashMap::new()),
            latest_round: RwLock::new(0),
            slashed: RwLock::new(HashSet::new()),
            events,
        };

        let member_count = initial_members.len();
        for member in initial_members {
            ledger.mint(0, None, member, "genesis".to_string()).await;
        }
        info!("initialized reputation ledger with {} genesis members", member_count);

        ledger
    }

    /// Mint one grant and emit the notification
    async fn mint(&self, round_id: u64, from: Option<AccountId>, to: AccountId, reason: String) {
        let minted_at = day_floor(self.host.timestamp_secs());
        let grant = ReputationGrant {
            round_id,
            from: from.clone(),
            to: to.clone(),
            amount: self.config.grant_amount,
            reason: reason.clone(),
            minted_at,
            expires_at: minted_at + self.config.valid_period_secs,
        };
        let expires_at = grant.expires_at;

        self.grants
            .write()
            .await
            .entry(to.clone())
            .or_default()
            .push(grant);

        debug!("minted {} reputation to {} (round {})", self.config.grant_amount, to, round_id);
        self.emit(ReputationEvent::ReputationMinted {
            round_id,
            from,
            to,
            amount: self.config.grant_amount,
            expires_at,
            reason,
        })
        .await;
    }

    /// Send an event, logging delivery failures instead of aborting
    async fn emit(&self, event: ReputationEvent) {
        if let Err(e) = self.events.send(event).await {
            warn!("failed to deliver reputation event: {}", e);
        }
    }

    /// Open a new evaluation round
    ///
    /// Only the bound governance identity may call this; in practice that
    /// means a passed proposal whose execution targets this ledger.
    pub async fn start_evaluation(
        &self,
        caller: &AccountId,
        evaluators: Vec<AccountId>,
    ) -> ReputationResult<u64> {
        if caller != &self.governance {
            return Err(ReputationError::OnlyGovernance);
        }
        if evaluators.len() > self.config.max_evaluators {
            return Err(ReputationError::InvalidEvaluatorsNumber(self.config.max_evaluators));
        }

        let start_block = self.host.block_number();
        let end_block = start_block + self.config.evaluation_period_blocks;

        let mut latest = self.latest_round.write().await;
        let round_id = *latest + 1;
        *latest = round_id;

        let round = EvaluationRound {
            round_id,
            evaluators: evaluators.clone(),
            start_block,
            end_block,
            evaluated_by: HashSet::new(),
        };
        self.rounds.write().await.insert(round_id, round);
        drop(latest);

        info!(
            "evaluation round {} started with {} evaluators (blocks {}..={})",
            round_id,
            evaluators.len(),
            start_block,
            end_block
        );
        self.emit(ReputationEvent::EvaluationStarted {
            round_id,
            evaluators,
            start_block,
            end_block,
        })
        .await;

        Ok(round_id)
    }

    /// Submit one evaluation batch for a round
    ///
    /// The caller must be an evaluator of the round who has not yet
    /// submitted, the round must still be open, and the batch must be
    /// balanced, within the per-call maximum, and free of self-evaluation.
    /// Each target receives one grant of the fixed amount.
    pub async fn evaluate(
        &self,
        caller: &AccountId,
        round_id: u64,
        targets: Vec<AccountId>,
        reasons: Vec<String>,
    ) -> ReputationResult<()> {
        let mut rounds = self.rounds.write().await;
        let round = rounds
            .get_mut(&round_id)
            .ok_or(ReputationError::InvalidRoundId(round_id))?;

        if !round.is_evaluator(caller) || round.has_evaluated(caller) {
            return Err(ReputationError::OnlyEvaluator);
        }
        if !round.is_open_at(self.host.block_number()) {
            return Err(ReputationError::OnlyEvaluationPeriod);
        }
        if targets.len() > self.config.max_evaluation {
            return Err(ReputationError::InvalidEvaluation);
        }
        if targets.len() != reasons.len() {
            return Err(ReputationError::InvalidArrayLength);
        }
        // Self-evaluation is rejected outright, nothing in the batch mints
        if targets.iter().any(|target| target == caller) {
            return Err(ReputationError::InvalidEvaluation);
        }

        round.evaluated_by.insert(caller.clone());
        drop(rounds);

        for (target, reason) in targets.into_iter().zip(reasons) {
            self.mint(round_id, Some(caller.clone()), target, reason).await;
        }

        Ok(())
    }

    /// Sum of unexpired grants to the account, 0 forever once slashed
    pub async fn reputation_of(&self, account: &AccountId) -> u64 {
        if self.slashed.read().await.contains(account) {
            return 0;
        }

        let now = self.host.timestamp_secs();
        let grants = self.grants.read().await;
        grants
            .get(account)
            .map(|list| {
                list.iter()
                    .filter(|grant| grant.is_active_at(now))
                    .map(|grant| grant.amount)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Permanently void the account's reputation
    ///
    /// Only the bound governance identity may call this. The flag is
    /// one-way: past and future grants to the account stop counting.
    pub async fn slash(&self, caller: &AccountId, account: &AccountId) -> ReputationResult<()> {
        if caller != &self.governance {
            return Err(ReputationError::OnlyGovernance);
        }

        self.slashed.write().await.insert(account.clone());
        warn!("account {} slashed, reputation permanently voided", account);
        Ok(())
    }

    /// Whether the account has been slashed
    pub async fn is_slashed(&self, account: &AccountId) -> bool {
        self.slashed.read().await.contains(account)
    }

    /// Look up a round by id
    pub async fn round(&self, round_id: u64) -> Option<EvaluationRound> {
        self.rounds.read().await.get(&round_id).cloned()
    }

    /// Highest round id handed out so far (0 before the first round)
    pub async fn latest_round_id(&self) -> u64 {
        *self.latest_round.read().await
    }
}

#[async_trait]
impl WeightProvider for ReputationLedger {
    async fn weight_of(&self, account: &AccountId) -> u64 {
        self.reputation_of(account).await
    }
}
