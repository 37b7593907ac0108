//! The governance engine
//!
//! Stores proposals and vote receipts, derives status from stored fields
//! and current block height, tallies weighted votes, and executes passed
//! proposals all-or-nothing once the timelock has elapsed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use civitas_common::{AccountId, ChainHost, WeightProvider};

use crate::error::{GovernanceError, GovernanceResult};
use crate::execution::OperationDispatcher;
use crate::proposal::{Operation, Proposal, ProposalStatus, VoteReceipt, VoteType};

/// Configuration for the governance engine, fixed at initialization
#[derive(Debug, Clone)]
pub struct GovernanceConfig {
    /// Blocks between proposal creation and the start of voting
    pub voting_delay: u64,
    /// Length of the voting window in blocks
    pub voting_period: u64,
    /// Blocks between the end of voting and earliest execution
    pub proposal_time_lock: u64,
    /// Minimum weight required to create a proposal
    pub proposal_threshold: u64,
    /// Maximum operations per proposal
    pub proposal_max_operations: usize,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_delay: 0,
            voting_period: 19_938,
            proposal_time_lock: 0,
            proposal_threshold: 50,
            proposal_max_operations: 5,
        }
    }
}

/// Events emitted by the governance engine
#[derive(Debug, Clone)]
pub enum GovernanceEvent {
    /// A proposal was created
    ProposalCreated {
        proposal_id: u64,
        proposer: AccountId,
        description: String,
        operations: Vec<Operation>,
        start_block: u64,
        end_block: u64,
    },
    /// A vote was cast
    VoteCast {
        voter: AccountId,
        proposal_id: u64,
        support: VoteType,
        weight: u64,
        reason: Option<String>,
    },
    /// A proposal was canceled by its proposer
    ProposalCanceled { proposal_id: u64 },
    /// A proposal's whole operation batch was executed
    ProposalExecuted { proposal_id: u64 },
}

/// The governance engine
pub struct GovernanceEngine {
    /// Engine configuration
    config: GovernanceConfig,
    /// Source of voting weight
    weights: Arc<dyn WeightProvider>,
    /// Host chain view
    host: Arc<dyn ChainHost>,
    /// Forwarder for proposal operations
    dispatcher: Arc<dyn OperationDispatcher>,
    /// Proposals by id
    proposals: RwLock<HashMap<u64, Proposal>>,
    /// Receipts by (proposal id, voter)
    receipts: RwLock<HashMap<(u64, AccountId), VoteReceipt>>,
    /// Number of proposals created so far
    proposal_count: RwLock<u64>,
    /// Event sender
    events: mpsc::Sender<GovernanceEvent>,
}

impl GovernanceEngine {
    /// Create a new governance engine
    pub fn new(
        config: GovernanceConfig,
        weights: Arc<dyn WeightProvider>,
        host: Arc<dyn ChainHost>,
        dispatcher: Arc<dyn OperationDispatcher>,
        events: mpsc::Sender<GovernanceEvent>,
    ) -> Self {
        Self {
            config,
            weights,
            host,
            dispatcher,
            proposals: RwLock::new(HashMap::new()),
            receipts: RwLock::new(HashMap::new()),
            proposal_count: RwLock::new(0),
            events,
        }
    }

    /// Send an event, logging delivery failures instead of aborting
    async fn emit(&self, event: GovernanceEvent) {
        if let Err(e) = self.events.send(event).await {
            warn!("failed to deliver governance event: {}", e);
        }
    }

    /// Number of proposals created so far
    pub async fn proposal_count(&self) -> u64 {
        *self.proposal_count.read().await
    }

    /// Create a proposal
    ///
    /// The caller's current weight must reach the proposal threshold, and
    /// the three operation arrays must be balanced and within the maximum.
    pub async fn propose(
        &self,
        caller: &AccountId,
        targets: Vec<AccountId>,
        values: Vec<u64>,
        calldatas: Vec<Vec<u8>>,
        description: String,
    ) -> GovernanceResult<u64> {
        let weight = self.weights.weight_of(caller).await;
        if weight < self.config.proposal_threshold {
            return Err(GovernanceError::ReputationBelowThreshold);
        }

        let len = targets.len();
        if len == 0
            || len > self.config.proposal_max_operations
            || values.len() != len
            || calldatas.len() != len
        {
            return Err(GovernanceError::InvalidOperationNumber);
        }

        let operations: Vec<Operation> = targets
            .into_iter()
            .zip(values)
            .zip(calldatas)
            .map(|((target, value), calldata)| Operation { target, value, calldata })
            .collect();

        let start_block = self.host.block_number() + self.config.voting_delay;
        let end_block = start_block + self.config.voting_period;
        let execute_block = end_block + self.config.proposal_time_lock;

        let mut count = self.proposal_count.write().await;
        let id = *count + 1;
        *count = id;

        let proposal = Proposal {
            id,
            proposer: caller.clone(),
            operations: operations.clone(),
            description: description.clone(),
            start_block,
            end_block,
            execute_block,
            for_votes: 0,
            against_votes: 0,
            abstain_votes: 0,
            canceled: false,
            executed: false,
        };
        self.proposals.write().await.insert(id, proposal);
        drop(count);

        info!("proposal {} created by {} (voting blocks {}..={})", id, caller, start_block, end_block);
        self.emit(GovernanceEvent::ProposalCreated {
            proposal_id: id,
            proposer: caller.clone(),
            description,
            operations,
            start_block,
            end_block,
        })
        .await;

        Ok(id)
    }

    /// Look up a proposal by id
    pub async fn get_proposal(&self, id: u64) -> Option<Proposal> {
        self.proposals.read().await.get(&id).cloned()
    }

    /// Derive the proposal's status at the current block height
    pub async fn get_status(&self, id: u64) -> GovernanceResult<ProposalStatus> {
        let proposals = self.proposals.read().await;
        let proposal = proposals
            .get(&id)
            .ok_or(GovernanceError::InvalidProposalId(id))?;
        Ok(proposal.status_at(self.host.block_number()))
    }

    /// Cast a vote on an active proposal
    ///
    /// The caller's weight is captured once, here, and is immutable
    /// afterwards; later reputation changes never retouch the tally.
    /// Returns the captured weight.
    pub async fn cast_vote(
        &self,
        caller: &AccountId,
        id: u64,
        support: u8,
        reason: Option<String>,
    ) -> GovernanceResult<u64> {
        let weight = self.weights.weight_of(caller).await;
        if weight == 0 {
            return Err(GovernanceError::OnlyMember);
        }

        let mut proposals = self.proposals.write().await;
        let proposal = proposals
            .get_mut(&id)
            .ok_or(GovernanceError::InvalidProposalId(id))?;
        if proposal.status_at(self.host.block_number()) != ProposalStatus::Active {
            return Err(GovernanceError::InvalidProposalId(id));
        }

        let key = (id, caller.clone());
        let mut receipts = self.receipts.write().await;
        if receipts.contains_key(&key) {
            return Err(GovernanceError::InvalidDoubleVoting);
        }

        let support = VoteType::try_from(support)?;
        match support {
            VoteType::Against => proposal.against_votes += weight,
            VoteType::For => proposal.for_votes += weight,
            VoteType::Abstain => proposal.abstain_votes += weight,
        }
        receipts.insert(key, VoteReceipt { has_voted: true, support, votes: weight });
        drop(receipts);
        drop(proposals);

        info!("{} voted {:?} on proposal {} with weight {}", caller, support, id, weight);
        self.emit(GovernanceEvent::VoteCast {
            voter: caller.clone(),
            proposal_id: id,
            support,
            weight,
            reason,
        })
        .await;

        Ok(weight)
    }

    /// Whether the account has voted on the proposal
    pub async fn has_voted(&self, id: u64, account: &AccountId) -> bool {
        self.receipts
            .read()
            .await
            .contains_key(&(id, account.clone()))
    }

    /// Look up the account's receipt for the proposal
    pub async fn get_receipt(&self, id: u64, account: &AccountId) -> Option<VoteReceipt> {
        self.receipts.read().await.get(&(id, account.clone())).cloned()
    }

    /// Cancel a proposal
    ///
    /// Only the proposer, and only while the proposal is neither canceled
    /// nor executed.
    pub async fn cancel(&self, caller: &AccountId, id: u64) -> GovernanceResult<()> {
        let mut proposals = self.proposals.write().await;
        let proposal = proposals
            .get_mut(&id)
            .ok_or(GovernanceError::InvalidProposalId(id))?;

        if proposal.proposer != *caller {
            return Err(GovernanceError::NotProposalOwner);
        }
        if proposal.canceled || proposal.executed {
            return Err(GovernanceError::ProposalAlreadyResolved);
        }

        proposal.canceled = true;
        drop(proposals);

        info!("proposal {} canceled by its proposer", id);
        self.emit(GovernanceEvent::ProposalCanceled { proposal_id: id }).await;
        Ok(())
    }

    /// Execute a succeeded proposal
    ///
    /// Forwards each operation in array order; the batch is all-or-nothing.
    /// A failed operation aborts the execution with the proposal left
    /// `Succeeded` so a later call can retry; full success marks the
    /// proposal `Executed` exactly once.
    pub async fn execute(&self, id: u64) -> GovernanceResult<()> {
        let operations = {
            let proposals = self.proposals.read().await;
            let proposal = proposals
                .get(&id)
                .ok_or(GovernanceError::InvalidProposalId(id))?;

            let block = self.host.block_number();
            if proposal.status_at(block) != ProposalStatus::Succeeded {
                return Err(GovernanceError::NotSucceededProposal);
            }
            if block < proposal.execute_block {
                return Err(GovernanceError::TimelockActive);
            }
            proposal.operations.clone()
        };

        for (index, operation) in operations.iter().enumerate() {
            if let Err(e) = self.dispatcher.dispatch(operation).await {
                warn!("proposal {} execution aborted at operation {}: {}", id, index, e);
                return Err(GovernanceError::OperationFailed {
                    index,
                    reason: e.to_string(),
                });
            }
        }

        let mut proposals = self.proposals.write().await;
        let proposal = proposals
            .get_mut(&id)
            .ok_or(GovernanceError::InvalidProposalId(id))?;
        if proposal.executed || proposal.canceled {
            return Err(GovernanceError::NotSucceededProposal);
        }
        proposal.executed = true;
        drop(proposals);

        info!("proposal {} executed", id);
        self.emit(GovernanceEvent::ProposalExecuted { proposal_id: id }).await;
        Ok(())
    }
}
