//! Full-lifecycle tests wiring the governance engine to the reputation
//! ledger and treasury, with proposal execution forwarded through a
//! dispatcher the way a deployment would route it.

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use civitas::common::{days, AccountId, SimulatedChain};
use civitas::governance::{
    GovernanceConfig, GovernanceEngine, GovernanceError, GovernanceEvent, Operation,
    OperationDispatcher, ProposalStatus, VoteType,
};
use civitas::ledger::{LedgerEvent, Treasury};
use civitas::reputation::{ReputationConfig, ReputationEvent, ReputationLedger};

fn account(id: &str) -> AccountId {
    AccountId::from_string(id)
}

/// Calls a proposal operation can address to a collaborator ledger
#[derive(Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
enum DaoCall {
    StartEvaluation { evaluators: Vec<String> },
    Slash { account: String },
    Send { target: String, amount: u64, information: String },
}

impl DaoCall {
    fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("calldata encoding")
    }
}

/// Routes executed operations to the collaborator ledgers, calling with
/// the governance identity the ledgers are bound to
struct DaoDispatcher {
    governance_id: AccountId,
    reputation_address: AccountId,
    treasury_address: AccountId,
    reputation: Arc<ReputationLedger>,
    treasury: Arc<Treasury>,
}

#[async_trait]
impl OperationDispatcher for DaoDispatcher {
    async fn dispatch(&self, operation: &Operation) -> anyhow::Result<()> {
        let call: DaoCall = serde_json::from_slice(&operation.calldata)?;
        if operation.target == self.reputation_address {
            match call {
                DaoCall::StartEvaluation { evaluators } => {
                    let evaluators = evaluators.iter().map(AccountId::from_string).collect();
                    self.reputation
                        .start_evaluation(&self.governance_id, evaluators)
                        .await?;
                }
                DaoCall::Slash { account } => {
                    self.reputation
                        .slash(&self.governance_id, &AccountId::from_string(account))
                        .await?;
                }
                DaoCall::Send { .. } => {
                    anyhow::bail!("treasury call sent to the reputation ledger")
                }
            }
        } else if operation.target == self.treasury_address {
            match call {
                DaoCall::Send { target, amount, information } => {
                    self.treasury
                        .send(
                            &self.governance_id,
                            &AccountId::from_string(target),
                            amount,
                            information,
                        )
                        .await?;
                }
                _ => anyhow::bail!("reputation call sent to the treasury"),
            }
        } else {
            anyhow::bail!("unknown operation target {}", operation.target);
        }
        Ok(())
    }
}

struct Dao {
    chain: Arc<SimulatedChain>,
    reputation: Arc<ReputationLedger>,
    treasury: Arc<Treasury>,
    engine: GovernanceEngine,
    governance_events: mpsc::Receiver<GovernanceEvent>,
    _reputation_events: mpsc::Receiver<ReputationEvent>,
    _ledger_events: mpsc::Receiver<LedgerEvent>,
}

async fn setup_dao(members: &[&str]) -> Result<Dao, Box<dyn Error>> {
    let chain = Arc::new(SimulatedChain::new(100, days(1_000)));
    let governance_id = account("governance-engine");

    let (reputation_tx, reputation_rx) = mpsc::channel(256);
    let reputation = Arc::new(
        ReputationLedger::new(
            ReputationConfig::default(),
            members.iter().map(|m| account(m)).collect(),
            governance_id.clone(),
            chain.clone(),
            reputation_tx,
        )
        .await,
    );

    let (ledger_tx, ledger_rx) = mpsc::channel(256);
    let treasury = Arc::new(Treasury::new(
        governance_id.clone(),
        account("treasury"),
        vec![],
        ledger_tx,
    ));

    let dispatcher = Arc::new(DaoDispatcher {
        governance_id,
        reputation_address: account("reputation-ledger"),
        treasury_address: account("treasury"),
        reputation: reputation.clone(),
        treasury: treasury.clone(),
    });

    let (governance_tx, governance_rx) = mpsc::channel(256);
    let config = GovernanceConfig {
        voting_delay: 2,
        voting_period: 10,
        proposal_time_lock: 3,
        proposal_threshold: 50,
        proposal_max_operations: 5,
    };
    let engine = GovernanceEngine::new(
        config,
        reputation.clone(),
        chain.clone(),
        dispatcher,
        governance_tx,
    );

    Ok(Dao {
        chain,
        reputation,
        treasury,
        engine,
        governance_events: governance_rx,
        _reputation_events: reputation_rx,
        _ledger_events: ledger_rx,
    })
}

/// Propose a batch, carry it through voting, and leave it Succeeded with
/// the timelock already elapsed
async fn pass_proposal(
    dao: &Dao,
    proposer: &str,
    operations: Vec<(AccountId, DaoCall)>,
    description: &str,
    for_voters: &[&str],
    against_voters: &[&str],
) -> Result<u64, Box<dyn Error>> {
    let (targets, calldatas): (Vec<AccountId>, Vec<Vec<u8>>) = operations
        .iter()
        .map(|(target, call)| (target.clone(), call.encode()))
        .unzip();
    let values = vec![0; targets.len()];

    let id = dao
        .engine
        .propose(&account(proposer), targets, values, calldatas, description.to_string())
        .await?;
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Pending);

    dao.chain.advance_blocks(2);
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Active);
    for voter in for_voters {
        dao.engine
            .cast_vote(&account(voter), id, VoteType::For as u8, None)
            .await?;
    }
    for voter in against_voters {
        dao.engine
            .cast_vote(&account(voter), id, VoteType::Against as u8, None)
            .await?;
    }

    // Past the voting window and the timelock
    dao.chain.advance_blocks(11);
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Succeeded);
    dao.chain.advance_blocks(2);
    Ok(id)
}

#[tokio::test]
async fn test_full_governance_lifecycle() -> Result<(), Box<dyn Error>> {
    let mut dao = setup_dao(&["alice", "bob", "carol", "dave"]).await?;

    // Genesis reputation doubles as proposal eligibility
    assert_eq!(dao.reputation.reputation_of(&account("alice")).await, 100);
    dao.treasury.deposit(&account("donor"), 100_000, "Donation".to_string()).await?;

    // 1. One proposal opens an evaluation round and pays a grantee
    let id = pass_proposal(
        &dao,
        "alice",
        vec![
            (
                account("reputation-ledger"),
                DaoCall::StartEvaluation {
                    evaluators: vec![
                        "alice".to_string(),
                        "bob".to_string(),
                        "carol".to_string(),
                        "dave".to_string(),
                    ],
                },
            ),
            (
                account("treasury"),
                DaoCall::Send {
                    target: "relief-fund".to_string(),
                    amount: 40_000,
                    information: "[p-Id:1]relief programme".to_string(),
                },
            ),
        ],
        "open evaluation round and fund the relief programme",
        &["bob", "carol"],
        &["dave"],
    )
    .await?;

    dao.engine.execute(id).await?;
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Executed);

    // Both operations landed
    assert_eq!(dao.reputation.latest_round_id().await, 1);
    assert_eq!(dao.treasury.total_funds().await, 60_000);
    let record = dao.treasury.tx_record(2).await.unwrap();
    assert_eq!(record.dst, account("relief-fund"));

    // A second execution is refused
    assert_eq!(
        dao.engine.execute(id).await.unwrap_err(),
        GovernanceError::NotSucceededProposal
    );

    // 2. Evaluators grant reputation in the opened round
    dao.reputation
        .evaluate(
            &account("alice"),
            1,
            vec![account("bob"), account("carol")],
            vec!["facilitation".to_string(), "outreach".to_string()],
        )
        .await?;
    dao.reputation
        .evaluate(&account("dave"), 1, vec![account("bob")], vec!["bookkeeping".to_string()])
        .await?;
    assert_eq!(dao.reputation.reputation_of(&account("bob")).await, 300);
    assert_eq!(dao.reputation.reputation_of(&account("carol")).await, 200);

    // 3. A second proposal slashes dave
    let id = pass_proposal(
        &dao,
        "alice",
        vec![(
            account("reputation-ledger"),
            DaoCall::Slash { account: "dave".to_string() },
        )],
        "slash dave for misconduct",
        &["bob"],
        &["dave"],
    )
    .await?;
    dao.engine.execute(id).await?;

    assert!(dao.reputation.is_slashed(&account("dave")).await);
    assert_eq!(dao.reputation.reputation_of(&account("dave")).await, 0);
    // The receipt keeps the weight dave had at cast time
    let receipt = dao.engine.get_receipt(id, &account("dave")).await.unwrap();
    assert_eq!(receipt.votes, 100);

    // Exactly one execution event per executed proposal
    let mut executed = 0;
    while let Ok(event) = dao.governance_events.try_recv() {
        if matches!(event, GovernanceEvent::ProposalExecuted { .. }) {
            executed += 1;
        }
    }
    assert_eq!(executed, 2);

    Ok(())
}

#[tokio::test]
async fn test_failed_operation_leaves_proposal_retryable() -> Result<(), Box<dyn Error>> {
    let mut dao = setup_dao(&["alice", "bob"]).await?;
    dao.treasury.deposit(&account("donor"), 60_000, "Donation".to_string()).await?;

    // The send exceeds the treasury's funds, so execution must abort
    let id = pass_proposal(
        &dao,
        "alice",
        vec![(
            account("treasury"),
            DaoCall::Send {
                target: "relief-fund".to_string(),
                amount: 1_000_000,
                information: "[p-Id:2]expansion".to_string(),
            },
        )],
        "overdrawn spending proposal",
        &["bob"],
        &[],
    )
    .await?;

    let err = dao.engine.execute(id).await.unwrap_err();
    assert!(matches!(err, GovernanceError::OperationFailed { index: 0, .. }));
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Succeeded);
    assert_eq!(dao.treasury.total_funds().await, 60_000);

    // Once the external condition is fixed, the retry lands
    dao.treasury
        .deposit(&account("donor"), 2_000_000, "Donation".to_string())
        .await?;
    dao.engine.execute(id).await?;
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Executed);
    assert_eq!(dao.treasury.total_funds().await, 1_060_000);

    let mut executed = 0;
    while let Ok(event) = dao.governance_events.try_recv() {
        if matches!(event, GovernanceEvent::ProposalExecuted { .. }) {
            executed += 1;
        }
    }
    assert_eq!(executed, 1);

    Ok(())
}

#[tokio::test]
async fn test_timelock_gates_execution() -> Result<(), Box<dyn Error>> {
    let dao = setup_dao(&["alice", "bob"]).await?;
    dao.treasury.deposit(&account("donor"), 10_000, String::new()).await?;

    let calldata = DaoCall::Send {
        target: "relief-fund".to_string(),
        amount: 1_000,
        information: String::new(),
    }
    .encode();
    let id = dao
        .engine
        .propose(
            &account("alice"),
            vec![account("treasury")],
            vec![0],
            vec![calldata],
            "timelocked spending".to_string(),
        )
        .await?;

    dao.chain.advance_blocks(2);
    dao.engine
        .cast_vote(&account("bob"), id, VoteType::For as u8, None)
        .await?;

    // Succeeded, but still inside the timelock
    dao.chain.advance_blocks(11);
    assert_eq!(dao.engine.get_status(id).await?, ProposalStatus::Succeeded);
    assert_eq!(
        dao.engine.execute(id).await.unwrap_err(),
        GovernanceError::TimelockActive
    );

    dao.chain.advance_blocks(2);
    dao.engine.execute(id).await?;
    assert_eq!(dao.treasury.total_funds().await, 9_000);

    Ok(())
}

#[tokio::test]
async fn test_slashed_member_cannot_vote() -> Result<(), Box<dyn Error>> {
    let dao = setup_dao(&["alice", "bob"]).await?;

    let id = pass_proposal(
        &dao,
        "alice",
        vec![(
            account("reputation-ledger"),
            DaoCall::Slash { account: "bob".to_string() },
        )],
        "slash bob",
        &["alice"],
        &[],
    )
    .await?;
    dao.engine.execute(id).await?;

    let id = dao
        .engine
        .propose(
            &account("alice"),
            vec![account("reputation-ledger")],
            vec![0],
            vec![DaoCall::StartEvaluation { evaluators: vec!["alice".to_string()] }.encode()],
            "follow-up round".to_string(),
        )
        .await?;
    dao.chain.advance_blocks(2);

    assert_eq!(
        dao.engine
            .cast_vote(&account("bob"), id, VoteType::For as u8, None)
            .await
            .unwrap_err(),
        GovernanceError::OnlyMember
    );

    Ok(())
}
