//! Reputation ledger scenarios: peer evaluation rounds, day-boxed decay,
//! and round terminality.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;

use civitas::common::{days, AccountId, SimulatedChain, WeightProvider};
use civitas::reputation::{
    ReputationConfig, ReputationError, ReputationEvent, ReputationLedger,
};

fn account(id: &str) -> AccountId {
    AccountId::from_string(id)
}

fn governance() -> AccountId {
    account("governance-engine")
}

async fn setup_ledger(
    members: &[&str],
) -> (Arc<SimulatedChain>, ReputationLedger, mpsc::Receiver<ReputationEvent>) {
    let chain = Arc::new(SimulatedChain::new(500, days(2_000) + 7_200));
    let (tx, rx) = mpsc::channel(256);
    let ledger = ReputationLedger::new(
        ReputationConfig::default(),
        members.iter().map(|m| account(m)).collect(),
        governance(),
        chain.clone(),
        tx,
    )
    .await;
    (chain, ledger, rx)
}

#[tokio::test]
async fn test_peer_evaluation_round() -> Result<(), Box<dyn Error>> {
    let members = ["alice", "bob", "carol", "dave"];
    let (_chain, ledger, _events) = setup_ledger(&members).await;

    let round_id = ledger
        .start_evaluation(&governance(), members.iter().map(|m| account(m)).collect())
        .await?;

    // After two evaluators submit, carol has been evaluated twice
    ledger
        .evaluate(
            &account("alice"),
            round_id,
            vec![account("bob"), account("carol"), account("dave")],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        )
        .await?;
    ledger
        .evaluate(
            &account("bob"),
            round_id,
            vec![account("alice"), account("carol"), account("dave")],
            vec!["d".to_string(), "e".to_string(), "f".to_string()],
        )
        .await?;
    assert_eq!(ledger.reputation_of(&account("carol")).await, 300);

    // Every member evaluates the other three: genesis plus three grants each
    ledger
        .evaluate(
            &account("carol"),
            round_id,
            vec![account("alice"), account("bob"), account("dave")],
            vec!["g".to_string(), "h".to_string(), "i".to_string()],
        )
        .await?;
    ledger
        .evaluate(
            &account("dave"),
            round_id,
            vec![account("alice"), account("bob"), account("carol")],
            vec!["j".to_string(), "k".to_string(), "l".to_string()],
        )
        .await?;

    for member in &members {
        assert_eq!(ledger.reputation_of(&account(member)).await, 400);
        assert_eq!(ledger.weight_of(&account(member)).await, 400);
    }

    Ok(())
}

#[tokio::test]
async fn test_reputation_decays_after_valid_period() -> Result<(), Box<dyn Error>> {
    let (chain, ledger, _events) = setup_ledger(&["alice", "bob"]).await;

    let round_id = ledger
        .start_evaluation(&governance(), vec![account("alice")])
        .await?;
    ledger
        .evaluate(&account("alice"), round_id, vec![account("bob")], vec!["x".to_string()])
        .await?;
    assert_eq!(ledger.reputation_of(&account("bob")).await, 200);

    // All grants were minted the same day, so everything expires together
    chain.advance_secs(days(100));
    assert_eq!(ledger.reputation_of(&account("alice")).await, 0);
    assert_eq!(ledger.reputation_of(&account("bob")).await, 0);

    // Fresh grants in a new round count again
    let round_id = ledger
        .start_evaluation(&governance(), vec![account("alice")])
        .await?;
    ledger
        .evaluate(&account("alice"), round_id, vec![account("bob")], vec!["y".to_string()])
        .await?;
    assert_eq!(ledger.reputation_of(&account("bob")).await, 100);

    Ok(())
}

#[tokio::test]
async fn test_rounds_are_terminal_but_retained() -> Result<(), Box<dyn Error>> {
    let (chain, ledger, _events) = setup_ledger(&["alice", "bob"]).await;

    let round_id = ledger
        .start_evaluation(&governance(), vec![account("alice")])
        .await?;
    chain.advance_blocks(ReputationConfig::default().evaluation_period_blocks + 1);

    let err = ledger
        .evaluate(&account("alice"), round_id, vec![account("bob")], vec!["late".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err, ReputationError::OnlyEvaluationPeriod);

    // The round's history stays queryable for grant provenance
    let round = ledger.round(round_id).await.unwrap();
    assert_eq!(round.round_id, round_id);
    assert!(round.evaluated_by.is_empty());

    Ok(())
}
