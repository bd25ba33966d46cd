use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use tipline::config::AppConfig;
use tipline::events::EventSender;
use tipline::ledger::MockLedger;
use tipline::store::MemoryStore;
use tipline::{
    AccountId, BalanceOracle, ReceiptMirror, SessionController, TipError, TipPipeline, TipRequest,
};

/// Helper to build a fully wired core over the in-process doubles
fn wire(ledger: Arc<MockLedger>, store: Arc<MemoryStore>) -> (Arc<SessionController>, TipPipeline) {
    let events = EventSender::disconnected();
    let oracle = Arc::new(BalanceOracle::new(
        ledger.clone(),
        events.clone(),
        Duration::from_secs(60),
    ));
    let mirror = Arc::new(ReceiptMirror::new(store.clone(), events.clone(), "tips"));
    let session = Arc::new(SessionController::new(oracle, mirror, events.clone()));
    // The same double plays both the ledger and the signer role
    let pipeline = TipPipeline::new(
        ledger.clone(),
        ledger,
        store,
        session.clone(),
        events,
        &AppConfig::default(),
    );
    (session, pipeline)
}

fn account(byte: u8) -> AccountId {
    AccountId::from_str(&bs58::encode(vec![byte; 32]).into_string()).unwrap()
}

fn coins(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn qa_tc_full_session_flow() {
    let ledger = Arc::new(MockLedger::new());
    let store = Arc::new(MemoryStore::new());
    let (session, pipeline) = wire(ledger.clone(), store.clone());

    let (alice, bob) = (account(1), account(2));
    ledger.fund(&alice, 2_000_000_000);

    session.on_connect(alice.clone()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let receipt = pipeline
        .submit(TipRequest::new(bob.to_string(), coins("0.75")).with_note("coffee"))
        .await
        .unwrap();
    assert_eq!(receipt.from_account, alice);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.mirror().view().len(), 1);

    session.on_disconnect();
    assert!(session.mirror().view().is_empty());
    assert!(!session.oracle().latest().is_known());

    // Submission while disconnected is rejected up front
    let err = pipeline
        .submit(TipRequest::new(bob.to_string(), coins("0.1")))
        .await
        .unwrap_err();
    assert!(matches!(err, TipError::NotConnected));
}

#[tokio::test]
async fn qa_tc_reconnect_restores_history() {
    let ledger = Arc::new(MockLedger::new());
    let store = Arc::new(MemoryStore::new());
    let (session, pipeline) = wire(ledger.clone(), store.clone());

    let (alice, bob) = (account(1), account(2));
    ledger.fund(&alice, 3_000_000_000);

    session.on_connect(alice.clone()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    pipeline
        .submit(TipRequest::new(bob.to_string(), coins("1")))
        .await
        .unwrap();

    session.on_disconnect();
    assert!(session.mirror().view().is_empty());

    // The receipt survives in the store; the fresh subscription's initial
    // snapshot brings it back
    session.on_connect(alice).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.mirror().view().len(), 1);
}

#[tokio::test]
async fn qa_tc_history_is_newest_first() {
    let ledger = Arc::new(MockLedger::new());
    let store = Arc::new(MemoryStore::new());
    let (session, pipeline) = wire(ledger.clone(), store.clone());

    let (alice, bob) = (account(1), account(2));
    ledger.fund(&alice, 10_000_000_000);

    session.on_connect(alice).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    for amount in ["0.1", "0.2", "0.3"] {
        pipeline
            .submit(TipRequest::new(bob.to_string(), coins(amount)))
            .await
            .unwrap();
        // Distinct recorded_at values
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    let view = session.mirror().view();
    assert_eq!(view.len(), 3);
    assert!(view.windows(2).all(|w| w[0].recorded_at >= w[1].recorded_at));
    assert_eq!(view[0].amount, coins("0.3"));
    assert_eq!(view[2].amount, coins("0.1"));
}
