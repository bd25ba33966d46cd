//! tipline dev harness
//!
//! Wires the in-process mock collaborators and drives one scripted
//! session: connect, send a tip, show the mirrored history, disconnect.
//! The core owns no CLI or wire protocol; this binary exists to exercise
//! the pipeline end to end without a live cluster.

#[cfg(not(feature = "mock-ledger"))]
fn main() {
    eprintln!("the tipline dev harness requires the `mock-ledger` feature");
    std::process::exit(1);
}

#[cfg(feature = "mock-ledger")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use tracing::info;

    use tipline::config::AppConfig;
    use tipline::ledger::{AccountId, MockLedger};
    use tipline::logging::init_logging;
    use tipline::money::BASE_UNITS_PER_COIN;
    use tipline::store::MemoryStore;
    use tipline::{
        BalanceOracle, ReceiptMirror, SessionController, TipPipeline, TipRequest, events,
    };

    fn get_env() -> String {
        let args: Vec<String> = std::env::args().collect();
        for i in 0..args.len() {
            if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
                return args[i + 1].clone();
            }
        }
        "dev".to_string()
    }

    fn demo_account(byte: u8) -> AccountId {
        AccountId::from_str(&bs58::encode(vec![byte; 32]).into_string()).expect("demo account id")
    }

    let config = AppConfig::load(&get_env());
    let _guard = init_logging(&config);

    info!(
        version = env!("GIT_HASH"),
        cluster = %config.ledger.cluster,
        "tipline starting"
    );

    let ledger = Arc::new(MockLedger::new());
    let store = Arc::new(MemoryStore::new());

    let (events, mut event_rx) = events::channel();
    let event_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            info!(?event, "core event");
        }
    });

    let oracle = Arc::new(BalanceOracle::new(
        ledger.clone(),
        events.clone(),
        Duration::from_secs(config.oracle.poll_interval_secs),
    ));
    let mirror = Arc::new(ReceiptMirror::new(
        store.clone(),
        events.clone(),
        config.store.collection.clone(),
    ));
    let session = Arc::new(SessionController::new(oracle, mirror, events.clone()));
    let pipeline = TipPipeline::new(
        ledger.clone(),
        ledger.clone(),
        store,
        session.clone(),
        events,
        &config,
    );

    let alice = demo_account(7);
    let bob = demo_account(8);
    ledger.fund(&alice, 5 * BASE_UNITS_PER_COIN);

    session.on_connect(alice).await;

    let receipt = pipeline
        .submit(TipRequest::new(bob.to_string(), Decimal::from_str("0.5")?).with_note("thanks"))
        .await?;
    info!(tx_ref = %receipt.transaction_ref, "demo tip settled");

    // Let the mirror pick the receipt up on its own channel
    tokio::time::sleep(Duration::from_millis(100)).await;
    for entry in session.mirror().view().iter() {
        info!(
            recorded_at = %entry.recorded_at,
            amount = %entry.amount,
            to = %entry.to_account.short(),
            "history entry"
        );
    }

    session.on_disconnect();
    event_task.abort();
    Ok(())
}
