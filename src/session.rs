//! Session Controller
//!
//! Owns the lifecycle of the balance oracle and the receipt mirror based on
//! wallet connect/disconnect events from the account collaborator. Both
//! children are idempotent-start; disconnect cancels them and resets their
//! snapshots.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::events::{CoreEvent, EventSender};
use crate::ledger::AccountId;
use crate::mirror::ReceiptMirror;
use crate::oracle::BalanceOracle;

pub struct SessionController {
    oracle: Arc<BalanceOracle>,
    mirror: Arc<ReceiptMirror>,
    events: EventSender,
    account: RwLock<Option<AccountId>>,
}

impl SessionController {
    pub fn new(oracle: Arc<BalanceOracle>, mirror: Arc<ReceiptMirror>, events: EventSender) -> Self {
        Self {
            oracle,
            mirror,
            events,
            account: RwLock::new(None),
        }
    }

    /// Connected account, if any
    pub fn account(&self) -> Option<AccountId> {
        self.account.read().unwrap().clone()
    }

    pub fn oracle(&self) -> &Arc<BalanceOracle> {
        &self.oracle
    }

    pub fn mirror(&self) -> &Arc<ReceiptMirror> {
        &self.mirror
    }

    /// Start (or keep) the session for an account. A repeat connect for the
    /// current account does not double-start polling or the subscription; a
    /// connect for a different account restarts both.
    pub async fn on_connect(&self, account: AccountId) {
        {
            let mut current = self.account.write().unwrap();
            match current.as_ref() {
                Some(existing) if *existing == account => {}
                Some(existing) => {
                    info!(
                        from = %existing.short(),
                        to = %account.short(),
                        "Session switching accounts"
                    );
                    self.oracle.cancel();
                    self.oracle.clear();
                    self.mirror.cancel();
                    self.mirror.clear();
                }
                None => {
                    info!(account = %account.short(), "Session connected");
                }
            }
            *current = Some(account.clone());
        }

        self.oracle.start(account.clone());
        if let Err(e) = self.mirror.subscribe(account.clone()).await {
            warn!(account = %account.short(), error = %e, "Receipt subscription failed on connect");
            self.events.emit(CoreEvent::SubscriptionFailed {
                reason: e.to_string(),
            });
        }
        self.events.emit(CoreEvent::SessionConnected { account });
    }

    /// Tear the session down: cancel both children and reset their state
    pub fn on_disconnect(&self) {
        let had_session = self.account.write().unwrap().take().is_some();
        if !had_session {
            return;
        }

        self.oracle.cancel();
        self.oracle.clear();
        self.mirror.cancel();
        self.mirror.clear();

        info!("Session disconnected");
        self.events.emit(CoreEvent::SessionDisconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MockLedger;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn acct(byte: u8) -> AccountId {
        bs58::encode(vec![byte; 32]).into_string().parse().unwrap()
    }

    fn controller(ledger: Arc<MockLedger>, store: Arc<MemoryStore>) -> SessionController {
        let events = EventSender::disconnected();
        let oracle = Arc::new(BalanceOracle::new(
            ledger,
            events.clone(),
            Duration::from_secs(60),
        ));
        let mirror = Arc::new(ReceiptMirror::new(store, events.clone(), "tips"));
        SessionController::new(oracle, mirror, events)
    }

    #[tokio::test]
    async fn test_connect_starts_children() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MemoryStore::new());
        let alice = acct(1);
        ledger.fund(&alice, 1_000_000_000);

        let session = controller(ledger.clone(), store);
        session.on_connect(alice.clone()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.account(), Some(alice));
        assert!(session.oracle().latest().is_known());
        assert_eq!(ledger.balance_call_count(), 1);
    }

    #[tokio::test]
    async fn test_repeat_connect_does_not_double_start() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MemoryStore::new());
        let alice = acct(1);

        let session = controller(ledger.clone(), store);
        session.on_connect(alice.clone()).await;
        session.on_connect(alice).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ledger.balance_call_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_clears_state() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MemoryStore::new());
        let alice = acct(1);
        ledger.fund(&alice, 1_000_000_000);

        let session = controller(ledger.clone(), store);
        session.on_connect(alice).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.oracle().latest().is_known());

        session.on_disconnect();
        assert!(session.account().is_none());
        assert!(!session.oracle().latest().is_known());
        assert!(session.mirror().view().is_empty());
    }

    #[tokio::test]
    async fn test_connect_with_new_account_switches() {
        let ledger = Arc::new(MockLedger::new());
        let store = Arc::new(MemoryStore::new());
        let (alice, bob) = (acct(1), acct(2));
        ledger.fund(&alice, 1_000_000_000);
        ledger.fund(&bob, 2_000_000_000);

        let session = controller(ledger.clone(), store);
        session.on_connect(alice).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        session.on_connect(bob.clone()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(session.account(), Some(bob));
        use rust_decimal::Decimal;
        assert_eq!(session.oracle().latest().value, Some(Decimal::TWO));
    }
}
