//! Balance Oracle
//!
//! Polls the ledger for the connected account's spendable balance on a
//! fixed interval while a session is active. The snapshot is single-writer
//! (the poll task) and superseded whole; readers always get a complete
//! value. A failed poll keeps the previous snapshot in place.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{CoreEvent, EventSender};
use crate::ledger::{AccountId, LedgerClient};
use crate::money;

/// Latest known spendable balance
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    /// Display-unit balance; None until the first successful poll
    pub value: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    pub fn unknown() -> Self {
        Self {
            value: None,
            observed_at: Utc::now(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some()
    }
}

struct ActivePoll {
    account: AccountId,
    canceled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Session-scoped balance poller
pub struct BalanceOracle {
    ledger: Arc<dyn LedgerClient>,
    events: EventSender,
    poll_interval: Duration,
    snapshot: Arc<RwLock<BalanceSnapshot>>,
    active: Mutex<Option<ActivePoll>>,
}

impl BalanceOracle {
    pub fn new(ledger: Arc<dyn LedgerClient>, events: EventSender, poll_interval: Duration) -> Self {
        Self {
            ledger,
            events,
            poll_interval,
            snapshot: Arc::new(RwLock::new(BalanceSnapshot::unknown())),
            active: Mutex::new(None),
        }
    }

    /// Latest snapshot, by value
    pub fn latest(&self) -> BalanceSnapshot {
        self.snapshot.read().unwrap().clone()
    }

    /// Start polling for an account: one immediate query, then the fixed
    /// period. Idempotent for the account already being polled.
    pub fn start(&self, account: AccountId) {
        let mut active = self.active.lock().unwrap();
        if let Some(poll) = active.as_ref() {
            if poll.account == account && !poll.canceled.load(Ordering::SeqCst) {
                debug!(account = %account.short(), "Balance poll already running");
                return;
            }
            poll.canceled.store(true, Ordering::SeqCst);
            poll.task.abort();
        }

        let canceled = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn({
            let ledger = self.ledger.clone();
            let snapshot = self.snapshot.clone();
            let events = self.events.clone();
            let canceled = canceled.clone();
            let account = account.clone();
            let interval = self.poll_interval;
            async move {
                loop {
                    if canceled.load(Ordering::SeqCst) {
                        break;
                    }
                    Self::poll_once(&ledger, &snapshot, &events, &canceled, &account).await;
                    if canceled.load(Ordering::SeqCst) {
                        break;
                    }
                    tokio::time::sleep(interval).await;
                }
            }
        });

        debug!(account = %account.short(), "Balance poll started");
        *active = Some(ActivePoll {
            account,
            canceled,
            task,
        });
    }

    /// One out-of-band query (e.g. right after a settled transfer)
    pub async fn refresh(&self) {
        let (account, canceled) = {
            let active = self.active.lock().unwrap();
            match active.as_ref() {
                Some(poll) if !poll.canceled.load(Ordering::SeqCst) => {
                    (poll.account.clone(), poll.canceled.clone())
                }
                _ => {
                    debug!("Balance refresh skipped: no active poll");
                    return;
                }
            }
        };
        Self::poll_once(&self.ledger, &self.snapshot, &self.events, &canceled, &account).await;
    }

    /// Stop polling. An in-flight query may complete but its result is
    /// never applied.
    pub fn cancel(&self) {
        let mut active = self.active.lock().unwrap();
        if let Some(poll) = active.take() {
            poll.canceled.store(true, Ordering::SeqCst);
            poll.task.abort();
            debug!(account = %poll.account.short(), "Balance poll canceled");
        }
    }

    /// Reset the snapshot to unknown (session teardown)
    pub fn clear(&self) {
        *self.snapshot.write().unwrap() = BalanceSnapshot::unknown();
    }

    async fn poll_once(
        ledger: &Arc<dyn LedgerClient>,
        snapshot: &Arc<RwLock<BalanceSnapshot>>,
        events: &EventSender,
        canceled: &AtomicBool,
        account: &AccountId,
    ) {
        match ledger.get_balance(account).await {
            Ok(units) => {
                let snap = BalanceSnapshot {
                    value: Some(money::from_base_units(units)),
                    observed_at: Utc::now(),
                };
                {
                    // The flag is re-checked under the write lock with no
                    // await point before the swap: a cancel that landed
                    // during the round-trip wins.
                    let mut guard = snapshot.write().unwrap();
                    if canceled.load(Ordering::SeqCst) {
                        return;
                    }
                    *guard = snap.clone();
                }
                debug!(account = %account.short(), base_units = units, "Balance updated");
                events.emit(CoreEvent::BalanceUpdated(snap));
            }
            Err(e) => {
                // Stale-but-available: previous snapshot stays in place
                warn!(account = %account.short(), error = %e, "Balance poll failed");
                events.emit(CoreEvent::BalancePollFailed {
                    reason: e.to_string(),
                });
            }
        }
    }
}
