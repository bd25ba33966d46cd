//! Receipt Mirror
//!
//! Live local reflection of the receipts the active account has sent. The
//! standing query carries no store-side ordering (the single-field filter
//! needs no composite index), so every delivery is re-sorted client-side
//! and the whole view is swapped atomically. Observers only ever see a
//! fully-sorted, fully-filtered snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{CoreEvent, EventSender};
use crate::ledger::AccountId;
use crate::store::{FIELD_FROM_ACCOUNT, QueryFilter, Receipt, ReceiptStore, StoreError};

/// Re-sort a delivery snapshot: `recorded_at` descending, stable, so
/// receipts with equal timestamps keep their arrival order.
pub fn sort_receipts(mut receipts: Vec<Receipt>) -> Vec<Receipt> {
    receipts.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    receipts
}

struct ActiveWatch {
    account: AccountId,
    canceled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Session-scoped live view of persisted receipts
pub struct ReceiptMirror {
    store: Arc<dyn ReceiptStore>,
    events: EventSender,
    collection: String,
    view: Arc<RwLock<Arc<Vec<Receipt>>>>,
    active: Mutex<Option<ActiveWatch>>,
}

impl ReceiptMirror {
    pub fn new(
        store: Arc<dyn ReceiptStore>,
        events: EventSender,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            events,
            collection: collection.into(),
            view: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            active: Mutex::new(None),
        }
    }

    /// Current view snapshot. Immutable; a later update swaps in a new one.
    pub fn view(&self) -> Arc<Vec<Receipt>> {
        self.view.read().unwrap().clone()
    }

    /// Open the standing query for an account and keep the view current.
    /// Idempotent for the account already being watched. Delivery errors
    /// end the subscription; the caller decides whether to resubscribe.
    pub async fn subscribe(&self, account: AccountId) -> Result<(), StoreError> {
        {
            let active = self.active.lock().unwrap();
            if let Some(watch) = active.as_ref() {
                if watch.account == account && !watch.canceled.load(Ordering::SeqCst) {
                    debug!(account = %account.short(), "Mirror already subscribed");
                    return Ok(());
                }
            }
        }

        let filter = QueryFilter::field_equals(FIELD_FROM_ACCOUNT, account.as_str());
        let mut watch = self.store.watch_query(&self.collection, filter).await?;

        let canceled = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn({
            let view = self.view.clone();
            let events = self.events.clone();
            let canceled = canceled.clone();
            let account = account.clone();
            async move {
                while let Some(delivery) = watch.next().await {
                    match delivery {
                        Ok(docs) => {
                            let mut receipts = Vec::with_capacity(docs.len());
                            for doc in &docs {
                                match Receipt::from_document(doc) {
                                    Ok(receipt) => receipts.push(receipt),
                                    Err(e) => {
                                        // One bad document must not poison the view
                                        warn!(doc_id = %doc.id, error = %e, "Skipping malformed receipt");
                                    }
                                }
                            }
                            let sorted = Arc::new(sort_receipts(receipts));
                            let count = sorted.len();
                            {
                                // Re-checked under the write lock, no await
                                // before the swap: cancel wins over an
                                // in-flight delivery.
                                let mut guard = view.write().unwrap();
                                if canceled.load(Ordering::SeqCst) {
                                    return;
                                }
                                *guard = sorted;
                            }
                            debug!(account = %account.short(), count, "Mirror view updated");
                            events.emit(CoreEvent::ReceiptsUpdated { count });
                        }
                        Err(e) => {
                            // No automatic resubscribe
                            warn!(account = %account.short(), error = %e, "Receipt subscription failed");
                            events.emit(CoreEvent::SubscriptionFailed {
                                reason: e.to_string(),
                            });
                            return;
                        }
                    }
                }
            }
        });

        let mut active = self.active.lock().unwrap();
        if let Some(previous) = active.take() {
            previous.canceled.store(true, Ordering::SeqCst);
            previous.task.abort();
        }
        debug!(account = %account.short(), "Mirror subscribed");
        *active = Some(ActiveWatch {
            account,
            canceled,
            task,
        });
        Ok(())
    }

    /// Stop delivery immediately; a delivery already in flight is discarded
    pub fn cancel(&self) {
        let mut active = self.active.lock().unwrap();
        if let Some(watch) = active.take() {
            watch.canceled.store(true, Ordering::SeqCst);
            watch.task.abort();
            debug!(account = %watch.account.short(), "Mirror canceled");
        }
    }

    /// Reset the view to empty (session teardown)
    pub fn clear(&self) {
        *self.view.write().unwrap() = Arc::new(Vec::new());
    }
}
