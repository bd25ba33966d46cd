//! Memory Store (dev/test double)
//!
//! In-process document store with watcher fan-out. Every append re-delivers
//! the full filtered result set to each watcher on the collection, which is
//! the delivery model the mirror is written against.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Document, DocumentId, QueryFilter, ReceiptStore, ReceiptWatch, StoreError};

struct Watcher {
    collection: String,
    filter: QueryFilter,
    tx: mpsc::UnboundedSender<Result<Vec<Document>, StoreError>>,
    canceled: Arc<AtomicBool>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    watchers: Vec<Watcher>,
}

/// Mock document store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_adds: AtomicBool,
    add_calls: AtomicU64,
    query_calls: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent append fails (store unreachable)
    pub fn set_fail_adds(&self, fail: bool) {
        self.fail_adds.store(fail, Ordering::SeqCst);
    }

    pub fn add_call_count(&self) -> u64 {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn query_call_count(&self) -> u64 {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.collections.get(collection).map_or(0, Vec::len)
    }

    /// Push an error to every live watcher (subscription failure injection)
    pub fn fail_watchers(&self, reason: &str) {
        let inner = self.inner.lock().unwrap();
        for watcher in &inner.watchers {
            let _ = watcher
                .tx
                .send(Err(StoreError::Unavailable(reason.to_string())));
        }
    }

    fn snapshot_for(inner: &Inner, collection: &str, filter: &QueryFilter) -> Vec<Document> {
        inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(&d.fields))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn notify_watchers(inner: &mut Inner, collection: &str) {
        // Drop watchers whose handle was canceled or dropped
        inner
            .watchers
            .retain(|w| !w.canceled.load(Ordering::SeqCst) && !w.tx.is_closed());

        for watcher in &inner.watchers {
            if watcher.collection == collection {
                let snapshot = Self::snapshot_for(inner, collection, &watcher.filter);
                let _ = watcher.tx.send(Ok(snapshot));
            }
        }
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn add_document(
        &self,
        collection: &str,
        fields: serde_json::Value,
    ) -> Result<DocumentId, StoreError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_adds.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store unreachable".to_string()));
        }

        let id = DocumentId::new(uuid::Uuid::new_v4().to_string());
        let mut inner = self.inner.lock().unwrap();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Self::notify_watchers(&mut inner, collection);

        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        filter: &QueryFilter,
    ) -> Result<Vec<Document>, StoreError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        let inner = self.inner.lock().unwrap();
        Ok(Self::snapshot_for(&inner, collection, filter))
    }

    async fn watch_query(
        &self,
        collection: &str,
        filter: QueryFilter,
    ) -> Result<ReceiptWatch, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let canceled = Arc::new(AtomicBool::new(false));

        let mut inner = self.inner.lock().unwrap();
        // Initial full snapshot, then one delivery per change
        let _ = tx.send(Ok(Self::snapshot_for(&inner, collection, &filter)));
        inner.watchers.push(Watcher {
            collection: collection.to_string(),
            filter,
            tx,
            canceled: canceled.clone(),
        });

        Ok(ReceiptWatch::new(rx, canceled))
    }
}
