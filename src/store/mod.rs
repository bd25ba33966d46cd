//! Receipt Store Collaborator Boundary
//!
//! The secondary store is document-oriented: append a document, run a
//! one-shot filtered query, or hold a standing query that delivers full
//! result-set snapshots with at-least-once semantics and no ordering
//! guarantee on the filtered field. Ordering is always done client-side.

pub mod receipt;
pub mod writer;

#[cfg(any(test, feature = "mock-ledger"))]
pub mod memory;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

pub use receipt::{FIELD_FROM_ACCOUNT, FIELD_TRANSACTION_REF, Receipt, ReceiptFields};
pub use writer::ReceiptWriter;

#[cfg(any(test, feature = "mock-ledger"))]
pub use memory::MemoryStore;

/// Store-assigned document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored document: assigned id plus its JSON field map
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: serde_json::Value,
}

/// Single-field equality filter.
///
/// Deliberately this and nothing more: one equality clause needs no
/// composite index on the store side, so result sets arrive unordered and
/// the client re-sorts.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub field: String,
    pub equals: serde_json::Value,
}

impl QueryFilter {
    pub fn field_equals(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }

    pub fn matches(&self, fields: &serde_json::Value) -> bool {
        fields.get(&self.field) == Some(&self.equals)
    }
}

/// Receipt store errors
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("Receipt store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Watch stream closed by the store")]
    WatchClosed,
}

/// Handle on a standing query.
///
/// `next` yields full result-set snapshots until the watch errors, the
/// store drops it, or `cancel` is called. After `cancel` no further
/// delivery is yielded, including deliveries already queued.
pub struct ReceiptWatch {
    rx: mpsc::UnboundedReceiver<Result<Vec<Document>, StoreError>>,
    canceled: Arc<AtomicBool>,
}

impl ReceiptWatch {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Result<Vec<Document>, StoreError>>,
        canceled: Arc<AtomicBool>,
    ) -> Self {
        Self { rx, canceled }
    }

    pub async fn next(&mut self) -> Option<Result<Vec<Document>, StoreError>> {
        if self.canceled.load(Ordering::SeqCst) {
            return None;
        }
        let delivery = self.rx.recv().await;
        // A cancel that raced the delivery wins: discard it
        if self.canceled.load(Ordering::SeqCst) {
            return None;
        }
        delivery
    }

    /// Stop delivery and release the store-side watch
    pub fn cancel(&mut self) {
        self.canceled.store(true, Ordering::SeqCst);
        self.rx.close();
    }
}

impl Drop for ReceiptWatch {
    fn drop(&mut self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

/// Secondary store collaborator
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Append a document; the store assigns the id
    async fn add_document(
        &self,
        collection: &str,
        fields: serde_json::Value,
    ) -> Result<DocumentId, StoreError>;

    /// One-shot filtered read
    async fn query(
        &self,
        collection: &str,
        filter: &QueryFilter,
    ) -> Result<Vec<Document>, StoreError>;

    /// Standing filtered query delivering full result-set snapshots,
    /// starting with the current one
    async fn watch_query(
        &self,
        collection: &str,
        filter: QueryFilter,
    ) -> Result<ReceiptWatch, StoreError>;
}
