//! Receipt Store Writer
//!
//! Fire-after-confirm append of a receipt. Not transactional with the
//! ledger write: the caller retries persistence alone on failure, and the
//! writer keeps that retry safe by deduplicating on the transaction
//! reference before inserting.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::receipt::{FIELD_TRANSACTION_REF, Receipt, ReceiptFields};
use super::{QueryFilter, ReceiptStore, StoreError};
use crate::ledger::{AccountId, TxRef};

/// Appends confirmed transfers to the receipt collection
pub struct ReceiptWriter {
    store: Arc<dyn ReceiptStore>,
    collection: String,
}

impl ReceiptWriter {
    pub fn new(store: Arc<dyn ReceiptStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Persist a receipt for a confirmed transfer.
    ///
    /// Idempotent on `tx_ref`: if a receipt for the same transaction is
    /// already present (a prior attempt reached the store even though the
    /// caller saw an error), that receipt is returned unchanged.
    pub async fn persist(
        &self,
        from_account: AccountId,
        to_account: AccountId,
        amount: Decimal,
        note: Option<String>,
        tx_ref: TxRef,
    ) -> Result<Receipt, StoreError> {
        let filter = QueryFilter::field_equals(FIELD_TRANSACTION_REF, tx_ref.as_str());
        let existing = self.store.query(&self.collection, &filter).await?;
        if let Some(doc) = existing.first() {
            let receipt =
                Receipt::from_document(doc).map_err(|e| StoreError::Malformed(e.to_string()))?;
            debug!(tx_ref = %tx_ref, receipt_id = %receipt.id, "Receipt already persisted");
            return Ok(receipt);
        }

        let fields = ReceiptFields {
            from_account,
            to_account,
            amount,
            note,
            recorded_at: Utc::now(),
            transaction_ref: tx_ref,
        };
        let value =
            serde_json::to_value(&fields).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let id = self.store.add_document(&self.collection, value).await?;

        info!(
            receipt_id = %id,
            tx_ref = %fields.transaction_ref,
            to = %fields.to_account.short(),
            "Receipt persisted"
        );
        Ok(Receipt::from_parts(id, fields))
    }
}
