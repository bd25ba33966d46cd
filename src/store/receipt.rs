//! Receipt Record
//!
//! An off-ledger, immutable record of a confirmed transfer. The store owns
//! receipts; the mirror caches them read-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Document, DocumentId};
use crate::ledger::{AccountId, TxRef};

/// Document field name holding the sender account (mirror filter key)
pub const FIELD_FROM_ACCOUNT: &str = "fromAccount";

/// Document field name holding the ledger transaction reference (dedupe key)
pub const FIELD_TRANSACTION_REF: &str = "transactionRef";

/// Receipt fields as written to a document. The store-assigned id is not a
/// field; the writer stamps `recorded_at` from its local clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptFields {
    pub from_account: AccountId,
    pub to_account: AccountId,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub transaction_ref: TxRef,
}

/// A persisted receipt: store-assigned id plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub id: DocumentId,
    pub from_account: AccountId,
    pub to_account: AccountId,
    pub amount: Decimal,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub transaction_ref: TxRef,
}

impl Receipt {
    pub fn from_parts(id: DocumentId, fields: ReceiptFields) -> Self {
        Self {
            id,
            from_account: fields.from_account,
            to_account: fields.to_account,
            amount: fields.amount,
            note: fields.note,
            recorded_at: fields.recorded_at,
            transaction_ref: fields.transaction_ref,
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        let fields: ReceiptFields = serde_json::from_value(doc.fields.clone())?;
        Ok(Self::from_parts(doc.id.clone(), fields))
    }
}
