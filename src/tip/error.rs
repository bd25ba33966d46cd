//! Tip Submission Error Types
//!
//! The taxonomy keeps three user-visible outcomes apart: the transfer
//! definitely did not happen, the outcome is unknown, and the transfer
//! settled but was not recorded.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::{AddressError, TxRef};

/// Tip submission errors
#[derive(Error, Debug, Clone)]
pub enum TipError {
    // === Validation Errors ===
    #[error("No account connected")]
    NotConnected,

    #[error("Recipient is not a valid account id: {0}")]
    InvalidRecipient(AddressError),

    #[error("Amount must be a positive value within ledger range")]
    InvalidAmount,

    #[error("Note exceeds the maximum length")]
    NoteTooLong,

    /// Advisory check against the last balance snapshot; the ledger is the
    /// final authority
    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    // === Submission Errors ===
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    /// The ledger reports the transaction failed. Definite non-transfer;
    /// no receipt is written.
    #[error("Transfer failed on ledger: {0}")]
    ConfirmationFailed(String),

    /// The confirmation wait ended without a verdict. The transaction may
    /// still confirm later out-of-band; funds cannot be assumed unmoved.
    #[error("Confirmation wait ended with outcome unknown")]
    ConfirmationTimeout,

    /// The transfer settled on-chain but the receipt write failed. Retry
    /// persistence with this reference; never resubmit value.
    #[error("Transfer settled but receipt not recorded ({transaction_ref}): {reason}")]
    ReceiptPersistFailed {
        transaction_ref: TxRef,
        reason: String,
    },
}

/// What a failed submission implies about whether value moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Definitely did not happen
    NotExecuted,
    /// May have happened; requires out-of-band verification
    Unknown,
    /// Happened on-chain but is not recorded locally
    SettledUnrecorded,
}

impl TipError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TipError::NotConnected => "NOT_CONNECTED",
            TipError::InvalidRecipient(_) => "INVALID_RECIPIENT",
            TipError::InvalidAmount => "INVALID_AMOUNT",
            TipError::NoteTooLong => "NOTE_TOO_LONG",
            TipError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TipError::SubmissionRejected(_) => "SUBMISSION_REJECTED",
            TipError::ConfirmationFailed(_) => "CONFIRMATION_FAILED",
            TipError::ConfirmationTimeout => "CONFIRMATION_TIMEOUT",
            TipError::ReceiptPersistFailed { .. } => "RECEIPT_PERSIST_FAILED",
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            TipError::NotConnected
            | TipError::InvalidRecipient(_)
            | TipError::InvalidAmount
            | TipError::NoteTooLong
            | TipError::InsufficientBalance { .. }
            | TipError::SubmissionRejected(_)
            | TipError::ConfirmationFailed(_) => FailureKind::NotExecuted,
            TipError::ConfirmationTimeout => FailureKind::Unknown,
            TipError::ReceiptPersistFailed { .. } => FailureKind::SettledUnrecorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(TipError::NotConnected.code(), "NOT_CONNECTED");
        assert_eq!(TipError::ConfirmationTimeout.code(), "CONFIRMATION_TIMEOUT");
        assert_eq!(
            TipError::ReceiptPersistFailed {
                transaction_ref: TxRef::new("tx"),
                reason: "down".to_string(),
            }
            .code(),
            "RECEIPT_PERSIST_FAILED"
        );
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            TipError::ConfirmationFailed("reverted".to_string()).failure_kind(),
            FailureKind::NotExecuted
        );
        assert_eq!(
            TipError::ConfirmationTimeout.failure_kind(),
            FailureKind::Unknown
        );
        assert_eq!(
            TipError::ReceiptPersistFailed {
                transaction_ref: TxRef::new("tx"),
                reason: "down".to_string(),
            }
            .failure_kind(),
            FailureKind::SettledUnrecorded
        );
    }
}
