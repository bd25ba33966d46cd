//! Ledger Client Traits
//!
//! Two collaborators sit behind these traits: the ledger network (balance
//! queries, confirmation waits) and the signer that presents a built
//! transaction to the account holder for approval and broadcast. Both may
//! suspend for a long time; neither is retried by the core.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::AccountId;

/// Commitment level a transaction must reach before it counts as settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level: {}", other)),
        }
    }
}

/// Opaque ledger transaction reference, unique per on-chain transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxRef(String);

impl TxRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single native-transfer instruction, in base units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub from: AccountId,
    pub to: AccountId,
    pub base_units: u64,
}

/// Ledger collaborator errors
#[derive(Debug, Error, Clone)]
pub enum LedgerError {
    /// Transport-level failure; the requested fact is unknown
    #[error("Ledger network error: {0}")]
    Network(String),

    /// The ledger reports the transaction failed. Definite non-transfer.
    #[error("Transaction failed on ledger: {0}")]
    TransactionFailed(String),
}

/// Signing collaborator errors
#[derive(Debug, Error, Clone)]
pub enum SignerError {
    /// The account holder (or the collaborator on their behalf) declined
    #[error("Signature request rejected: {0}")]
    Rejected(String),

    #[error("Signer unavailable: {0}")]
    Unavailable(String),
}

/// Ledger network collaborator
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Spendable balance of an account, in base units
    async fn get_balance(&self, account: &AccountId) -> Result<u64, LedgerError>;

    /// Wait until the transaction reaches the given commitment level.
    ///
    /// `Err(TransactionFailed)` means the ledger reports a definite failure;
    /// any other error leaves the outcome unknown. The caller bounds this
    /// wait with its own timeout.
    async fn await_confirmation(
        &self,
        tx_ref: &TxRef,
        commitment: Commitment,
    ) -> Result<(), LedgerError>;
}

/// Signing collaborator: presents the built transaction to the account
/// holder and broadcasts it on approval. May suspend indefinitely pending
/// user action.
#[async_trait]
pub trait TransferSigner: Send + Sync {
    async fn sign_and_broadcast(
        &self,
        instruction: &TransferInstruction,
    ) -> Result<TxRef, SignerError>;
}
