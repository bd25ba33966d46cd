//! Ledger Collaborator Boundary
//!
//! The ledger is an opaque service with a submit/confirm contract. This
//! module owns the account identifier type, the collaborator traits for
//! balance queries, signing/broadcast and confirmation waits, and the
//! in-process mock used by the dev binary and tests.

pub mod address;
pub mod client;
#[cfg(any(test, feature = "mock-ledger"))]
pub mod mock;

pub use address::{AccountId, AddressError};
pub use client::{
    Commitment, LedgerClient, LedgerError, SignerError, TransferInstruction, TransferSigner, TxRef,
};
#[cfg(any(test, feature = "mock-ledger"))]
pub use mock::MockLedger;
