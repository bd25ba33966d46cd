//! tipline - Tip Transfer Orchestration Core
//!
//! Coordinates two independently-failing collaborators: a ledger that
//! settles native-asset transfers and a document store that records and
//! streams receipts of them.
//!
//! # Modules
//!
//! - [`money`] - Display decimal <-> integer base unit conversion
//! - [`ledger`] - Ledger/signer collaborator traits, account ids, mock
//! - [`store`] - Receipt store collaborator trait, receipt writer, mock
//! - [`oracle`] - Session-scoped balance polling
//! - [`mirror`] - Live, re-sorted local view of persisted receipts
//! - [`tip`] - The submission pipeline state machine
//! - [`session`] - Connect/disconnect lifecycle for oracle + mirror
//! - [`events`] - Notification channel for the presentation layer
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod mirror;
pub mod money;
pub mod oracle;
pub mod session;
pub mod store;
pub mod tip;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use events::{CoreEvent, EventSender};
pub use ledger::{AccountId, Commitment, LedgerClient, TransferSigner, TxRef};
pub use mirror::{ReceiptMirror, sort_receipts};
pub use oracle::{BalanceOracle, BalanceSnapshot};
pub use session::SessionController;
pub use store::{Receipt, ReceiptStore, ReceiptWriter};
pub use tip::{SubmissionId, SubmissionState, TipError, TipPipeline, TipRequest};
