//! Tip Submission Pipeline
//!
//! The central state machine: validate a request, build and broadcast a
//! native-transfer instruction, await ledger confirmation, persist the
//! receipt, refresh the balance. Steps are strictly sequential within one
//! submission; the mirror observes the persisted receipt on its own
//! channel, before or after `submit` returns.

pub mod error;
pub mod pipeline;
pub mod state;
pub mod types;


pub use error::{FailureKind, TipError};
pub use pipeline::TipPipeline;
pub use state::SubmissionState;
pub use types::{MAX_NOTE_LEN, SubmissionId, TipRequest};
