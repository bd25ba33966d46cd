//! Submission FSM State Definitions

use std::fmt;

/// Submission pipeline states
///
/// Terminal states: SETTLED, FAILED. Every non-terminal state can exit to
/// FAILED; the error value carries the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    /// No submission in progress
    Idle,

    /// Checking session, recipient, amount and the advisory balance
    Validating,

    /// Instruction built; waiting on the signing collaborator. May suspend
    /// indefinitely pending user action.
    Signing,

    /// Broadcast done; waiting for the ledger to reach the required
    /// commitment level (timeout-bounded)
    AwaitingConfirmation,

    /// Confirmed on ledger; appending the receipt to the store
    Persisting,

    /// Terminal: receipt returned, balance refresh triggered
    Settled,

    /// Terminal: see the returned error for which step failed
    Failed,
}

impl SubmissionState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Settled | SubmissionState::Failed)
    }

    /// True once value may have left the account (broadcast happened)
    #[inline]
    pub fn is_past_broadcast(&self) -> bool {
        matches!(
            self,
            SubmissionState::AwaitingConfirmation
                | SubmissionState::Persisting
                | SubmissionState::Settled
        )
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "IDLE",
            SubmissionState::Validating => "VALIDATING",
            SubmissionState::Signing => "SIGNING",
            SubmissionState::AwaitingConfirmation => "AWAITING_CONFIRMATION",
            SubmissionState::Persisting => "PERSISTING",
            SubmissionState::Settled => "SETTLED",
            SubmissionState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
