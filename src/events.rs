//! Core Event Channel
//!
//! The presentation layer consumes these events instead of the core driving
//! UI side effects directly. Every state change a UI would surface (balance
//! refresh, mirror update, submission progress, non-fatal failures) is
//! published here.
//!
//! ```text
//! Oracle ──┐
//! Mirror ──┼─▶ CoreEvent ─▶ UnboundedReceiver (presentation layer)
//! Pipeline ┘
//! ```

use tokio::sync::mpsc;

use crate::ledger::AccountId;
use crate::oracle::BalanceSnapshot;
use crate::store::Receipt;
use crate::tip::{SubmissionId, SubmissionState};

/// Events published by the core for the presentation layer
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Session started for an account
    SessionConnected { account: AccountId },
    /// Session ended; snapshot and mirror view were reset
    SessionDisconnected,
    /// A fresh balance snapshot was applied
    BalanceUpdated(BalanceSnapshot),
    /// A balance poll failed; previous snapshot retained
    BalancePollFailed { reason: String },
    /// A submission moved to a new pipeline state
    SubmissionState {
        submission_id: SubmissionId,
        state: SubmissionState,
    },
    /// A submission settled and its receipt was persisted
    TipSettled(Receipt),
    /// The mirror applied a new view
    ReceiptsUpdated { count: usize },
    /// The mirror subscription failed; delivery stopped until resubscribe
    SubscriptionFailed { reason: String },
}

/// Sender half of the core event channel
///
/// Sends never fail from the core's perspective: a closed channel means the
/// presentation layer went away, which must not disturb the pipeline.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<CoreEvent>,
}

impl EventSender {
    pub fn emit(&self, event: CoreEvent) {
        let _ = self.tx.send(event);
    }

    /// A sender with no consumer, for tests and headless use
    pub fn disconnected() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }
}

/// Create the core event channel
pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<CoreEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit(CoreEvent::SessionDisconnected);
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (tx, mut rx) = channel();
        tx.emit(CoreEvent::SessionDisconnected);
        tx.emit(CoreEvent::BalancePollFailed {
            reason: "rpc down".to_string(),
        });

        assert!(matches!(
            rx.recv().await.unwrap(),
            CoreEvent::SessionDisconnected
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            CoreEvent::BalancePollFailed { .. }
        ));
    }
}
