//! Tip Pipeline
//!
//! Orchestrates one submission from validation to settled receipt. This is
//! the only writer path into the receipt collection; the mirror picks the
//! result up on its own subscription channel.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::TipError;
use super::state::SubmissionState;
use super::types::{MAX_NOTE_LEN, SubmissionId, TipRequest};
use crate::config::AppConfig;
use crate::events::{CoreEvent, EventSender};
use crate::ledger::{
    AccountId, Commitment, LedgerClient, LedgerError, SignerError, TransferInstruction,
    TransferSigner, TxRef,
};
use crate::money;
use crate::session::SessionController;
use crate::store::{Receipt, ReceiptStore, ReceiptWriter};

pub struct TipPipeline {
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn TransferSigner>,
    writer: ReceiptWriter,
    session: Arc<SessionController>,
    events: EventSender,
    commitment: Commitment,
    confirmation_timeout: Duration,
}

impl TipPipeline {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn TransferSigner>,
        store: Arc<dyn ReceiptStore>,
        session: Arc<SessionController>,
        events: EventSender,
        config: &AppConfig,
    ) -> Self {
        let commitment = config.ledger.commitment.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Bad commitment in config, using default");
            Commitment::default()
        });

        Self {
            ledger,
            signer,
            writer: ReceiptWriter::new(store, config.store.collection.clone()),
            session,
            events,
            commitment,
            confirmation_timeout: Duration::from_secs(config.ledger.confirmation_timeout_secs),
        }
    }

    /// Override the confirmation wait bound
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Submit one tip transfer.
    ///
    /// Strictly sequential: validate, sign/broadcast, await confirmation,
    /// persist. The request is not retried on any failure; a
    /// `ReceiptPersistFailed` is recovered via [`Self::retry_persist`],
    /// never by resubmitting value.
    pub async fn submit(&self, request: TipRequest) -> Result<Receipt, TipError> {
        let submission_id = SubmissionId::new();
        self.transition(submission_id, SubmissionState::Validating);

        let result = self.run(submission_id, &request).await;
        match &result {
            Ok(receipt) => {
                self.transition(submission_id, SubmissionState::Settled);
                info!(
                    submission_id = %submission_id,
                    tx_ref = %receipt.transaction_ref,
                    amount = %receipt.amount,
                    to = %receipt.to_account.short(),
                    "Tip settled"
                );
            }
            Err(e) => {
                self.transition(submission_id, SubmissionState::Failed);
                warn!(
                    submission_id = %submission_id,
                    code = e.code(),
                    error = %e,
                    "Tip submission failed"
                );
            }
        }
        result
    }

    async fn run(
        &self,
        submission_id: SubmissionId,
        request: &TipRequest,
    ) -> Result<Receipt, TipError> {
        // === Validating ===
        let from = self.session.account().ok_or(TipError::NotConnected)?;
        let recipient: AccountId = request
            .recipient
            .parse()
            .map_err(TipError::InvalidRecipient)?;
        if let Some(note) = &request.note {
            if note.len() > MAX_NOTE_LEN {
                return Err(TipError::NoteTooLong);
            }
        }
        let base_units =
            money::to_base_units(request.amount).map_err(|_| TipError::InvalidAmount)?;
        // What actually moves on-chain, after truncation toward zero
        let amount = money::from_base_units(base_units);

        // Advisory check against the last snapshot, skipped when unknown.
        // The snapshot may be stale; the ledger is the final authority.
        let snapshot = self.session.oracle().latest();
        if let Some(available) = snapshot.value {
            if request.amount > available {
                return Err(TipError::InsufficientBalance {
                    required: request.amount,
                    available,
                });
            }
        }

        // === Signing: may suspend indefinitely pending user action ===
        self.transition(submission_id, SubmissionState::Signing);
        let instruction = TransferInstruction {
            from: from.clone(),
            to: recipient.clone(),
            base_units,
        };
        let tx_ref = self
            .signer
            .sign_and_broadcast(&instruction)
            .await
            .map_err(|e| match e {
                SignerError::Rejected(reason) => TipError::SubmissionRejected(reason),
                SignerError::Unavailable(reason) => TipError::SubmissionRejected(reason),
            })?;
        debug!(submission_id = %submission_id, tx_ref = %tx_ref, "Transfer broadcast");

        // === AwaitingConfirmation, bounded ===
        self.transition(submission_id, SubmissionState::AwaitingConfirmation);
        let confirmation = tokio::time::timeout(
            self.confirmation_timeout,
            self.ledger.await_confirmation(&tx_ref, self.commitment),
        )
        .await;
        match confirmation {
            // Unknown outcome: the transaction may still confirm later
            // out-of-band. No receipt, no retry.
            Err(_elapsed) => return Err(TipError::ConfirmationTimeout),
            Ok(Err(LedgerError::TransactionFailed(reason))) => {
                // Definite non-transfer: no receipt is written
                return Err(TipError::ConfirmationFailed(reason));
            }
            Ok(Err(LedgerError::Network(reason))) => {
                // A transport failure leaves the outcome as unknown as a
                // timeout does
                warn!(submission_id = %submission_id, tx_ref = %tx_ref, error = %reason, "Confirmation wait lost contact");
                return Err(TipError::ConfirmationTimeout);
            }
            Ok(Ok(())) => {}
        }

        // === Persisting ===
        self.transition(submission_id, SubmissionState::Persisting);
        let receipt = self
            .persist(from, recipient, amount, request.note.clone(), tx_ref)
            .await?;

        // === Settled: the on-chain balance changed ===
        self.session.oracle().refresh().await;
        self.events.emit(CoreEvent::TipSettled(receipt.clone()));
        Ok(receipt)
    }

    /// Retry only the persistence step after `ReceiptPersistFailed`.
    ///
    /// Never contacts the signer or the ledger; safe to call repeatedly:
    /// the writer dedupes on the transaction reference.
    pub async fn retry_persist(
        &self,
        request: &TipRequest,
        transaction_ref: TxRef,
    ) -> Result<Receipt, TipError> {
        let from = self.session.account().ok_or(TipError::NotConnected)?;
        let recipient: AccountId = request
            .recipient
            .parse()
            .map_err(TipError::InvalidRecipient)?;
        let base_units =
            money::to_base_units(request.amount).map_err(|_| TipError::InvalidAmount)?;

        let receipt = self
            .persist(
                from,
                recipient,
                money::from_base_units(base_units),
                request.note.clone(),
                transaction_ref,
            )
            .await?;
        self.events.emit(CoreEvent::TipSettled(receipt.clone()));
        Ok(receipt)
    }

    async fn persist(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        note: Option<String>,
        tx_ref: TxRef,
    ) -> Result<Receipt, TipError> {
        self.writer
            .persist(from, to, amount, note, tx_ref.clone())
            .await
            .map_err(|e| TipError::ReceiptPersistFailed {
                transaction_ref: tx_ref,
                reason: e.to_string(),
            })
    }

    fn transition(&self, submission_id: SubmissionId, state: SubmissionState) {
        debug!(submission_id = %submission_id, state = %state, "Submission state");
        self.events.emit(CoreEvent::SubmissionState {
            submission_id,
            state,
        });
    }
}
