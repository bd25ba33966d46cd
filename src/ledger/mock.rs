//! Mock Ledger (dev/test double)
//!
//! In-process ledger + signer with controllable failure modes and call
//! counters. Balances live in a map; a broadcast debits the sender and
//! credits the recipient immediately, and the confirmation outcome is
//! recorded for `await_confirmation` to replay.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::address::AccountId;
use super::client::{
    Commitment, LedgerClient, LedgerError, SignerError, TransferInstruction, TransferSigner, TxRef,
};

#[derive(Default)]
struct MockState {
    balances: HashMap<AccountId, u64>,
    /// tx_ref -> confirmation outcome (None = confirmed, Some = failure reason)
    outcomes: HashMap<TxRef, Option<String>>,
}

/// Mock ledger and signer in one
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,

    reject_submissions: AtomicBool,
    fail_confirmations: AtomicBool,
    hang_confirmations: AtomicBool,
    fail_balance_queries: AtomicBool,
    balance_delay_ms: AtomicU64,

    balance_calls: AtomicU64,
    broadcast_calls: AtomicU64,
    confirm_calls: AtomicU64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air
    pub fn fund(&self, account: &AccountId, base_units: u64) {
        let mut state = self.state.lock().unwrap();
        *state.balances.entry(account.clone()).or_insert(0) += base_units;
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        let state = self.state.lock().unwrap();
        state.balances.get(account).copied().unwrap_or(0)
    }

    /// Signer declines every subsequent request
    pub fn set_reject_submissions(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }

    /// Ledger reports every subsequent confirmation as failed
    pub fn set_fail_confirmations(&self, fail: bool) {
        self.fail_confirmations.store(fail, Ordering::SeqCst);
    }

    /// Confirmation waits never resolve (drives caller timeouts)
    pub fn set_hang_confirmations(&self, hang: bool) {
        self.hang_confirmations.store(hang, Ordering::SeqCst);
    }

    pub fn set_fail_balance_queries(&self, fail: bool) {
        self.fail_balance_queries.store(fail, Ordering::SeqCst);
    }

    /// Artificial round-trip time for balance queries
    pub fn set_balance_delay(&self, delay: Duration) {
        self.balance_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn balance_call_count(&self) -> u64 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn broadcast_call_count(&self) -> u64 {
        self.broadcast_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_call_count(&self) -> u64 {
        self.confirm_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, account: &AccountId) -> Result<u64, LedgerError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.balance_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_balance_queries.load(Ordering::SeqCst) {
            return Err(LedgerError::Network("rpc unreachable".to_string()));
        }

        Ok(self.balance_of(account))
    }

    async fn await_confirmation(
        &self,
        tx_ref: &TxRef,
        _commitment: Commitment,
    ) -> Result<(), LedgerError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);

        if self.hang_confirmations.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        if self.fail_confirmations.load(Ordering::SeqCst) {
            return Err(LedgerError::TransactionFailed(
                "transaction reverted".to_string(),
            ));
        }

        let state = self.state.lock().unwrap();
        match state.outcomes.get(tx_ref) {
            Some(None) => Ok(()),
            Some(Some(reason)) => Err(LedgerError::TransactionFailed(reason.clone())),
            None => Err(LedgerError::Network("unknown transaction".to_string())),
        }
    }
}

#[async_trait]
impl TransferSigner for MockLedger {
    async fn sign_and_broadcast(
        &self,
        instruction: &TransferInstruction,
    ) -> Result<TxRef, SignerError> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);

        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(SignerError::Rejected("user declined".to_string()));
        }

        let tx_ref = TxRef::new(format!("{:x}", uuid::Uuid::new_v4().simple()));

        let mut state = self.state.lock().unwrap();
        let available = state
            .balances
            .get(&instruction.from)
            .copied()
            .unwrap_or(0);

        // The ledger is the final authority on funds, not the caller's
        // advisory snapshot: short balances broadcast but fail to confirm.
        if available < instruction.base_units {
            state
                .outcomes
                .insert(tx_ref.clone(), Some("insufficient funds".to_string()));
            return Ok(tx_ref);
        }

        *state
            .balances
            .entry(instruction.from.clone())
            .or_insert(0) -= instruction.base_units;
        *state
            .balances
            .entry(instruction.to.clone())
            .or_insert(0) += instruction.base_units;
        state.outcomes.insert(tx_ref.clone(), None);

        Ok(tx_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(byte: u8) -> AccountId {
        bs58::encode(vec![byte; 32]).into_string().parse().unwrap()
    }

    #[tokio::test]
    async fn test_broadcast_moves_funds_and_confirms() {
        let ledger = MockLedger::new();
        let (alice, bob) = (acct(1), acct(2));
        ledger.fund(&alice, 1_000_000_000);

        let tx = ledger
            .sign_and_broadcast(&TransferInstruction {
                from: alice.clone(),
                to: bob.clone(),
                base_units: 400_000_000,
            })
            .await
            .unwrap();

        ledger
            .await_confirmation(&tx, Commitment::Confirmed)
            .await
            .unwrap();
        assert_eq!(ledger.balance_of(&alice), 600_000_000);
        assert_eq!(ledger.balance_of(&bob), 400_000_000);
        assert_eq!(ledger.broadcast_call_count(), 1);
    }

    #[tokio::test]
    async fn test_short_balance_fails_at_confirmation() {
        let ledger = MockLedger::new();
        let (alice, bob) = (acct(1), acct(2));
        ledger.fund(&alice, 100);

        let tx = ledger
            .sign_and_broadcast(&TransferInstruction {
                from: alice.clone(),
                to: bob,
                base_units: 200,
            })
            .await
            .unwrap();

        let err = ledger
            .await_confirmation(&tx, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransactionFailed(_)));
        assert_eq!(ledger.balance_of(&alice), 100);
    }

    #[tokio::test]
    async fn test_rejection_knob() {
        let ledger = MockLedger::new();
        ledger.set_reject_submissions(true);

        let err = ledger
            .sign_and_broadcast(&TransferInstruction {
                from: acct(1),
                to: acct(2),
                base_units: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SignerError::Rejected(_)));
    }
}
