use crate::domain::notification::{ClaimedStatus, GatewayNotification};
use crate::domain::ports::{ResolveOutcome, TransactionStoreRef};
use crate::domain::transaction::{Resolution, TransactionState};
use crate::error::{CheckoutError, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileResult {
    /// This call moved the transaction out of `Pending`.
    Resolved(TransactionState),
    /// Amounts disagreed; the transaction was forced to `Failed` and flagged.
    AmountMismatch { expected: i64, received: i64 },
    /// Nothing to do, the transaction was already terminal.
    AlreadyResolved(TransactionState),
    /// The gateway has not reached a final status yet.
    StillPending,
}

impl ReconcileResult {
    /// State the transaction is in after this call.
    pub fn state(&self) -> TransactionState {
        match self {
            Self::Resolved(state) | Self::AlreadyResolved(state) => *state,
            Self::AmountMismatch { .. } => TransactionState::Failed,
            Self::StillPending => TransactionState::Pending,
        }
    }
}

/// Applies gateway notifications to stored transactions, at most once per transaction.
///
/// The reconciler owns no state besides the store handle and is cheap to clone. Concurrent
/// calls for the same public id are serialized by the store's compare-and-swap.
#[derive(Clone)]
pub struct Reconciler {
    store: TransactionStoreRef,
}

impl Reconciler {
    /// Creates a new `Reconciler`.
    ///
    /// # Arguments
    ///
    /// * `store` - The transaction store shared by every processor.
    pub fn new(store: TransactionStoreRef) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TransactionStoreRef {
        &self.store
    }

    pub async fn reconcile(
        &self,
        public_id: &str,
        notification: &GatewayNotification,
    ) -> Result<ReconcileResult> {
        let tx = self
            .store
            .get(public_id)
            .await?
            .ok_or_else(|| CheckoutError::UnknownTransaction(public_id.to_string()))?;

        if tx.state.is_terminal() {
            debug!(public_id, state = %tx.state, "duplicate notification ignored");
            return Ok(ReconcileResult::AlreadyResolved(tx.state));
        }

        let expected = tx.amount.minor_units()?;
        let mismatch = notification.amount_minor != expected
            || notification.currency != *tx.amount.currency();

        let resolution = if mismatch {
            Resolution::flagged_failure(&notification.gateway_transaction_id)
        } else {
            let state = match notification.status {
                ClaimedStatus::Completed => TransactionState::Completed,
                ClaimedStatus::Failed => TransactionState::Failed,
                ClaimedStatus::Cancelled => TransactionState::Cancelled,
                ClaimedStatus::Pending => return Ok(ReconcileResult::StillPending),
            };
            Resolution::new(state, &notification.gateway_transaction_id)
        };

        match self.store.resolve_pending(public_id, resolution).await? {
            ResolveOutcome::Applied(_) if mismatch => {
                warn!(
                    public_id,
                    expected,
                    received = notification.amount_minor,
                    currency = %notification.currency,
                    "amount mismatch, transaction failed and flagged for review"
                );
                Ok(ReconcileResult::AmountMismatch {
                    expected,
                    received: notification.amount_minor,
                })
            }
            ResolveOutcome::Applied(tx) => {
                info!(
                    public_id,
                    state = %tx.state,
                    gateway_transaction_id = %notification.gateway_transaction_id,
                    "transaction resolved"
                );
                Ok(ReconcileResult::Resolved(tx.state))
            }
            ResolveOutcome::AlreadyResolved(tx) => {
                debug!(public_id, state = %tx.state, "lost resolution race");
                Ok(ReconcileResult::AlreadyResolved(tx.state))
            }
            ResolveOutcome::Missing => {
                Err(CheckoutError::UnknownTransaction(public_id.to_string()))
            }
        }
    }
}
