use super::reconciler::{ReconcileResult, Reconciler};
use crate::domain::notification::GatewayNotification;
use crate::domain::ports::TransactionStoreRef;
use crate::domain::transaction::Transaction;
use crate::error::Result;

/// One row of an exported payment ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    /// A transaction that was opened at checkout.
    Created(Transaction),
    /// A status report received for an existing transaction.
    Notification {
        public_id: String,
        notification: GatewayNotification,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    Created,
    Reconciled(ReconcileResult),
}

/// Feeds ledger events through the same reconciliation path the HTTP callbacks use.
///
/// Events are applied in order, one at a time.
pub struct LedgerReplay {
    reconciler: Reconciler,
}

impl LedgerReplay {
    pub fn new(store: TransactionStoreRef) -> Self {
        Self {
            reconciler: Reconciler::new(store),
        }
    }

    pub async fn apply(&self, event: LedgerEvent) -> Result<ReplayOutcome> {
        match event {
            LedgerEvent::Created(tx) => {
                self.reconciler.store().insert(tx).await?;
                Ok(ReplayOutcome::Created)
            }
            LedgerEvent::Notification {
                public_id,
                notification,
            } => self
                .reconciler
                .reconcile(&public_id, &notification)
                .await
                .map(ReplayOutcome::Reconciled),
        }
    }

    /// Every transaction in the store once the replay is done.
    pub async fn into_results(self) -> Result<Vec<Transaction>> {
        self.reconciler.store().list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Currency, Money};
    use crate::domain::notification::ClaimedStatus;
    use crate::domain::transaction::TransactionState;
    use crate::error::CheckoutError;
    use crate::infrastructure::in_memory::InMemoryTransactionStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn created(public_id: &str) -> LedgerEvent {
        let amount = Money::new(dec!(50.00), Currency::new("EUR").unwrap()).unwrap();
        LedgerEvent::Created(Transaction::pending(public_id, "BOEKENBON", amount))
    }

    fn completed(public_id: &str, amount_minor: i64) -> LedgerEvent {
        LedgerEvent::Notification {
            public_id: public_id.to_string(),
            notification: GatewayNotification {
                status: ClaimedStatus::Completed,
                amount_minor,
                currency: Currency::new("EUR").unwrap(),
                gateway_transaction_id: "900".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_replay_duplicate_notifications() {
        let replay = LedgerReplay::new(Arc::new(InMemoryTransactionStore::new()));
        assert_eq!(replay.apply(created("A1")).await.unwrap(), ReplayOutcome::Created);
        assert_eq!(
            replay.apply(completed("A1", 5000)).await.unwrap(),
            ReplayOutcome::Reconciled(ReconcileResult::Resolved(TransactionState::Completed))
        );
        assert_eq!(
            replay.apply(completed("A1", 1)).await.unwrap(),
            ReplayOutcome::Reconciled(ReconcileResult::AlreadyResolved(
                TransactionState::Completed
            ))
        );

        let results = replay.into_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].state, TransactionState::Completed);
        assert!(!results[0].needs_review);
    }

    #[tokio::test]
    async fn test_replay_rejects_duplicate_creation() {
        let replay = LedgerReplay::new(Arc::new(InMemoryTransactionStore::new()));
        replay.apply(created("A1")).await.unwrap();
        assert!(matches!(
            replay.apply(created("A1")).await,
            Err(CheckoutError::DuplicateTransaction(_))
        ));
    }

    #[tokio::test]
    async fn test_replay_unknown_notification() {
        let replay = LedgerReplay::new(Arc::new(InMemoryTransactionStore::new()));
        assert!(matches!(
            replay.apply(completed("missing", 5000)).await,
            Err(CheckoutError::UnknownTransaction(_))
        ));
        assert!(replay.into_results().await.unwrap().is_empty());
    }
}
