use crate::domain::ports::{ResolveOutcome, TransactionStore};
use crate::domain::transaction::{Resolution, Transaction};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type Slot = Arc<Mutex<Transaction>>;

/// A thread-safe in-memory store for transactions.
///
/// The map lock is only held to find or add an entry. Each transaction sits behind its own
/// mutex, so resolving one public id never blocks work on another.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<String, Slot>>>,
}

impl InMemoryTransactionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, public_id: &str) -> Option<Slot> {
        self.transactions.read().await.get(public_id).cloned()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    /// Adds `tx` under its public id, failing with `DuplicateTransaction` if the id is taken.
    async fn insert(&self, tx: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        match transactions.entry(tx.public_id.clone()) {
            Entry::Occupied(_) => Err(CheckoutError::DuplicateTransaction(tx.public_id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(tx)));
                Ok(())
            }
        }
    }

    /// Returns a snapshot of the transaction, if any.
    async fn get(&self, public_id: &str) -> Result<Option<Transaction>> {
        match self.slot(public_id).await {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    /// Returns every transaction, oldest first.
    async fn list(&self) -> Result<Vec<Transaction>> {
        let slots: Vec<Slot> = self.transactions.read().await.values().cloned().collect();
        let mut transactions = Vec::with_capacity(slots.len());
        for slot in slots {
            transactions.push(slot.lock().await.clone());
        }
        transactions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.public_id.cmp(&b.public_id))
        });
        Ok(transactions)
    }

    /// Resolves a pending transaction while holding its slot lock.
    ///
    /// # Arguments
    ///
    /// * `public_id` - The shop's id for the transaction.
    /// * `resolution` - The terminal state and gateway data to record.
    async fn resolve_pending(
        &self,
        public_id: &str,
        resolution: Resolution,
    ) -> Result<ResolveOutcome> {
        let Some(slot) = self.slot(public_id).await else {
            return Ok(ResolveOutcome::Missing);
        };

        let mut tx = slot.lock().await;
        if tx.state.is_terminal() {
            return Ok(ResolveOutcome::AlreadyResolved(tx.clone()));
        }
        tx.resolve(&resolution)?;
        Ok(ResolveOutcome::Applied(tx.clone()))
    }
}
