use super::gateway::{OrderCreated, OrderRequest};
use super::notification::GatewayNotification;
use super::transaction::{Resolution, Transaction};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Result of a compare-and-swap out of `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// This caller performed the transition.
    Applied(Transaction),
    /// Someone else got there first; nothing was written.
    AlreadyResolved(Transaction),
    Missing,
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new transaction, failing with `DuplicateTransaction` if the id is taken.
    async fn insert(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, public_id: &str) -> Result<Option<Transaction>>;
    async fn list(&self) -> Result<Vec<Transaction>>;
    /// Applies `resolution` only while the transaction is still pending.
    ///
    /// Implementations must make the check and the write atomic per `public_id`.
    async fn resolve_pending(&self, public_id: &str, resolution: Resolution)
        -> Result<ResolveOutcome>;
}

#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderCreated>;
    /// Current status of an order, straight from the gateway.
    async fn fetch_order(&self, order_id: &str) -> Result<GatewayNotification>;
}

pub type TransactionStoreRef = Arc<dyn TransactionStore>;
pub type GatewayClientRef = Arc<dyn GatewayClient>;
