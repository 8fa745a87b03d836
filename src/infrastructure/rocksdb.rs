use crate::domain::ports::{ResolveOutcome, TransactionStore};
use crate::domain::transaction::{Resolution, Transaction};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, TransactionDB,
    TransactionDBOptions,
};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing transactions, keyed by the UTF-8 public id.
pub const CF_TRANSACTIONS: &str = "transactions";

/// A persistent transaction store backed by a RocksDB `TransactionDB`.
///
/// Writes go through a RocksDB transaction that takes an exclusive lock on the key with
/// `get_for_update`, so inserting and resolving are atomic per public id even across
/// processors sharing the same database handle.
///
/// `Clone` shares the underlying `Arc<TransactionDB>`.
#[derive(Clone)]
pub struct RocksDbTransactionStore {
    db: Arc<TransactionDB>,
}

impl RocksDbTransactionStore {
    /// Opens or creates a RocksDB `TransactionDB` at the specified path.
    ///
    /// Ensures that the "transactions" column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());
        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            vec![cf_transactions],
        )?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_TRANSACTIONS).ok_or_else(|| {
            CheckoutError::InternalError(Box::new(std::io::Error::other(
                "Transactions column family not found",
            )))
        })
    }
}

#[async_trait]
impl TransactionStore for RocksDbTransactionStore {
    async fn insert(&self, tx: Transaction) -> Result<()> {
        let cf = self.cf()?;
        let key = tx.public_id.as_bytes();

        let txn = self.db.transaction();
        if txn.get_for_update_cf(cf, key, true)?.is_some() {
            txn.rollback()?;
            return Err(CheckoutError::DuplicateTransaction(tx.public_id));
        }
        txn.put_cf(cf, key, serde_json::to_vec(&tx)?)?;
        txn.commit()?;
        Ok(())
    }

    async fn get(&self, public_id: &str) -> Result<Option<Transaction>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, public_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf()?;
        let mut transactions = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            transactions.push(serde_json::from_slice::<Transaction>(&value)?);
        }
        Ok(transactions)
    }

    async fn resolve_pending(
        &self,
        public_id: &str,
        resolution: Resolution,
    ) -> Result<ResolveOutcome> {
        let cf = self.cf()?;
        let key = public_id.as_bytes();

        let txn = self.db.transaction();
        let Some(bytes) = txn.get_for_update_cf(cf, key, true)? else {
            txn.rollback()?;
            return Ok(ResolveOutcome::Missing);
        };
        let mut tx: Transaction = serde_json::from_slice(&bytes)?;
        if tx.state.is_terminal() {
            txn.rollback()?;
            return Ok(ResolveOutcome::AlreadyResolved(tx));
        }

        tx.resolve(&resolution)?;
        txn.put_cf(cf, key, serde_json::to_vec(&tx)?)?;
        txn.commit()?;
        Ok(ResolveOutcome::Applied(tx))
    }
}
