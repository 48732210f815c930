//! Key-value store abstraction
//!
//! Shared state that outlives a single request lives here: cache entries
//! (`cache:*`) and sessions (`session:*`). Values are JSON text.

mod memory;
mod redb_store;

pub use memory::MemoryKv;
pub use redb_store::RedbKv;

use shared::AppError;
use thiserror::Error;

/// Key-value store errors
#[derive(Debug, Error)]
pub enum KvError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

pub type KvResult<T> = Result<T, KvError>;

impl From<KvError> for AppError {
    fn from(err: KvError) -> Self {
        AppError::storage(format!("State store error: {err}"))
    }
}

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> KvResult<Option<String>>;

    fn put(&self, key: &str, value: &str) -> KvResult<()>;

    /// Deleting a missing key is not an error
    fn delete(&self, key: &str) -> KvResult<()>;

    fn keys_with_prefix(&self, prefix: &str) -> KvResult<Vec<String>>;

    /// Delete every key under `prefix`, returning how many were removed
    fn delete_prefix(&self, prefix: &str) -> KvResult<usize> {
        let keys = self.keys_with_prefix(prefix)?;
        for key in &keys {
            self.delete(key)?;
        }
        Ok(keys.len())
    }
}
