use crate::models::{ClientIdentity, LedgerStats, VisitRecord};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The visit ledger: a running total plus the last counted visit per identity
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the counter and record tables if they do not exist yet
    async fn ensure_schema(&self) -> StorageResult<()>;

    /// Current total, or 0 before the first admitted visit
    async fn get_count(&self) -> StorageResult<i64>;

    /// Record for `identity` whose last visit is strictly after `window_start`
    async fn find_recent_record(
        &self,
        identity: &ClientIdentity,
        window_start: i64,
    ) -> StorageResult<Option<VisitRecord>>;

    /// Bump the counter and upsert the identity's record in one transaction.
    /// Returns the new count.
    async fn increment_and_record(&self, identity: &ClientIdentity, now: i64)
        -> StorageResult<i64>;

    /// Record for `identity` regardless of age
    async fn get_record(&self, identity: &ClientIdentity) -> StorageResult<Option<VisitRecord>>;

    async fn stats(&self) -> StorageResult<LedgerStats>;
}
