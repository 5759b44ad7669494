use crate::models::{ClientIdentity, LedgerStats, VisitRecord};
use crate::storage::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Storage wrapper that bounds every ledger call with a deadline
pub struct TimeoutStorage {
    /// Underlying storage implementation
    inner: Arc<dyn Storage>,
    limit: Duration,
}

impl TimeoutStorage {
    pub fn new(inner: Arc<dyn Storage>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StorageResult<T>> + Send,
    ) -> StorageResult<T> {
        match time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    limit_ms = self.limit.as_millis() as u64,
                    "ledger call timed out"
                );
                Err(StorageError::Timeout(self.limit))
            }
        }
    }
}

#[async_trait]
impl Storage for TimeoutStorage {
    async fn ensure_schema(&self) -> StorageResult<()> {
        self.bounded("ensure_schema", self.inner.ensure_schema()).await
    }

    async fn get_count(&self) -> StorageResult<i64> {
        self.bounded("get_count", self.inner.get_count()).await
    }

    async fn find_recent_record(
        &self,
        identity: &ClientIdentity,
        window_start: i64,
    ) -> StorageResult<Option<VisitRecord>> {
        self.bounded(
            "find_recent_record",
            self.inner.find_recent_record(identity, window_start),
        )
        .await
    }

    async fn increment_and_record(
        &self,
        identity: &ClientIdentity,
        now: i64,
    ) -> StorageResult<i64> {
        self.bounded(
            "increment_and_record",
            self.inner.increment_and_record(identity, now),
        )
        .await
    }

    async fn get_record(&self, identity: &ClientIdentity) -> StorageResult<Option<VisitRecord>> {
        self.bounded("get_record", self.inner.get_record(identity)).await
    }

    async fn stats(&self) -> StorageResult<LedgerStats> {
        self.bounded("stats", self.inner.stats()).await
    }
}
