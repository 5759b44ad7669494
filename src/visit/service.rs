use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use tracing::debug;

use super::device::is_mobile;
use crate::models::{ClientIdentity, VisitOutcome};
use crate::storage::{Storage, StorageError, StorageResult};

/// Counts unique visits per identity per dedupe window.
///
/// Holds no per-request state: every call re-reads the ledger, so any number
/// of instances can share one backing store.
#[derive(Clone)]
pub struct VisitService {
    storage: Arc<dyn Storage>,
    window_secs: i64,
}

impl VisitService {
    pub fn new(storage: Arc<dyn Storage>, dedupe_window_secs: u64) -> Self {
        Self {
            storage,
            window_secs: i64::try_from(dedupe_window_secs).unwrap_or(i64::MAX),
        }
    }

    /// Count-and-classify one page load using the system clock
    pub async fn handle_visit(&self, identity: &ClientIdentity) -> StorageResult<VisitOutcome> {
        self.handle_visit_at(identity, unix_now()?).await
    }

    /// Count-and-classify one page load observed at `now` (epoch seconds).
    ///
    /// The check and the increment are separate store round trips, so two
    /// simultaneous first visits from one identity may both be admitted.
    pub async fn handle_visit_at(
        &self,
        identity: &ClientIdentity,
        now: i64,
    ) -> StorageResult<VisitOutcome> {
        let is_mobile = is_mobile(&identity.user_agent);
        let window_start = now.saturating_sub(self.window_secs);

        self.storage.ensure_schema().await?;

        let recent = self
            .storage
            .find_recent_record(identity, window_start)
            .await?;

        let (count, admitted) = match recent {
            Some(record) => {
                debug!(
                    ip = %identity.ip,
                    last_visit_at = record.last_visit_at,
                    "repeat visit inside dedupe window"
                );
                (self.storage.get_count().await?, false)
            }
            None => {
                let count = self.storage.increment_and_record(identity, now).await?;
                debug!(ip = %identity.ip, count, "visit admitted");
                (count, true)
            }
        };

        Ok(VisitOutcome {
            count,
            is_mobile,
            admitted,
        })
    }
}

fn unix_now() -> StorageResult<i64> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")
        .map_err(StorageError::Other)?
        .as_secs();
    Ok(secs as i64)
}
