//! # Queue Processor
//!
//! Replays the offline queue against the server, one drain pass at a time.
//!
//! ## Drain Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cursor = 0                                                             │
//! │  loop:                                                                  │
//! │    batch = pending_after(cursor, batch_size)   ORDER BY seq             │
//! │    for entry in batch:                                                  │
//! │      cursor = entry.seq                                                 │
//! │                                                                         │
//! │      decode / validate fails  ──► mark_failed        (failed)          │
//! │      api.apply(op):                                                     │
//! │        Ok                     ──► mark_synced        (synced)          │
//! │        connectivity error     ──► STOP, stays pending (interrupted)    │
//! │        5xx / 408 / 429        ──► record_failure     (deferred|failed) │
//! │        other 4xx              ──► mark_failed        (failed)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cursor moves past entries that stay pending, so a single pass never
//! retries the same entry twice.

use std::sync::Arc;
use tracing::{debug, info, warn};

use rewardcart_core::{QueueStatus, QueuedOperation};
use rewardcart_db::Database;

use crate::api::CartApi;
use crate::config::SyncSettings;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Drain Report
// =============================================================================

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub synced: u32,

    /// Entries that ended up in the `failed` state during this pass.
    pub failed: u32,

    /// Entries that hit a retryable error and stay pending.
    pub deferred: u32,

    /// The pass stopped early on a connectivity error.
    pub interrupted: bool,

    pub last_error: Option<String>,
}

impl DrainReport {
    /// Everything that was attempted went through.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.deferred == 0 && !self.interrupted
    }

    /// Operations that did not go through and were not interrupted.
    pub fn problems(&self) -> u32 {
        self.failed + self.deferred
    }
}

enum EntryOutcome {
    Synced,
    Failed,
    Deferred,
    Interrupted,
}

// =============================================================================
// Queue Processor
// =============================================================================

pub struct QueueProcessor {
    db: Database,
    api: Arc<dyn CartApi>,
    batch_size: u32,
    max_attempts: u32,
}

impl QueueProcessor {
    pub fn new(db: Database, api: Arc<dyn CartApi>, settings: &SyncSettings) -> Self {
        QueueProcessor {
            db,
            api,
            batch_size: settings.batch_size.max(1),
            max_attempts: settings.max_attempts.max(1),
        }
    }

    /// Runs one pass over every pending entry.
    ///
    /// Errors are only returned for database failures; delivery problems
    /// are counted in the report.
    pub async fn drain(&self) -> SyncResult<DrainReport> {
        let queue = self.db.offline_queue();
        let mut report = DrainReport::default();
        let mut cursor = 0;

        'pass: loop {
            let batch = queue.pending_after(cursor, self.batch_size).await?;
            if batch.is_empty() {
                break;
            }
            debug!(count = batch.len(), after = cursor, "Draining batch");

            for entry in batch {
                cursor = entry.seq;

                match self.deliver(&entry, &mut report).await? {
                    EntryOutcome::Synced => report.synced += 1,
                    EntryOutcome::Failed => report.failed += 1,
                    EntryOutcome::Deferred => report.deferred += 1,
                    EntryOutcome::Interrupted => {
                        report.interrupted = true;
                        break 'pass;
                    }
                }
            }
        }

        info!(
            synced = report.synced,
            failed = report.failed,
            deferred = report.deferred,
            interrupted = report.interrupted,
            "Drain pass finished"
        );
        Ok(report)
    }

    async fn deliver(
        &self,
        entry: &QueuedOperation,
        report: &mut DrainReport,
    ) -> SyncResult<EntryOutcome> {
        let queue = self.db.offline_queue();

        let op = match entry
            .operation()
            .map_err(SyncError::from)
            .and_then(|op| op.normalized().map_err(SyncError::from))
        {
            Ok(op) => op,
            Err(e) => {
                warn!(id = %entry.id, error = %e, "Dropping undeliverable queue entry");
                let message = e.to_string();
                queue.mark_failed(&entry.id, &message).await?;
                report.last_error = Some(message);
                return Ok(EntryOutcome::Failed);
            }
        };

        match self.api.apply(&op).await {
            Ok(()) => {
                queue.mark_synced(&entry.id).await?;
                debug!(id = %entry.id, op = %op.describe(), "Queue entry synced");
                Ok(EntryOutcome::Synced)
            }
            Err(e) if e.is_connectivity() => {
                warn!(id = %entry.id, error = %e, "Lost connectivity, stopping drain");
                report.last_error = Some(e.to_string());
                Ok(EntryOutcome::Interrupted)
            }
            Err(e) if e.is_retryable() => {
                let message = e.to_string();
                let status = queue
                    .record_failure(&entry.id, &message, self.max_attempts)
                    .await?;
                report.last_error = Some(message);
                Ok(match status {
                    QueueStatus::Failed => EntryOutcome::Failed,
                    _ => EntryOutcome::Deferred,
                })
            }
            Err(e) => {
                let message = e.to_string();
                queue.mark_failed(&entry.id, &message).await?;
                report.last_error = Some(message);
                Ok(EntryOutcome::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCartApi;
    use rewardcart_core::CartOperation;
    use rewardcart_db::DbConfig;

    async fn setup(max_attempts: u32) -> (Database, Arc<MockCartApi>, QueueProcessor) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = Arc::new(MockCartApi::new());
        let settings = SyncSettings {
            max_attempts,
            batch_size: 2,
            ..Default::default()
        };
        let processor = QueueProcessor::new(db.clone(), api.clone(), &settings);
        (db, api, processor)
    }

    fn add(product: &str) -> CartOperation {
        CartOperation::AddItem {
            product_id: product.into(),
            quantity: 1,
            variant_id: None,
        }
    }

    fn http(status: u16) -> SyncError {
        SyncError::Http {
            status,
            message: "nope".into(),
        }
    }

    #[tokio::test]
    async fn test_drain_replays_in_fifo_order() {
        let (db, api, processor) = setup(3).await;
        for p in ["p1", "p2", "p3", "p4", "p5"] {
            db.offline_queue().enqueue(&add(p)).await.unwrap();
        }

        let report = processor.drain().await.unwrap();

        assert_eq!(report.synced, 5);
        assert!(report.is_clean());
        assert_eq!(
            api.applied(),
            vec![add("p1"), add("p2"), add("p3"), add("p4"), add("p5")]
        );
        assert_eq!(db.offline_queue().count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_operation_fails_immediately() {
        let (db, api, processor) = setup(3).await;
        db.offline_queue().enqueue(&add("p1")).await.unwrap();
        db.offline_queue().enqueue(&add("p2")).await.unwrap();
        api.push(Err(http(409)));

        let report = processor.drain().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.synced, 1);
        assert_eq!(report.problems(), 1);
        assert_eq!(db.offline_queue().count_failed().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_server_errors_defer_until_attempt_limit() {
        let (db, api, processor) = setup(2).await;
        let queued = db.offline_queue().enqueue(&add("p1")).await.unwrap();

        api.push(Err(http(503)));
        let first = processor.drain().await.unwrap();
        assert_eq!(first.deferred, 1);
        assert_eq!(db.offline_queue().count_pending().await.unwrap(), 1);

        api.push(Err(http(503)));
        let second = processor.drain().await.unwrap();
        assert_eq!(second.failed, 1);

        let entry = db.offline_queue().get(&queued.id).await.unwrap();
        assert_eq!(entry.status, QueueStatus::Failed);
        assert_eq!(entry.attempts, 2);
    }

    #[tokio::test]
    async fn test_connectivity_error_stops_pass() {
        let (db, api, processor) = setup(3).await;
        for p in ["p1", "p2", "p3"] {
            db.offline_queue().enqueue(&add(p)).await.unwrap();
        }
        api.push(Ok(()));
        api.push(Err(SyncError::Timeout("15s".into())));

        let report = processor.drain().await.unwrap();

        assert!(report.interrupted);
        assert_eq!(report.synced, 1);
        assert_eq!(api.applied().len(), 2);

        // Nothing lost, attempts untouched
        let pending = db.offline_queue().list_unsynced().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|e| e.attempts == 0));
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_failed_without_request() {
        let (db, api, processor) = setup(3).await;
        let queued = db.offline_queue().enqueue(&add("p1")).await.unwrap();
        sqlx::query("UPDATE offline_queue SET payload = '{not json' WHERE id = ?1")
            .bind(&queued.id)
            .execute(db.pool())
            .await
            .unwrap();

        let report = processor.drain().await.unwrap();

        assert_eq!(report.failed, 1);
        assert!(api.applied().is_empty());
    }
}
