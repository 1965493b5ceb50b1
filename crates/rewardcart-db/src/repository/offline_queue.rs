//! # Offline Queue Repository
//!
//! Durable FIFO of cart mutations waiting to reach the server.
//!
//! ## Queue Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Offline-First Cart                                   │
//! │                                                                         │
//! │  USER ACTION (add to cart, apply coupon, ...)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  enqueue(op)  ──► INSERT status='pending', seq = next                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            QUEUE PROCESSOR (rewardcart-sync)                    │   │
//! │  │                                                                 │   │
//! │  │  pending_after(seq, batch) ── oldest first                      │   │
//! │  │     a. server accepted      → mark_synced(id)                   │   │
//! │  │     b. server hiccup (5xx)  → record_failure(id, err, max)      │   │
//! │  │                               attempts+1, failed at the limit   │   │
//! │  │     c. server rejected (4xx)→ mark_failed(id, err)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  reset_failed() ── user taps "retry": failed → pending, attempts = 0   │
//! │  cleanup_synced(days) ── prune delivered history                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ordering is by `seq` (an autoincrement key), never by timestamp, so two
//! mutations enqueued in the same millisecond still replay in order.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use rewardcart_core::{CartOperation, QueueStatus, QueuedOperation};

const ENTITY: &str = "Queued operation";

/// Repository for the offline cart queue.
#[derive(Debug, Clone)]
pub struct OfflineQueueRepository {
    pool: SqlitePool,
}

impl OfflineQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OfflineQueueRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Appends an operation to the end of the queue.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let entry = repo.enqueue(&CartOperation::ApplyCoupon { code: "SAVE10".into() }).await?;
    /// assert_eq!(entry.status, QueueStatus::Pending);
    /// ```
    pub async fn enqueue(&self, op: &CartOperation) -> DbResult<QueuedOperation> {
        let id = Uuid::new_v4().to_string();
        let kind = op.kind();
        let payload = op.to_payload()?;
        let now = Utc::now();

        debug!(id = %id, kind = kind.as_str(), "Enqueuing cart operation");

        let seq = sqlx::query(
            r#"
            INSERT INTO offline_queue (id, kind, payload, status, attempts, created_at)
            VALUES (?1, ?2, ?3, 'pending', 0, ?4)
            "#,
        )
        .bind(&id)
        .bind(kind)
        .bind(&payload)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(QueuedOperation {
            seq,
            id,
            kind,
            payload,
            status: QueueStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            attempted_at: None,
            synced_at: None,
        })
    }

    /// Marks a pending entry as delivered.
    pub async fn mark_synced(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE offline_queue SET
                status = 'synced',
                synced_at = ?2,
                attempted_at = ?2,
                last_error = NULL
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(())
    }

    /// Records a retryable delivery failure.
    ///
    /// Increments `attempts`; the entry flips to `failed` once attempts
    /// reach `max_attempts`, otherwise it stays `pending`.
    ///
    /// ## Returns
    /// The entry's status after the update.
    pub async fn record_failure(
        &self,
        id: &str,
        error: &str,
        max_attempts: u32,
    ) -> DbResult<QueueStatus> {
        let now = Utc::now();

        // Right-hand sides see the pre-update row, hence `attempts + 1`.
        let status: Option<QueueStatus> = sqlx::query_scalar(
            r#"
            UPDATE offline_queue SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3,
                status = CASE WHEN attempts + 1 >= ?4 THEN 'failed' ELSE 'pending' END
            WHERE id = ?1 AND status = 'pending'
            RETURNING status
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .bind(i64::from(max_attempts))
        .fetch_optional(&self.pool)
        .await?;

        let status = status.ok_or_else(|| DbError::not_found(ENTITY, id))?;

        if status == QueueStatus::Failed {
            warn!(id = %id, error = %error, "Cart operation gave up after max attempts");
        }

        Ok(status)
    }

    /// Fails an entry immediately (the server rejected it outright).
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE offline_queue SET
                status = 'failed',
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        warn!(id = %id, error = %error, "Cart operation rejected");
        Ok(())
    }

    /// Puts every failed entry back in line with a fresh attempt budget.
    ///
    /// Entries keep their `seq`, so they replay in their original position.
    ///
    /// ## Returns
    /// Number of entries reset.
    pub async fn reset_failed(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE offline_queue SET
                status = 'pending',
                attempts = 0
            WHERE status = 'failed'
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!(count = result.rows_affected(), "Reset failed cart operations");
        Ok(result.rows_affected())
    }

    /// Deletes one entry regardless of status.
    ///
    /// ## Returns
    /// `true` if the entry existed.
    pub async fn remove(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM offline_queue WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empties the queue.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM offline_queue")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes entries synced more than `days_old` days ago.
    pub async fn cleanup_synced(&self, days_old: u32) -> DbResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days_old));

        let result = sqlx::query(
            r#"
            DELETE FROM offline_queue
            WHERE status = 'synced'
            AND synced_at < ?1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn get(&self, id: &str) -> DbResult<QueuedOperation> {
        sqlx::query_as::<_, QueuedOperation>(
            r#"
            SELECT seq, id, kind, payload, status, attempts, last_error,
                   created_at, attempted_at, synced_at
            FROM offline_queue
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    /// Next batch of pending entries with `seq > after_seq`, oldest first.
    ///
    /// Pass `0` to start from the head of the queue.
    pub async fn pending_after(&self, after_seq: i64, limit: u32) -> DbResult<Vec<QueuedOperation>> {
        let entries = sqlx::query_as::<_, QueuedOperation>(
            r#"
            SELECT seq, id, kind, payload, status, attempts, last_error,
                   created_at, attempted_at, synced_at
            FROM offline_queue
            WHERE status = 'pending' AND seq > ?1
            ORDER BY seq ASC
            LIMIT ?2
            "#,
        )
        .bind(after_seq)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Everything not yet delivered (pending and failed), in queue order.
    pub async fn list_unsynced(&self) -> DbResult<Vec<QueuedOperation>> {
        let entries = sqlx::query_as::<_, QueuedOperation>(
            r#"
            SELECT seq, id, kind, payload, status, attempts, last_error,
                   created_at, attempted_at, synced_at
            FROM offline_queue
            WHERE status IN ('pending', 'failed')
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn failed(&self) -> DbResult<Vec<QueuedOperation>> {
        let entries = sqlx::query_as::<_, QueuedOperation>(
            r#"
            SELECT seq, id, kind, payload, status, attempts, last_error,
                   created_at, attempted_at, synced_at
            FROM offline_queue
            WHERE status = 'failed'
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM offline_queue WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub async fn count_failed(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM offline_queue WHERE status = 'failed'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
