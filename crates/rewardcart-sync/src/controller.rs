//! # Cart Sync Controller
//!
//! Front door of offline cart sync: queues mutations, drains the queue on
//! demand and keeps an observable [`CartSyncState`].
//!
//! ## Controller Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartSyncController                                 │
//! │                                                                         │
//! │   enqueue(op) ──► normalize ─► offline_queue.enqueue ──► refresh()     │
//! │                                                                         │
//! │   sync_cart()                                                           │
//! │     ├─ sync_lock.try_lock()   busy     → false                          │
//! │     ├─ network offline                 → false                          │
//! │     ├─ is_syncing = true                                                │
//! │     ├─ QueueProcessor::drain()                                          │
//! │     │    interrupted → network := Offline                               │
//! │     │    failed + deferred > 0 → "Failed to sync N operations"          │
//! │     ├─ clean → last_synced_at = now                                     │
//! │     └─ is_syncing = false, counts refreshed       → report.is_clean()   │
//! │                                                                         │
//! │   retry_failed_operations() ──► reset_failed ──► sync_cart()            │
//! │                                                                         │
//! │  EVENTS (SyncEventEmitter):                                            │
//! │  emit_status   - every state change                                    │
//! │  emit_progress - after each drain pass                                 │
//! │  emit_error    - { message, retryable }                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use rewardcart_core::{CartOperation, CartSyncState, QueuedOperation};
use rewardcart_db::Database;

use crate::api::CartApi;
use crate::config::SyncSettings;
use crate::error::SyncResult;
use crate::network::{NetworkMonitor, NetworkStatus};
use crate::processor::{DrainReport, QueueProcessor};

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives sync notifications (UI bridge, CLI printer, ...).
pub trait SyncEventEmitter: Send + Sync {
    fn emit_status(&self, state: &CartSyncState);

    fn emit_progress(&self, report: &DrainReport);

    fn emit_error(&self, message: &str, retryable: bool);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl SyncEventEmitter for NoOpEmitter {
    fn emit_status(&self, _state: &CartSyncState) {}
    fn emit_progress(&self, _report: &DrainReport) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
}

// =============================================================================
// Controller
// =============================================================================

/// Cloneable handle; clones share state, lock and queue.
#[derive(Clone)]
pub struct CartSyncController {
    db: Database,
    processor: Arc<QueueProcessor>,
    network: NetworkMonitor,
    state: Arc<RwLock<CartSyncState>>,
    sync_lock: Arc<Mutex<()>>,
    emitter: Arc<dyn SyncEventEmitter>,
}

impl CartSyncController {
    pub fn new(
        db: Database,
        api: Arc<dyn CartApi>,
        network: NetworkMonitor,
        settings: &SyncSettings,
    ) -> Self {
        Self::with_emitter(db, api, network, settings, Arc::new(NoOpEmitter))
    }

    pub fn with_emitter(
        db: Database,
        api: Arc<dyn CartApi>,
        network: NetworkMonitor,
        settings: &SyncSettings,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> Self {
        let processor = QueueProcessor::new(db.clone(), api, settings);
        let state = CartSyncState {
            is_online: network.is_online(),
            ..Default::default()
        };

        CartSyncController {
            db,
            processor: Arc::new(processor),
            network,
            state: Arc::new(RwLock::new(state)),
            sync_lock: Arc::new(Mutex::new(())),
            emitter,
        }
    }

    /// Current state snapshot.
    pub async fn state(&self) -> CartSyncState {
        self.state.read().await.clone()
    }

    pub fn network(&self) -> &NetworkMonitor {
        &self.network
    }

    /// Validates, normalizes and queues a cart mutation for later replay.
    #[instrument(skip(self, op), fields(op = %op.describe()))]
    pub async fn enqueue(&self, op: CartOperation) -> SyncResult<QueuedOperation> {
        let op = op.normalized()?;
        let queued = self.db.offline_queue().enqueue(&op).await?;
        self.refresh().await;
        Ok(queued)
    }

    /// Re-reads queue counts and connectivity into the state.
    pub async fn refresh(&self) -> CartSyncState {
        let counts = self.counts().await;
        let is_online = self.network.is_online();

        let snapshot = {
            let mut s = self.state.write().await;
            match counts {
                Ok((pending, failed)) => {
                    s.pending_operations = pending;
                    s.failed_operations = failed;
                }
                Err(e) => error!(error = %e, "Failed to read queue counts"),
            }
            s.is_online = is_online;
            s.clone()
        };

        self.emitter.emit_status(&snapshot);
        snapshot
    }

    async fn counts(&self) -> SyncResult<(i64, i64)> {
        let queue = self.db.offline_queue();
        Ok((queue.count_pending().await?, queue.count_failed().await?))
    }

    /// Drains the offline queue.
    ///
    /// ## Returns
    /// `true` only when every attempted operation was synced. `false` when
    /// offline, when another sync is running, or when anything failed.
    pub async fn sync_cart(&self) -> bool {
        let _guard = match self.sync_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Sync already in progress");
                return false;
            }
        };

        if !self.network.is_online() {
            debug!("Offline, skipping cart sync");
            self.refresh().await;
            return false;
        }

        {
            let mut s = self.state.write().await;
            s.is_syncing = true;
            s.sync_error = None;
            self.emitter.emit_status(&s);
        }

        info!("Cart sync starting");

        let (ok, sync_error) = match self.processor.drain().await {
            Ok(report) => {
                self.emitter.emit_progress(&report);
                self.outcome(&report)
            }
            Err(e) => {
                error!(error = %e, "Cart sync aborted");
                self.emitter.emit_error(&e.to_string(), e.is_retryable());
                (false, Some(e.to_string()))
            }
        };

        {
            let mut s = self.state.write().await;
            s.is_syncing = false;
            s.sync_error = sync_error;
            if ok {
                s.last_synced_at = Some(Utc::now());
            }
        }

        self.refresh().await;
        ok
    }

    /// Interprets a drain report. Returns `(success, sync_error)`.
    fn outcome(&self, report: &DrainReport) -> (bool, Option<String>) {
        if report.interrupted {
            warn!(
                error = report.last_error.as_deref().unwrap_or("unknown"),
                "Connectivity lost during cart sync"
            );
            self.network.set_status(NetworkStatus::Offline);
        }

        let problems = report.problems();
        if problems > 0 {
            let message = format!("Failed to sync {problems} operations");
            self.emitter.emit_error(&message, report.failed == 0);
            return (false, Some(message));
        }

        (report.is_clean(), None)
    }

    /// Puts failed operations back in line and syncs again.
    pub async fn retry_failed_operations(&self) -> bool {
        match self.db.offline_queue().reset_failed().await {
            Ok(count) => info!(count, "Retrying failed cart operations"),
            Err(e) => {
                error!(error = %e, "Failed to reset failed operations");
                let mut s = self.state.write().await;
                s.sync_error = Some(e.to_string());
                return false;
            }
        }

        self.sync_cart().await
    }
}
