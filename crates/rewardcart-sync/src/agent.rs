//! # Auto-Sync Agent
//!
//! Background task that replays the offline queue when connectivity returns.
//!
//! ```text
//!   NetworkMonitor ──watch──► AutoSync task
//!                               │
//!                               ├─ any change      → controller.refresh()
//!                               └─ Offline→Online  → controller.sync_cart()
//!
//!   AutoSyncHandle::shutdown() ──mpsc──► task exits
//! ```
//!
//! Staying online does not trigger repeated syncs; callers that want a sync
//! at startup call `sync_cart()` themselves.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::CartSyncController;
use crate::error::{SyncError, SyncResult};
use crate::network::NetworkStatus;

/// Handle for the running auto-sync task.
pub struct AutoSyncHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl AutoSyncHandle {
    /// Stops the task and waits for it to exit. A sync already in progress
    /// finishes first.
    pub async fn shutdown(self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Shutdown channel closed".into()))?;
        self.task
            .await
            .map_err(|e| SyncError::Internal(format!("Auto-sync task failed: {e}")))
    }
}

pub struct AutoSync;

impl AutoSync {
    /// Spawns the agent on the current runtime.
    pub fn spawn(controller: CartSyncController) -> AutoSyncHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        // Subscribe before spawning so no transition is missed
        let mut network_rx = controller.network().subscribe();
        let initial = *network_rx.borrow_and_update();
        let task = tokio::spawn(Self::run(controller, initial, network_rx, shutdown_rx));
        AutoSyncHandle { shutdown_tx, task }
    }

    async fn run(
        controller: CartSyncController,
        initial: NetworkStatus,
        mut network_rx: watch::Receiver<NetworkStatus>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        info!("Auto-sync agent starting");

        let mut last = initial;

        loop {
            tokio::select! {
                changed = network_rx.changed() => {
                    if changed.is_err() {
                        warn!("Network monitor dropped");
                        break;
                    }

                    let current = *network_rx.borrow_and_update();
                    let came_online =
                        last == NetworkStatus::Offline && current == NetworkStatus::Online;
                    last = current;

                    controller.refresh().await;

                    if came_online {
                        info!("Back online, syncing cart");
                        let synced = controller.sync_cart().await;
                        debug!(synced, "Auto-sync pass finished");
                    }
                }

                _ = shutdown_rx.recv() => {
                    info!("Auto-sync agent shutting down");
                    break;
                }
            }
        }

        info!("Auto-sync agent stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncSettings;
    use crate::network::NetworkMonitor;
    use crate::testing::MockCartApi;
    use rewardcart_core::CartOperation;
    use rewardcart_db::{Database, DbConfig};
    use std::sync::Arc;
    use std::time::Duration;

    async fn controller() -> (CartSyncController, Arc<MockCartApi>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let api = Arc::new(MockCartApi::new());
        let controller = CartSyncController::new(
            db,
            api.clone(),
            NetworkMonitor::new(NetworkStatus::Offline),
            &SyncSettings::default(),
        );
        controller
            .enqueue(CartOperation::ApplyCoupon {
                code: "SAVE10".into(),
            })
            .await
            .unwrap();
        (controller, api)
    }

    async fn wait_until_drained(controller: &CartSyncController) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while controller.state().await.pending_operations > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("queue was not drained");
    }

    #[tokio::test]
    async fn test_coming_online_triggers_sync() {
        let (controller, api) = controller().await;
        let handle = AutoSync::spawn(controller.clone());

        controller.network().set_status(NetworkStatus::Online);
        wait_until_drained(&controller).await;

        assert_eq!(api.applied().len(), 1);
        assert!(controller.state().await.is_online);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_sync_after_shutdown() {
        let (controller, api) = controller().await;
        let handle = AutoSync::spawn(controller.clone());
        handle.shutdown().await.unwrap();

        controller.network().set_status(NetworkStatus::Online);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(api.applied().is_empty());
        assert_eq!(controller.state().await.pending_operations, 1);
    }
}
