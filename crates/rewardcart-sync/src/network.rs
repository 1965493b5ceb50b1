//! # Network Monitor
//!
//! Tracks whether the backend is reachable.
//!
//! ```text
//! ┌──────────────┐   set_status()   ┌──────────────────────┐   subscribe()
//! │ ProbeTask    │ ───────────────► │ watch<NetworkStatus> │ ─────────────► AutoSync
//! │ (health())   │                  └──────────────────────┘                CLI watch
//! └──────────────┘        ▲
//!                         │ set_status(Offline)
//!                  CartSyncController (connectivity error mid-drain)
//! ```
//!
//! Only a connectivity error marks the device offline. An HTTP error from
//! `/health` still proves the server is reachable.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::api::CartApi;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Network Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn is_online(self) -> bool {
        self == NetworkStatus::Online
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkStatus::Online => write!(f, "online"),
            NetworkStatus::Offline => write!(f, "offline"),
        }
    }
}

// =============================================================================
// Network Monitor
// =============================================================================

/// Shared connectivity flag. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    tx: Arc<watch::Sender<NetworkStatus>>,
}

impl NetworkMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        NetworkMonitor { tx: Arc::new(tx) }
    }

    pub fn status(&self) -> NetworkStatus {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.status().is_online()
    }

    /// Publishes a new status.
    ///
    /// ## Returns
    /// `true` if this was a transition.
    pub fn set_status(&self, status: NetworkStatus) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });

        if changed {
            info!(%status, "Network status changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.tx.subscribe()
    }
}

// =============================================================================
// Probe Task
// =============================================================================

/// Handle for the background reachability probe.
pub struct ProbeHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ProbeHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Shutdown channel closed".into()))
    }
}

/// Classifies one probe result.
fn probe_outcome(result: &SyncResult<()>) -> NetworkStatus {
    match result {
        Err(err) if err.is_connectivity() => NetworkStatus::Offline,
        _ => NetworkStatus::Online,
    }
}

impl NetworkMonitor {
    /// Runs one health check and publishes the result.
    pub async fn probe(&self, api: &dyn CartApi) -> NetworkStatus {
        let result = api.health().await;
        if let Err(ref e) = result {
            debug!(error = %e, "Health probe failed");
        }
        let status = probe_outcome(&result);
        self.set_status(status);
        status
    }

    /// Probes `api.health()` every `interval` and publishes the result.
    pub fn spawn_probe(&self, api: Arc<dyn CartApi>, interval: Duration) -> ProbeHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let monitor = self.clone();

        tokio::spawn(async move {
            info!(?interval, "Network probe starting");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        monitor.probe(api.as_ref()).await;
                    }

                    _ = shutdown_rx.recv() => {
                        info!("Network probe shutting down");
                        break;
                    }
                }
            }
        });

        ProbeHandle { shutdown_tx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCartApi;

    #[test]
    fn test_set_status_reports_transitions() {
        let monitor = NetworkMonitor::new(NetworkStatus::Offline);
        let mut rx = monitor.subscribe();

        assert!(!monitor.set_status(NetworkStatus::Offline));
        assert!(!rx.has_changed().unwrap());

        assert!(monitor.set_status(NetworkStatus::Online));
        assert!(rx.has_changed().unwrap());
        assert!(monitor.clone().is_online());
    }

    #[test]
    fn test_probe_outcome() {
        assert_eq!(probe_outcome(&Ok(())), NetworkStatus::Online);
        assert_eq!(
            probe_outcome(&Err(SyncError::Timeout("15s".into()))),
            NetworkStatus::Offline
        );
        assert_eq!(
            probe_outcome(&Err(SyncError::Http {
                status: 503,
                message: "down".into()
            })),
            NetworkStatus::Online
        );
    }

    #[tokio::test]
    async fn test_probe_publishes_reachability() {
        let monitor = NetworkMonitor::new(NetworkStatus::Offline);
        let api = MockCartApi::new();

        assert_eq!(monitor.probe(&api).await, NetworkStatus::Online);
        assert!(monitor.is_online());

        api.set_offline(true);
        assert_eq!(monitor.probe(&api).await, NetworkStatus::Offline);
        assert!(!monitor.is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_task_tracks_backend() {
        let monitor = NetworkMonitor::new(NetworkStatus::Offline);
        let api = Arc::new(MockCartApi::new());
        let mut rx = monitor.subscribe();

        let handle = monitor.spawn_probe(api.clone(), Duration::from_secs(30));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), NetworkStatus::Online);

        api.set_offline(true);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), NetworkStatus::Offline);

        handle.shutdown().await.unwrap();
    }
}
