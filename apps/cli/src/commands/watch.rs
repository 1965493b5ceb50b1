//! # Watch Command
//!
//! Runs the background pieces until Ctrl-C, printing sync events as JSON
//! lines.
//!
//! ```text
//!   probe once ──► online? sync_cart()
//!        │
//!        ├─ spawn_probe(every probe_interval_secs)     (unless 0)
//!        ├─ AutoSync::spawn                           (unless auto_sync = false)
//!        │
//!   Ctrl-C ──► shutdown both, close the database
//! ```

use std::sync::Arc;
use tracing::info;

use rewardcart_sync::{AutoSync, CartApi};

use crate::error::{CliError, CliResult};
use crate::state::AppState;

pub async fn run(state: AppState) -> CliResult<()> {
    if state.probe().await.is_online() {
        state.controller.sync_cart().await;
    } else {
        state.controller.refresh().await;
    }

    let probe = state.config.probe_interval().map(|interval| {
        let api: Arc<dyn CartApi> = state.api.clone();
        state.network.spawn_probe(api, interval)
    });

    let agent = state
        .config
        .sync
        .auto_sync
        .then(|| AutoSync::spawn(state.controller.clone()));

    info!("Watching for connectivity changes, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::internal(format!("Failed to listen for Ctrl-C: {e}")))?;

    if let Some(probe) = probe {
        probe.shutdown().await?;
    }
    if let Some(agent) = agent {
        agent.shutdown().await?;
    }

    state.db.close().await;
    info!("Watch stopped");
    Ok(())
}
