//! # Offline Queue Commands
//!
//! ```text
//! rewardcart queue list            unsynced entries, FIFO order
//!            queue status          counts, label, message, migrations
//!            queue sync            probe, then drain
//!            queue retry           failed → pending, then drain
//!            queue remove <ID>     drop one entry
//!            queue clear [--synced-older-than DAYS]
//! ```

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;

use rewardcart_core::{
    CartOperationKind, CartSyncState, QueueStatus, QueuedOperation, SyncStatusLabel,
};

use rewardcart_db::DbError;

use crate::error::CliResult;
use crate::state::AppState;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum QueueCommand {
    /// List pending and failed operations
    List,

    /// Show sync status
    Status,

    /// Push pending operations to the server
    Sync,

    /// Retry failed operations
    Retry,

    /// Drop a single queue entry by id
    Remove { id: String },

    /// Delete queue entries (all of them unless --synced-older-than is given)
    Clear {
        /// Only delete synced entries older than this many days
        #[arg(long)]
        synced_older_than: Option<u32>,
    },
}

// =============================================================================
// Response DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryDto {
    pub seq: i64,
    pub id: String,
    pub kind: CartOperationKind,
    pub status: QueueStatus,
    pub attempts: i64,
    pub description: String,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<QueuedOperation> for QueueEntryDto {
    fn from(entry: QueuedOperation) -> Self {
        let description = entry
            .operation()
            .map(|op| op.describe())
            .unwrap_or_else(|e| format!("<undecodable: {e}>"));

        QueueEntryDto {
            seq: entry.seq,
            id: entry.id,
            kind: entry.kind,
            status: entry.status,
            attempts: entry.attempts,
            description,
            last_error: entry.last_error,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub state: CartSyncState,
    pub label: SyncStatusLabel,
    pub message: String,
}

impl From<CartSyncState> for StatusResponse {
    fn from(state: CartSyncState) -> Self {
        StatusResponse {
            label: state.status_label(),
            message: state.status_message(),
            state,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStatus {
    #[serde(flatten)]
    pub status: StatusResponse,
    pub api_base_url: String,
    pub database_path: String,
    pub migrations_total: usize,
    pub migrations_applied: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub synced: bool,
    #[serde(flatten)]
    pub status: StatusResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub removed: u64,
}

/// Output of any queue subcommand.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueueResponse {
    List(Vec<QueueEntryDto>),
    Status(DetailedStatus),
    Sync(SyncResponse),
    Clear(ClearResponse),
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn run(state: &AppState, command: QueueCommand) -> CliResult<QueueResponse> {
    match command {
        QueueCommand::List => list(state).await.map(QueueResponse::List),
        QueueCommand::Status => status(state).await.map(QueueResponse::Status),
        QueueCommand::Sync => {
            state.probe().await;
            let synced = state.controller.sync_cart().await;
            Ok(QueueResponse::Sync(sync_response(state, synced).await))
        }
        QueueCommand::Retry => {
            state.probe().await;
            let synced = state.controller.retry_failed_operations().await;
            Ok(QueueResponse::Sync(sync_response(state, synced).await))
        }
        QueueCommand::Remove { id } => {
            if !state.db.offline_queue().remove(&id).await? {
                return Err(DbError::not_found("Queued operation", id).into());
            }
            state.controller.refresh().await;
            Ok(QueueResponse::Clear(ClearResponse { removed: 1 }))
        }
        QueueCommand::Clear { synced_older_than } => {
            let queue = state.db.offline_queue();
            let removed = match synced_older_than {
                Some(days) => queue.cleanup_synced(days).await?,
                None => queue.clear().await?,
            };
            state.controller.refresh().await;
            Ok(QueueResponse::Clear(ClearResponse { removed }))
        }
    }
}

async fn list(state: &AppState) -> CliResult<Vec<QueueEntryDto>> {
    let entries = state.db.offline_queue().list_unsynced().await?;
    Ok(entries.into_iter().map(QueueEntryDto::from).collect())
}

async fn status(state: &AppState) -> CliResult<DetailedStatus> {
    let sync_state = state.controller.refresh().await;
    let (migrations_total, migrations_applied) = state.db.migration_status().await?;

    Ok(DetailedStatus {
        status: sync_state.into(),
        api_base_url: state.config.api.base_url.clone(),
        database_path: state.config.database_path().display().to_string(),
        migrations_total,
        migrations_applied,
    })
}

async fn sync_response(state: &AppState, synced: bool) -> SyncResponse {
    SyncResponse {
        synced,
        status: state.controller.state().await.into(),
    }
}
