//! # Application State
//!
//! Everything a command may need, wired once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppState::init                                 │
//! │                                                                         │
//! │  1. ClientConfig::load(--config)     defaults → TOML → env             │
//! │  2. Database::new(config.database_path())   migrations applied         │
//! │  3. SessionStore  (+ SignedIn when --token / REWARDCART_TOKEN)         │
//! │  4. RestApi       (reads bearer token from the session store)          │
//! │  5. NetworkMonitor (Offline until a probe says otherwise)              │
//! │  6. CartSyncController (db + api + network + emitter)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `bill validate` is pure and never builds this.

mod emitter;

pub use emitter::JsonLinesEmitter;

use std::sync::Arc;
use tracing::info;

use rewardcart_core::session::{AuthSession, SessionAction};
use rewardcart_db::{Database, DbConfig};
use rewardcart_sync::{
    CartApi, CartSyncController, ClientConfig, NetworkMonitor, NetworkStatus, NoOpEmitter,
    RestApi, SessionStore, SyncEventEmitter,
};

use crate::error::CliResult;
use crate::GlobalArgs;

/// User id recorded for sessions started from a raw token.
const CLI_USER_ID: &str = "cli";

pub struct AppState {
    pub config: ClientConfig,
    pub db: Database,
    pub session: SessionStore,
    pub api: Arc<RestApi>,
    pub network: NetworkMonitor,
    pub controller: CartSyncController,
}

impl AppState {
    pub async fn init(global: &GlobalArgs) -> CliResult<Self> {
        Self::with_emitter(global, Arc::new(NoOpEmitter)).await
    }

    pub async fn with_emitter(
        global: &GlobalArgs,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> CliResult<Self> {
        let config = ClientConfig::load(global.config.clone())?;

        let db_path = config.database_path();
        info!(?db_path, "Database path determined");
        let db = Database::new(DbConfig::new(db_path)).await?;

        let session = SessionStore::default();
        if let Some(token) = global.token.as_deref().filter(|t| !t.trim().is_empty()) {
            session.dispatch(SessionAction::SignedIn {
                auth: AuthSession {
                    user_id: CLI_USER_ID.to_string(),
                    token: token.trim().to_string(),
                    expires_at: None,
                },
            })?;
        }

        let api = Arc::new(RestApi::new(&config, session.clone())?);
        let cart_api: Arc<dyn CartApi> = api.clone();
        let network = NetworkMonitor::new(NetworkStatus::Offline);
        let controller = CartSyncController::with_emitter(
            db.clone(),
            cart_api,
            network.clone(),
            &config.sync,
            emitter,
        );

        Ok(AppState {
            config,
            db,
            session,
            api,
            network,
            controller,
        })
    }

    /// Checks reachability once and updates the network monitor.
    pub async fn probe(&self) -> NetworkStatus {
        self.network.probe(self.api.as_ref()).await
    }
}
