//! # rewardcart-sync: Network & Sync Layer for RewardCart
//!
//! Everything that talks to the backend or runs in the background: the REST
//! client, offline cart sync, the session store and debounced search.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Offline-First Cart Sync                          │
//! │                                                                         │
//! │  cart add/update/remove ──► CartSyncController::enqueue                 │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                          offline_queue (SQLite)                         │
//! │                                   │                                     │
//! │  NetworkMonitor ──Offline→Online──► AutoSync ──► sync_cart()            │
//! │   ▲                                                │                    │
//! │   │ probe /health                                  ▼                    │
//! │   │                                       QueueProcessor::drain         │
//! │   │                                                │ FIFO by seq        │
//! │   └──────────── connectivity error ◄───────────────┤                    │
//! │                                                    ▼                    │
//! │                                          RestApi (reqwest)              │
//! │                                          Bearer ◄── SessionStore        │
//! │                                                                         │
//! │  DebouncedSearch ──(300ms quiet)──► RestApi::search                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - Auto-sync on reconnect
//! - [`api`] - `CartApi`/`SearchApi` traits and the reqwest client
//! - [`config`] - TOML + env configuration
//! - [`controller`] - `CartSyncController` and its observable state
//! - [`error`] - Sync error types
//! - [`network`] - Connectivity monitor and health probe
//! - [`processor`] - Offline queue drain pass
//! - [`search`] - Debounced, cancellable product search
//! - [`session`] - Session store with immutable snapshots

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod network;
pub mod processor;
pub mod search;
pub mod session;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{AutoSync, AutoSyncHandle};
pub use api::{CartApi, RestApi, SearchApi};
pub use config::ClientConfig;
pub use controller::{CartSyncController, NoOpEmitter, SyncEventEmitter};
pub use error::{SyncError, SyncResult};
pub use network::{NetworkMonitor, NetworkStatus, ProbeHandle};
pub use processor::{DrainReport, QueueProcessor};
pub use search::{DebouncedSearch, SearchState};
pub use session::SessionStore;
