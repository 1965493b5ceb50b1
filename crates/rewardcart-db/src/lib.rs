//! # rewardcart-db: Database Layer for RewardCart
//!
//! Local SQLite storage for the RewardCart client. Today that is the offline
//! cart queue: every cart mutation is written here first and replayed against
//! the server by `rewardcart-sync`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RewardCart Data Flow                              │
//! │                                                                         │
//! │  CLI / CartSyncController                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  rewardcart-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OfflineQueue  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Repository    │    │ 001_offline_ │  │   │
//! │  │   │               │    │               │    │  queue.sql   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir)/rewardcart.db                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rewardcart_core::CartOperation;
//! use rewardcart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rewardcart.db")).await?;
//!
//! db.offline_queue().enqueue(&CartOperation::ClearCart).await?;
//! let pending = db.offline_queue().count_pending().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::offline_queue::OfflineQueueRepository;
