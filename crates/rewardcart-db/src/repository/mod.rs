//! # Repository Module
//!
//! Database repositories for RewardCart. Each repository owns the SQL for
//! one table and hands back core types.
//!
//! ```text
//! Caller ── db.offline_queue().enqueue(&op) ──► OfflineQueueRepository ──► SQLite
//! ```
//!
//! ## Available Repositories
//!
//! - [`offline_queue::OfflineQueueRepository`] - Offline cart mutation queue

pub mod offline_queue;
