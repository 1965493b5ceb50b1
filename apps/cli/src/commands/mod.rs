//! # CLI Commands
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── bill.rs     ◄─── Bill form validation (pure, no state)
//! ├── cart.rs     ◄─── Queue cart mutations, optional push
//! ├── queue.rs    ◄─── Inspect, sync, retry and clear the offline queue
//! ├── search.rs   ◄─── Debounced product search
//! ├── session.rs  ◄─── Session snapshot
//! └── watch.rs    ◄─── Probe + auto-sync until Ctrl-C
//! ```
//!
//! Each handler returns a serializable DTO or a [`CliError`](crate::error::CliError);
//! printing is done once in `lib.rs`.

pub mod bill;
pub mod cart;
pub mod queue;
pub mod search;
pub mod session;
pub mod watch;
