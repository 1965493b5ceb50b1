//! # rewardcart-core: Pure Business Logic for RewardCart
//!
//! This crate holds every rule of the RewardCart client that can be expressed
//! as a pure function: bill form validation, money parsing, cart mutation
//! types and the session reducer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RewardCart Client                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/cli (rewardcart binary)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      rewardcart-sync (REST, offline sync, search, session)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               rewardcart-db (SQLite offline queue)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ rewardcart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   types   │  │ validation│  │  session  │  │   │
//! │  │   │   Money   │  │ BillForm  │  │  bill     │  │  reducer  │  │   │
//! │  │   │ Cashback  │  │ CartOp    │  │  cart     │  │  actions  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (bill form, cart operations, queue entries)
//! - [`money`] - Money type with integer arithmetic and decimal parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Field and form validation
//! - [`session`] - Session state and its reducer
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rewardcart_core::types::BillFormData;
//! use rewardcart_core::validation::validate_bill_form;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let form = BillFormData {
//!     amount: "1299.50".into(),
//!     date: "2024-06-14".into(),
//!     merchant: "Fresh Mart".into(),
//!     bill_number: "INV-2024-001".into(),
//!     notes: String::new(),
//! };
//!
//! let result = validate_bill_form(&form, today);
//! assert!(result.is_valid);
//! assert_eq!(result.values.amount.unwrap().cents(), 129950);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CashbackRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest bill amount accepted for cashback claims, in minor units (1.00).
pub const MIN_BILL_AMOUNT_CENTS: i64 = 100;

/// Largest bill amount accepted for cashback claims, in minor units (1,000,000.00).
pub const MAX_BILL_AMOUNT_CENTS: i64 = 100_000_000;

/// Bills older than this many days cannot be submitted.
pub const MAX_BILL_AGE_DAYS: i64 = 30;

/// Maximum quantity of a single item in cart.
pub const MAX_ITEM_QUANTITY: i64 = 999;
