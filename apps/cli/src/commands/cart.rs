//! # Cart Commands
//!
//! Offline-first: every mutation is queued locally, then optionally pushed.
//!
//! ```text
//! rewardcart cart add p-101 --quantity 2 [--variant v-red]
//!            cart update p-101 3
//!            cart remove p-101
//!            cart coupon save10          (normalized to SAVE10)
//!            cart uncoupon
//!            cart clear
//!            cart ... --sync             probe, then drain the queue
//! ```

use clap::Subcommand;
use serde::Serialize;
use tracing::debug;

use rewardcart_core::validation::validate_coupon_code;
use rewardcart_core::{CartOperation, CartSyncState, QueuedOperation};

use crate::error::CliResult;
use crate::state::AppState;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Add a product to the cart
    Add {
        product_id: String,

        #[arg(long, short, default_value_t = 1)]
        quantity: i64,

        #[arg(long)]
        variant: Option<String>,
    },

    /// Set the quantity of a cart line
    Update { product_id: String, quantity: i64 },

    /// Remove a product from the cart
    Remove { product_id: String },

    /// Apply a coupon code
    Coupon { code: String },

    /// Remove the applied coupon
    Uncoupon,

    /// Empty the cart
    Clear,
}

impl CartCommand {
    /// Builds the queued operation. Coupon codes are normalized here.
    pub fn into_operation(self) -> CliResult<CartOperation> {
        Ok(match self {
            CartCommand::Add {
                product_id,
                quantity,
                variant,
            } => CartOperation::AddItem {
                product_id,
                quantity,
                variant_id: variant,
            },
            CartCommand::Update {
                product_id,
                quantity,
            } => CartOperation::UpdateQuantity {
                product_id,
                quantity,
            },
            CartCommand::Remove { product_id } => CartOperation::RemoveItem { product_id },
            CartCommand::Coupon { code } => CartOperation::ApplyCoupon {
                code: validate_coupon_code(&code)?,
            },
            CartCommand::Uncoupon => CartOperation::RemoveCoupon,
            CartCommand::Clear => CartOperation::ClearCart,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub queued: QueuedOperation,
    pub description: String,

    /// Outcome of `--sync`, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced: Option<bool>,

    pub state: CartSyncState,
    pub status: String,
}

pub async fn run(state: &AppState, command: CartCommand, sync: bool) -> CliResult<CartResponse> {
    let op = command.into_operation()?;
    let description = op.describe();
    debug!(op = %description, "cart command");

    let queued = state.controller.enqueue(op).await?;

    let synced = if sync {
        state.probe().await;
        Some(state.controller.sync_cart().await)
    } else {
        None
    };

    let sync_state = state.controller.refresh().await;
    Ok(CartResponse {
        queued,
        description,
        synced,
        status: sync_state.status_message(),
        state: sync_state,
    })
}
