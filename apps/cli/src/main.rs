//! # RewardCart CLI Entry Point
//!
//! Setup lives in `lib.rs` for testability.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    rewardcart_cli::run().await
}
