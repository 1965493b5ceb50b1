//! # RewardCart CLI Library
//!
//! Argument parsing, logging setup and command dispatch for the `rewardcart`
//! binary.
//!
//! ## Module Organization
//! ```text
//! rewardcart_cli/
//! ├── lib.rs          ◄─── You are here (clap definitions & dispatch)
//! ├── error.rs        ◄─── CliError { code, message }
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState: config, db, session, api, controller
//! │   └── emitter.rs  ◄─── Sync events as JSON lines
//! └── commands/       ◄─── One module per top-level command
//! ```
//!
//! ## Output Contract
//! ```text
//! stdout ── command result as pretty JSON (watch: one JSON event per line)
//! stderr ── tracing logs, and the CliError JSON on failure
//! exit   ── 0 ok, 1 internal/db, 2 validation, 3 config, 4 network/server
//! ```

pub mod commands;
pub mod error;
pub mod state;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rewardcart_core::BillFormData;

use commands::cart::CartCommand;
use commands::queue::QueueCommand;
use error::{CliError, CliResult};
use state::{AppState, JsonLinesEmitter};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "rewardcart", version, about = "RewardCart client core")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bearer token for API calls
    #[arg(long, global = true, env = "REWARDCART_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bill upload form checks
    Bill {
        #[command(subcommand)]
        command: BillCommand,
    },

    /// Queue cart changes (offline-first)
    Cart {
        /// Push the queue to the server right away
        #[arg(long, global = true)]
        sync: bool,

        #[command(subcommand)]
        command: CartCommand,
    },

    /// Inspect and drain the offline queue
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },

    /// Search products
    Search { query: String },

    /// Print the current session
    Session,

    /// Probe connectivity and auto-sync until Ctrl-C
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum BillCommand {
    /// Validate a bill before upload
    Validate {
        /// Bill total, e.g. 1499.50
        #[arg(long)]
        amount: String,

        /// Bill date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        #[arg(long)]
        merchant: String,

        #[arg(long, default_value = "")]
        bill_number: String,

        #[arg(long, default_value = "")]
        notes: String,

        /// Cashback rate in basis points (500 = 5%) for an estimate
        #[arg(long)]
        cashback_bps: Option<u32>,
    },
}

// =============================================================================
// Entry Point
// =============================================================================

/// Parses arguments, runs the command and maps the outcome to an exit code.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match serde_json::to_string_pretty(&err) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{err}"),
            }
            ExitCode::from(err.code.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Bill {
            command:
                BillCommand::Validate {
                    amount,
                    date,
                    merchant,
                    bill_number,
                    notes,
                    cashback_bps,
                },
        } => {
            let form = BillFormData {
                amount,
                date,
                merchant,
                bill_number,
                notes,
            };
            let today = Local::now().date_naive();
            print_json(&commands::bill::validate(form, cashback_bps, today)?)
        }

        Command::Cart { sync, command } => {
            let state = AppState::init(&cli.global).await?;
            let result = commands::cart::run(&state, command, sync).await;
            state.db.close().await;
            print_json(&result?)
        }

        Command::Queue { command } => {
            let state = AppState::init(&cli.global).await?;
            let result = commands::queue::run(&state, command).await;
            state.db.close().await;
            print_json(&result?)
        }

        Command::Search { query } => {
            let state = AppState::init(&cli.global).await?;
            let result = commands::search::run(&state, &query).await;
            state.db.close().await;
            print_json(&result?)
        }

        Command::Session => {
            let state = AppState::init(&cli.global).await?;
            let result = commands::session::run(&state);
            state.db.close().await;
            print_json(&result?)
        }

        Command::Watch => {
            let state = AppState::with_emitter(&cli.global, Arc::new(JsonLinesEmitter)).await?;
            commands::watch::run(state).await
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::from)?;
    println!("{json}");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=rewardcart_sync=trace` - Trace the sync crate only
/// - Default: `info,rewardcart=debug,sqlx=warn`
///
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rewardcart=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "rewardcart starting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bill_validate() {
        let cli = Cli::try_parse_from([
            "rewardcart",
            "bill",
            "validate",
            "--amount",
            "1000",
            "--date",
            "2024-06-15",
            "--merchant",
            "Big Bazaar",
            "--cashback-bps",
            "500",
        ])
        .unwrap();

        match cli.command {
            Command::Bill {
                command:
                    BillCommand::Validate {
                        amount,
                        bill_number,
                        cashback_bps,
                        ..
                    },
            } => {
                assert_eq!(amount, "1000");
                assert_eq!(bill_number, "");
                assert_eq!(cashback_bps, Some(500));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_cart_with_sync_and_globals() {
        let cli = Cli::try_parse_from([
            "rewardcart",
            "cart",
            "add",
            "p-101",
            "--quantity",
            "2",
            "--sync",
            "--config",
            "/tmp/rc.toml",
        ])
        .unwrap();

        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/rc.toml")));
        match cli.command {
            Command::Cart { sync, command } => {
                assert!(sync);
                assert_eq!(
                    command,
                    CartCommand::Add {
                        product_id: "p-101".into(),
                        quantity: 2,
                        variant: None,
                    }
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_queue_remove() {
        let cli = Cli::try_parse_from(["rewardcart", "queue", "remove", "op-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Queue {
                command: QueueCommand::Remove { ref id }
            } if id == "op-1"
        ));
    }

    #[test]
    fn test_parse_queue_clear() {
        let cli =
            Cli::try_parse_from(["rewardcart", "queue", "clear", "--synced-older-than", "7"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Command::Queue {
                command: QueueCommand::Clear {
                    synced_older_than: Some(7)
                }
            }
        ));
    }
}
