//! # roost
//!
//! Command-line front end for bookings and city-tax declarations.
//!
//! ## Module Organization
//! ```text
//! apps/cli/src/
//! ├── main.rs              ◄─── You are here (parsing, startup)
//! └── commands/
//!     ├── mod.rs           ◄─── Command enum + dispatch
//!     ├── config.rs        (no database)
//!     ├── accommodation.rs
//!     ├── customer.rs
//!     ├── reservation.rs
//!     ├── tax.rs
//!     └── declaration.rs
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging (stderr, RUST_LOG or default filter)            │
//! │  2. Load RoostConfig (--config or platform config dir, then env)       │
//! │  3. Apply --db override; `config` commands stop here                    │
//! │  4. Open Database (WAL, migrations)                                     │
//! │  5. Build Services                                                      │
//! │  6. Run the subcommand                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roost_accounting::{RoostConfig, Services};
use roost_db::Database;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "roost", version, about = "Short-term rental bookings and city-tax declarations")]
struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the configuration
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = RoostConfig::load(cli.config.clone()).context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let command = match cli.command {
        Command::Config(cmd) => return cmd.run(&config, cli.config),
        Command::Ledger(cmd) => cmd,
    };

    if let Some(parent) = config.database.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("failed to open database {}", config.database.path.display()))?;
    info!(path = %config.database.path.display(), "Database ready");

    let services = Services::new(db.clone(), &config).await?;
    let result = command.run(&services, &config).await;

    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so `--json` output stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=roost=trace` - Show trace for roost crates only
/// - Default: `info,roost=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,roost=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
