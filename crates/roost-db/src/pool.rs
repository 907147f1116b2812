//! # Database Handle
//!
//! Opens the SQLite file behind the ledger and the tax registry.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RoostConfig.db_config() / DbConfig::in_memory()                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config)                                                  │
//! │       ├── file: WAL journal, created on first use                      │
//! │       ├── :memory: one pinned connection, never recycled               │
//! │       ├── foreign keys ON (reservations cascade with accommodations)   │
//! │       └── embedded migrations                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  accommodations() customers() reservations() local_taxes()             │
//! │  (repositories borrow a clone of the pool, nothing global)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every connection to `:memory:` sees its own private database, which is
//! why the in-memory pool never holds more than one.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::accommodation::AccommodationRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::local_tax::LocalTaxRepository;
use crate::repository::reservation::ReservationRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool behaves.
///
/// ## Example
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("roost.db").max_connections(2)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// A private, migrated in-memory database. Used by tests.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .create_if_missing(true)
        };
        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
            .foreign_keys(true))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        if self.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(self.max_connections.max(1))
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        migrations::apply(&pool).await?;

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn accommodations(&self) -> AccommodationRepository {
        AccommodationRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn reservations(&self) -> ReservationRepository {
        ReservationRepository::new(self.pool.clone())
    }

    /// Tax rules, e.g.
    /// `db.local_taxes().find_overlapping(TargetCategory::Adults, from, to)`.
    pub fn local_taxes(&self) -> LocalTaxRepository {
        LocalTaxRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        debug!("Closing database");
        self.pool.close().await;
    }
}
