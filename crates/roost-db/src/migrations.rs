//! # Schema Migrations
//!
//! SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied in version order every time a [`Database`](crate::Database)
//! opens. sqlx records applied versions in `_sqlx_migrations`, so reopening
//! an up-to-date file is a no-op.
//!
//! New schema changes go in a new `NNN_description.sql` file. Applied files
//! are never edited: sqlx checksums them and refuses to start on a change.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

pub(crate) async fn apply(pool: &SqlitePool) -> DbResult<()> {
    debug!(known = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;
    info!(applied, "Schema up to date");
    Ok(())
}
