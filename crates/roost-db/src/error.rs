//! # Database Errors
//!
//! ```text
//! sqlx::Error / MigrateError
//!       │
//!       ▼
//! DbError          NotFound | Constraint{rule} | Connection/Migration/Query
//!       │
//!       ▼
//! AccountingError  NotFound stays NotFound, the rest becomes Persistence
//! ```
//!
//! Schema rules (positive amounts, ordered dates, existing parents) are
//! enforced twice: validation rejects bad input first, and the CHECK and
//! FOREIGN KEY constraints surface here as [`DbError::Constraint`] if
//! anything slips past.

use std::fmt;
use thiserror::Error;

/// Which kind of schema rule a write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Unique,
    ForeignKey,
    Check,
    NotNull,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Constraint::Unique => "UNIQUE",
            Constraint::ForeignKey => "FOREIGN KEY",
            Constraint::Check => "CHECK",
            Constraint::NotNull => "NOT NULL",
        })
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    /// An update or lookup targeted a row that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A write broke a schema constraint, e.g. a reservation for a deleted
    /// accommodation or a tax rule ending before it starts.
    #[error("{rule} constraint failed: {message}")]
    Constraint { rule: Constraint, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored row could not be mapped back to a domain type.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: String, reason: String },
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn corrupt_row(table: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::CorruptRow {
            table: table.into(),
            reason: reason.into(),
        }
    }

    pub fn is_constraint(&self, rule: Constraint) -> bool {
        matches!(self, DbError::Constraint { rule: r, .. } if *r == rule)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => {
                let rule = match db_err.kind() {
                    ErrorKind::UniqueViolation => Some(Constraint::Unique),
                    ErrorKind::ForeignKeyViolation => Some(Constraint::ForeignKey),
                    ErrorKind::CheckViolation => Some(Constraint::Check),
                    ErrorKind::NotNullViolation => Some(Constraint::NotNull),
                    _ => None,
                };
                let message = db_err.message().to_string();
                match rule {
                    Some(rule) => DbError::Constraint { rule, message },
                    None => DbError::QueryFailed(message),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::corrupt_row("unknown", format!("column {index}: {source}"))
            }
            other => DbError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
