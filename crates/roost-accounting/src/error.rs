//! # Accounting Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Accounting Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Input       │  │     Store       │  │       Output            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  NotFound       │  │  Report (keeps the      │ │
//! │  │  Unavailable    │  │  Persistence    │  │  computed declaration)  │ │
//! │  │  Config         │  │  Calculation    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Validation and Unavailable are raised before any store mutation.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reconciliation warnings are not errors; they travel inside
//! [`DeclarationOutcome`].

use chrono::NaiveDate;
use thiserror::Error;

use roost_core::tax::DeclarationOutcome;
use roost_core::{CoreError, ValidationError};
use roost_db::DbError;

/// Result type alias for service operations.
pub type AccountingResult<T> = Result<T, AccountingError>;

#[derive(Debug, Error)]
pub enum AccountingError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The accommodation already hosts a stay overlapping the request.
    #[error("Accommodation {accommodation_id} is not available from {start} to {end}")]
    Unavailable {
        accommodation_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Persistence error: {0}")]
    Persistence(#[source] DbError),

    /// Stored rules or stays the tax math cannot evaluate.
    #[error("City tax could not be computed: {0}")]
    Calculation(#[source] CoreError),

    // =========================================================================
    // Output Errors
    // =========================================================================
    /// Writing the declaration failed after it was computed.
    ///
    /// The computed declaration is carried along so the caller can still
    /// show or retry it.
    #[error("Failed to write declaration report: {source}")]
    Report {
        #[source]
        source: ReportError,
        declaration: Box<DeclarationOutcome>,
    },
}

impl AccountingError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        AccountingError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Missing rows keep their meaning; every other store failure is a
/// persistence error.
impl From<DbError> for AccountingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AccountingError::NotFound { entity, id },
            other => AccountingError::Persistence(other),
        }
    }
}

impl From<CoreError> for AccountingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => AccountingError::Validation(v),
            CoreError::InvalidGuestBreakdown { reservation_id } => {
                AccountingError::Validation(ValidationError::invalid_format(
                    "guests",
                    format!("reservation {reservation_id} has more children and infants than guests"),
                ))
            }
            overflow @ CoreError::TaxOverflow { .. } => AccountingError::Calculation(overflow),
        }
    }
}

// =============================================================================
// Report Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No config path available")]
    NoPath,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_stays_not_found() {
        let err: AccountingError = DbError::not_found("Reservation", 42).into();
        assert!(matches!(
            err,
            AccountingError::NotFound { ref entity, ref id } if entity == "Reservation" && id == "42"
        ));

        let err: AccountingError = DbError::PoolExhausted.into();
        assert!(matches!(err, AccountingError::Persistence(DbError::PoolExhausted)));
    }

    #[test]
    fn test_core_errors_become_validation() {
        let err: AccountingError = CoreError::InvalidGuestBreakdown { reservation_id: 3 }.into();
        assert!(matches!(err, AccountingError::Validation(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn test_tax_overflow_is_a_calculation_error() {
        let err: AccountingError = CoreError::TaxOverflow { reservation_id: 5 }.into();
        assert!(matches!(
            err,
            AccountingError::Calculation(CoreError::TaxOverflow { reservation_id: 5 })
        ));
        assert_eq!(
            err.to_string(),
            "City tax could not be computed: city tax of reservation 5 overflows"
        );
    }
}
