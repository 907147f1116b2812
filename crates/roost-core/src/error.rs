//! # Error Types
//!
//! ```text
//! ValidationError   bad input, raised before anything is written
//!       │
//!       ▼
//! CoreError         + stored data the tax math cannot use
//!       │
//!       ▼
//! AccountingError   (roost-accounting) alongside DbError
//! ```
//!
//! Reconciliation warnings are not errors; see [`crate::warnings`].

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored reservation has more children and infants than guests, so
    /// its adult count would be negative.
    #[error("reservation {reservation_id} has more children and infants than guests")]
    InvalidGuestBreakdown { reservation_id: i64 },

    /// Rate × nights × guests does not fit in an `i64` of cents. Only reachable
    /// through rules written around validation.
    #[error("city tax of reservation {reservation_id} overflows")]
    TaxOverflow { reservation_id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input for a tax rule, reservation, accommodation or customer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    /// E.g. more guests than the accommodation sleeps.
    #[error("{field} must be within {min}..={max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Unparsable amount, date or identifier.
    #[error("invalid {field}: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of {}", .allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Tax rule with `valid_from > valid_to`, or a stay whose departure is
    /// not after its arrival.
    #[error("{field}: {start} must be before {end}")]
    InvalidDateRange {
        field: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("description");
        assert_eq!(err.to_string(), "description is required");

        let err = ValidationError::MustNotBeNegative {
            field: "days_threshold".to_string(),
        };
        assert_eq!(err.to_string(), "days_threshold must not be negative");
    }

    #[test]
    fn test_date_range_message() {
        let err = ValidationError::InvalidDateRange {
            field: "validity".to_string(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        };
        assert_eq!(err.to_string(), "validity: 2020-01-01 must be before 2019-01-01");
    }

    #[test]
    fn test_not_allowed_lists_choices() {
        let err: ValidationError = "teens".parse::<crate::TargetCategory>().unwrap_err();
        assert_eq!(err.to_string(), "target must be one of adults, children, infants");
    }

    #[test]
    fn test_core_error_is_transparent_over_validation() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "name is required");
    }
}
