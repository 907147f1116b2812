//! # Validation Module
//!
//! Input validation for everything that reaches the store.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Parsing (CLI / config)                                        │
//! │  ├── TargetCategory::from_str, Money::from_str, dates                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── ranges, signs, guest breakdown                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite CHECK / FOREIGN KEY constraints                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every check here runs before any store mutation.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{Accommodation, NewReservation, NewTaxRule};
use crate::MAX_RATE_PER_NIGHT_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Tax Rules
// =============================================================================

/// Validates a tax rule before insert or update.
///
/// ## Rules
/// - `amount_per_night` ≥ 0
/// - `amount_per_night` ≤ MAX_RATE_PER_NIGHT_CENTS (10,000.00)
/// - `days_threshold` ≥ 0
/// - `valid_from` ≤ `valid_to`
///
/// The target category is already typed; unknown categories are rejected
/// when parsed.
pub fn validate_tax_rule(rule: &NewTaxRule) -> ValidationResult<()> {
    non_negative("amount_per_night", rule.amount_per_night.cents())?;
    if rule.amount_per_night.cents() > MAX_RATE_PER_NIGHT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "amount_per_night".to_string(),
            min: 0,
            max: MAX_RATE_PER_NIGHT_CENTS,
        });
    }
    non_negative("days_threshold", rule.days_threshold)?;

    if rule.valid_from > rule.valid_to {
        return Err(ValidationError::InvalidDateRange {
            field: "validity".to_string(),
            start: rule.valid_from,
            end: rule.valid_to,
        });
    }

    Ok(())
}

// =============================================================================
// Reservations
// =============================================================================

/// Validates that `arrival` is strictly before `departure`.
pub fn validate_stay_dates(arrival: NaiveDate, departure: NaiveDate) -> ValidationResult<()> {
    if arrival >= departure {
        return Err(ValidationError::InvalidDateRange {
            field: "stay".to_string(),
            start: arrival,
            end: departure,
        });
    }
    Ok(())
}

/// Validates a booking request.
///
/// ## Rules
/// - arrival strictly before departure
/// - at least one guest, unless this is an unavailability block
/// - no negative counts, children + infants ≤ guests
/// - price ≥ 0
pub fn validate_reservation(reservation: &NewReservation, is_block: bool) -> ValidationResult<()> {
    validate_stay_dates(reservation.arrival_date, reservation.departure_date)?;

    if reservation.guests <= 0 && !is_block {
        return Err(ValidationError::MustBePositive {
            field: "guests".to_string(),
        });
    }
    non_negative("guests", reservation.guests)?;
    non_negative("children", reservation.children)?;
    non_negative("infants", reservation.infants)?;

    if reservation.children + reservation.infants > reservation.guests {
        return Err(ValidationError::OutOfRange {
            field: "children + infants".to_string(),
            min: 0,
            max: reservation.guests,
        });
    }

    non_negative("price", reservation.price.cents())?;

    Ok(())
}

/// Validates a guest count requested against an accommodation's capacity.
pub fn validate_capacity(guests: i64, max_guests_allowed: i64) -> ValidationResult<()> {
    if guests > max_guests_allowed {
        return Err(ValidationError::OutOfRange {
            field: "guests".to_string(),
            min: 0,
            max: max_guests_allowed,
        });
    }
    Ok(())
}

// =============================================================================
// Accommodations & Customers
// =============================================================================

/// Validates an accommodation before insert.
pub fn validate_accommodation(accommodation: &Accommodation) -> ValidationResult<()> {
    required("description", accommodation.description())?;

    if accommodation.max_guests_allowed() <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "max_guests_allowed".to_string(),
        });
    }

    match accommodation {
        Accommodation::Apartment(apartment) => {
            non_negative("rooms", apartment.rooms)?;
            non_negative("bathrooms", apartment.bathrooms)?;
            non_negative("bedrooms", apartment.bedrooms)?;
            non_negative("beds", apartment.beds)?;
        }
        Accommodation::Room(_) => {}
    }

    Ok(())
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("name", name)
}

// =============================================================================
// Unit Tests
// =============================================================================
