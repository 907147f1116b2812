//! # roost-core: Pure Business Logic for Roost
//!
//! This crate contains the domain types and the city-tax arithmetic of the
//! Roost rental ledger as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Roost Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (`roost`)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        roost-accounting (registry, ledger, declarations)        │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼──────────────────┐  ┌─────────▼──────────────────┐   │
//! │  │   ★ roost-core (THIS CRATE) ★   │  │  roost-db (SQLite, sqlx)   │   │
//! │  │                                 │  │                            │   │
//! │  │  money · period · types         │  │  repositories, migrations  │   │
//! │  │  validation · tax · warnings    │  │                            │   │
//! │  │                                 │  └────────────────────────────┘   │
//! │  │  NO I/O • NO DATABASE • PURE    │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Accommodation, Reservation, TaxRule, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`period`] - Half-open date ranges and calendar months
//! - [`tax`] - Per-stay tax evaluation and monthly declaration math
//! - [`warnings`] - Non-fatal reconciliation warnings
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use roost_core::period::StayPeriod;
//!
//! let stay = StayPeriod::new(
//!     NaiveDate::from_ymd_opt(2024, 3, 29).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
//! )
//! .unwrap();
//! assert_eq!(stay.nights(), 5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod period;
pub mod tax;
pub mod types;
pub mod validation;
pub mod warnings;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::{CalendarMonth, StayPeriod};
pub use types::*;
pub use warnings::ReconciliationWarning;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name of the sentinel customer that owns unavailability blocks.
///
/// Reservations booked for this customer carry zero guests and mark the
/// accommodation as closed for the period.
pub const UNAVAILABLE_CUSTOMER_NAME: &str = "UNAVAILABLE";

/// Highest nightly rate a tax rule may carry, in cents (10,000.00).
///
/// Keeps rate × nights × guests far inside `i64` for any stay chrono can
/// represent.
pub const MAX_RATE_PER_NIGHT_CENTS: i64 = 1_000_000;
