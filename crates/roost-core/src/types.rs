//! # Domain Types
//!
//! Core domain types for Roost.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Domain Model Overview                               │
//! │                                                                         │
//! │  ┌────────────────┐        ┌──────────────┐        ┌────────────┐      │
//! │  │ Accommodation  │ 1    * │ Reservation  │ *    1 │  Customer  │      │
//! │  │ ───────────────│───────►│──────────────│◄───────│────────────│      │
//! │  │ Apartment |    │        │ arrival      │        │ name       │      │
//! │  │ Room           │        │ departure    │        │ address    │      │
//! │  └────────────────┘        │ guests       │        │ phone      │      │
//! │                            │ city_tax ◄───┼──┐     └────────────┘      │
//! │                            └──────────────┘  │                         │
//! │                                              │ written only by the     │
//! │  ┌────────────────┐                          │ tax engine              │
//! │  │    TaxRule     │──────────────────────────┘                         │
//! │  │ target         │  adults | children | infants                       │
//! │  │ amount / night │                                                    │
//! │  │ days_threshold │                                                    │
//! │  │ [from, to]     │                                                    │
//! │  └────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Money fields are stored as `*_cents` integers and exposed as [`Money`]
//! through accessor methods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::period::StayPeriod;

// =============================================================================
// Target Category
// =============================================================================

/// Guest category a tax rule applies to.
///
/// Stored as `adults`, `children` or `infants`. Parsing also accepts the
/// singular forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum TargetCategory {
    Adults,
    Children,
    Infants,
}

impl TargetCategory {
    /// All categories in evaluation order.
    pub const ALL: [TargetCategory; 3] = [
        TargetCategory::Adults,
        TargetCategory::Children,
        TargetCategory::Infants,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCategory::Adults => "adults",
            TargetCategory::Children => "children",
            TargetCategory::Infants => "infants",
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adults" | "adult" => Ok(TargetCategory::Adults),
            "children" | "child" => Ok(TargetCategory::Children),
            "infants" | "infant" => Ok(TargetCategory::Infants),
            _ => Err(ValidationError::NotAllowed {
                field: "target".to_string(),
                allowed: TargetCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Tax Rule
// =============================================================================

/// A local (city) tax rule as stored in the registry.
///
/// The validity window `[start_date, end_date]` is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TaxRule {
    pub id: i64,
    pub description: String,
    /// Amount per night per guest, in cents.
    pub amount_cents: i64,
    pub target: TargetCategory,
    /// Nights of a single stay after which the tax stops accruing.
    pub days_threshold: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TaxRule {
    pub fn amount_per_night(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Validity as a half-open period `[start_date, end_date + 1)`.
    pub fn validity(&self) -> StayPeriod {
        StayPeriod::from_inclusive(self.start_date, self.end_date)
    }

    /// Nights of `window` during which this rule is in force.
    pub fn nights_within(&self, window: &StayPeriod) -> i64 {
        self.validity().overlap_nights(window)
    }
}

/// Input for creating or replacing a tax rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxRule {
    pub description: String,
    pub amount_per_night: Money,
    pub target: TargetCategory,
    pub days_threshold: i64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

// =============================================================================
// Accommodation
// =============================================================================

/// Apartment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: i64,
    pub description: String,
    pub max_guests_allowed: i64,
    pub rooms: i64,
    pub bathrooms: i64,
    pub bedrooms: i64,
    pub beds: i64,
}

/// Room details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub description: String,
    pub max_guests_allowed: i64,
    pub has_private_bathroom: bool,
    pub has_kitchen: bool,
}

/// A bookable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Accommodation {
    Apartment(Apartment),
    Room(Room),
}

impl Accommodation {
    pub fn id(&self) -> i64 {
        match self {
            Accommodation::Apartment(a) => a.id,
            Accommodation::Room(r) => r.id,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Accommodation::Apartment(a) => &a.description,
            Accommodation::Room(r) => &r.description,
        }
    }

    pub fn max_guests_allowed(&self) -> i64 {
        match self {
            Accommodation::Apartment(a) => a.max_guests_allowed,
            Accommodation::Room(r) => r.max_guests_allowed,
        }
    }

    /// `apartment` or `room`; the discriminator stored in the database.
    pub fn kind(&self) -> &'static str {
        match self {
            Accommodation::Apartment(_) => "apartment",
            Accommodation::Room(_) => "room",
        }
    }

    /// Returns a copy carrying the given id.
    pub fn with_id(mut self, id: i64) -> Self {
        match &mut self {
            Accommodation::Apartment(a) => a.id = id,
            Accommodation::Room(r) => r.id = id,
        }
        self
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Reservation
// =============================================================================

/// A booked stay, or an unavailability block when `guests` is zero.
///
/// ## Guest Breakdown
/// ```text
/// guests = adults + children + infants
/// adults = guests - children - infants   (never negative)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub accommodation_id: i64,
    pub customer_id: i64,
    pub arrival_date: NaiveDate,
    /// Exclusive: the guest leaves this morning.
    pub departure_date: NaiveDate,
    pub guests: i64,
    pub children: i64,
    pub infants: i64,
    pub price_cents: i64,
    /// City tax owed for the stay, written by the tax engine.
    pub city_tax_cents: i64,
    pub booked_on: NaiveDate,
}

impl Reservation {
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    pub fn city_tax(&self) -> Money {
        Money::from_cents(self.city_tax_cents)
    }

    pub fn adults(&self) -> i64 {
        self.guests - self.children - self.infants
    }

    /// Number of guests belonging to `category`.
    pub fn population(&self, category: TargetCategory) -> i64 {
        match category {
            TargetCategory::Adults => self.adults(),
            TargetCategory::Children => self.children,
            TargetCategory::Infants => self.infants,
        }
    }

    /// The stay as `[arrival, departure)`.
    ///
    /// A stored reservation always has arrival before departure; an
    /// inverted record degrades to an empty stay.
    pub fn stay(&self) -> StayPeriod {
        StayPeriod::new(self.arrival_date, self.departure_date)
            .unwrap_or_else(|_| StayPeriod::empty_at(self.arrival_date))
    }

    pub fn nights(&self) -> i64 {
        self.stay().nights()
    }

    pub fn is_unavailability_block(&self) -> bool {
        self.guests == 0
    }

    /// Rejects records whose children and infants outnumber the guests.
    pub fn check_guest_breakdown(&self) -> CoreResult<()> {
        if self.adults() < 0 || self.children < 0 || self.infants < 0 {
            return Err(CoreError::InvalidGuestBreakdown {
                reservation_id: self.id,
            });
        }
        Ok(())
    }
}

/// Input for booking a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub accommodation_id: i64,
    pub customer_id: i64,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub guests: i64,
    pub children: i64,
    pub infants: i64,
    pub price: Money,
}

impl NewReservation {
    /// The reservation this request would store, before it has an id or a
    /// city tax. Lets the tax be evaluated ahead of the insert.
    pub fn draft(&self, booked_on: NaiveDate) -> Reservation {
        Reservation {
            id: 0,
            accommodation_id: self.accommodation_id,
            customer_id: self.customer_id,
            arrival_date: self.arrival_date,
            departure_date: self.departure_date,
            guests: self.guests,
            children: self.children,
            infants: self.infants,
            price_cents: self.price.cents(),
            city_tax_cents: 0,
            booked_on,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
