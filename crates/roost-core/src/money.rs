//! # Cents
//!
//! Nightly rates, stored city tax and declaration totals are all `Money`:
//! a signed count of cents that parses from and prints as `12.34`.
//!
//! ## Reconciliation needs exact sums
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Declaration totals compared as floats:                                 │
//! │    5.5 × 3 + 5.5 × 2 == 27.5  ... usually, but not always              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    550 × 3 + 550 × 2 = 2750 cents, every time                          │
//! │    Reconciliation compares integers, never floats                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use roost_core::money::Money;
//!
//! let rate: Money = "5.5".parse().unwrap();   // 5.50 per night
//! assert_eq!(rate.cents(), 550);
//!
//! let stay = rate * 5_i64 * 2_i64;             // 5 nights, 2 adults
//! assert_eq!(stay.to_string(), "55.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// TaxRule.amount_cents ──► per-night rate ──► Reservation.city_tax_cents
///                                                    │
///                                                    ▼
///                              Declaration.total_city_tax (apportioned)
///                              Declaration.total_evaluated (recomputed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// `major` euros plus `minor` cents, with the sign taken from `major`.
    ///
    /// ```rust
    /// use roost_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(5, 50).cents(), 550);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// `self × factor`, or `None` if the result leaves `i64`.
    #[inline]
    pub const fn checked_mul(self, factor: i64) -> Option<Money> {
        match self.0.checked_mul(factor) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Scales the amount by `numerator / denominator`, rounding half away
    /// from zero.
    ///
    /// Used to spread a stored stay tax over the months the stay touches.
    /// A zero denominator yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use roost_core::money::Money;
    ///
    /// let stored = Money::from_cents(5500);
    /// assert_eq!(stored.apportion(2, 5).cents(), 2200);
    /// assert_eq!(Money::from_cents(1000).apportion(1, 3).cents(), 333);
    /// assert_eq!(Money::from_cents(1000).apportion(2, 3).cents(), 667);
    /// ```
    pub fn apportion(&self, numerator: i64, denominator: i64) -> Money {
        if denominator == 0 {
            return Money::zero();
        }
        // i128 keeps large stays from overflowing the intermediate product
        let product = self.0 as i128 * numerator as i128;
        let den = denominator as i128;
        let half = den.abs() / 2;
        let rounded = if (product < 0) != (den < 0) {
            (product - half * den.signum()) / den
        } else {
            (product + half * den.signum()) / den
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders two decimals with no currency symbol, e.g. `440.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Parses decimal amounts such as `5`, `5.5`, `-3.25`.
///
/// More than two fractional digits is rejected rather than rounded.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ValidationError::invalid_format("amount", reason);

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("empty amount"));
        }
        if fraction.len() > 2 {
            return Err(invalid("at most two decimal places are allowed"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount is too large"))?
        };
        let minor: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a count of nights or guests.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i64) -> Self {
        Money(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
