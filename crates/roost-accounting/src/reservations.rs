//! # Reservation Ledger
//!
//! Booking, blocking and lookup of stays.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_reservation(request)                                               │
//! │       │                                                                 │
//! │       ├── validate dates, guest breakdown, price                       │
//! │       ├── accommodation exists, guests ≤ capacity                      │
//! │       ├── customer exists                                              │
//! │       ├── no overlapping stay        → Unavailable                     │
//! │       ▼                                                                 │
//! │  AccountingService::quote(draft)      blocks skip this, they owe 0     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  one INSERT, city tax included                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The availability check and the insert are separate statements; a second
//! writer booking the same dates in between is not detected.

use chrono::{Local, NaiveDate};
use tracing::info;

use roost_core::validation::{validate_capacity, validate_reservation, validate_stay_dates};
use roost_core::{Accommodation, CalendarMonth, Money, NewReservation, Reservation};
use roost_db::Database;

use crate::accounting::AccountingService;
use crate::customers::CustomerBook;
use crate::error::{AccountingError, AccountingResult};

#[derive(Debug, Clone)]
pub struct ReservationService {
    db: Database,
    customers: CustomerBook,
    accounting: AccountingService,
}

impl ReservationService {
    pub fn new(db: Database, customers: CustomerBook, accounting: AccountingService) -> Self {
        ReservationService {
            db,
            customers,
            accounting,
        }
    }

    /// Books a stay, returning the stored reservation with its city tax
    /// already evaluated.
    pub async fn add_reservation(&self, request: &NewReservation) -> AccountingResult<Reservation> {
        self.book(request, false).await
    }

    /// Marks `[start, end)` as unavailable with a guest-less reservation.
    pub async fn block_dates(
        &self,
        accommodation_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AccountingResult<Reservation> {
        let request = NewReservation {
            accommodation_id,
            customer_id: self.customers.unavailable_customer_id(),
            arrival_date: start,
            departure_date: end,
            guests: 0,
            children: 0,
            infants: 0,
            price: Money::zero(),
        };
        self.book(&request, true).await
    }

    async fn book(&self, request: &NewReservation, is_block: bool) -> AccountingResult<Reservation> {
        validate_reservation(request, is_block)?;

        let accommodation = self.accommodation(request.accommodation_id).await?;
        if !is_block {
            validate_capacity(request.guests, accommodation.max_guests_allowed())?;
            self.customers.get(request.customer_id).await?;
        }

        let available = self
            .db
            .reservations()
            .is_available(request.accommodation_id, request.arrival_date, request.departure_date)
            .await?;
        if !available {
            return Err(AccountingError::Unavailable {
                accommodation_id: request.accommodation_id,
                start: request.arrival_date,
                end: request.departure_date,
            });
        }

        let mut reservation = request.draft(Local::now().date_naive());
        if !is_block {
            reservation.city_tax_cents = self.accounting.quote(&reservation).await?.total().cents();
        }

        let id = self.db.reservations().insert(&reservation).await?;
        info!(
            reservation_id = id,
            accommodation_id = request.accommodation_id,
            arrival = %request.arrival_date,
            departure = %request.departure_date,
            guests = request.guests,
            city_tax = %reservation.city_tax(),
            block = is_block,
            "Reservation stored"
        );

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> AccountingResult<Reservation> {
        self.db
            .reservations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AccountingError::not_found("Reservation", id))
    }

    pub async fn delete(&self, id: i64) -> AccountingResult<bool> {
        let removed = self.db.reservations().delete(id).await?;
        if removed {
            info!(reservation_id = id, "Reservation deleted");
        }
        Ok(removed)
    }

    pub async fn list(&self) -> AccountingResult<Vec<Reservation>> {
        Ok(self.db.reservations().list_all().await?)
    }

    pub async fn for_accommodation(&self, accommodation_id: i64) -> AccountingResult<Vec<Reservation>> {
        Ok(self.db.reservations().list_for_accommodation(accommodation_id).await?)
    }

    /// Reservations with at least one night inside `month`, by arrival.
    pub async fn for_month(&self, accommodation_id: i64, month: CalendarMonth) -> AccountingResult<Vec<Reservation>> {
        Ok(self
            .db
            .reservations()
            .list_overlapping(accommodation_id, month.first_day(), month.next_month_start())
            .await?)
    }

    /// True if no stay of the accommodation overlaps `[start, end)`.
    pub async fn check_availability(
        &self,
        accommodation_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AccountingResult<bool> {
        validate_stay_dates(start, end)?;
        Ok(self.db.reservations().is_available(accommodation_id, start, end).await?)
    }

    /// Accommodations that can host `guests` for the whole of `[start, end)`.
    pub async fn available_accommodations(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        guests: i64,
    ) -> AccountingResult<Vec<Accommodation>> {
        validate_stay_dates(start, end)?;
        Ok(self.db.accommodations().list_available(start, end, guests).await?)
    }

    async fn accommodation(&self, id: i64) -> AccountingResult<Accommodation> {
        self.db
            .accommodations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AccountingError::not_found("Accommodation", id))
    }
}
