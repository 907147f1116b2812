//! # Reservation Repository
//!
//! Database operations for reservations, including availability checks.
//!
//! ## Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stays are half-open [arrival, departure).                              │
//! │                                                                         │
//! │  existing      [arrival ───────── departure)                            │
//! │  requested                  [start ───────── end)                       │
//! │                                                                         │
//! │  overlaps  ⇔  arrival < end  AND  departure > start                     │
//! │                                                                         │
//! │  A stay departing on the 10th does not block one arriving on the 10th.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use roost_core::Reservation;

const SELECT_RESERVATION: &str = r#"
    SELECT id, accommodation_id, customer_id, arrival_date, departure_date,
           guests, children, infants, price_cents, city_tax_cents, booked_on
    FROM reservations
"#;

/// Repository for reservation database operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Inserts `reservation`, city tax included, and returns the new id.
    /// The `id` field is ignored.
    pub async fn insert(&self, reservation: &Reservation) -> DbResult<i64> {
        debug!(
            accommodation_id = reservation.accommodation_id,
            arrival = %reservation.arrival_date,
            departure = %reservation.departure_date,
            city_tax_cents = reservation.city_tax_cents,
            "Inserting reservation"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO reservations
                (accommodation_id, customer_id, arrival_date, departure_date,
                 guests, children, infants, price_cents, city_tax_cents, booked_on)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(reservation.accommodation_id)
        .bind(reservation.customer_id)
        .bind(reservation.arrival_date)
        .bind(reservation.departure_date)
        .bind(reservation.guests)
        .bind(reservation.children)
        .bind(reservation.infants)
        .bind(reservation.price_cents)
        .bind(reservation.city_tax_cents)
        .bind(reservation.booked_on)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Writes every mutable field of `reservation` back to its row.
    pub async fn update(&self, reservation: &Reservation) -> DbResult<()> {
        debug!(id = reservation.id, city_tax_cents = reservation.city_tax_cents, "Updating reservation");

        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET accommodation_id = ?1, customer_id = ?2,
                arrival_date = ?3, departure_date = ?4,
                guests = ?5, children = ?6, infants = ?7,
                price_cents = ?8, city_tax_cents = ?9, booked_on = ?10
            WHERE id = ?11
            "#,
        )
        .bind(reservation.accommodation_id)
        .bind(reservation.customer_id)
        .bind(reservation.arrival_date)
        .bind(reservation.departure_date)
        .bind(reservation.guests)
        .bind(reservation.children)
        .bind(reservation.infants)
        .bind(reservation.price_cents)
        .bind(reservation.city_tax_cents)
        .bind(reservation.booked_on)
        .bind(reservation.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", reservation.id));
        }
        Ok(())
    }

    /// Deletes a reservation. Returns false if it did not exist.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!("{SELECT_RESERVATION} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reservation)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_RESERVATION} ORDER BY arrival_date, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// All reservations of one accommodation, by arrival.
    pub async fn list_for_accommodation(&self, accommodation_id: i64) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_RESERVATION} WHERE accommodation_id = ?1 ORDER BY arrival_date, id"
        ))
        .bind(accommodation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Reservations of one accommodation sharing at least one night with
    /// `[start, end)`, by arrival.
    pub async fn list_overlapping(
        &self,
        accommodation_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_RESERVATION}
             WHERE accommodation_id = ?1 AND arrival_date < ?3 AND departure_date > ?2
             ORDER BY arrival_date, id"
        ))
        .bind(accommodation_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(accommodation_id, %start, %end, count = reservations.len(), "Found overlapping reservations");
        Ok(reservations)
    }

    /// Reservations of every accommodation sharing at least one night with
    /// `[start, end)`, by id.
    pub async fn list_in_period(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_RESERVATION} WHERE arrival_date < ?2 AND departure_date > ?1 ORDER BY id"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(%start, %end, count = reservations.len(), "Found reservations in period");
        Ok(reservations)
    }

    /// True if no reservation of the accommodation overlaps `[start, end)`.
    pub async fn is_available(&self, accommodation_id: i64, start: NaiveDate, end: NaiveDate) -> DbResult<bool> {
        let clashes: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE accommodation_id = ?1 AND arrival_date < ?3 AND departure_date > ?2
            "#,
        )
        .bind(accommodation_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(clashes == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use roost_core::{Accommodation, Money, NewReservation, Room};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let room = Accommodation::Room(Room {
            id: 0,
            description: "Garden room".to_string(),
            max_guests_allowed: 2,
            has_private_bathroom: true,
            has_kitchen: false,
        });
        let accommodation_id = db.accommodations().insert(&room).await.unwrap();
        let customer_id = db.customers().insert("Ada Lovelace", None, None).await.unwrap();
        (db, accommodation_id, customer_id)
    }

    fn booking(accommodation_id: i64, customer_id: i64, arrival: NaiveDate, departure: NaiveDate) -> NewReservation {
        NewReservation {
            accommodation_id,
            customer_id,
            arrival_date: arrival,
            departure_date: departure,
            guests: 2,
            children: 0,
            infants: 0,
            price: Money::from_cents(12000),
        }
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let (db, accommodation_id, customer_id) = setup().await;
        let repo = db.reservations();

        let mut draft = booking(accommodation_id, customer_id, d(2024, 5, 1), d(2024, 5, 4)).draft(d(2024, 1, 2));
        draft.city_tax_cents = 1200;
        let id = repo.insert(&draft).await.unwrap();

        let mut stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.city_tax_cents, 1200);
        assert_eq!(stored.nights(), 3);
        assert_eq!(stored.booked_on, d(2024, 1, 2));

        stored.city_tax_cents = 3300;
        repo.update(&stored).await.unwrap();
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().city_tax_cents, 3300);
    }

    #[tokio::test]
    async fn test_availability_uses_half_open_stays() {
        let (db, accommodation_id, customer_id) = setup().await;
        let repo = db.reservations();

        repo.insert(&booking(accommodation_id, customer_id, d(2024, 5, 1), d(2024, 5, 10)).draft(d(2024, 1, 2)))
            .await
            .unwrap();

        assert!(repo.is_available(accommodation_id, d(2024, 5, 10), d(2024, 5, 12)).await.unwrap());
        assert!(repo.is_available(accommodation_id, d(2024, 4, 28), d(2024, 5, 1)).await.unwrap());
        assert!(!repo.is_available(accommodation_id, d(2024, 5, 9), d(2024, 5, 12)).await.unwrap());
        assert!(!repo.is_available(accommodation_id, d(2024, 4, 1), d(2024, 6, 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_overlapping_month() {
        let (db, accommodation_id, customer_id) = setup().await;
        let repo = db.reservations();

        for (arrival, departure) in [
            (d(2023, 3, 25), d(2023, 4, 1)),
            (d(2023, 3, 29), d(2023, 4, 3)),
            (d(2023, 4, 29), d(2023, 5, 3)),
            (d(2023, 5, 3), d(2023, 5, 5)),
        ] {
            repo.insert(&booking(accommodation_id, customer_id, arrival, departure).draft(d(2023, 1, 1)))
                .await
                .unwrap();
        }

        let april = repo
            .list_overlapping(accommodation_id, d(2023, 4, 1), d(2023, 5, 1))
            .await
            .unwrap();
        let arrivals: Vec<NaiveDate> = april.iter().map(|r| r.arrival_date).collect();
        assert_eq!(arrivals, vec![d(2023, 3, 29), d(2023, 4, 29)]);
    }

    #[tokio::test]
    async fn test_list_in_period_spans_accommodations() {
        let (db, room_id, customer_id) = setup().await;
        let other_id = db
            .accommodations()
            .insert(&Accommodation::Room(Room {
                id: 0,
                description: "Attic room".to_string(),
                max_guests_allowed: 2,
                has_private_bathroom: false,
                has_kitchen: false,
            }))
            .await
            .unwrap();
        let repo = db.reservations();

        for (accommodation_id, arrival, departure) in [
            (room_id, d(2024, 1, 1), d(2024, 1, 5)),
            (other_id, d(2024, 1, 4), d(2024, 1, 8)),
            (other_id, d(2024, 1, 10), d(2024, 1, 12)),
        ] {
            repo.insert(&booking(accommodation_id, customer_id, arrival, departure).draft(d(2023, 12, 1)))
                .await
                .unwrap();
        }

        // [Jan 4, Jan 10) holds the 4th of the first stay and the whole second
        let touching = repo.list_in_period(d(2024, 1, 4), d(2024, 1, 10)).await.unwrap();
        let accommodations: Vec<i64> = touching.iter().map(|r| r.accommodation_id).collect();
        assert_eq!(accommodations, vec![room_id, other_id]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (db, accommodation_id, customer_id) = setup().await;
        let repo = db.reservations();
        let id = repo
            .insert(&booking(accommodation_id, customer_id, d(2024, 5, 1), d(2024, 5, 4)).draft(d(2024, 1, 2)))
            .await
            .unwrap();
        let stored = repo.get_by_id(id).await.unwrap().unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(matches!(repo.update(&stored).await, Err(DbError::NotFound { .. })));
    }
}
