//! # Accommodation Repository
//!
//! Apartments and rooms live in one table; the `kind` column selects which
//! variant of [`Accommodation`] a row maps to.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use roost_core::{Accommodation, Apartment, Room};

const SELECT_ACCOMMODATION: &str = r#"
    SELECT id, kind, description, max_guests_allowed,
           rooms, bathrooms, bedrooms, beds, has_private_bathroom, has_kitchen
    FROM accommodations
"#;

/// Raw row before it is split into the [`Accommodation`] variants.
#[derive(Debug, sqlx::FromRow)]
struct AccommodationRow {
    id: i64,
    kind: String,
    description: String,
    max_guests_allowed: i64,
    rooms: Option<i64>,
    bathrooms: Option<i64>,
    bedrooms: Option<i64>,
    beds: Option<i64>,
    has_private_bathroom: Option<bool>,
    has_kitchen: Option<bool>,
}

impl TryFrom<AccommodationRow> for Accommodation {
    type Error = DbError;

    fn try_from(row: AccommodationRow) -> Result<Self, Self::Error> {
        match row.kind.as_str() {
            "apartment" => Ok(Accommodation::Apartment(Apartment {
                id: row.id,
                description: row.description,
                max_guests_allowed: row.max_guests_allowed,
                rooms: row.rooms.unwrap_or_default(),
                bathrooms: row.bathrooms.unwrap_or_default(),
                bedrooms: row.bedrooms.unwrap_or_default(),
                beds: row.beds.unwrap_or_default(),
            })),
            "room" => Ok(Accommodation::Room(Room {
                id: row.id,
                description: row.description,
                max_guests_allowed: row.max_guests_allowed,
                has_private_bathroom: row.has_private_bathroom.unwrap_or_default(),
                has_kitchen: row.has_kitchen.unwrap_or_default(),
            })),
            other => Err(DbError::corrupt_row(
                "accommodations",
                format!("unknown kind '{other}' for id {}", row.id),
            )),
        }
    }
}

fn into_accommodations(rows: Vec<AccommodationRow>) -> DbResult<Vec<Accommodation>> {
    rows.into_iter().map(Accommodation::try_from).collect()
}

/// Repository for accommodation database operations.
#[derive(Debug, Clone)]
pub struct AccommodationRepository {
    pool: SqlitePool,
}

impl AccommodationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccommodationRepository { pool }
    }

    /// Inserts an accommodation (its `id` is ignored) and returns the new id.
    pub async fn insert(&self, accommodation: &Accommodation) -> DbResult<i64> {
        debug!(kind = accommodation.kind(), description = accommodation.description(), "Inserting accommodation");

        let query = sqlx::query(
            r#"
            INSERT INTO accommodations
                (kind, description, max_guests_allowed,
                 rooms, bathrooms, bedrooms, beds, has_private_bathroom, has_kitchen)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(accommodation.kind())
        .bind(accommodation.description())
        .bind(accommodation.max_guests_allowed());

        let query = match accommodation {
            Accommodation::Apartment(a) => query
                .bind(Some(a.rooms))
                .bind(Some(a.bathrooms))
                .bind(Some(a.bedrooms))
                .bind(Some(a.beds))
                .bind(None::<bool>)
                .bind(None::<bool>),
            Accommodation::Room(r) => query
                .bind(None::<i64>)
                .bind(None::<i64>)
                .bind(None::<i64>)
                .bind(None::<i64>)
                .bind(Some(r.has_private_bathroom))
                .bind(Some(r.has_kitchen)),
        };

        let result = query.execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Accommodation>> {
        let row = sqlx::query_as::<_, AccommodationRow>(&format!("{SELECT_ACCOMMODATION} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Accommodation::try_from).transpose()
    }

    pub async fn list_all(&self) -> DbResult<Vec<Accommodation>> {
        let rows = sqlx::query_as::<_, AccommodationRow>(&format!("{SELECT_ACCOMMODATION} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        into_accommodations(rows)
    }

    /// Accommodations hosting at least `guests` with no reservation
    /// overlapping `[start, end)`.
    pub async fn list_available(&self, start: NaiveDate, end: NaiveDate, guests: i64) -> DbResult<Vec<Accommodation>> {
        let rows = sqlx::query_as::<_, AccommodationRow>(&format!(
            "{SELECT_ACCOMMODATION} a
             WHERE a.max_guests_allowed >= ?3
               AND NOT EXISTS (
                   SELECT 1 FROM reservations r
                   WHERE r.accommodation_id = a.id
                     AND r.arrival_date < ?2 AND r.departure_date > ?1
               )
             ORDER BY a.id"
        ))
        .bind(start)
        .bind(end)
        .bind(guests)
        .fetch_all(&self.pool)
        .await?;

        debug!(%start, %end, guests, count = rows.len(), "Found available accommodations");
        into_accommodations(rows)
    }

    /// Deletes an accommodation and, by cascade, its reservations.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use roost_core::{Money, NewReservation};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn apartment(max_guests: i64) -> Accommodation {
        Accommodation::Apartment(Apartment {
            id: 0,
            description: "Oltrarno loft".to_string(),
            max_guests_allowed: max_guests,
            rooms: 3,
            bathrooms: 1,
            bedrooms: 2,
            beds: 3,
        })
    }

    #[tokio::test]
    async fn test_round_trip_both_kinds() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accommodations();

        let apartment_id = repo.insert(&apartment(4)).await.unwrap();
        let room = Accommodation::Room(Room {
            id: 0,
            description: "Garden room".to_string(),
            max_guests_allowed: 2,
            has_private_bathroom: true,
            has_kitchen: false,
        });
        let room_id = repo.insert(&room).await.unwrap();

        assert_eq!(repo.get_by_id(apartment_id).await.unwrap(), Some(apartment(4).with_id(apartment_id)));
        assert_eq!(repo.get_by_id(room_id).await.unwrap(), Some(room.with_id(room_id)));
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_available() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let _too_small = db.accommodations().insert(&apartment(2)).await.unwrap();
        let large = db.accommodations().insert(&apartment(6)).await.unwrap();
        let booked = db.accommodations().insert(&apartment(6)).await.unwrap();
        let customer = db.customers().insert("Ada Lovelace", None, None).await.unwrap();

        db.reservations()
            .insert(
                &NewReservation {
                    accommodation_id: booked,
                    customer_id: customer,
                    arrival_date: d(2024, 5, 1),
                    departure_date: d(2024, 5, 10),
                    guests: 4,
                    children: 0,
                    infants: 0,
                    price: Money::from_cents(50000),
                }
                .draft(d(2024, 1, 1)),
            )
            .await
            .unwrap();

        let free = db
            .accommodations()
            .list_available(d(2024, 5, 5), d(2024, 5, 7), 4)
            .await
            .unwrap();
        let ids: Vec<i64> = free.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![large]);
    }

    #[tokio::test]
    async fn test_delete_cascades_reservations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.accommodations().insert(&apartment(4)).await.unwrap();
        let customer = db.customers().insert("Ada Lovelace", None, None).await.unwrap();
        db.reservations()
            .insert(
                &NewReservation {
                    accommodation_id: id,
                    customer_id: customer,
                    arrival_date: d(2024, 5, 1),
                    departure_date: d(2024, 5, 3),
                    guests: 1,
                    children: 0,
                    infants: 0,
                    price: Money::zero(),
                }
                .draft(d(2024, 1, 1)),
            )
            .await
            .unwrap();

        assert!(db.accommodations().delete(id).await.unwrap());
        assert!(db.reservations().list_all().await.unwrap().is_empty());
    }
}
