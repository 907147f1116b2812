//! Accommodation catalogue: apartments and rooms.

use tracing::info;

use roost_core::validation::validate_accommodation;
use roost_core::{Accommodation, Apartment, Room};
use roost_db::Database;

use crate::error::{AccountingError, AccountingResult};

#[derive(Debug, Clone)]
pub struct AccommodationService {
    db: Database,
}

impl AccommodationService {
    pub fn new(db: Database) -> Self {
        AccommodationService { db }
    }

    /// Validates and stores an accommodation, returning it with its new id.
    pub async fn create(&self, accommodation: Accommodation) -> AccountingResult<Accommodation> {
        validate_accommodation(&accommodation)?;

        let id = self.db.accommodations().insert(&accommodation).await?;
        info!(accommodation_id = id, kind = accommodation.kind(), "Accommodation created");
        Ok(accommodation.with_id(id))
    }

    pub async fn create_apartment(&self, apartment: Apartment) -> AccountingResult<Accommodation> {
        self.create(Accommodation::Apartment(apartment)).await
    }

    pub async fn create_room(&self, room: Room) -> AccountingResult<Accommodation> {
        self.create(Accommodation::Room(room)).await
    }

    pub async fn get(&self, id: i64) -> AccountingResult<Accommodation> {
        self.db
            .accommodations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AccountingError::not_found("Accommodation", id))
    }

    pub async fn list(&self) -> AccountingResult<Vec<Accommodation>> {
        Ok(self.db.accommodations().list_all().await?)
    }

    /// Deletes an accommodation together with its reservations.
    pub async fn delete(&self, id: i64) -> AccountingResult<bool> {
        let removed = self.db.accommodations().delete(id).await?;
        if removed {
            info!(accommodation_id = id, "Accommodation deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::ValidationError;
    use roost_db::DbConfig;

    async fn service() -> AccommodationService {
        AccommodationService::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service().await;
        let room = service
            .create_room(Room {
                id: 0,
                description: "Garden room".to_string(),
                max_guests_allowed: 2,
                has_private_bathroom: true,
                has_kitchen: false,
            })
            .await
            .unwrap();

        assert!(room.id() > 0);
        assert_eq!(service.get(room.id()).await.unwrap(), room);
        assert!(matches!(service.get(999).await, Err(AccountingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_apartment_is_not_stored() {
        let service = service().await;
        let result = service
            .create_apartment(Apartment {
                id: 0,
                description: "  ".to_string(),
                max_guests_allowed: 4,
                rooms: 2,
                bathrooms: 1,
                bedrooms: 1,
                beds: 2,
            })
            .await;

        assert!(matches!(result, Err(AccountingError::Validation(ValidationError::Required { .. }))));
        assert!(service.list().await.unwrap().is_empty());
    }
}
