//! # Customer Book
//!
//! Customers, plus the sentinel customer that owns unavailability blocks.
//!
//! The sentinel is looked up (or created) once when the book is built, so
//! blocking dates never races on its creation.

use tracing::{debug, info};

use roost_core::validation::validate_customer_name;
use roost_core::{Customer, ValidationError, UNAVAILABLE_CUSTOMER_NAME};
use roost_db::Database;

use crate::error::{AccountingError, AccountingResult};

#[derive(Debug, Clone)]
pub struct CustomerBook {
    db: Database,
    unavailable_id: i64,
}

impl CustomerBook {
    /// Builds the book, resolving the sentinel customer.
    pub async fn new(db: Database) -> AccountingResult<Self> {
        let customers = db.customers();
        let unavailable_id = match customers.find_by_name(UNAVAILABLE_CUSTOMER_NAME).await? {
            Some(existing) => existing.id,
            None => {
                let id = customers.insert(UNAVAILABLE_CUSTOMER_NAME, None, None).await?;
                debug!(customer_id = id, "Created unavailability sentinel customer");
                id
            }
        };

        Ok(CustomerBook { db, unavailable_id })
    }

    /// Id of the customer that owns unavailability blocks.
    pub fn unavailable_customer_id(&self) -> i64 {
        self.unavailable_id
    }

    pub async fn add(&self, name: &str, address: Option<&str>, phone: Option<&str>) -> AccountingResult<Customer> {
        validate_customer_name(name)?;

        let name = name.trim();
        let id = self.db.customers().insert(name, address, phone).await?;
        info!(customer_id = id, "Customer added");

        Ok(Customer {
            id,
            name: name.to_string(),
            address: address.map(str::to_string),
            phone: phone.map(str::to_string),
        })
    }

    pub async fn get(&self, id: i64) -> AccountingResult<Customer> {
        self.db
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AccountingError::not_found("Customer", id))
    }

    /// All customers except the sentinel.
    pub async fn list(&self) -> AccountingResult<Vec<Customer>> {
        let mut customers = self.db.customers().list_all().await?;
        customers.retain(|c| c.id != self.unavailable_id);
        Ok(customers)
    }

    /// Deletes a customer. Customers with reservations are kept and the
    /// store's foreign key error is returned.
    pub async fn delete(&self, id: i64) -> AccountingResult<bool> {
        if id == self.unavailable_id {
            return Err(ValidationError::NotAllowed {
                field: "customer".to_string(),
                allowed: vec!["any customer except the unavailability sentinel".to_string()],
            }
            .into());
        }
        Ok(self.db.customers().delete(id).await?)
    }
}
