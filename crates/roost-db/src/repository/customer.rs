//! # Customer Repository

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use roost_core::Customer;

const SELECT_CUSTOMER: &str = "SELECT id, name, address, phone FROM customers";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer and returns the new id.
    pub async fn insert(&self, name: &str, address: Option<&str>, phone: Option<&str>) -> DbResult<i64> {
        debug!(name, "Inserting customer");

        let result = sqlx::query("INSERT INTO customers (name, address, phone) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(address)
            .bind(phone)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// First customer with exactly this name, lowest id first.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "{SELECT_CUSTOMER} WHERE name = ?1 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Deletes a customer. Fails with a foreign key violation while the
    /// customer still has reservations.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
