//! # Local Tax Repository
//!
//! Storage for city tax rules.
//!
//! ## Overlap Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rule   [start_date ─────────── end_date]      (inclusive)              │
//! │  query             [from ─────────── to]       (inclusive)              │
//! │                                                                         │
//! │  overlaps  ⇔  start_date <= to  AND  end_date >= from                   │
//! │                                                                         │
//! │  Results are ordered by id so callers iterate deterministically.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use roost_core::{NewTaxRule, TargetCategory, TaxRule};

const SELECT_RULE: &str = r#"
    SELECT id, description, amount_cents, target, days_threshold, start_date, end_date
    FROM local_taxes
"#;

/// Repository for tax rule operations.
#[derive(Debug, Clone)]
pub struct LocalTaxRepository {
    pool: SqlitePool,
}

impl LocalTaxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocalTaxRepository { pool }
    }

    /// Inserts a rule and returns its id.
    pub async fn insert(&self, rule: &NewTaxRule) -> DbResult<i64> {
        debug!(target_category = %rule.target, description = %rule.description, "Inserting tax rule");

        let result = sqlx::query(
            r#"
            INSERT INTO local_taxes
                (description, amount_cents, target, days_threshold, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&rule.description)
        .bind(rule.amount_per_night.cents())
        .bind(rule.target)
        .bind(rule.days_threshold)
        .bind(rule.valid_from)
        .bind(rule.valid_to)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Replaces every field of an existing rule.
    pub async fn update(&self, id: i64, rule: &NewTaxRule) -> DbResult<()> {
        debug!(id, "Updating tax rule");

        let result = sqlx::query(
            r#"
            UPDATE local_taxes
            SET description = ?1, amount_cents = ?2, target = ?3,
                days_threshold = ?4, start_date = ?5, end_date = ?6
            WHERE id = ?7
            "#,
        )
        .bind(&rule.description)
        .bind(rule.amount_per_night.cents())
        .bind(rule.target)
        .bind(rule.days_threshold)
        .bind(rule.valid_from)
        .bind(rule.valid_to)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaxRule", id));
        }
        Ok(())
    }

    /// Deletes a rule. Returns false if no rule had this id.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        debug!(id, "Deleting tax rule");

        let result = sqlx::query("DELETE FROM local_taxes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<TaxRule>> {
        let rule = sqlx::query_as::<_, TaxRule>(&format!("{SELECT_RULE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rule)
    }

    /// All rules, ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<TaxRule>> {
        let rules = sqlx::query_as::<_, TaxRule>(&format!("{SELECT_RULE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rules)
    }

    /// Rules for `target` whose validity intersects `[from, to]`, by id.
    pub async fn find_overlapping(
        &self,
        target: TargetCategory,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<TaxRule>> {
        let rules = sqlx::query_as::<_, TaxRule>(&format!(
            "{SELECT_RULE} WHERE target = ?1 AND start_date <= ?3 AND end_date >= ?2 ORDER BY id"
        ))
        .bind(target)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        debug!(category = %target, %from, %to, count = rules.len(), "Found overlapping tax rules");
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constraint, Database, DbConfig};
    use roost_core::Money;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(cents: i64, target: TargetCategory, from: NaiveDate, to: NaiveDate) -> NewTaxRule {
        NewTaxRule {
            description: "Florence".to_string(),
            amount_per_night: Money::from_cents(cents),
            target,
            days_threshold: 7,
            valid_from: from,
            valid_to: to,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.local_taxes();

        let id = repo
            .insert(&rule(550, TargetCategory::Adults, d(2023, 4, 1), d(2030, 12, 31)))
            .await
            .unwrap();

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.amount_cents, 550);
        assert_eq!(stored.target, TargetCategory::Adults);
        assert_eq!(stored.start_date, d(2023, 4, 1));
        assert_eq!(stored.end_date, d(2030, 12, 31));
    }

    #[tokio::test]
    async fn test_find_overlapping_is_inclusive_and_ordered() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.local_taxes();

        let new_rate = repo
            .insert(&rule(550, TargetCategory::Adults, d(2023, 4, 1), d(2030, 12, 31)))
            .await
            .unwrap();
        let old_rate = repo
            .insert(&rule(400, TargetCategory::Adults, d(2020, 1, 1), d(2023, 3, 31)))
            .await
            .unwrap();
        repo.insert(&rule(550, TargetCategory::Children, d(2023, 4, 1), d(2030, 12, 31)))
            .await
            .unwrap();

        // Touches the old rule only on its last day
        let found = repo
            .find_overlapping(TargetCategory::Adults, d(2023, 3, 31), d(2023, 4, 3))
            .await
            .unwrap();
        let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![new_rate, old_rate]);

        let found = repo
            .find_overlapping(TargetCategory::Adults, d(2024, 1, 1), d(2024, 1, 5))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, new_rate);

        let none = repo
            .find_overlapping(TargetCategory::Infants, d(2024, 1, 1), d(2024, 1, 5))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.local_taxes();

        let id = repo
            .insert(&rule(400, TargetCategory::Adults, d(2020, 1, 1), d(2023, 3, 31)))
            .await
            .unwrap();

        repo.update(id, &rule(450, TargetCategory::Adults, d(2020, 1, 1), d(2023, 3, 31)))
            .await
            .unwrap();
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().amount_cents, 450);

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());

        let missing = repo
            .update(id, &rule(450, TargetCategory::Adults, d(2020, 1, 1), d(2023, 3, 31)))
            .await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_schema_rejects_negative_amount() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .local_taxes()
            .insert(&rule(-1, TargetCategory::Adults, d(2020, 1, 1), d(2023, 3, 31)))
            .await;
        assert!(result.unwrap_err().is_constraint(Constraint::Check));
    }
}
