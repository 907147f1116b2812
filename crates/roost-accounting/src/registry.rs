//! # Local Tax Registry
//!
//! Durable store of city-tax rules, validated before every write.
//!
//! ## Overlap Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rule      [valid_from ─────────────── valid_to]     (inclusive)        │
//! │  query              [start ─────────────────── end]  (inclusive)        │
//! │                                                                         │
//! │  match  ⇔  valid_from ≤ end  AND  valid_to ≥ start                      │
//! │                                                                         │
//! │  Results are ordered by rule id. The declaration counts guests on the  │
//! │  first rule with taxable nights, so this order is part of the result.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overlapping rules for the same category are accepted; the engine sums
//! them as they are.
//!
//! Writes are crate-private. Outside callers change rules through
//! [`crate::AccountingService`], which re-evaluates the stays a change
//! touches.

use chrono::NaiveDate;
use tracing::info;

use roost_core::tax::RuleSet;
use roost_core::validation::validate_tax_rule;
use roost_core::{NewTaxRule, StayPeriod, TargetCategory, TaxRule, ValidationError};
use roost_db::Database;

use crate::error::{AccountingError, AccountingResult};

#[derive(Debug, Clone)]
pub struct TaxRegistry {
    db: Database,
}

impl TaxRegistry {
    pub fn new(db: Database) -> Self {
        TaxRegistry { db }
    }

    /// Stores a new rule and returns its id.
    pub(crate) async fn add_rule(&self, rule: &NewTaxRule) -> AccountingResult<i64> {
        validate_tax_rule(rule)?;

        let id = self.db.local_taxes().insert(rule).await?;
        info!(
            rule_id = id,
            category = %rule.target,
            amount = %rule.amount_per_night,
            valid_from = %rule.valid_from,
            valid_to = %rule.valid_to,
            "Tax rule added"
        );
        Ok(id)
    }

    /// Replaces every field of an existing rule and returns the rule as it
    /// was before.
    pub(crate) async fn update_rule(&self, id: i64, rule: &NewTaxRule) -> AccountingResult<TaxRule> {
        validate_tax_rule(rule)?;

        let previous = self.get_rule(id).await?;
        self.db.local_taxes().update(id, rule).await?;
        info!(rule_id = id, category = %rule.target, "Tax rule updated");
        Ok(previous)
    }

    /// Deletes a rule, returning it, or `None` if it did not exist.
    pub(crate) async fn remove_rule(&self, id: i64) -> AccountingResult<Option<TaxRule>> {
        let Some(rule) = self.db.local_taxes().get_by_id(id).await? else {
            return Ok(None);
        };
        if !self.db.local_taxes().delete(id).await? {
            return Ok(None);
        }
        info!(rule_id = id, "Tax rule removed");
        Ok(Some(rule))
    }

    pub async fn get_rule(&self, id: i64) -> AccountingResult<TaxRule> {
        self.db
            .local_taxes()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AccountingError::not_found("TaxRule", id))
    }

    pub async fn list_rules(&self) -> AccountingResult<Vec<TaxRule>> {
        Ok(self.db.local_taxes().list_all().await?)
    }

    /// Rules of `target` whose validity intersects `[start, end]`, both ends
    /// inclusive, by id.
    pub async fn rules_for_category(
        &self,
        target: TargetCategory,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AccountingResult<Vec<TaxRule>> {
        if start > end {
            return Err(ValidationError::InvalidDateRange {
                field: "query".to_string(),
                start,
                end,
            }
            .into());
        }

        Ok(self.db.local_taxes().find_overlapping(target, start, end).await?)
    }

    /// Every rule, per category, in force on at least one night of `stay`.
    ///
    /// A rule starting on the departure day taxes no night of the stay and
    /// is left out.
    pub async fn rules_for_stay(&self, stay: &StayPeriod) -> AccountingResult<RuleSet> {
        let mut rules = RuleSet::new();
        let Some(last_night) = stay.end().pred_opt().filter(|_| !stay.is_empty()) else {
            return Ok(rules);
        };

        for category in TargetCategory::ALL {
            let found = self.rules_for_category(category, stay.start(), last_night).await?;
            rules.set_category(category, found);
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_core::Money;
    use roost_db::DbConfig;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(target: TargetCategory, cents: i64, from: NaiveDate, to: NaiveDate) -> NewTaxRule {
        NewTaxRule {
            description: format!("{target} city tax"),
            amount_per_night: Money::from_cents(cents),
            target,
            days_threshold: 7,
            valid_from: from,
            valid_to: to,
        }
    }

    async fn registry() -> TaxRegistry {
        TaxRegistry::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_rules_before_writing() {
        let registry = registry().await;

        let inverted = rule(TargetCategory::Adults, 550, d(2024, 1, 2), d(2024, 1, 1));
        assert!(matches!(
            registry.add_rule(&inverted).await,
            Err(AccountingError::Validation(ValidationError::InvalidDateRange { .. }))
        ));

        let negative = rule(TargetCategory::Adults, -1, d(2024, 1, 1), d(2024, 1, 1));
        assert!(matches!(
            registry.add_rule(&negative).await,
            Err(AccountingError::Validation(ValidationError::MustNotBeNegative { .. }))
        ));

        let mut no_threshold = rule(TargetCategory::Adults, 100, d(2024, 1, 1), d(2024, 1, 1));
        no_threshold.days_threshold = -3;
        assert!(registry.add_rule(&no_threshold).await.is_err());

        assert!(registry.list_rules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_rules_are_permitted() {
        let registry = registry().await;
        registry
            .add_rule(&rule(TargetCategory::Adults, 300, d(2020, 1, 1), d(2030, 12, 31)))
            .await
            .unwrap();
        registry
            .add_rule(&rule(TargetCategory::Adults, 250, d(2020, 1, 1), d(2030, 12, 31)))
            .await
            .unwrap();

        let found = registry
            .rules_for_category(TargetCategory::Adults, d(2023, 4, 1), d(2023, 4, 30))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].id < found[1].id);
    }

    #[tokio::test]
    async fn test_rules_for_stay_excludes_rule_starting_on_departure() {
        let registry = registry().await;
        let old = registry
            .add_rule(&rule(TargetCategory::Adults, 400, d(2020, 1, 1), d(2024, 3, 31)))
            .await
            .unwrap();
        registry
            .add_rule(&rule(TargetCategory::Adults, 550, d(2024, 4, 3), d(2030, 12, 31)))
            .await
            .unwrap();
        registry
            .add_rule(&rule(TargetCategory::Children, 200, d(2020, 1, 1), d(2030, 12, 31)))
            .await
            .unwrap();

        let stay = StayPeriod::new(d(2024, 3, 29), d(2024, 4, 3)).unwrap();
        let rules = registry.rules_for_stay(&stay).await.unwrap();

        let adult_ids: Vec<i64> = rules.for_category(TargetCategory::Adults).iter().map(|r| r.id).collect();
        assert_eq!(adult_ids, vec![old]);
        assert_eq!(rules.for_category(TargetCategory::Children).len(), 1);
        assert!(rules.for_category(TargetCategory::Infants).is_empty());
    }

    #[tokio::test]
    async fn test_update_remove_and_get() {
        let registry = registry().await;
        let id = registry
            .add_rule(&rule(TargetCategory::Infants, 100, d(2024, 1, 1), d(2024, 12, 31)))
            .await
            .unwrap();

        let previous = registry
            .update_rule(id, &rule(TargetCategory::Infants, 0, d(2024, 1, 1), d(2024, 12, 31)))
            .await
            .unwrap();
        assert_eq!(previous.amount_cents, 100);
        assert_eq!(registry.get_rule(id).await.unwrap().amount_cents, 0);

        assert_eq!(registry.remove_rule(id).await.unwrap().map(|r| r.id), Some(id));
        assert!(registry.remove_rule(id).await.unwrap().is_none());
        assert!(matches!(registry.get_rule(id).await, Err(AccountingError::NotFound { .. })));
        assert!(matches!(
            registry
                .update_rule(id, &rule(TargetCategory::Infants, 0, d(2024, 1, 1), d(2024, 12, 31)))
                .await,
            Err(AccountingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_inverted_query_range_is_rejected() {
        let registry = registry().await;
        assert!(matches!(
            registry
                .rules_for_category(TargetCategory::Adults, d(2024, 2, 1), d(2024, 1, 1))
                .await,
            Err(AccountingError::Validation(_))
        ));
    }
}
