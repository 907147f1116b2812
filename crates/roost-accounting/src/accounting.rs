//! # Accounting Service
//!
//! Runs the city-tax engine against the store.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate_local_taxes(reservation)                                      │
//! │       │                                                                 │
//! │       ├── registry.rules_for_stay(stay)                                │
//! │       ├── tax::evaluate_stay(reservation, rules)                       │
//! │       ├── ledger update (city_tax)       ← only writer of this field   │
//! │       ▼                                                                 │
//! │  caller's reservation updated only after the write succeeded           │
//! │                                                                         │
//! │  add_rule / update_rule / remove_rule                                   │
//! │       │                                                                 │
//! │       ├── registry write (validated)                                   │
//! │       ├── stays with a night in the old or new validity                │
//! │       ▼                                                                 │
//! │  evaluate_local_taxes on each of them, blocks skipped                   │
//! │                                                                         │
//! │  evaluate_monthly_declaration(accommodation, month, sink)               │
//! │       │                                                                 │
//! │       ├── accommodation must exist       → NotFound                    │
//! │       ├── stays touching the month, blocks skipped                     │
//! │       ├── DeclarationBuilder per stay (rules over the full stay)       │
//! │       ├── warnings logged                                              │
//! │       ▼                                                                 │
//! │  sink.write(declaration)                 → Report (keeps the result)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Evaluation reads the rules and writes the reservation without a lock. A
//! concurrent writer changing either in between goes unnoticed. A rule
//! change whose re-evaluation fails part way stays stored; `reevaluate_all`
//! brings the stays back in line.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use roost_core::tax::{evaluate_stay, DeclarationBuilder, DeclarationOutcome, StayTax};
use roost_core::{CalendarMonth, Money, NewTaxRule, Reservation, StayPeriod};
use roost_db::Database;

use crate::error::{AccountingError, AccountingResult};
use crate::registry::TaxRegistry;
use crate::report::DeclarationSink;

#[derive(Debug, Clone)]
pub struct AccountingService {
    db: Database,
    registry: TaxRegistry,
    mismatch_tolerance: Money,
}

impl AccountingService {
    pub fn new(db: Database, registry: TaxRegistry, mismatch_tolerance: Money) -> Self {
        AccountingService {
            db,
            registry,
            mismatch_tolerance,
        }
    }

    // =========================================================================
    // Per-Reservation Evaluation
    // =========================================================================

    /// Recomputes and stores the city tax of `reservation`.
    ///
    /// On failure `reservation` is left exactly as it was.
    pub async fn evaluate_local_taxes(&self, reservation: &mut Reservation) -> AccountingResult<Money> {
        let tax = self.quote(reservation).await?;

        let mut updated = reservation.clone();
        updated.city_tax_cents = tax.total().cents();
        self.db.reservations().update(&updated).await?;

        info!(
            reservation_id = updated.id,
            nights = updated.nights(),
            city_tax = %tax.total(),
            "City tax evaluated"
        );

        *reservation = updated;
        Ok(tax.total())
    }

    /// The tax `reservation` owes under the current rules. Nothing is stored.
    pub async fn quote(&self, reservation: &Reservation) -> AccountingResult<StayTax> {
        let rules = self.registry.rules_for_stay(&reservation.stay()).await?;
        Ok(evaluate_stay(reservation, &rules)?)
    }

    /// Loads, evaluates and returns one reservation.
    pub async fn evaluate_reservation(&self, id: i64) -> AccountingResult<Reservation> {
        let mut reservation = self
            .db
            .reservations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AccountingError::not_found("Reservation", id))?;

        self.evaluate_local_taxes(&mut reservation).await?;
        Ok(reservation)
    }

    /// Re-evaluates every stored stay, e.g. after a rule change.
    /// Unavailability blocks are skipped. Returns how many were evaluated.
    pub async fn reevaluate_all(&self) -> AccountingResult<usize> {
        let mut count = 0;
        for mut reservation in self.db.reservations().list_all().await? {
            if reservation.is_unavailability_block() {
                continue;
            }
            self.evaluate_local_taxes(&mut reservation).await?;
            count += 1;
        }
        info!(count, "All reservations re-evaluated");
        Ok(count)
    }

    // =========================================================================
    // Rule Changes
    // =========================================================================

    /// Stores a rule and re-evaluates the stays it applies to.
    pub async fn add_rule(&self, rule: &NewTaxRule) -> AccountingResult<i64> {
        let id = self.registry.add_rule(rule).await?;
        self.refresh(&[StayPeriod::from_inclusive(rule.valid_from, rule.valid_to)])
            .await?;
        Ok(id)
    }

    /// Replaces a rule and re-evaluates the stays under its old or new
    /// validity.
    pub async fn update_rule(&self, id: i64, rule: &NewTaxRule) -> AccountingResult<()> {
        let previous = self.registry.update_rule(id, rule).await?;
        self.refresh(&[
            previous.validity(),
            StayPeriod::from_inclusive(rule.valid_from, rule.valid_to),
        ])
        .await?;
        Ok(())
    }

    /// Deletes a rule and re-evaluates the stays it applied to. Returns false
    /// if it did not exist.
    pub async fn remove_rule(&self, id: i64) -> AccountingResult<bool> {
        let Some(removed) = self.registry.remove_rule(id).await? else {
            return Ok(false);
        };
        self.refresh(&[removed.validity()]).await?;
        Ok(true)
    }

    /// Re-evaluates every stay with a night inside one of `windows`.
    async fn refresh(&self, windows: &[StayPeriod]) -> AccountingResult<usize> {
        let mut affected = BTreeMap::new();
        for window in windows {
            let touching = self
                .db
                .reservations()
                .list_in_period(window.start(), window.end())
                .await?;
            for reservation in touching {
                affected.entry(reservation.id).or_insert(reservation);
            }
        }

        let mut count = 0;
        for mut reservation in affected.into_values() {
            if reservation.is_unavailability_block() {
                continue;
            }
            self.evaluate_local_taxes(&mut reservation).await?;
            count += 1;
        }
        debug!(count, "Stays re-evaluated after rule change");
        Ok(count)
    }

    // =========================================================================
    // Monthly Declaration
    // =========================================================================

    /// Builds the declaration of one accommodation and month without
    /// writing it anywhere.
    pub async fn compute_monthly_declaration(
        &self,
        accommodation_id: i64,
        month: CalendarMonth,
    ) -> AccountingResult<DeclarationOutcome> {
        if self.db.accommodations().get_by_id(accommodation_id).await?.is_none() {
            return Err(AccountingError::not_found("Accommodation", accommodation_id));
        }

        let reservations = self
            .db
            .reservations()
            .list_overlapping(accommodation_id, month.first_day(), month.next_month_start())
            .await?;

        let mut builder = DeclarationBuilder::new(accommodation_id, month);
        for reservation in reservations.iter().filter(|r| !r.is_unavailability_block()) {
            let rules = self.registry.rules_for_stay(&reservation.stay()).await?;
            builder.add_reservation(reservation, &rules)?;
        }

        let outcome = builder.finish(self.mismatch_tolerance);
        for warning in &outcome.warnings {
            warn!(accommodation_id, month = %month, "{}", warning);
        }
        Ok(outcome)
    }

    /// Builds the declaration and hands it to `sink`.
    ///
    /// If the sink fails, the error still carries the computed outcome.
    pub async fn evaluate_monthly_declaration(
        &self,
        accommodation_id: i64,
        month: CalendarMonth,
        sink: &mut dyn DeclarationSink,
    ) -> AccountingResult<DeclarationOutcome> {
        let outcome = self.compute_monthly_declaration(accommodation_id, month).await?;
        let declaration = &outcome.declaration;

        info!(
            accommodation_id,
            month = %month,
            reservations = outcome.reservations,
            total_city_tax = %declaration.total_city_tax,
            total_guests = declaration.total_guests,
            total_nights = declaration.total_nights,
            total_evaluated = %declaration.total_evaluated,
            "Monthly declaration computed"
        );

        match sink.write(declaration) {
            Ok(()) => Ok(outcome),
            Err(source) => Err(AccountingError::Report {
                source,
                declaration: Box::new(outcome),
            }),
        }
    }
}
