//! # City Tax Math
//!
//! Pure evaluation of local (city) taxes: what a single stay owes, and how
//! the stays touching one calendar month add up into a declaration.
//!
//! ## Per-Stay Evaluation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stay        [A ─────────────────────────────── D)                      │
//! │  rule 4.00   [──────────── valid_to]                                    │
//! │  rule 5.50                          [valid_from ──────────────── ...    │
//! │                                                                         │
//! │  per guest = Σ rate × nights(rule ∩ stay)                               │
//! │  total     = adults × per_adult + children × per_child                  │
//! │              + infants × per_infant                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overlapping rules of the same category are summed as they are; nights
//! covered twice are taxed twice.
//!
//! ## Monthly Declaration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  month            [1st ───────────────────────── next 1st)             │
//! │  stay      [A ───────────── D)                                          │
//! │  window           [1st ──── D)        stay ∩ month                      │
//! │                                                                         │
//! │  consumed = 1st - A        nights already used before this month        │
//! │  nights   = min(rule ∩ window, threshold, threshold - consumed)         │
//! │                                                                         │
//! │  evaluated += rate × nights × population                                │
//! │  guests/nights counted once per category (first rule with nights > 0)   │
//! │  declared  += stored city tax × share of taxable window in month        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::period::{days_between, CalendarMonth, StayPeriod};
use crate::types::{Reservation, TargetCategory, TaxRule};
use crate::warnings::ReconciliationWarning;

// =============================================================================
// Rule Set
// =============================================================================

/// Tax rules grouped by target category, each group ordered by rule id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    adults: Vec<TaxRule>,
    children: Vec<TaxRule>,
    infants: Vec<TaxRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups `rules` by category.
    pub fn from_rules(rules: impl IntoIterator<Item = TaxRule>) -> Self {
        let mut set = RuleSet::new();
        for rule in rules {
            set.bucket_mut(rule.target).push(rule);
        }
        for category in TargetCategory::ALL {
            set.bucket_mut(category).sort_by_key(|r| r.id);
        }
        set
    }

    /// Replaces the rules of one category. Rules whose target differs are
    /// dropped.
    pub fn set_category(&mut self, category: TargetCategory, rules: Vec<TaxRule>) {
        let mut rules: Vec<TaxRule> = rules.into_iter().filter(|r| r.target == category).collect();
        rules.sort_by_key(|r| r.id);
        *self.bucket_mut(category) = rules;
    }

    pub fn for_category(&self, category: TargetCategory) -> &[TaxRule] {
        match category {
            TargetCategory::Adults => &self.adults,
            TargetCategory::Children => &self.children,
            TargetCategory::Infants => &self.infants,
        }
    }

    pub fn len(&self) -> usize {
        self.adults.len() + self.children.len() + self.infants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_mut(&mut self, category: TargetCategory) -> &mut Vec<TaxRule> {
        match category {
            TargetCategory::Adults => &mut self.adults,
            TargetCategory::Children => &mut self.children,
            TargetCategory::Infants => &mut self.infants,
        }
    }
}

// =============================================================================
// Per-Stay Evaluation
// =============================================================================

/// Tax owed by one guest category for a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTax {
    pub category: TargetCategory,
    /// What a single guest of this category owes for the stay.
    pub per_guest: Money,
    pub guests: i64,
    pub amount: Money,
}

/// Breakdown of the tax owed for one stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayTax {
    pub lines: Vec<CategoryTax>,
}

impl StayTax {
    pub fn total(&self) -> Money {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// Overflow-checked `amount × factor` on behalf of `reservation_id`.
fn times(amount: Money, factor: i64, reservation_id: i64) -> CoreResult<Money> {
    amount
        .checked_mul(factor)
        .ok_or(CoreError::TaxOverflow { reservation_id })
}

fn plus(a: Money, b: Money, reservation_id: i64) -> CoreResult<Money> {
    a.checked_add(b).ok_or(CoreError::TaxOverflow { reservation_id })
}

/// Computes the city tax owed for a whole stay.
///
/// No day-count threshold is applied here: every night each rule covers is
/// taxed. Amounts that overflow `i64` cents fail with
/// [`CoreError::TaxOverflow`].
pub fn evaluate_stay(reservation: &Reservation, rules: &RuleSet) -> CoreResult<StayTax> {
    reservation.check_guest_breakdown()?;
    let stay = reservation.stay();
    let id = reservation.id;

    let mut lines = Vec::with_capacity(TargetCategory::ALL.len());
    for category in TargetCategory::ALL {
        let mut per_guest = Money::zero();
        for rule in rules.for_category(category) {
            let charge = times(rule.amount_per_night(), rule.nights_within(&stay), id)?;
            per_guest = plus(per_guest, charge, id)?;
        }
        let guests = reservation.population(category);
        lines.push(CategoryTax {
            category,
            per_guest,
            guests,
            amount: times(per_guest, guests, id)?,
        });
    }

    // StayTax::total sums these unchecked
    lines
        .iter()
        .try_fold(Money::zero(), |acc, line| plus(acc, line.amount, id))?;

    Ok(StayTax { lines })
}

// =============================================================================
// Monthly Declaration
// =============================================================================

/// Aggregate city-tax figures for one accommodation and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub accommodation_id: i64,
    pub month: CalendarMonth,
    /// Stored per-reservation tax, apportioned to this month.
    pub total_city_tax: Money,
    pub total_guests: i64,
    pub total_nights: i64,
    /// Tax recomputed from the rules for the nights inside this month.
    pub total_evaluated: Money,
}

impl Declaration {
    pub fn empty(accommodation_id: i64, month: CalendarMonth) -> Self {
        Declaration {
            accommodation_id,
            month,
            total_city_tax: Money::zero(),
            total_guests: 0,
            total_nights: 0,
            total_evaluated: Money::zero(),
        }
    }
}

/// A finished declaration together with the warnings raised building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationOutcome {
    pub declaration: Declaration,
    pub warnings: Vec<ReconciliationWarning>,
    /// Reservations that touched the month.
    pub reservations: usize,
}

impl DeclarationOutcome {
    pub fn has_mismatch(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ReconciliationWarning::TotalsMismatch { .. }))
    }
}

/// Nights of `window` a rule may still tax this month.
///
/// `consumed` is the number of stay nights that fell before the month
/// (negative when the stay starts inside it).
fn taxable_nights(rule: &TaxRule, window: &StayPeriod, consumed: i64) -> i64 {
    let threshold = rule.days_threshold;
    rule.nights_within(window)
        .min(threshold)
        .min(threshold - consumed)
        .max(0)
}

/// Share of the stored stay tax that belongs to `month`.
///
/// The taxable window is the first `min(stay, threshold)` nights of the stay;
/// the share is the part of that window inside the month.
fn apportion_stored(reservation: &Reservation, rule: &TaxRule, month: &StayPeriod) -> Money {
    let stay = reservation.stay();
    let total_length = stay.nights().min(rule.days_threshold);
    if total_length <= 0 {
        return Money::zero();
    }
    let in_month = stay.truncate(total_length).overlap_nights(month);
    reservation.city_tax().apportion(in_month, total_length)
}

/// Accumulates reservations into a monthly [`Declaration`].
///
/// ## Usage
/// ```rust
/// use roost_core::tax::DeclarationBuilder;
/// use roost_core::{CalendarMonth, Money};
///
/// let month = CalendarMonth::new(2023, 4).unwrap();
/// let outcome = DeclarationBuilder::new(1, month).finish(Money::zero());
/// assert_eq!(outcome.declaration.total_guests, 0);
/// assert!(outcome.warnings.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DeclarationBuilder {
    declaration: Declaration,
    warnings: Vec<ReconciliationWarning>,
    reservations: usize,
}

impl DeclarationBuilder {
    pub fn new(accommodation_id: i64, month: CalendarMonth) -> Self {
        DeclarationBuilder {
            declaration: Declaration::empty(accommodation_id, month),
            warnings: Vec::new(),
            reservations: 0,
        }
    }

    /// Adds one reservation.
    ///
    /// `rules` must hold every rule overlapping the reservation's full stay;
    /// rules outside the month simply contribute no nights. Reservations that
    /// do not touch the month are ignored.
    pub fn add_reservation(&mut self, reservation: &Reservation, rules: &RuleSet) -> CoreResult<()> {
        reservation.check_guest_breakdown()?;

        let month = self.declaration.month;
        let month_period = month.period();
        let Some(window) = reservation.stay().intersect(&month_period) else {
            return Ok(());
        };
        let id = reservation.id;
        let consumed = days_between(reservation.arrival_date, month.first_day());
        let mut stored_apportioned = false;
        let mut totals = self.declaration.clone();
        let mut rate_change = None;

        for category in TargetCategory::ALL {
            let population = reservation.population(category);
            let category_rules = rules.for_category(category);
            let mut guests_counted = false;
            let mut per_guest = Money::zero();

            for rule in category_rules {
                let nights = taxable_nights(rule, &window, consumed);
                if nights <= 0 {
                    continue;
                }
                if !guests_counted {
                    totals.total_guests += population;
                    totals.total_nights = nights
                        .checked_mul(population)
                        .and_then(|n| totals.total_nights.checked_add(n))
                        .ok_or(CoreError::TaxOverflow { reservation_id: id })?;
                    guests_counted = true;
                    if category == TargetCategory::Adults && category_rules.len() > 1 {
                        rate_change = Some(ReconciliationWarning::RateChangedDuringStay {
                            reservation_id: id,
                            adult_rules: category_rules.len(),
                        });
                    }
                }
                if !stored_apportioned {
                    let share = apportion_stored(reservation, rule, &month_period);
                    totals.total_city_tax = plus(totals.total_city_tax, share, id)?;
                    stored_apportioned = true;
                }
                per_guest = plus(per_guest, times(rule.amount_per_night(), nights, id)?, id)?;
            }

            let evaluated = times(per_guest, population, id)?;
            totals.total_evaluated = plus(totals.total_evaluated, evaluated, id)?;
        }

        // Totals and warnings change together or not at all.
        self.declaration = totals;
        self.warnings.extend(rate_change);
        self.reservations += 1;
        Ok(())
    }

    /// Closes the declaration, flagging a mismatch when evaluated and
    /// declared totals differ by more than `tolerance`.
    pub fn finish(mut self, tolerance: Money) -> DeclarationOutcome {
        let evaluated = self.declaration.total_evaluated;
        let declared = self.declaration.total_city_tax;
        if (evaluated - declared).abs() > tolerance.abs() {
            self.warnings
                .push(ReconciliationWarning::TotalsMismatch { evaluated, declared });
        }
        DeclarationOutcome {
            declaration: self.declaration,
            warnings: self.warnings,
            reservations: self.reservations,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(
        id: i64,
        cents: i64,
        target: TargetCategory,
        threshold: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaxRule {
        TaxRule {
            id,
            description: format!("rule {id}"),
            amount_cents: cents,
            target,
            days_threshold: threshold,
            start_date: from,
            end_date: to,
        }
    }

    fn stay(
        id: i64,
        arrival: NaiveDate,
        departure: NaiveDate,
        guests: i64,
        children: i64,
        infants: i64,
    ) -> Reservation {
        Reservation {
            id,
            accommodation_id: 1,
            customer_id: 1,
            arrival_date: arrival,
            departure_date: departure,
            guests,
            children,
            infants,
            price_cents: 10000,
            city_tax_cents: 0,
            booked_on: arrival,
        }
    }

    /// Florence: 4.00 until 2023-03-31, 5.50 from 2023-04-01, threshold 7.
    fn florence() -> RuleSet {
        let mut rules = Vec::new();
        let mut id = 0;
        for target in TargetCategory::ALL {
            id += 1;
            rules.push(rule(id, 550, target, 7, d(2023, 4, 1), d(2030, 12, 31)));
            id += 1;
            rules.push(rule(id, 400, target, 7, d(2020, 1, 1), d(2023, 3, 31)));
        }
        RuleSet::from_rules(rules)
    }

    /// Flat rate for adults and children over a long window.
    fn flat(cents: i64, threshold: i64) -> RuleSet {
        RuleSet::from_rules(vec![
            rule(1, cents, TargetCategory::Adults, threshold, d(2020, 1, 1), d(2031, 1, 1)),
            rule(2, cents, TargetCategory::Children, threshold, d(2020, 1, 1), d(2031, 1, 1)),
        ])
    }

    fn april_2023() -> CalendarMonth {
        CalendarMonth::new(2023, 4).unwrap()
    }

    // -------------------------------------------------------------------------
    // RuleSet
    // -------------------------------------------------------------------------

    #[test]
    fn test_rule_set_groups_and_orders_by_id() {
        let set = RuleSet::from_rules(vec![
            rule(9, 100, TargetCategory::Adults, 7, d(2020, 1, 1), d(2020, 12, 31)),
            rule(3, 100, TargetCategory::Children, 7, d(2020, 1, 1), d(2020, 12, 31)),
            rule(2, 100, TargetCategory::Adults, 7, d(2020, 1, 1), d(2020, 12, 31)),
        ]);
        let ids: Vec<i64> = set.for_category(TargetCategory::Adults).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 9]);
        assert_eq!(set.for_category(TargetCategory::Children).len(), 1);
        assert!(set.for_category(TargetCategory::Infants).is_empty());
        assert_eq!(set.len(), 3);
    }

    // -------------------------------------------------------------------------
    // Per-stay evaluation
    // -------------------------------------------------------------------------

    #[test]
    fn test_single_rule_is_rate_times_nights_times_population() {
        let reservation = stay(1, d(2024, 5, 1), d(2024, 5, 4), 5, 2, 1);
        let tax = evaluate_stay(&reservation, &flat(300, 7)).unwrap();

        // 3 nights × 3.00 × (2 adults + 2 children), infants have no rule
        assert_eq!(tax.total().cents(), 300 * 3 * 4);
        assert_eq!(tax.lines[0].guests, 2);
        assert_eq!(tax.lines[0].per_guest.cents(), 900);
        assert_eq!(tax.lines[2].amount, Money::zero());
    }

    #[test]
    fn test_rate_change_before_stay_uses_new_rate_only() {
        // 2024-03-29 → 2024-04-03 sits entirely after the 2023 change
        let reservation = stay(1, d(2024, 3, 29), d(2024, 4, 3), 4, 2, 0);
        let tax = evaluate_stay(&reservation, &florence()).unwrap();

        let adults = tax.lines[0];
        assert_eq!(adults.amount.to_string(), "55.00");
        let children = tax.lines[1];
        assert_eq!(children.amount.to_string(), "55.00");
        assert_eq!(tax.total().to_string(), "110.00");
    }

    #[test]
    fn test_rate_change_mid_stay_splits_nights() {
        // Mar 29, 30, 31 at 4.00 then Apr 1, 2 at 5.50
        let reservation = stay(1, d(2023, 3, 29), d(2023, 4, 3), 1, 0, 0);
        let tax = evaluate_stay(&reservation, &florence()).unwrap();
        assert_eq!(tax.total().cents(), 3 * 400 + 2 * 550);
    }

    #[test]
    fn test_rule_ending_on_last_night_counts_it() {
        let rules = RuleSet::from_rules(vec![rule(
            1,
            200,
            TargetCategory::Adults,
            30,
            d(2024, 1, 1),
            d(2024, 1, 9),
        )]);
        // Last taxed night is Jan 9
        let reservation = stay(1, d(2024, 1, 5), d(2024, 1, 10), 1, 0, 0);
        let tax = evaluate_stay(&reservation, &rules).unwrap();
        assert_eq!(tax.total().cents(), 5 * 200);
    }

    #[test]
    fn test_overlapping_rules_are_summed() {
        let rules = RuleSet::from_rules(vec![
            rule(1, 300, TargetCategory::Adults, 7, d(2020, 1, 1), d(2031, 1, 1)),
            rule(2, 250, TargetCategory::Adults, 7, d(2020, 1, 1), d(2031, 1, 1)),
        ]);
        let reservation = stay(1, d(2024, 1, 1), d(2024, 1, 3), 2, 0, 0);
        let tax = evaluate_stay(&reservation, &rules).unwrap();
        assert_eq!(tax.total().cents(), (300 + 250) * 2 * 2);
    }

    #[test]
    fn test_amount_does_not_depend_on_rule_order() {
        let a = rule(1, 300, TargetCategory::Adults, 7, d(2020, 1, 1), d(2024, 1, 2));
        let b = rule(2, 500, TargetCategory::Adults, 7, d(2024, 1, 3), d(2031, 1, 1));
        let reservation = stay(1, d(2024, 1, 1), d(2024, 1, 6), 2, 0, 0);

        let forward = evaluate_stay(&reservation, &RuleSet::from_rules(vec![a.clone(), b.clone()])).unwrap();
        let backward = evaluate_stay(&reservation, &RuleSet::from_rules(vec![b, a])).unwrap();
        assert_eq!(forward.total(), backward.total());
        assert_eq!(forward.total().cents(), (2 * 300 + 3 * 500) * 2);
    }

    #[test]
    fn test_bad_breakdown_is_rejected() {
        let reservation = stay(1, d(2024, 1, 1), d(2024, 1, 3), 1, 1, 1);
        assert!(evaluate_stay(&reservation, &flat(300, 7)).is_err());
    }

    // -------------------------------------------------------------------------
    // Monthly declaration
    // -------------------------------------------------------------------------

    fn declare(reservations: &[Reservation], rules: &RuleSet) -> DeclarationOutcome {
        let mut builder = DeclarationBuilder::new(1, april_2023());
        for r in reservations {
            builder.add_reservation(r, rules).unwrap();
        }
        builder.finish(Money::zero())
    }

    fn with_stored_tax(mut r: Reservation, rules: &RuleSet) -> Reservation {
        r.city_tax_cents = evaluate_stay(&r, rules).unwrap().total().cents();
        r
    }

    #[test]
    fn test_empty_month_is_all_zero() {
        let outcome = declare(&[], &flat(550, 7));
        assert_eq!(outcome.declaration, Declaration::empty(1, april_2023()));
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.reservations, 0);
    }

    #[test]
    fn test_stay_outside_month_is_ignored() {
        let rules = flat(550, 7);
        let march = with_stored_tax(stay(1, d(2023, 3, 25), d(2023, 4, 1), 2, 0, 0), &rules);
        let outcome = declare(&[march], &rules);
        assert_eq!(outcome.reservations, 0);
        assert_eq!(outcome.declaration.total_guests, 0);
    }

    #[test]
    fn test_threshold_boundary() {
        let rules = flat(100, 7);

        let exact = stay(1, d(2023, 4, 1), d(2023, 4, 8), 1, 0, 0);
        let outcome = declare(&[exact], &rules);
        assert_eq!(outcome.declaration.total_nights, 7);
        assert_eq!(outcome.declaration.total_evaluated.cents(), 700);

        let one_more = stay(2, d(2023, 4, 10), d(2023, 4, 18), 1, 0, 0);
        let outcome = declare(&[one_more], &rules);
        assert_eq!(outcome.declaration.total_nights, 7);
        assert_eq!(outcome.declaration.total_evaluated.cents(), 700);
    }

    #[test]
    fn test_threshold_carries_over_from_previous_month() {
        let rules = flat(100, 7);
        // Mar 29, 30, 31 consumed 3 of 7 nights, 4 remain in April
        let r = with_stored_tax(stay(1, d(2023, 3, 29), d(2023, 4, 10), 2, 0, 0), &rules);
        let stored = r.city_tax_cents;
        let outcome = declare(&[r], &rules);
        assert_eq!(outcome.declaration.total_nights, 4 * 2);
        assert_eq!(outcome.declaration.total_guests, 2);
        assert_eq!(outcome.declaration.total_evaluated.cents(), 4 * 100 * 2);

        // Stored 24.00 covers all 12 nights; April holds 4 of the first 7.
        assert_eq!(stored, 2400);
        assert_eq!(outcome.declaration.total_city_tax.cents(), 1371);
        assert!(outcome.has_mismatch());
    }

    #[test]
    fn test_threshold_elapsed_before_month() {
        let rules = flat(100, 7);
        let r = with_stored_tax(stay(1, d(2023, 3, 20), d(2023, 4, 5), 2, 0, 0), &rules);
        let outcome = declare(&[r], &rules);
        assert_eq!(outcome.reservations, 1);
        assert_eq!(outcome.declaration.total_nights, 0);
        assert_eq!(outcome.declaration.total_guests, 0);
        assert_eq!(outcome.declaration.total_evaluated, Money::zero());
        assert_eq!(outcome.declaration.total_city_tax, Money::zero());
    }

    #[test]
    fn test_no_rate_change_warning_without_taxable_nights() {
        let rules = RuleSet::from_rules(vec![
            rule(1, 100, TargetCategory::Adults, 7, d(2020, 1, 1), d(2023, 3, 31)),
            rule(2, 200, TargetCategory::Adults, 7, d(2023, 4, 1), d(2031, 1, 1)),
        ]);
        // Seven nights used up in March, nothing left to tax in April
        let r = with_stored_tax(stay(3, d(2023, 3, 20), d(2023, 4, 5), 2, 0, 0), &rules);
        let outcome = declare(&[r], &rules);

        assert_eq!(outcome.reservations, 1);
        assert_eq!(outcome.declaration.total_nights, 0);
        assert!(!outcome
            .warnings
            .iter()
            .any(|w| matches!(w, ReconciliationWarning::RateChangedDuringStay { .. })));
    }

    #[test]
    fn test_overflowing_rate_is_an_error() {
        let rules = RuleSet::from_rules(vec![rule(
            1,
            i64::MAX / 2 + 1,
            TargetCategory::Adults,
            7,
            d(2020, 1, 1),
            d(2031, 1, 1),
        )]);
        let r = stay(9, d(2023, 4, 1), d(2023, 4, 3), 1, 0, 0);

        assert!(matches!(
            evaluate_stay(&r, &rules),
            Err(CoreError::TaxOverflow { reservation_id: 9 })
        ));

        let mut builder = DeclarationBuilder::new(1, april_2023());
        assert!(builder.add_reservation(&r, &rules).is_err());
        let outcome = builder.finish(Money::zero());
        assert_eq!(outcome.reservations, 0);
        assert_eq!(outcome.declaration, Declaration::empty(1, april_2023()));
    }

    #[test]
    fn test_stored_tax_apportioned_across_months() {
        let rules = flat(550, 7);
        // 5 nights, 2 in April
        let starts_in_march = with_stored_tax(stay(1, d(2023, 3, 29), d(2023, 4, 3), 2, 0, 0), &rules);
        // 4 nights, 2 in April
        let ends_in_may = with_stored_tax(stay(2, d(2023, 4, 29), d(2023, 5, 3), 4, 0, 0), &rules);

        let outcome = declare(&[starts_in_march, ends_in_may], &rules);
        let declaration = &outcome.declaration;
        assert_eq!(declaration.total_city_tax.cents(), 2200 + 4400);
        assert_eq!(declaration.total_evaluated, declaration.total_city_tax);
        assert_eq!(declaration.total_nights, 2 * 2 + 2 * 4);
        assert_eq!(declaration.total_guests, 6);
        assert!(!outcome.has_mismatch());
    }

    #[test]
    fn test_guests_counted_once_with_overlapping_rules() {
        let rules = RuleSet::from_rules(vec![
            rule(1, 300, TargetCategory::Adults, 7, d(2020, 1, 1), d(2031, 1, 1)),
            rule(2, 250, TargetCategory::Adults, 7, d(2020, 1, 1), d(2031, 1, 1)),
        ]);
        let r = with_stored_tax(stay(7, d(2023, 4, 3), d(2023, 4, 6), 2, 0, 0), &rules);
        let outcome = declare(&[r], &rules);

        assert_eq!(outcome.declaration.total_guests, 2);
        assert_eq!(outcome.declaration.total_nights, 6);
        assert_eq!(outcome.declaration.total_evaluated.cents(), 550 * 3 * 2);
        assert!(outcome.warnings.contains(&ReconciliationWarning::RateChangedDuringStay {
            reservation_id: 7,
            adult_rules: 2,
        }));
        assert!(!outcome.has_mismatch());
    }

    #[test]
    fn test_mismatch_is_flagged_but_totals_kept() {
        let rules = flat(550, 7);
        let mut r = stay(1, d(2023, 4, 3), d(2023, 4, 6), 2, 0, 0);
        r.city_tax_cents = 1000;
        let outcome = declare(&[r], &rules);

        assert_eq!(outcome.declaration.total_city_tax.cents(), 1000);
        assert_eq!(outcome.declaration.total_evaluated.cents(), 3300);
        assert!(outcome.warnings.contains(&ReconciliationWarning::TotalsMismatch {
            evaluated: Money::from_cents(3300),
            declared: Money::from_cents(1000),
        }));
    }

    #[test]
    fn test_tolerance_absorbs_small_differences() {
        let rules = flat(550, 7);
        let mut r = stay(1, d(2023, 4, 3), d(2023, 4, 6), 2, 0, 0);
        r.city_tax_cents = 3299;

        let mut builder = DeclarationBuilder::new(1, april_2023());
        builder.add_reservation(&r, &rules).unwrap();
        assert!(!builder.clone().finish(Money::from_cents(1)).has_mismatch());
        assert!(builder.finish(Money::zero()).has_mismatch());
    }
}
