//! Non-fatal findings raised while reconciling a monthly declaration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// Warnings emitted during declaration reconciliation.
///
/// The declaration still completes when any of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReconciliationWarning {
    /// More than one adult rule covers the stay, so the guest and night
    /// totals are approximate for this reservation.
    RateChangedDuringStay {
        reservation_id: i64,
        adult_rules: usize,
    },
    /// The recomputed tax differs from the apportioned stored tax.
    TotalsMismatch { evaluated: Money, declared: Money },
}

impl fmt::Display for ReconciliationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationWarning::RateChangedDuringStay {
                reservation_id,
                adult_rules,
            } => write!(
                f,
                "reservation {reservation_id} spans {adult_rules} adult tax rules, totals are approximate"
            ),
            ReconciliationWarning::TotalsMismatch {
                evaluated,
                declared,
            } => write!(
                f,
                "evaluated city tax {evaluated} differs from declared city tax {declared}"
            ),
        }
    }
}
