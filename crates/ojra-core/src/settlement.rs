//! # Settlement Engine
//!
//! Turns a payment event into updated seat records, and keeps track of the
//! change owed back to passengers who overpaid.
//!
//! ## Payment Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Passenger 1 pays 50.00 for seats {1, 2}, fare 10.00                    │
//! │                                                                         │
//! │  n          = |covered| + 1                = 2                          │
//! │  per_person = min(round2(50 / 2), 10)      = 10.00                      │
//! │  remainder  = 50 − 10 × 2                  = 30.00                      │
//! │                                                                         │
//! │  seat 1 (payer)   paid = 10 + 30 = 40.00   paid_for = [2]               │
//! │  seat 2 (covered) paid = 10.00             paid_by  = 1                 │
//! │                                                                         │
//! │  Overpayment always lands on the payer, never spread over co-riders.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Special Payments
//! A special payment is a free-form amount for the payer alone: the
//! per-person requirement collapses to the amount itself, nobody else is
//! touched and the seat is excluded from change calculations.
//!
//! ## Atomicity
//! Every function clones the ledger, applies all updates to the clone and
//! returns it. A failure returns `Err` before anything escapes, so a payer
//! can never be updated without its covered seats.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::trip::Ledger;
use crate::types::PassengerId;
use crate::validation::{validate_change_amount, validate_payment_amount};

// =============================================================================
// Payment Event
// =============================================================================

/// How a payment relates to the fare.
///
/// Covering other seats and paying a custom amount are mutually exclusive,
/// so they are separate variants rather than a flag next to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentMode {
    /// Split against the fare; `covered_ids` are other seats paid for.
    Standard {
        #[serde(default, rename = "coveredIds")]
        covered_ids: Vec<PassengerId>,
    },
    /// Free-form amount for the payer only.
    Special,
}

impl PaymentMode {
    /// A standard payment for the payer alone.
    pub fn solo() -> Self {
        PaymentMode::Standard {
            covered_ids: Vec::new(),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, PaymentMode::Special)
    }

    /// Covered seats; always empty for special payments.
    pub fn covered_ids(&self) -> &[PassengerId] {
        match self {
            PaymentMode::Standard { covered_ids } => covered_ids,
            PaymentMode::Special => &[],
        }
    }
}

/// A payment submitted by one passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub payer_id: PassengerId,
    pub amount: Money,
    pub mode: PaymentMode,
}

impl PaymentEvent {
    /// A payment covering the payer and, optionally, other seats.
    pub fn standard(payer_id: PassengerId, amount: Money, covered_ids: Vec<PassengerId>) -> Self {
        PaymentEvent {
            payer_id,
            amount,
            mode: PaymentMode::Standard { covered_ids },
        }
    }

    /// A free-form payment for the payer only.
    pub fn special(payer_id: PassengerId, amount: Money) -> Self {
        PaymentEvent {
            payer_id,
            amount,
            mode: PaymentMode::Special,
        }
    }
}

/// How a payment amount was divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Parties covered, payer included.
    pub parties: u32,
    /// Amount recorded on each covered seat.
    pub per_person: Money,
    /// What is left after the equal split; added to the payer.
    pub remainder: Money,
}

impl Allocation {
    /// Amount recorded on the payer's own seat.
    pub fn payer_share(&self) -> Money {
        self.per_person + self.remainder
    }
}

/// Computes the split of `amount` over `parties` seats, capped at `fare` each.
///
/// ## Example
/// ```rust
/// use ojra_core::money::Money;
/// use ojra_core::settlement::allocate;
///
/// let split = allocate(Money::from_major(100), 1, Money::from_major(30));
/// assert_eq!(split.per_person, Money::from_major(30));
/// assert_eq!(split.remainder, Money::from_major(70));
/// assert_eq!(split.payer_share(), Money::from_major(100));
/// ```
pub fn allocate(amount: Money, parties: u32, fare: Money) -> Allocation {
    let parties = parties.max(1);
    let per_person = amount.split_even(parties).min(fare);
    let remainder = amount - per_person.times(parties);

    Allocation {
        parties,
        per_person,
        remainder,
    }
}

/// Drops duplicates while keeping the order seats were picked in.
fn distinct(ids: &[PassengerId]) -> Vec<PassengerId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

// =============================================================================
// Record Payment
// =============================================================================

/// Applies a payment event to the ledger.
///
/// ## Rules
/// - Zero or over-limit amounts are rejected
/// - Payer and every covered id must be in the ledger; the payer may not
///   cover itself
/// - Covered seats get `per_person` and `paid_by = payer`; their own
///   `paid_for` / special flag are left alone
/// - The payer gets `per_person + remainder`, `paid_for = covered` and the
///   special flag of this event
/// - Payments overwrite `paid`, they never add to it
///
/// ## Errors
/// `CoreError::Settlement` when rounding would leave the payer a negative
/// share; the ledger is returned unchanged to the caller in that case.
pub fn settle_payment(
    ledger: &Ledger,
    fare: Money,
    event: &PaymentEvent,
    limit: Money,
) -> CoreResult<Ledger> {
    validate_payment_amount(event.amount, limit)?;
    if ledger.is_empty() {
        return Err(CoreError::EmptyLedger);
    }

    let payer_id = event.payer_id;
    ledger.require(payer_id)?;

    let covered = distinct(event.mode.covered_ids());
    if covered.contains(&payer_id) {
        return Err(CoreError::PayerCoversSelf(payer_id));
    }
    for id in &covered {
        ledger.require(*id)?;
    }

    let is_special = event.mode.is_special();
    let effective_fare = if is_special { event.amount } else { fare };
    let split = allocate(event.amount, covered.len() as u32 + 1, effective_fare);

    if split.payer_share().is_negative() {
        return Err(CoreError::settlement(format!(
            "{} cannot be split over {} passengers",
            event.amount, split.parties
        )));
    }

    let mut next = ledger.clone();

    let payer = next.require_mut(payer_id)?;
    payer.paid = split.payer_share();
    payer.paid_for = covered.clone();
    payer.is_special_payment = is_special;

    for id in &covered {
        let passenger = next.require_mut(*id)?;
        passenger.paid = split.per_person;
        passenger.paid_by = Some(payer_id);
    }

    debug!(
        payer = payer_id,
        amount = %event.amount,
        covered = ?covered,
        special = is_special,
        per_person = %split.per_person,
        remainder = %split.remainder,
        "Payment settled"
    );

    Ok(next)
}

// =============================================================================
// Change Bookkeeping
// =============================================================================

/// Sets the change-given flag on one seat. Nothing else changes.
pub fn toggle_change_given(ledger: &Ledger, id: PassengerId, given: bool) -> CoreResult<Ledger> {
    let mut next = ledger.clone();
    next.require_mut(id)?.change_given = given;
    Ok(next)
}

/// Records that part of a passenger's change was handed back.
///
/// ## Rules
/// - `amount` must be positive
/// - The amount is clamped to the change still owed (`paid − fare`)
/// - `change_given` becomes true only once `paid` is back down to the fare
///
/// ## Errors
/// `CoreError::NoChangeOwed` for seats that did not overpay or that hold a
/// special payment.
///
/// ## User Workflow
/// ```text
/// Seat 1 paid 40.00, fare 10.00 → owed 30.00
///      │
///      ├── return_change(1, 20.00) → paid 20.00, change_given = false
///      │
///      └── return_change(1, 50.00) → clamped to 10.00
///                                   → paid 10.00, change_given = true
/// ```
pub fn return_change(
    ledger: &Ledger,
    fare: Money,
    id: PassengerId,
    amount: Money,
) -> CoreResult<Ledger> {
    validate_change_amount(amount)?;

    let mut next = ledger.clone();
    let passenger = next.require_mut(id)?;

    let owed = passenger.change_owed(fare);
    if !owed.is_positive() {
        return Err(CoreError::NoChangeOwed(id));
    }

    let returned = amount.min(owed);
    passenger.paid -= returned;
    passenger.change_given = passenger.paid <= fare;

    debug!(
        passenger = id,
        returned = %returned,
        paid = %passenger.paid,
        change_given = passenger.change_given,
        "Change returned"
    );

    Ok(next)
}

/// Hands back everything still owed to one passenger.
pub fn return_all_change(ledger: &Ledger, fare: Money, id: PassengerId) -> CoreResult<Ledger> {
    let owed = ledger.require(id)?.change_owed(fare);
    if !owed.is_positive() {
        return Err(CoreError::NoChangeOwed(id));
    }
    return_change(ledger, fare, id, owed)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::TripConfig;
    use crate::types::VehicleType;

    fn limit() -> Money {
        Money::from_major(10_000)
    }

    fn taxi(fare: Money) -> Ledger {
        Ledger::for_config(&TripConfig {
            vehicle_type: VehicleType::Taxi,
            cost_per_person: fare,
            custom_capacity: 0,
        })
    }

    fn paid(ledger: &Ledger, id: PassengerId) -> Money {
        ledger.get(id).unwrap().paid
    }

    #[test]
    fn test_exact_multi_passenger_split() {
        let fare = Money::from_major(10);
        let event = PaymentEvent::standard(1, Money::from_major(30), vec![2, 3]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        assert_eq!(paid(&ledger, 1), fare);
        assert_eq!(paid(&ledger, 2), fare);
        assert_eq!(paid(&ledger, 3), fare);
        assert_eq!(paid(&ledger, 4), Money::zero());

        assert_eq!(ledger.get(1).unwrap().paid_for, vec![2, 3]);
        assert_eq!(ledger.get(2).unwrap().paid_by, Some(1));
        assert_eq!(ledger.get(3).unwrap().paid_by, Some(1));
        assert_eq!(ledger.get(1).unwrap().paid_by, None);
    }

    #[test]
    fn test_remainder_goes_to_payer() {
        let fare = Money::from_major(30);
        let event = PaymentEvent::standard(1, Money::from_major(100), vec![]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        let payer = ledger.get(1).unwrap();
        assert_eq!(payer.paid, Money::from_major(100));
        assert_eq!(payer.change_owed(fare), Money::from_major(70));
    }

    #[test]
    fn test_overpayment_is_not_spread_over_covered_seats() {
        let fare = Money::from_major(10);
        let event = PaymentEvent::standard(1, Money::from_major(50), vec![2]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        assert_eq!(paid(&ledger, 1), Money::from_major(40));
        assert_eq!(paid(&ledger, 2), Money::from_major(10));
    }

    #[test]
    fn test_rounding_dust_goes_to_payer() {
        let fare = Money::from_cents(400);
        let event = PaymentEvent::standard(1, Money::from_cents(1000), vec![2, 3]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        // 10.00 / 3 = 3.33 each, dust 0.01 on the payer
        assert_eq!(paid(&ledger, 1).cents(), 334);
        assert_eq!(paid(&ledger, 2).cents(), 333);
        assert_eq!(paid(&ledger, 3).cents(), 333);
    }

    #[test]
    fn test_payment_overwrites_instead_of_accumulating() {
        let fare = Money::from_major(10);
        let first = PaymentEvent::standard(2, Money::from_major(20), vec![]);
        let second = PaymentEvent::standard(2, Money::from_major(15), vec![]);

        let ledger = settle_payment(&taxi(fare), fare, &first, limit()).unwrap();
        let ledger = settle_payment(&ledger, fare, &second, limit()).unwrap();
        assert_eq!(paid(&ledger, 2), Money::from_major(15));
    }

    #[test]
    fn test_special_payment_ignores_fare_and_covered() {
        let fare = Money::from_major(15);
        let event = PaymentEvent::special(1, Money::from_major(23));
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        let payer = ledger.get(1).unwrap();
        assert_eq!(payer.paid, Money::from_major(23));
        assert!(payer.is_special_payment);
        assert!(payer.paid_for.is_empty());
        assert_eq!(payer.change_owed(fare), Money::zero());
        assert!(ledger.iter().skip(1).all(|p| !p.has_paid()));
    }

    #[test]
    fn test_special_payment_clears_previous_coverage() {
        let fare = Money::from_major(10);
        let covering = PaymentEvent::standard(1, Money::from_major(20), vec![2]);
        let ledger = settle_payment(&taxi(fare), fare, &covering, limit()).unwrap();
        assert_eq!(ledger.get(1).unwrap().paid_for, vec![2]);

        let special = PaymentEvent::special(1, Money::from_major(7));
        let ledger = settle_payment(&ledger, fare, &special, limit()).unwrap();
        assert!(ledger.get(1).unwrap().paid_for.is_empty());
        // Covered seat keeps its own record
        assert_eq!(ledger.get(2).unwrap().paid_by, Some(1));
    }

    #[test]
    fn test_duplicate_covered_ids_collapse() {
        let fare = Money::from_major(10);
        let event = PaymentEvent::standard(1, Money::from_major(20), vec![3, 3]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        assert_eq!(ledger.get(1).unwrap().paid_for, vec![3]);
        assert_eq!(paid(&ledger, 1), fare);
        assert_eq!(paid(&ledger, 3), fare);

        assert_eq!(distinct(&[4, 2, 4, 3, 2]), vec![4, 2, 3]);
    }

    #[test]
    fn test_rejections_leave_ledger_alone() {
        let fare = Money::from_major(10);
        let ledger = taxi(fare);

        let zero = PaymentEvent::standard(1, Money::zero(), vec![]);
        assert!(matches!(
            settle_payment(&ledger, fare, &zero, limit()),
            Err(CoreError::Validation(_))
        ));

        let over = PaymentEvent::standard(1, Money::from_major(10_001), vec![]);
        assert!(settle_payment(&ledger, fare, &over, limit()).is_err());

        let unknown_payer = PaymentEvent::standard(9, Money::from_major(10), vec![]);
        assert!(matches!(
            settle_payment(&ledger, fare, &unknown_payer, limit()),
            Err(CoreError::PassengerNotFound(9))
        ));

        let unknown_covered = PaymentEvent::standard(1, Money::from_major(20), vec![2, 8]);
        assert!(matches!(
            settle_payment(&ledger, fare, &unknown_covered, limit()),
            Err(CoreError::PassengerNotFound(8))
        ));

        let self_cover = PaymentEvent::standard(1, Money::from_major(20), vec![1]);
        assert!(matches!(
            settle_payment(&ledger, fare, &self_cover, limit()),
            Err(CoreError::PayerCoversSelf(1))
        ));

        assert!(ledger.iter().all(|p| !p.has_paid()));
    }

    #[test]
    fn test_negative_payer_share_fails_settlement() {
        let fare = Money::from_major(10);
        let mut ledger = Ledger::for_config(&TripConfig {
            vehicle_type: VehicleType::Custom,
            cost_per_person: fare,
            custom_capacity: 9,
        });
        // 0.05 over 9 seats rounds to 0.01 each → payer share −0.03
        let event = PaymentEvent::standard(1, Money::from_cents(5), (2..=9).collect());
        let result = settle_payment(&ledger, fare, &event, limit());
        assert!(matches!(result, Err(CoreError::Settlement { .. })));

        ledger = settle_payment(
            &ledger,
            fare,
            &PaymentEvent::standard(1, Money::from_cents(9), (2..=9).collect()),
            limit(),
        )
        .unwrap();
        assert!(ledger.iter().all(|p| p.paid == Money::from_cents(1)));
    }

    #[test]
    fn test_settle_on_empty_ledger() {
        let event = PaymentEvent::standard(1, Money::from_major(10), vec![]);
        assert!(matches!(
            settle_payment(&Ledger::empty(), Money::zero(), &event, limit()),
            Err(CoreError::EmptyLedger)
        ));
    }

    #[test]
    fn test_change_drain_is_monotonic() {
        let fare = Money::from_major(10);
        let event = PaymentEvent::standard(1, Money::from_major(40), vec![]);
        let mut ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        let mut previous = paid(&ledger, 1);
        for step in [5, 10, 10] {
            ledger = return_change(&ledger, fare, 1, Money::from_major(step)).unwrap();
            let now = paid(&ledger, 1);
            assert!(now < previous);
            assert!(now >= fare);
            assert_eq!(ledger.get(1).unwrap().change_given, now <= fare);
            previous = now;
        }

        // 5 still owed; asking for 50 is clamped
        ledger = return_change(&ledger, fare, 1, Money::from_major(50)).unwrap();
        assert_eq!(paid(&ledger, 1), fare);
        assert!(ledger.get(1).unwrap().change_given);

        assert!(matches!(
            return_change(&ledger, fare, 1, Money::from_major(1)),
            Err(CoreError::NoChangeOwed(1))
        ));
    }

    #[test]
    fn test_return_change_rejects_non_positive_amount() {
        let fare = Money::from_major(10);
        let event = PaymentEvent::standard(1, Money::from_major(40), vec![]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        assert!(return_change(&ledger, fare, 1, Money::zero()).is_err());
        assert!(return_change(&ledger, fare, 1, Money::from_cents(-100)).is_err());
        assert_eq!(paid(&ledger, 1), Money::from_major(40));
    }

    #[test]
    fn test_return_all_change() {
        let fare = Money::from_major(10);
        let event = PaymentEvent::standard(1, Money::from_major(50), vec![2]);
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        let ledger = return_all_change(&ledger, fare, 1).unwrap();
        let payer = ledger.get(1).unwrap();
        assert_eq!(payer.paid, fare);
        assert!(payer.change_given);

        assert!(matches!(
            return_all_change(&ledger, fare, 2),
            Err(CoreError::NoChangeOwed(2))
        ));
    }

    #[test]
    fn test_special_seat_owes_no_change() {
        let fare = Money::from_major(15);
        let event = PaymentEvent::special(1, Money::from_major(23));
        let ledger = settle_payment(&taxi(fare), fare, &event, limit()).unwrap();

        assert!(matches!(
            return_change(&ledger, fare, 1, Money::from_major(1)),
            Err(CoreError::NoChangeOwed(1))
        ));
    }

    #[test]
    fn test_toggle_change_given_is_idempotent() {
        let fare = Money::from_major(10);
        let ledger = taxi(fare);

        let once = toggle_change_given(&ledger, 2, true).unwrap();
        let twice = toggle_change_given(&once, 2, true).unwrap();
        assert_eq!(once, twice);
        assert!(twice.get(2).unwrap().change_given);
        assert_eq!(twice.get(2).unwrap().paid, Money::zero());

        assert!(toggle_change_given(&ledger, 42, true).is_err());
    }

    #[test]
    fn test_payment_mode_json() {
        let event = PaymentEvent::standard(1, Money::from_cents(2000), vec![2]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["payerId"], 1);
        assert_eq!(json["mode"]["kind"], "standard");
        assert_eq!(json["mode"]["coveredIds"][0], 2);

        let special: PaymentEvent =
            serde_json::from_str(r#"{"payerId":3,"amount":2300,"mode":{"kind":"special"}}"#)
                .unwrap();
        assert!(special.mode.is_special());
        assert!(special.mode.covered_ids().is_empty());
    }
}
