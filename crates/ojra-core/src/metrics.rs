//! # Derived Metrics
//!
//! Trip-level totals recomputed from the full ledger on every query.
//! Nothing here is cached or updated incrementally; each call walks the
//! ledger once (O(capacity)).
//!
//! ```text
//! total_cost         = fare × capacity
//! total_collected    = Σ min(paid, fare)
//! total_remaining    = total_cost − total_collected
//! outstanding_change = Σ change_owed  over seats with paid > fare, !change_given
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::trip::TripState;

/// Trip summary shown above the seat cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TripMetrics {
    pub capacity: u32,
    pub total_cost: Money,
    /// Money counted toward the trip fare; overpayment is excluded.
    pub total_collected: Money,
    pub total_remaining: Money,
    /// Change still to be handed back across all seats.
    pub outstanding_change: Money,
    /// Seats with any amount recorded.
    pub paid_count: u32,
}

impl TripMetrics {
    /// Computes the metrics for a state.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::{Money, TripMetrics, TripState, VehicleType};
    ///
    /// let state = TripState::new()
    ///     .select_vehicle(VehicleType::Taxi)
    ///     .set_cost_per_person(Money::from_major(10), Money::from_major(10_000))
    ///     .unwrap();
    ///
    /// let metrics = TripMetrics::compute(&state);
    /// assert_eq!(metrics.total_cost, Money::from_major(40));
    /// assert_eq!(metrics.total_remaining, Money::from_major(40));
    /// ```
    pub fn compute(state: &TripState) -> Self {
        let fare = state.cost_per_person();
        let capacity = state.capacity();
        let total_cost = fare.times(capacity);

        let total_collected: Money = state.ledger().iter().map(|p| p.collected(fare)).sum();

        let outstanding_change: Money = state
            .ledger()
            .iter()
            .filter(|p| p.paid > fare && !p.change_given)
            .map(|p| p.change_owed(fare))
            .sum();

        let paid_count = state.ledger().iter().filter(|p| p.has_paid()).count() as u32;

        TripMetrics {
            capacity,
            total_cost,
            total_collected,
            total_remaining: total_cost - total_collected,
            outstanding_change,
            paid_count,
        }
    }

    /// True once every seat's fare has been collected.
    pub fn is_settled(&self) -> bool {
        self.total_cost.is_positive() && !self.total_remaining.is_positive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::{return_change, settle_payment, toggle_change_given, PaymentEvent};
    use crate::types::VehicleType;

    fn limit() -> Money {
        Money::from_major(10_000)
    }

    fn taxi_at(fare: Money) -> TripState {
        TripState::new()
            .select_vehicle(VehicleType::Taxi)
            .set_cost_per_person(fare, limit())
            .unwrap()
    }

    fn pay(state: &TripState, event: PaymentEvent) -> TripState {
        let ledger = settle_payment(state.ledger(), state.cost_per_person(), &event, limit()).unwrap();
        state.with_ledger(ledger)
    }

    #[test]
    fn test_taxi_scenario() {
        let state = taxi_at(Money::from_major(10));
        let state = pay(&state, PaymentEvent::standard(1, Money::from_major(50), vec![2]));

        let metrics = TripMetrics::compute(&state);
        assert_eq!(metrics.capacity, 4);
        assert_eq!(metrics.total_cost, Money::from_major(40));
        assert_eq!(metrics.total_collected, Money::from_major(20));
        assert_eq!(metrics.total_remaining, Money::from_major(20));
        assert_eq!(metrics.outstanding_change, Money::from_major(30));
        assert_eq!(metrics.paid_count, 2);
        assert!(!metrics.is_settled());
    }

    #[test]
    fn test_collected_plus_remaining_equals_cost() {
        let fare = Money::from_cents(733);
        let mut state = taxi_at(fare);

        let events = [
            PaymentEvent::standard(1, Money::from_cents(1000), vec![2, 3]),
            PaymentEvent::standard(4, Money::from_cents(250), vec![]),
            PaymentEvent::special(2, Money::from_cents(1999)),
            PaymentEvent::standard(3, Money::from_cents(5000), vec![]),
        ];

        for event in events {
            state = pay(&state, event);
            let m = TripMetrics::compute(&state);
            assert_eq!(m.total_collected + m.total_remaining, m.total_cost);
        }
    }

    #[test]
    fn test_change_given_removes_outstanding_change() {
        let fare = Money::from_major(10);
        let state = pay(
            &taxi_at(fare),
            PaymentEvent::standard(1, Money::from_major(25), vec![]),
        );
        assert_eq!(
            TripMetrics::compute(&state).outstanding_change,
            Money::from_major(15)
        );

        let drained = return_change(state.ledger(), fare, 1, Money::from_major(5)).unwrap();
        let state = state.with_ledger(drained);
        assert_eq!(
            TripMetrics::compute(&state).outstanding_change,
            Money::from_major(10)
        );

        let toggled = toggle_change_given(state.ledger(), 1, true).unwrap();
        let state = state.with_ledger(toggled);
        assert_eq!(TripMetrics::compute(&state).outstanding_change, Money::zero());
    }

    #[test]
    fn test_special_payment_excluded_from_change() {
        let fare = Money::from_major(15);
        let state = pay(&taxi_at(fare), PaymentEvent::special(1, Money::from_major(23)));

        let metrics = TripMetrics::compute(&state);
        assert_eq!(metrics.outstanding_change, Money::zero());
        assert_eq!(metrics.total_collected, fare);
    }

    #[test]
    fn test_fully_paid_trip_is_settled() {
        let fare = Money::from_major(10);
        let state = pay(
            &taxi_at(fare),
            PaymentEvent::standard(1, Money::from_major(40), vec![2, 3, 4]),
        );

        let metrics = TripMetrics::compute(&state);
        assert_eq!(metrics.total_remaining, Money::zero());
        assert!(metrics.is_settled());
    }

    #[test]
    fn test_empty_trip_metrics() {
        let metrics = TripMetrics::compute(&TripState::new());
        assert_eq!(metrics.capacity, 14);
        assert_eq!(metrics.total_cost, Money::zero());
        assert_eq!(metrics.total_collected, Money::zero());
        assert!(!metrics.is_settled());
    }
}
