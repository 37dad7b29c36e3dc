//! # Payment Draft
//!
//! The payment being composed for one seat before it is submitted: amount,
//! the other seats it covers, and whether it is a special amount.
//!
//! ## Payment Dialog Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open(seat) ──► set_amount ──► toggle_covered / set_special ──► submit │
//! │                                                                         │
//! │  Preview while typing:                                                  │
//! │    total_required = special ? amount : fare × (covered + 1)             │
//! │    amount > required → Change(amount − required)                        │
//! │    amount < required → Shortfall(required − amount)                     │
//! │    otherwise         → Exact                                            │
//! │                                                                         │
//! │  Turning "special" on drops the covered selection, so a special         │
//! │  payment can never carry a stale paid_for list into settlement.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::settlement::PaymentEvent;
use crate::types::{Passenger, PassengerId};

/// The open payment for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub passenger_id: PassengerId,
    pub amount: Money,
    pub covered_ids: Vec<PassengerId>,
    pub special: bool,
}

impl PaymentDraft {
    /// Opens an empty draft for a seat.
    pub fn open(passenger_id: PassengerId) -> Self {
        PaymentDraft {
            passenger_id,
            amount: Money::zero(),
            covered_ids: Vec::new(),
            special: false,
        }
    }

    /// Opens a draft for a seat, starting in special mode when the seat's
    /// recorded payment is special.
    pub fn for_passenger(passenger: &Passenger) -> Self {
        PaymentDraft {
            special: passenger.is_special_payment,
            ..PaymentDraft::open(passenger.id)
        }
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
    }

    /// Adds or removes a covered seat. Ignored while the draft is special
    /// and for the payer's own seat.
    pub fn toggle_covered(&mut self, id: PassengerId, covered: bool) {
        if self.special || id == self.passenger_id {
            return;
        }

        let present = self.covered_ids.contains(&id);
        if covered && !present {
            self.covered_ids.push(id);
        } else if !covered && present {
            self.covered_ids.retain(|c| *c != id);
        }
    }

    /// Switches special mode; switching it on clears the covered selection.
    pub fn set_special(&mut self, special: bool) {
        self.special = special;
        if special {
            self.covered_ids.clear();
        }
    }

    /// Live totals for the dialog.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::{Balance, Money, PaymentDraft};
    ///
    /// let mut draft = PaymentDraft::open(1);
    /// draft.set_amount(Money::from_major(50));
    /// draft.toggle_covered(2, true);
    ///
    /// let preview = draft.preview(Money::from_major(10));
    /// assert_eq!(preview.total_required, Money::from_major(20));
    /// assert_eq!(preview.balance, Balance::Change { amount: Money::from_major(30) });
    /// ```
    pub fn preview(&self, fare: Money) -> PaymentPreview {
        let passengers = if self.special {
            1
        } else {
            self.covered_ids.len() as u32 + 1
        };

        let total_required = if self.special {
            self.amount
        } else {
            fare.times(passengers)
        };

        let balance = if self.amount > total_required {
            Balance::Change {
                amount: self.amount - total_required,
            }
        } else if self.amount < total_required {
            Balance::Shortfall {
                amount: total_required - self.amount,
            }
        } else {
            Balance::Exact
        };

        PaymentPreview {
            passengers,
            total_required,
            balance,
            can_submit: self.amount.is_positive()
                && (self.special || self.amount >= total_required),
        }
    }

    /// Builds the payment event this draft describes.
    pub fn to_event(&self) -> PaymentEvent {
        if self.special {
            PaymentEvent::special(self.passenger_id, self.amount)
        } else {
            PaymentEvent::standard(self.passenger_id, self.amount, self.covered_ids.clone())
        }
    }
}

/// Difference between what is offered and what is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Balance {
    /// Overpaid; this much goes back to the payer.
    Change { amount: Money },
    /// Underpaid by this much.
    Shortfall { amount: Money },
    Exact,
}

/// Totals shown in the payment dialog while a draft is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreview {
    /// Seats the payment is for, payer included.
    pub passengers: u32,
    pub total_required: Money,
    pub balance: Balance,
    /// Positive amount that covers everybody selected (or is special).
    pub can_submit: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::PaymentMode;

    #[test]
    fn test_toggle_covered() {
        let mut draft = PaymentDraft::open(1);
        draft.toggle_covered(3, true);
        draft.toggle_covered(2, true);
        draft.toggle_covered(3, true);
        assert_eq!(draft.covered_ids, vec![3, 2]);

        draft.toggle_covered(3, false);
        assert_eq!(draft.covered_ids, vec![2]);

        draft.toggle_covered(1, true);
        assert_eq!(draft.covered_ids, vec![2]);
    }

    #[test]
    fn test_special_clears_and_blocks_selection() {
        let mut draft = PaymentDraft::open(1);
        draft.toggle_covered(2, true);
        draft.set_special(true);
        assert!(draft.covered_ids.is_empty());

        draft.toggle_covered(4, true);
        assert!(draft.covered_ids.is_empty());

        draft.set_amount(Money::from_major(23));
        assert_eq!(draft.to_event().mode, PaymentMode::Special);
    }

    #[test]
    fn test_preview_shortfall_blocks_submit() {
        let mut draft = PaymentDraft::open(1);
        draft.set_amount(Money::from_major(15));
        draft.toggle_covered(2, true);

        let preview = draft.preview(Money::from_major(10));
        assert_eq!(preview.passengers, 2);
        assert_eq!(
            preview.balance,
            Balance::Shortfall {
                amount: Money::from_major(5)
            }
        );
        assert!(!preview.can_submit);
    }

    #[test]
    fn test_preview_exact_and_special() {
        let mut draft = PaymentDraft::open(1);
        draft.set_amount(Money::from_major(10));
        let preview = draft.preview(Money::from_major(10));
        assert_eq!(preview.balance, Balance::Exact);
        assert!(preview.can_submit);

        draft.set_special(true);
        draft.set_amount(Money::from_major(3));
        let preview = draft.preview(Money::from_major(10));
        assert_eq!(preview.total_required, Money::from_major(3));
        assert_eq!(preview.balance, Balance::Exact);
        assert!(preview.can_submit);
    }

    #[test]
    fn test_empty_amount_cannot_submit() {
        let draft = PaymentDraft::open(2);
        assert!(!draft.preview(Money::from_major(10)).can_submit);
    }

    #[test]
    fn test_for_passenger_keeps_special_flag() {
        let mut seat = Passenger::unpaid(2);
        assert!(!PaymentDraft::for_passenger(&seat).special);

        seat.paid = Money::from_major(7);
        seat.is_special_payment = true;
        let draft = PaymentDraft::for_passenger(&seat);
        assert_eq!(draft.passenger_id, 2);
        assert!(draft.special);
        assert_eq!(draft.amount, Money::zero());
    }

    #[test]
    fn test_to_event_keeps_selection_order() {
        let mut draft = PaymentDraft::open(4);
        draft.set_amount(Money::from_major(30));
        draft.toggle_covered(3, true);
        draft.toggle_covered(1, true);

        let event = draft.to_event();
        assert_eq!(event.payer_id, 4);
        assert_eq!(event.mode.covered_ids(), &[3, 1]);
    }
}
