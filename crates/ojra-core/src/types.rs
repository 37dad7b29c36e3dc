//! # Domain Types
//!
//! Core domain types used throughout ojra.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │  VehicleType    │   │     Passenger       │   │  PaymentStatus  │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  Microbus (14)  │   │  id = seat_number   │   │  Unpaid         │   │
//! │  │  Bus      (50)  │   │  paid (Money)       │   │  Partial        │   │
//! │  │  Minibus  (-)   │   │  change_given       │   │  Exact          │   │
//! │  │  Taxi     (4)   │   │  paid_by / paid_for │   │  Overpaid       │   │
//! │  │  Custom   (n)   │   │  is_special_payment │   │  ChangeReturned │   │
//! │  └─────────────────┘   └─────────────────────┘   │  Special        │   │
//! │                                                  └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Seat identifier, 1-based. A passenger's id and seat number are the same.
pub type PassengerId = u32;

// =============================================================================
// Vehicle Type
// =============================================================================

/// The kind of vehicle the trip runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Microbus,
    Bus,
    Minibus,
    Taxi,
    /// Capacity is supplied by the user.
    Custom,
}

impl VehicleType {
    /// Every vehicle type, in display order.
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Microbus,
        VehicleType::Bus,
        VehicleType::Minibus,
        VehicleType::Taxi,
        VehicleType::Custom,
    ];

    /// Fixed seat count for preset vehicles.
    ///
    /// `Minibus` has no preset and `Custom` takes its capacity from the user,
    /// so both return `None`.
    pub const fn preset_capacity(&self) -> Option<u32> {
        match self {
            VehicleType::Microbus => Some(14),
            VehicleType::Bus => Some(50),
            VehicleType::Taxi => Some(4),
            VehicleType::Minibus | VehicleType::Custom => None,
        }
    }

    /// Machine name used in snapshots and analytics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Microbus => "microbus",
            VehicleType::Bus => "bus",
            VehicleType::Minibus => "minibus",
            VehicleType::Taxi => "taxi",
            VehicleType::Custom => "custom",
        }
    }
}

impl Default for VehicleType {
    fn default() -> Self {
        VehicleType::Microbus
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VehicleType::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "vehicle".to_string(),
                reason: format!(
                    "'{}' is not one of microbus, bus, minibus, taxi, custom",
                    s.trim()
                ),
            })
    }
}

// =============================================================================
// Passenger
// =============================================================================

/// One seat's payment record.
///
/// ## Invariants
/// - `id == seat_number`, assigned at ledger creation, never renumbered
/// - `paid` is whole cents (rounded to 2 decimals by construction)
/// - `paid_by` is only set on a covered passenger, `paid_for` only on a payer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: PassengerId,

    pub seat_number: u32,

    /// Amount recorded against this seat. Zero means unpaid.
    pub paid: Money,

    /// True once any overpayment has been handed back in full.
    pub change_given: bool,

    /// The passenger whose payment covered this seat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub paid_by: Option<PassengerId>,

    /// Seats this passenger's payment covered, in the order they were picked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paid_for: Vec<PassengerId>,

    /// `paid` is a free-form amount, not measured against the fare.
    #[serde(default)]
    pub is_special_payment: bool,
}

impl Passenger {
    /// Creates a fresh, unpaid seat.
    pub fn unpaid(seat: u32) -> Self {
        Passenger {
            id: seat,
            seat_number: seat,
            paid: Money::zero(),
            change_given: false,
            paid_by: None,
            paid_for: Vec::new(),
            is_special_payment: false,
        }
    }

    /// Checks whether anything has been recorded for this seat.
    #[inline]
    pub fn has_paid(&self) -> bool {
        self.paid.is_positive()
    }

    /// Overpayment beyond the fare; zero for special payments.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::{Money, Passenger};
    ///
    /// let mut p = Passenger::unpaid(1);
    /// p.paid = Money::from_major(100);
    /// assert_eq!(p.change_owed(Money::from_major(30)), Money::from_major(70));
    /// ```
    pub fn change_owed(&self, fare: Money) -> Money {
        if self.is_special_payment {
            return Money::zero();
        }
        (self.paid - fare).non_negative()
    }

    /// Amount still missing to reach the fare; zero for special payments.
    pub fn remaining(&self, fare: Money) -> Money {
        if self.is_special_payment {
            return Money::zero();
        }
        (fare - self.paid).non_negative()
    }

    /// The part of `paid` that counts toward the trip fare.
    #[inline]
    pub fn collected(&self, fare: Money) -> Money {
        self.paid.min(fare)
    }

    /// Derives the card status shown for this seat.
    pub fn status(&self, fare: Money) -> PaymentStatus {
        if !self.has_paid() {
            return PaymentStatus::Unpaid;
        }
        if self.is_special_payment {
            return PaymentStatus::Special;
        }
        if self.paid > fare {
            if self.change_given {
                PaymentStatus::ChangeReturned
            } else {
                PaymentStatus::Overpaid {
                    change: self.change_owed(fare),
                }
            }
        } else if self.paid < fare {
            PaymentStatus::Partial {
                remaining: self.remaining(fare),
            }
        } else {
            PaymentStatus::Exact
        }
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Where a seat stands against the fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing recorded yet.
    Unpaid,
    /// Paid less than the fare.
    Partial { remaining: Money },
    /// Paid exactly the fare.
    Exact,
    /// Paid more than the fare and the change is still owed.
    Overpaid { change: Money },
    /// Paid more than the fare and the change was marked as given.
    ChangeReturned,
    /// Custom amount, not compared with the fare.
    Special,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_capacity() {
        assert_eq!(VehicleType::Microbus.preset_capacity(), Some(14));
        assert_eq!(VehicleType::Bus.preset_capacity(), Some(50));
        assert_eq!(VehicleType::Taxi.preset_capacity(), Some(4));
        assert_eq!(VehicleType::Minibus.preset_capacity(), None);
        assert_eq!(VehicleType::Custom.preset_capacity(), None);
    }

    #[test]
    fn test_vehicle_parse_and_default() {
        assert_eq!("Taxi".parse::<VehicleType>().unwrap(), VehicleType::Taxi);
        assert_eq!(" custom ".parse::<VehicleType>().unwrap(), VehicleType::Custom);
        assert!("tuktuk".parse::<VehicleType>().is_err());
        assert_eq!(VehicleType::default(), VehicleType::Microbus);
    }

    #[test]
    fn test_vehicle_serde_names() {
        let json = serde_json::to_string(&VehicleType::Microbus).unwrap();
        assert_eq!(json, "\"microbus\"");
    }

    #[test]
    fn test_status_transitions() {
        let fare = Money::from_major(10);
        let mut p = Passenger::unpaid(3);
        assert_eq!(p.status(fare), PaymentStatus::Unpaid);

        p.paid = Money::from_major(4);
        assert_eq!(
            p.status(fare),
            PaymentStatus::Partial {
                remaining: Money::from_major(6)
            }
        );

        p.paid = fare;
        assert_eq!(p.status(fare), PaymentStatus::Exact);

        p.paid = Money::from_major(20);
        assert_eq!(
            p.status(fare),
            PaymentStatus::Overpaid {
                change: Money::from_major(10)
            }
        );

        p.change_given = true;
        assert_eq!(p.status(fare), PaymentStatus::ChangeReturned);
    }

    #[test]
    fn test_special_payment_is_not_measured_against_fare() {
        let fare = Money::from_major(15);
        let mut p = Passenger::unpaid(1);
        p.paid = Money::from_major(23);
        p.is_special_payment = true;

        assert_eq!(p.change_owed(fare), Money::zero());
        assert_eq!(p.remaining(fare), Money::zero());
        assert_eq!(p.status(fare), PaymentStatus::Special);
    }

    #[test]
    fn test_passenger_json_shape() {
        let mut p = Passenger::unpaid(2);
        p.paid = Money::from_cents(1000);
        p.paid_by = Some(1);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["seatNumber"], 2);
        assert_eq!(json["paid"], 1000);
        assert_eq!(json["paidBy"], 1);
        assert!(json.get("paidFor").is_none());
    }
}
