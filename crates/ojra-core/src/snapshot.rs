//! # Snapshot
//!
//! The plain data shape persisted after every change and restored once at
//! startup. The engine does not decide when it is saved; it only converts
//! to and from this shape.
//!
//! ## JSON Shape
//! ```json
//! {
//!   "vehicleType": "taxi",
//!   "costPerPerson": 1000,
//!   "customCapacity": 0,
//!   "passengers": [
//!     { "id": 1, "seatNumber": 1, "paid": 4000, "changeGiven": false,
//!       "paidFor": [2], "isSpecialPayment": false }
//!   ]
//! }
//! ```
//! Money fields are integer cents.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::trip::{Ledger, TripConfig, TripState};
use crate::types::{Passenger, VehicleType};

/// Persisted trip state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub vehicle_type: VehicleType,
    pub cost_per_person: Money,
    pub custom_capacity: u32,
    pub passengers: Vec<Passenger>,
}

impl TripState {
    /// Captures the persistable part of the state. The payment draft is
    /// session-only and is not included.
    pub fn snapshot(&self) -> TripSnapshot {
        TripSnapshot {
            vehicle_type: self.config.vehicle_type,
            cost_per_person: self.config.cost_per_person,
            custom_capacity: self.config.custom_capacity,
            passengers: self.ledger.passengers().to_vec(),
        }
    }

    /// Rebuilds a state from a snapshot as a raw overwrite.
    ///
    /// The ledger is taken exactly as stored; the rebuild-on-config-change
    /// rule is NOT applied, so payments survive a restart.
    pub fn from_snapshot(snapshot: TripSnapshot) -> TripState {
        TripState {
            config: TripConfig {
                vehicle_type: snapshot.vehicle_type,
                cost_per_person: snapshot.cost_per_person,
                custom_capacity: snapshot.custom_capacity,
            },
            ledger: Ledger::from_passengers(snapshot.passengers),
            draft: None,
        }
    }
}

impl From<&TripState> for TripSnapshot {
    fn from(state: &TripState) -> Self {
        state.snapshot()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
