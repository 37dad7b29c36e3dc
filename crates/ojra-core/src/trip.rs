//! # Trip Configuration & Ledger
//!
//! Holds the vehicle, the per-seat fare and the seat ledger, and owns the
//! rule that ties them together: change the fare or the capacity and the
//! trip starts over.
//!
//! ## Ledger Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ledger Lifecycle                                  │
//! │                                                                         │
//! │  select_vehicle / set_cost_per_person / set_custom_capacity            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  capacity > 0 AND fare > 0 ?                                           │
//! │       ├── yes → seats 1..=capacity, all unpaid                         │
//! │       └── no  → empty ledger                                           │
//! │                                                                         │
//! │  Payments, change returns and change toggles mutate seats in place     │
//! │  (settlement.rs). reset() goes back to the zero state.                 │
//! │                                                                         │
//! │  Prior payments are NEVER carried across a rebuild.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition here takes `&self` and returns a new `TripState`; on
//! `Err` the caller still holds the untouched original.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::draft::PaymentDraft;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Passenger, PassengerId, VehicleType};
use crate::validation::{validate_capacity, validate_fare};

// =============================================================================
// Trip Configuration
// =============================================================================

/// Vehicle, fare and custom capacity for the current trip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TripConfig {
    pub vehicle_type: VehicleType,

    /// Fare owed by each seat, always whole cents.
    pub cost_per_person: Money,

    /// Seat count used when `vehicle_type` is `Custom`.
    pub custom_capacity: u32,
}

impl TripConfig {
    /// Effective seat count: the preset for fixed vehicles, else the custom value.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::{TripConfig, VehicleType};
    ///
    /// let mut config = TripConfig::default();
    /// config.vehicle_type = VehicleType::Taxi;
    /// config.custom_capacity = 9;
    /// assert_eq!(config.capacity(), 4);
    ///
    /// config.vehicle_type = VehicleType::Custom;
    /// assert_eq!(config.capacity(), 9);
    /// ```
    pub fn capacity(&self) -> u32 {
        match self.vehicle_type {
            VehicleType::Custom => self.custom_capacity,
            other => other.preset_capacity().unwrap_or(0),
        }
    }

    /// `cost_per_person × capacity`.
    pub fn total_fare(&self) -> Money {
        self.cost_per_person.times(self.capacity())
    }

    /// True when both capacity and fare are set, i.e. the ledger has seats.
    pub fn is_bookable(&self) -> bool {
        self.capacity() > 0 && self.cost_per_person.is_positive()
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// The ordered seat records of the current trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ledger {
    passengers: Vec<Passenger>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn empty() -> Self {
        Ledger::default()
    }

    /// Builds the ledger for a configuration: `capacity` fresh seats when the
    /// trip is bookable, otherwise nothing.
    pub fn for_config(config: &TripConfig) -> Self {
        if !config.is_bookable() {
            return Ledger::empty();
        }

        Ledger {
            passengers: (1..=config.capacity()).map(Passenger::unpaid).collect(),
        }
    }

    /// Wraps existing records as-is (snapshot restore).
    pub fn from_passengers(passengers: Vec<Passenger>) -> Self {
        Ledger { passengers }
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Passenger> {
        self.passengers.iter()
    }

    pub fn into_passengers(self) -> Vec<Passenger> {
        self.passengers
    }

    /// Looks up a seat by id.
    ///
    /// Seats built by [`Ledger::for_config`] sit at `id - 1`; other
    /// layouts fall back to a scan.
    pub fn get(&self, id: PassengerId) -> Option<&Passenger> {
        self.position(id).map(|i| &self.passengers[i])
    }

    /// Looks up a seat by id, failing loudly when it is not in this ledger.
    pub fn require(&self, id: PassengerId) -> CoreResult<&Passenger> {
        self.get(id).ok_or(CoreError::PassengerNotFound(id))
    }

    pub(crate) fn require_mut(&mut self, id: PassengerId) -> CoreResult<&mut Passenger> {
        match self.position(id) {
            Some(i) => Ok(&mut self.passengers[i]),
            None => Err(CoreError::PassengerNotFound(id)),
        }
    }

    fn position(&self, id: PassengerId) -> Option<usize> {
        let slot = (id as usize).checked_sub(1)?;
        match self.passengers.get(slot) {
            Some(p) if p.id == id => Some(slot),
            _ => self.passengers.iter().position(|p| p.id == id),
        }
    }

    /// Fails unless `id` is a seat `payer` may cover, i.e. one listed by
    /// [`Ledger::coverable_for`].
    pub fn require_coverable(&self, payer: PassengerId, id: PassengerId) -> CoreResult<&Passenger> {
        let passenger = self.require(id)?;
        if id == payer {
            return Err(CoreError::PayerCoversSelf(id));
        }
        if passenger.has_paid() {
            return Err(CoreError::NotCoverable(id));
        }
        Ok(passenger)
    }

    /// Seats the payer may cover: unpaid, and not the payer.
    pub fn coverable_for(&self, payer: PassengerId) -> impl Iterator<Item = &Passenger> {
        self.passengers
            .iter()
            .filter(move |p| !p.has_paid() && p.id != payer)
    }
}

// =============================================================================
// Trip State
// =============================================================================

/// Complete engine state: configuration, ledger and the open payment draft.
///
/// ## Transitions
/// | Method | Rebuilds ledger |
/// |--------|-----------------|
/// | `select_vehicle` | always |
/// | `set_cost_per_person` | always |
/// | `set_custom_capacity` | only while the vehicle is `Custom` |
/// | `reset` | empties it |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripState {
    pub(crate) config: TripConfig,
    pub(crate) ledger: Ledger,
    pub(crate) draft: Option<PaymentDraft>,
}

impl TripState {
    /// Creates a fresh state: microbus, no fare, no seats.
    pub fn new() -> Self {
        TripState::default()
    }

    pub fn config(&self) -> &TripConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn draft(&self) -> Option<&PaymentDraft> {
        self.draft.as_ref()
    }

    /// Effective capacity of the configured vehicle.
    pub fn capacity(&self) -> u32 {
        self.config.capacity()
    }

    /// Fare owed by each seat.
    pub fn cost_per_person(&self) -> Money {
        self.config.cost_per_person
    }

    /// Replaces the configuration and starts a fresh ledger for it.
    fn rebuilt(&self, config: TripConfig) -> TripState {
        let ledger = Ledger::for_config(&config);
        debug!(
            vehicle = %config.vehicle_type,
            capacity = config.capacity(),
            fare = %config.cost_per_person,
            seats = ledger.len(),
            "Ledger rebuilt"
        );

        TripState {
            config,
            ledger,
            draft: None,
        }
    }

    /// Switches vehicle and restarts the trip with its capacity.
    pub fn select_vehicle(&self, vehicle_type: VehicleType) -> TripState {
        let config = TripConfig {
            vehicle_type,
            ..self.config.clone()
        };
        self.rebuilt(config)
    }

    /// Sets the per-seat fare and restarts the trip.
    ///
    /// ## Rules
    /// - Negative or over-limit fares are rejected, state unchanged
    /// - A fare change always starts a fresh ledger
    pub fn set_cost_per_person(&self, fare: Money, limit: Money) -> CoreResult<TripState> {
        validate_fare(fare, limit)?;

        let config = TripConfig {
            cost_per_person: fare,
            ..self.config.clone()
        };
        Ok(self.rebuilt(config))
    }

    /// Sets the custom seat count.
    ///
    /// The value is always stored; the ledger restarts only when the vehicle
    /// is `Custom`, since that is the only case where capacity changes.
    /// Counts above `max` are rejected before any seat is built.
    pub fn set_custom_capacity(&self, capacity: i64, max: u32) -> CoreResult<TripState> {
        let capacity = validate_capacity(capacity, max)?;

        let config = TripConfig {
            custom_capacity: capacity,
            ..self.config.clone()
        };

        if config.vehicle_type == VehicleType::Custom {
            return Ok(self.rebuilt(config));
        }

        Ok(TripState {
            config,
            ..self.clone()
        })
    }

    /// Back to the reset defaults: no fare, no custom capacity, no seats,
    /// no open payment. The selected vehicle is kept.
    pub fn reset(&self) -> TripState {
        TripState {
            config: TripConfig {
                vehicle_type: self.config.vehicle_type,
                ..TripConfig::default()
            },
            ledger: Ledger::empty(),
            draft: None,
        }
    }

    pub(crate) fn with_ledger(&self, ledger: Ledger) -> TripState {
        TripState {
            ledger,
            ..self.clone()
        }
    }

    pub(crate) fn with_draft(&self, draft: Option<PaymentDraft>) -> TripState {
        TripState {
            draft,
            ..self.clone()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
