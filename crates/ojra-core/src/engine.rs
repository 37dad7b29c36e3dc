//! # Fare Engine
//!
//! Ties the pure transitions together: one event in, one new state out,
//! observers told afterwards.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         dispatch(event)                                 │
//! │                                                                         │
//! │  TripEvent ──► TripState::apply(&state, &event, &config)               │
//! │                     │                                                   │
//! │          ┌──────────┴──────────┐                                        │
//! │          ▼                     ▼                                        │
//! │        Err(e)               Ok(next)                                    │
//! │   state untouched        state = next                                   │
//! │   return Err(e)               │                                         │
//! │                               ▼                                         │
//! │                 for observer: on_transition(&Transition)                │
//! │                 (persistence, analytics; fire-and-forget)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Observers?
//! The transform never performs I/O. Whatever needs to react to a change
//! (saving the snapshot, queueing an analytics event) subscribes here and
//! receives the finished state. Observers cannot fail the transition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, info};
use ts_rs::TS;

use crate::draft::{PaymentDraft, PaymentPreview};
use crate::error::{CoreError, CoreResult};
use crate::metrics::TripMetrics;
use crate::money::Money;
use crate::settlement::{self, PaymentEvent};
use crate::snapshot::TripSnapshot;
use crate::trip::TripState;
use crate::types::{PassengerId, VehicleType};
use crate::{DEFAULT_STATE_KEY, MAX_CAPACITY, PAYMENT_LIMIT};

// =============================================================================
// Engine Configuration
// =============================================================================

/// Settings fixed at engine construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Upper bound on any fare or single payment.
    pub payment_limit: Money,

    /// Upper bound on the custom seat count.
    pub max_capacity: u32,

    /// Key the snapshot is persisted under.
    pub state_key: String,
}

impl EngineConfig {
    /// Default limits (10000.00, 200 seats) and key (`ojraState`).
    pub fn new() -> Self {
        EngineConfig {
            payment_limit: PAYMENT_LIMIT,
            max_capacity: MAX_CAPACITY,
            state_key: DEFAULT_STATE_KEY.to_string(),
        }
    }

    pub fn payment_limit(mut self, limit: Money) -> Self {
        self.payment_limit = limit;
        self
    }

    pub fn max_capacity(mut self, max: u32) -> Self {
        self.max_capacity = max;
        self
    }

    pub fn state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = key.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::new()
    }
}

// =============================================================================
// Trip Events
// =============================================================================

/// Every user action that changes the trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TripEvent {
    #[serde(rename_all = "camelCase")]
    SelectVehicle {
        vehicle_type: VehicleType,
    },
    SetCostPerPerson {
        amount: Money,
    },
    SetCustomCapacity {
        capacity: i64,
    },
    RecordPayment {
        payment: PaymentEvent,
    },
    #[serde(rename_all = "camelCase")]
    ToggleChangeGiven {
        passenger_id: PassengerId,
        given: bool,
    },
    #[serde(rename_all = "camelCase")]
    ReturnChange {
        passenger_id: PassengerId,
        amount: Money,
    },
    #[serde(rename_all = "camelCase")]
    ReturnAllChange {
        passenger_id: PassengerId,
    },
    Reset,
}

impl TripEvent {
    /// Analytics event name.
    pub fn name(&self) -> &'static str {
        match self {
            TripEvent::SelectVehicle { .. } => "vehicle_selected",
            TripEvent::SetCostPerPerson { .. } => "fare_set",
            TripEvent::SetCustomCapacity { .. } => "capacity_set",
            TripEvent::RecordPayment { .. } => "payment_recorded",
            TripEvent::ToggleChangeGiven { .. } => "change_toggled",
            TripEvent::ReturnChange { .. } | TripEvent::ReturnAllChange { .. } => {
                "change_returned"
            }
            TripEvent::Reset => "trip_reset",
        }
    }

    /// Analytics properties. Amounts are reported in cents.
    pub fn properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        match self {
            TripEvent::SelectVehicle { vehicle_type } => {
                props.insert("vehicle".into(), vehicle_type.as_str().into());
            }
            TripEvent::SetCostPerPerson { amount } => {
                props.insert("amount".into(), amount.cents().into());
            }
            TripEvent::SetCustomCapacity { capacity } => {
                props.insert("capacity".into(), (*capacity).into());
            }
            TripEvent::RecordPayment { payment } => {
                props.insert("amount".into(), payment.amount.cents().into());
                props.insert(
                    "passengers".into(),
                    (payment.mode.covered_ids().len() + 1).into(),
                );
                props.insert("special".into(), payment.mode.is_special().into());
            }
            TripEvent::ToggleChangeGiven { given, .. } => {
                props.insert("given".into(), (*given).into());
            }
            TripEvent::ReturnChange { amount, .. } => {
                props.insert("amount".into(), amount.cents().into());
                props.insert("all".into(), false.into());
            }
            TripEvent::ReturnAllChange { .. } => {
                props.insert("all".into(), true.into());
            }
            TripEvent::Reset => {}
        }
        props
    }
}

impl fmt::Display for TripEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Pure Transform
// =============================================================================

impl TripState {
    /// `(state, event) → state'`.
    ///
    /// Never mutates `self`. On `Err` the caller keeps the old state, which
    /// is what makes every event atomic.
    ///
    /// ## Example
    /// ```rust
    /// use ojra_core::{EngineConfig, Money, PaymentEvent, TripEvent, TripState, VehicleType};
    ///
    /// let config = EngineConfig::default();
    /// let state = TripState::new()
    ///     .apply(&TripEvent::SelectVehicle { vehicle_type: VehicleType::Taxi }, &config)
    ///     .and_then(|s| s.apply(&TripEvent::SetCostPerPerson { amount: Money::from_major(10) }, &config))
    ///     .and_then(|s| {
    ///         s.apply(
    ///             &TripEvent::RecordPayment {
    ///                 payment: PaymentEvent::standard(1, Money::from_major(50), vec![2]),
    ///             },
    ///             &config,
    ///         )
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(state.ledger().get(1).unwrap().paid, Money::from_major(40));
    /// assert_eq!(state.ledger().get(2).unwrap().paid, Money::from_major(10));
    /// ```
    pub fn apply(&self, event: &TripEvent, config: &EngineConfig) -> CoreResult<TripState> {
        let fare = self.cost_per_person();

        match event {
            TripEvent::SelectVehicle { vehicle_type } => Ok(self.select_vehicle(*vehicle_type)),
            TripEvent::SetCostPerPerson { amount } => {
                self.set_cost_per_person(*amount, config.payment_limit)
            }
            TripEvent::SetCustomCapacity { capacity } => {
                self.set_custom_capacity(*capacity, config.max_capacity)
            }
            TripEvent::RecordPayment { payment } => {
                let ledger =
                    settlement::settle_payment(self.ledger(), fare, payment, config.payment_limit)?;
                Ok(self.with_ledger(ledger))
            }
            TripEvent::ToggleChangeGiven {
                passenger_id,
                given,
            } => {
                let ledger = settlement::toggle_change_given(self.ledger(), *passenger_id, *given)?;
                Ok(self.with_ledger(ledger))
            }
            TripEvent::ReturnChange {
                passenger_id,
                amount,
            } => {
                let ledger =
                    settlement::return_change(self.ledger(), fare, *passenger_id, *amount)?;
                Ok(self.with_ledger(ledger))
            }
            TripEvent::ReturnAllChange { passenger_id } => {
                let ledger = settlement::return_all_change(self.ledger(), fare, *passenger_id)?;
                Ok(self.with_ledger(ledger))
            }
            TripEvent::Reset => Ok(self.reset()),
        }
    }
}

// =============================================================================
// Observers
// =============================================================================

/// A completed state change, as seen by observers.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    pub event: &'a TripEvent,
    pub state: &'a TripState,
    pub config: &'a EngineConfig,
}

/// Receives every successful transition.
///
/// Implementations must not block and must swallow their own failures;
/// the engine has already moved on by the time they run.
pub trait TripObserver: Send + Sync {
    fn on_transition(&self, transition: &Transition<'_>);
}

// =============================================================================
// Fare Engine
// =============================================================================

/// Owns the current state and dispatches events against it.
///
/// ## Usage
/// ```rust
/// use ojra_core::{EngineConfig, FareEngine, Money, TripEvent, VehicleType};
///
/// let mut engine = FareEngine::new(EngineConfig::default());
/// engine.dispatch(TripEvent::SelectVehicle { vehicle_type: VehicleType::Bus }).unwrap();
/// engine.dispatch(TripEvent::SetCostPerPerson { amount: Money::from_major(7) }).unwrap();
///
/// assert_eq!(engine.state().ledger().len(), 50);
/// assert_eq!(engine.metrics().total_cost, Money::from_major(350));
/// ```
pub struct FareEngine {
    config: EngineConfig,
    state: TripState,
    observers: Vec<Box<dyn TripObserver>>,
}

impl FareEngine {
    /// Creates an engine with a fresh trip.
    pub fn new(config: EngineConfig) -> Self {
        FareEngine {
            config,
            state: TripState::new(),
            observers: Vec::new(),
        }
    }

    /// Registers an observer for future transitions.
    pub fn subscribe(&mut self, observer: Box<dyn TripObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    /// Fresh metrics for the current state.
    pub fn metrics(&self) -> TripMetrics {
        TripMetrics::compute(&self.state)
    }

    pub fn snapshot(&self) -> TripSnapshot {
        self.state.snapshot()
    }

    /// Overwrites the state from a stored snapshot.
    ///
    /// Observers are NOT notified: restoring is not a user action and must
    /// not write straight back to storage.
    pub fn restore(&mut self, snapshot: TripSnapshot) {
        self.state = TripState::from_snapshot(snapshot);
        info!(
            vehicle = %self.state.config().vehicle_type,
            fare = %self.state.cost_per_person(),
            seats = self.state.ledger().len(),
            "Trip state restored"
        );
    }

    /// Applies an event; on success the new state replaces the old one and
    /// observers are notified.
    pub fn dispatch(&mut self, event: TripEvent) -> CoreResult<&TripState> {
        let next = self.state.apply(&event, &self.config)?;
        self.state = next;

        debug!(event = %event, "Trip event applied");
        self.notify(&event);

        Ok(&self.state)
    }

    fn notify(&self, event: &TripEvent) {
        let transition = Transition {
            event,
            state: &self.state,
            config: &self.config,
        };
        for observer in &self.observers {
            observer.on_transition(&transition);
        }
    }

    // -------------------------------------------------------------------------
    // Payment draft
    // -------------------------------------------------------------------------

    /// Opens a payment for a seat, replacing any open one. A seat whose
    /// recorded payment is special reopens in special mode.
    pub fn open_payment(&mut self, passenger_id: PassengerId) -> CoreResult<&PaymentDraft> {
        let draft = PaymentDraft::for_passenger(self.state.ledger().require(passenger_id)?);
        self.state = self.state.with_draft(Some(draft));
        self.current_draft()
    }

    /// Edits the open payment in place.
    pub fn edit_payment<F>(&mut self, edit: F) -> CoreResult<&PaymentDraft>
    where
        F: FnOnce(&mut PaymentDraft),
    {
        let previous = self.current_draft()?.clone();
        let mut draft = previous.clone();
        edit(&mut draft);

        // Newly picked seats must be unpaid; the whole list is checked again
        // on submit.
        for id in draft
            .covered_ids
            .iter()
            .filter(|id| !previous.covered_ids.contains(id))
        {
            self.state
                .ledger()
                .require_coverable(draft.passenger_id, *id)?;
        }

        self.state = self.state.with_draft(Some(draft));
        self.current_draft()
    }

    /// Live totals for the open payment.
    pub fn preview_payment(&self) -> CoreResult<PaymentPreview> {
        Ok(self.current_draft()?.preview(self.state.cost_per_person()))
    }

    /// Discards the open payment.
    pub fn close_payment(&mut self) {
        self.state = self.state.with_draft(None);
    }

    /// Settles the open payment. The draft is cleared only on success, so
    /// a rejected amount can be corrected and resubmitted.
    pub fn submit_payment(&mut self) -> CoreResult<&TripState> {
        let draft = self.current_draft()?;
        for id in &draft.covered_ids {
            self.state
                .ledger()
                .require_coverable(draft.passenger_id, *id)?;
        }

        let payment = draft.to_event();
        self.dispatch(TripEvent::RecordPayment { payment })?;
        self.close_payment();
        Ok(&self.state)
    }

    fn current_draft(&self) -> CoreResult<&PaymentDraft> {
        self.state.draft().ok_or(CoreError::NoOpenPayment)
    }
}

impl fmt::Debug for FareEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FareEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records event names it sees.
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl TripObserver for Recorder {
        fn on_transition(&self, transition: &Transition<'_>) {
            self.0
                .lock()
                .unwrap()
                .push(transition.event.name().to_string());
        }
    }

    fn taxi_engine(fare: i64) -> FareEngine {
        let mut engine = FareEngine::new(EngineConfig::default());
        engine
            .dispatch(TripEvent::SelectVehicle {
                vehicle_type: VehicleType::Taxi,
            })
            .unwrap();
        engine
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_major(fare),
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_observers_see_successful_events_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut engine = FareEngine::new(EngineConfig::default());
        engine.subscribe(Box::new(Recorder(seen.clone())));

        engine
            .dispatch(TripEvent::SelectVehicle {
                vehicle_type: VehicleType::Taxi,
            })
            .unwrap();
        assert!(engine
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_cents(-5),
            })
            .is_err());
        engine.dispatch(TripEvent::Reset).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["vehicle_selected", "trip_reset"]);
    }

    #[test]
    fn test_failed_settlement_leaves_state_unchanged() {
        let mut engine = taxi_engine(10);
        let before = engine.state().clone();

        let result = engine.dispatch(TripEvent::RecordPayment {
            payment: PaymentEvent::standard(1, Money::from_major(30), vec![2, 99]),
        });

        assert!(matches!(result, Err(CoreError::PassengerNotFound(99))));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_configured_payment_limit_applies() {
        let mut engine = FareEngine::new(EngineConfig::new().payment_limit(Money::from_major(100)));
        engine
            .dispatch(TripEvent::SelectVehicle {
                vehicle_type: VehicleType::Taxi,
            })
            .unwrap();

        assert!(engine
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_major(101),
            })
            .is_err());
        engine
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_major(20),
            })
            .unwrap();
        assert!(engine
            .dispatch(TripEvent::RecordPayment {
                payment: PaymentEvent::standard(1, Money::from_major(150), vec![]),
            })
            .is_err());
    }

    #[test]
    fn test_configured_max_capacity_applies() {
        let mut engine = FareEngine::new(EngineConfig::new().max_capacity(12));
        engine
            .dispatch(TripEvent::SelectVehicle {
                vehicle_type: VehicleType::Custom,
            })
            .unwrap();
        engine
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_major(5),
            })
            .unwrap();

        assert!(engine
            .dispatch(TripEvent::SetCustomCapacity {
                capacity: i64::from(u32::MAX),
            })
            .is_err());
        assert!(engine
            .dispatch(TripEvent::SetCustomCapacity { capacity: 13 })
            .is_err());
        assert!(engine.state().ledger().is_empty());

        engine
            .dispatch(TripEvent::SetCustomCapacity { capacity: 12 })
            .unwrap();
        assert_eq!(engine.state().ledger().len(), 12);
    }

    #[test]
    fn test_restore_does_not_notify() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let source = taxi_engine(10);

        let mut engine = FareEngine::new(EngineConfig::default());
        engine.subscribe(Box::new(Recorder(seen.clone())));
        engine.restore(source.snapshot());

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(engine.state().ledger().len(), 4);
    }

    #[test]
    fn test_draft_submit_flow() {
        let mut engine = taxi_engine(10);

        engine.open_payment(1).unwrap();
        engine
            .edit_payment(|d| {
                d.set_amount(Money::from_major(50));
                d.toggle_covered(2, true);
            })
            .unwrap();

        let preview = engine.preview_payment().unwrap();
        assert_eq!(preview.total_required, Money::from_major(20));

        engine.submit_payment().unwrap();
        assert!(engine.state().draft().is_none());
        assert_eq!(engine.metrics().outstanding_change, Money::from_major(30));
    }

    #[test]
    fn test_draft_kept_when_submit_rejected() {
        let mut engine = taxi_engine(10);
        engine.open_payment(3).unwrap();

        assert!(engine.submit_payment().is_err());
        assert_eq!(engine.state().draft().unwrap().passenger_id, 3);
    }

    #[test]
    fn test_draft_requires_known_seats() {
        let mut engine = taxi_engine(10);
        assert!(matches!(
            engine.open_payment(7),
            Err(CoreError::PassengerNotFound(7))
        ));
        assert!(matches!(
            engine.preview_payment(),
            Err(CoreError::NoOpenPayment)
        ));

        engine.open_payment(1).unwrap();
        assert!(engine.edit_payment(|d| d.toggle_covered(12, true)).is_err());
        assert!(engine.state().draft().unwrap().covered_ids.is_empty());
    }

    #[test]
    fn test_paid_seat_cannot_be_covered() {
        let mut engine = taxi_engine(10);
        engine
            .dispatch(TripEvent::RecordPayment {
                payment: PaymentEvent::standard(3, Money::from_major(40), vec![]),
            })
            .unwrap();
        let before = engine.state().ledger().clone();

        engine.open_payment(1).unwrap();
        assert!(matches!(
            engine.edit_payment(|d| {
                d.set_amount(Money::from_major(20));
                d.toggle_covered(3, true);
            }),
            Err(CoreError::NotCoverable(3))
        ));
        assert!(engine.state().draft().unwrap().covered_ids.is_empty());

        // Seat 3 keeps its payment and the 30.00 change it is owed.
        assert_eq!(engine.state().ledger(), &before);
        assert_eq!(engine.metrics().outstanding_change, Money::from_major(30));
    }

    #[test]
    fn test_submit_rechecks_covered_seats() {
        let mut engine = taxi_engine(10);
        engine.open_payment(1).unwrap();
        engine
            .edit_payment(|d| {
                d.set_amount(Money::from_major(20));
                d.toggle_covered(2, true);
            })
            .unwrap();

        // Seat 2 pays on its own while seat 1's payment is still open.
        engine
            .dispatch(TripEvent::RecordPayment {
                payment: PaymentEvent::standard(2, Money::from_major(25), vec![]),
            })
            .unwrap();

        assert!(matches!(
            engine.submit_payment(),
            Err(CoreError::NotCoverable(2))
        ));
        assert_eq!(engine.state().ledger().get(2).unwrap().paid, Money::from_major(25));
        assert!(engine.state().draft().is_some());

        // Unpicking the paid seat still works, then the payment goes through.
        engine.edit_payment(|d| d.toggle_covered(2, false)).unwrap();
        engine.submit_payment().unwrap();
        assert_eq!(engine.state().ledger().get(1).unwrap().paid, Money::from_major(20));
    }

    #[test]
    fn test_special_seat_reopens_special() {
        let mut engine = taxi_engine(10);
        engine
            .dispatch(TripEvent::RecordPayment {
                payment: PaymentEvent::special(4, Money::from_major(6)),
            })
            .unwrap();

        assert!(engine.open_payment(4).unwrap().special);
        assert!(!engine.open_payment(1).unwrap().special);
    }

    #[test]
    fn test_fare_change_closes_draft() {
        let mut engine = taxi_engine(10);
        engine.open_payment(2).unwrap();
        engine
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_major(12),
            })
            .unwrap();
        assert!(engine.state().draft().is_none());
    }

    #[test]
    fn test_event_properties() {
        let event = TripEvent::RecordPayment {
            payment: PaymentEvent::standard(1, Money::from_cents(2500), vec![2, 3]),
        };
        let props = event.properties();
        assert_eq!(event.name(), "payment_recorded");
        assert_eq!(props["amount"], 2500);
        assert_eq!(props["passengers"], 3);
        assert_eq!(props["special"], false);

        assert!(TripEvent::Reset.properties().is_empty());
    }

    #[test]
    fn test_event_json_tag() {
        let json = serde_json::to_value(TripEvent::ReturnAllChange { passenger_id: 2 }).unwrap();
        assert_eq!(json["type"], "return_all_change");
        assert_eq!(json["passengerId"], 2);

        let json = serde_json::to_value(TripEvent::SelectVehicle {
            vehicle_type: VehicleType::Custom,
        })
        .unwrap();
        assert_eq!(json["vehicleType"], "custom");

        let back: TripEvent =
            serde_json::from_str(r#"{"type":"return_change","passengerId":3,"amount":250}"#).unwrap();
        assert_eq!(
            back,
            TripEvent::ReturnChange {
                passenger_id: 3,
                amount: Money::from_cents(250),
            }
        );
    }
}
