//! # Commands
//!
//! One function per user action. Each takes the shared engine, applies the
//! action under the lock and returns a fresh [`TripView`].
//!
//! ## Trip Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  select_vehicle / set_fare / set_custom_capacity   (ledger rebuilt)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  open_payment(seat)                                                    │
//! │       ├── set_payment_amount                                           │
//! │       ├── toggle_covered / set_special                                 │
//! │       ├── preview_payment                                              │
//! │       └── submit_payment ──► RecordPayment   |   close_payment         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  return_change / return_all_change / toggle_change_given               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reset_trip ───────────────────────────────► (fare 0, no seats)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::EngineState;
use ojra_core::{
    FareEngine, Money, Passenger, PassengerId, PaymentDraft, PaymentPreview, PaymentStatus,
    TripConfig, TripEvent, TripMetrics, VehicleType,
};

// =============================================================================
// Views
// =============================================================================

/// Everything the shell prints after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    pub config: TripConfig,
    pub metrics: TripMetrics,
    pub passengers: Vec<PassengerView>,
    /// The payment being entered, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentView>,
}

/// One seat card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerView {
    #[serde(flatten)]
    pub passenger: Passenger,
    pub status: PaymentStatus,
    pub change_owed: Money,
}

/// The open payment with its live totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[serde(flatten)]
    pub draft: PaymentDraft,
    pub preview: PaymentPreview,
    /// Seats that may be added to this payment.
    pub coverable_ids: Vec<PassengerId>,
}

impl TripView {
    pub fn from_engine(engine: &FareEngine) -> Self {
        let state = engine.state();
        let fare = state.cost_per_person();

        let passengers = state
            .ledger()
            .iter()
            .map(|p| PassengerView {
                passenger: p.clone(),
                status: p.status(fare),
                change_owed: p.change_owed(fare),
            })
            .collect();

        let payment = state.draft().map(|draft| PaymentView {
            draft: draft.clone(),
            preview: draft.preview(fare),
            coverable_ids: state
                .ledger()
                .coverable_for(draft.passenger_id)
                .map(|p| p.id)
                .collect(),
        });

        TripView {
            config: state.config().clone(),
            metrics: engine.metrics(),
            passengers,
            payment,
        }
    }
}

fn dispatch(state: &EngineState, event: TripEvent) -> Result<TripView, ApiError> {
    debug!(event = %event, "command");
    state.with_engine_mut(|engine| {
        engine.dispatch(event)?;
        Ok(TripView::from_engine(engine))
    })
}

// =============================================================================
// Trip configuration
// =============================================================================

pub fn get_trip(state: &EngineState) -> TripView {
    state.with_engine(TripView::from_engine)
}

pub fn select_vehicle(state: &EngineState, vehicle_type: VehicleType) -> Result<TripView, ApiError> {
    dispatch(state, TripEvent::SelectVehicle { vehicle_type })
}

pub fn set_fare(state: &EngineState, amount: Money) -> Result<TripView, ApiError> {
    dispatch(state, TripEvent::SetCostPerPerson { amount })
}

pub fn set_custom_capacity(state: &EngineState, capacity: i64) -> Result<TripView, ApiError> {
    dispatch(state, TripEvent::SetCustomCapacity { capacity })
}

pub fn reset_trip(state: &EngineState) -> Result<TripView, ApiError> {
    dispatch(state, TripEvent::Reset)
}

// =============================================================================
// Payment entry
// =============================================================================

pub fn open_payment(state: &EngineState, passenger_id: PassengerId) -> Result<TripView, ApiError> {
    state.with_engine_mut(|engine| {
        engine.open_payment(passenger_id)?;
        Ok(TripView::from_engine(engine))
    })
}

pub fn set_payment_amount(state: &EngineState, amount: Money) -> Result<TripView, ApiError> {
    edit_payment(state, |draft| draft.set_amount(amount))
}

pub fn toggle_covered(
    state: &EngineState,
    passenger_id: PassengerId,
    covered: bool,
) -> Result<TripView, ApiError> {
    edit_payment(state, |draft| draft.toggle_covered(passenger_id, covered))
}

pub fn set_special(state: &EngineState, special: bool) -> Result<TripView, ApiError> {
    edit_payment(state, |draft| draft.set_special(special))
}

fn edit_payment<F>(state: &EngineState, edit: F) -> Result<TripView, ApiError>
where
    F: FnOnce(&mut PaymentDraft),
{
    state.with_engine_mut(|engine| {
        engine.edit_payment(edit)?;
        Ok(TripView::from_engine(engine))
    })
}

pub fn preview_payment(state: &EngineState) -> Result<PaymentPreview, ApiError> {
    state.with_engine(|engine| Ok(engine.preview_payment()?))
}

pub fn close_payment(state: &EngineState) -> TripView {
    state.with_engine_mut(|engine| {
        engine.close_payment();
        TripView::from_engine(engine)
    })
}

/// Records the open payment.
///
/// A standard payment must cover every selected seat in full; the engine
/// would accept less, but the payment dialog never submits it.
pub fn submit_payment(state: &EngineState) -> Result<TripView, ApiError> {
    state.with_engine_mut(|engine| {
        let preview = engine.preview_payment()?;
        if !preview.can_submit {
            return Err(ApiError::validation(format!(
                "Amount does not cover the {} required",
                preview.total_required
            )));
        }

        engine.submit_payment()?;
        Ok(TripView::from_engine(engine))
    })
}

// =============================================================================
// Change
// =============================================================================

pub fn toggle_change_given(
    state: &EngineState,
    passenger_id: PassengerId,
    given: bool,
) -> Result<TripView, ApiError> {
    dispatch(
        state,
        TripEvent::ToggleChangeGiven {
            passenger_id,
            given,
        },
    )
}

pub fn return_change(
    state: &EngineState,
    passenger_id: PassengerId,
    amount: Money,
) -> Result<TripView, ApiError> {
    dispatch(
        state,
        TripEvent::ReturnChange {
            passenger_id,
            amount,
        },
    )
}

pub fn return_all_change(
    state: &EngineState,
    passenger_id: PassengerId,
) -> Result<TripView, ApiError> {
    dispatch(state, TripEvent::ReturnAllChange { passenger_id })
}

// =============================================================================
// Unit Tests
// =============================================================================
