//! # Engine State
//!
//! The one `FareEngine` of the process, shared by the shell and anything
//! else that issues commands.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EngineState ── Arc<Mutex<FareEngine>>                                 │
//! │                                                                         │
//! │  Every command takes the lock for its whole read-modify-write, so      │
//! │  events are applied one at a time in arrival order. Observers run      │
//! │  inside the lock but only push onto a channel; the database write      │
//! │  happens on the store writer task.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use ojra_core::FareEngine;

/// Shared handle to the engine.
#[derive(Clone)]
pub struct EngineState {
    engine: Arc<Mutex<FareEngine>>,
}

impl EngineState {
    pub fn new(engine: FareEngine) -> Self {
        EngineState {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Executes a function with read access to the engine.
    pub fn with_engine<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&FareEngine) -> R,
    {
        // Transitions are pure, so a poisoned lock still holds a whole state.
        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&engine)
    }

    /// Executes a function with write access to the engine.
    pub fn with_engine_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut FareEngine) -> R,
    {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }
}

impl std::fmt::Debug for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_engine(|engine| f.debug_struct("EngineState").field("engine", engine).finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ojra_core::{EngineConfig, TripEvent, VehicleType};

    #[test]
    fn test_clones_share_engine() {
        let state = EngineState::new(FareEngine::new(EngineConfig::default()));
        let other = state.clone();

        other
            .with_engine_mut(|e| {
                e.dispatch(TripEvent::SelectVehicle {
                    vehicle_type: VehicleType::Bus,
                })
                .map(|_| ())
            })
            .unwrap();

        let vehicle = state.with_engine(|e| e.state().config().vehicle_type);
        assert_eq!(vehicle, VehicleType::Bus);
    }
}
