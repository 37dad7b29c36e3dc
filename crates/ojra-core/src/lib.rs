//! # ojra-core: Pure Fare Logic for Ojra
//!
//! Everything that decides who owes what on a shared ride lives here, as
//! pure transforms with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ojra Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Console shell (apps/console)                 │   │
//! │  │    vehicle ──► fare ──► pay / cover ──► change ──► reset        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ojra-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   trip    │  │settlement │  │  metrics  │  │  engine   │  │   │
//! │  │   │  Ledger   │  │ allocate  │  │  totals   │  │ events +  │  │   │
//! │  │   │ TripState │  │  change   │  │  status   │  │ observers │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE TRANSFORMS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ TripSnapshot / TripEvent               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ojra-db (Persistence Layer)                  │   │
//! │  │            snapshot store, analytics outbox, migrations         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent money with half-up rounding at the boundary
//! - [`types`] - Vehicles, passengers, payment status
//! - [`trip`] - Trip configuration, the seat ledger, rebuild rules
//! - [`settlement`] - Payment allocation and change return
//! - [`metrics`] - Derived totals
//! - [`draft`] - The payment being composed before submit
//! - [`snapshot`] - Persisted shape
//! - [`engine`] - Events, the pure `apply`, and observer dispatch
//! - [`validation`] / [`error`] - Input rules and typed errors
//!
//! ## Example Usage
//!
//! ```rust
//! use ojra_core::{EngineConfig, FareEngine, Money, PaymentEvent, TripEvent, VehicleType};
//!
//! let mut engine = FareEngine::new(EngineConfig::default());
//! engine.dispatch(TripEvent::SelectVehicle { vehicle_type: VehicleType::Taxi }).unwrap();
//! engine.dispatch(TripEvent::SetCostPerPerson { amount: "10".parse().unwrap() }).unwrap();
//!
//! // Seat 1 hands over 50.00 for themselves and seat 2
//! engine
//!     .dispatch(TripEvent::RecordPayment {
//!         payment: PaymentEvent::standard(1, Money::from_major(50), vec![2]),
//!     })
//!     .unwrap();
//!
//! let metrics = engine.metrics();
//! assert_eq!(metrics.total_collected, Money::from_major(20));
//! assert_eq!(metrics.outstanding_change, Money::from_major(30));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod money;
pub mod settlement;
pub mod snapshot;
pub mod trip;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use draft::{Balance, PaymentDraft, PaymentPreview};
pub use engine::{EngineConfig, FareEngine, Transition, TripEvent, TripObserver};
pub use error::{CoreError, CoreResult, ValidationError};
pub use metrics::TripMetrics;
pub use money::Money;
pub use settlement::{PaymentEvent, PaymentMode};
pub use snapshot::TripSnapshot;
pub use trip::{Ledger, TripConfig, TripState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest fare or single payment accepted (10,000.00).
///
/// Catches a mistyped extra zero before it lands in the ledger.
pub const PAYMENT_LIMIT: Money = Money::from_major(10_000);

/// Largest custom seat count accepted (200).
///
/// Every seat is materialised in the ledger, so the count is bounded the
/// same way amounts are.
pub const MAX_CAPACITY: u32 = 200;

/// Storage key the trip snapshot lives under.
pub const DEFAULT_STATE_KEY: &str = "ojraState";
