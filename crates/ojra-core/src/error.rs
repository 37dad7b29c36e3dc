//! # Error Types
//!
//! Domain-specific error types for ojra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ojra-core errors (this file)                                          │
//! │  ├── CoreError        - Precondition and settlement failures           │
//! │  └── ValidationError  - Rejected input (state stays unchanged)         │
//! │                                                                         │
//! │  ojra-db errors (separate crate)                                       │
//! │  └── DbError          - Snapshot / outbox persistence failures         │
//! │                                                                         │
//! │  Console errors (in app)                                               │
//! │  └── ApiError         - What the shell prints (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → shell output           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rejection vs Failure
//! A `ValidationError` is the "refuse the mutation" outcome: negative or
//! over-limit amounts, zero payments, non-numeric text. The other
//! `CoreError` variants mean the caller broke a precondition (an id that is
//! not in the ledger) or that settlement could not produce a valid ledger.
//! In every case the engine keeps its previous state.

use thiserror::Error;

use crate::money::Money;
use crate::types::PassengerId;

// =============================================================================
// Core Error
// =============================================================================

/// Core fare engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Passenger id does not exist in the current ledger.
    ///
    /// ## When This Occurs
    /// - The caller kept an id from a ledger that was since rebuilt
    ///   (fare or capacity changed)
    /// - A restored snapshot has fewer seats than the caller expects
    #[error("Passenger not found: {0}")]
    PassengerNotFound(PassengerId),

    /// The payer appears in its own covered list.
    #[error("Passenger {0} cannot cover their own fare as a co-rider")]
    PayerCoversSelf(PassengerId),

    /// A payment tried to cover a seat the payer may not pay for.
    ///
    /// ## When This Occurs
    /// - The seat already has a payment recorded (covering it would wipe
    ///   that payment and any change still owed on it)
    /// - The seat was picked while unpaid and got paid before submit
    #[error("Passenger {0} has already paid and cannot be covered")]
    NotCoverable(PassengerId),

    /// There is no overpayment to hand back.
    ///
    /// ## When This Occurs
    /// - Passenger paid exactly the fare or less
    /// - Passenger made a special payment (no fixed fare to compare against)
    #[error("No change owed to passenger {0}")]
    NoChangeOwed(PassengerId),

    /// The ledger is empty, so there is nobody to settle for.
    ///
    /// ## When This Occurs
    /// - Fare or capacity is still zero
    /// - Vehicle is a minibus (no preset capacity)
    #[error("No passengers on this trip yet")]
    EmptyLedger,

    /// A draft operation was attempted with no payment open.
    #[error("No payment is being entered")]
    NoOpenPayment,

    /// Settlement could not produce a valid allocation.
    ///
    /// ## When This Occurs
    /// - A sub-fare amount spread across several passengers rounds up so
    ///   far that the payer's own share would turn negative
    #[error("Settlement failed: {reason}")]
    Settlement { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a settlement failure.
    pub fn settlement(reason: impl Into<String>) -> Self {
        CoreError::Settlement {
            reason: reason.into(),
        }
    }

    /// True when the error is a plain input rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any state transform runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Amount exceeds the configured payment limit.
    #[error("{field} {value} exceeds the limit of {limit}")]
    OverLimit {
        field: String,
        value: Money,
        limit: Money,
    },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-numeric amount text).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::PassengerNotFound(7).to_string(),
            "Passenger not found: 7"
        );
        assert_eq!(
            CoreError::settlement("payer share negative").to_string(),
            "Settlement failed: payer share negative"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Negative {
            field: "fare".to_string(),
        };
        assert_eq!(err.to_string(), "fare cannot be negative");

        let err = ValidationError::OverLimit {
            field: "payment".to_string(),
            value: Money::from_cents(1_000_001),
            limit: Money::from_major(10_000),
        };
        assert_eq!(
            err.to_string(),
            "payment 10000.01 exceeds the limit of 10000.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "payment".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_rejection());
        assert!(!CoreError::EmptyLedger.is_rejection());
    }
}
