//! # Validation Module
//!
//! Boundary checks applied before any trip state transform runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shell / UI                                                   │
//! │  ├── Parse text into numbers (Money::from_str)                         │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Sign and range checks against the payment limit                   │
//! │  └── Err(..) means "refuse the mutation, keep the old state"           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine preconditions (CoreError)                             │
//! │  └── Passenger ids must exist in the current ledger                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a per-seat fare.
///
/// ## Rules
/// - Must be non-negative (zero clears the trip)
/// - Must not exceed the payment limit
///
/// ## Example
/// ```rust
/// use ojra_core::money::Money;
/// use ojra_core::validation::validate_fare;
///
/// let limit = Money::from_major(10_000);
/// assert!(validate_fare(Money::from_major(15), limit).is_ok());
/// assert!(validate_fare(Money::zero(), limit).is_ok());
/// assert!(validate_fare(Money::from_cents(-1), limit).is_err());
/// ```
pub fn validate_fare(fare: Money, limit: Money) -> ValidationResult<()> {
    if fare.is_negative() {
        return Err(ValidationError::Negative {
            field: "fare".to_string(),
        });
    }

    if fare > limit {
        return Err(ValidationError::OverLimit {
            field: "fare".to_string(),
            value: fare,
            limit,
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be positive (a zero payment is never settled)
/// - Must not exceed the payment limit
pub fn validate_payment_amount(amount: Money, limit: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment".to_string(),
        });
    }

    if amount > limit {
        return Err(ValidationError::OverLimit {
            field: "payment".to_string(),
            value: amount,
            limit,
        });
    }

    Ok(())
}

/// Validates an amount of change being handed back.
///
/// ## Rules
/// - Must be positive
pub fn validate_change_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "change".to_string(),
        });
    }

    Ok(())
}

/// Validates a custom vehicle capacity and narrows it to a seat count.
///
/// ## Rules
/// - Must be non-negative (zero empties the ledger)
/// - Must not exceed the configured maximum
///
/// ## Example
/// ```rust
/// use ojra_core::validation::validate_capacity;
///
/// assert_eq!(validate_capacity(7, 200).unwrap(), 7);
/// assert!(validate_capacity(-1, 200).is_err());
/// assert!(validate_capacity(201, 200).is_err());
/// ```
pub fn validate_capacity(capacity: i64, max: u32) -> ValidationResult<u32> {
    if capacity < 0 {
        return Err(ValidationError::Negative {
            field: "capacity".to_string(),
        });
    }

    match u32::try_from(capacity) {
        Ok(seats) if seats <= max => Ok(seats),
        _ => Err(ValidationError::OutOfRange {
            field: "capacity".to_string(),
            min: 0,
            max: i64::from(max),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn limit() -> Money {
        Money::from_major(10_000)
    }

    #[test]
    fn test_validate_fare() {
        assert!(validate_fare(Money::zero(), limit()).is_ok());
        assert!(validate_fare(Money::from_cents(1550), limit()).is_ok());
        assert!(validate_fare(limit(), limit()).is_ok());

        assert!(validate_fare(Money::from_cents(-100), limit()).is_err());
        assert!(validate_fare(limit() + Money::from_cents(1), limit()).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Money::from_cents(1), limit()).is_ok());
        assert!(validate_payment_amount(limit(), limit()).is_ok());

        assert!(validate_payment_amount(Money::zero(), limit()).is_err());
        assert!(validate_payment_amount(Money::from_cents(-500), limit()).is_err());
        assert!(validate_payment_amount(Money::from_major(10_001), limit()).is_err());
    }

    #[test]
    fn test_validate_change_amount() {
        assert!(validate_change_amount(Money::from_cents(50)).is_ok());
        assert!(validate_change_amount(Money::zero()).is_err());
        assert!(validate_change_amount(Money::from_cents(-50)).is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert_eq!(validate_capacity(0, 200).unwrap(), 0);
        assert_eq!(validate_capacity(50, 200).unwrap(), 50);
        assert_eq!(validate_capacity(200, 200).unwrap(), 200);
        assert!(validate_capacity(-3, 200).is_err());
        assert!(matches!(
            validate_capacity(201, 200),
            Err(ValidationError::OutOfRange { max: 200, .. })
        ));
        assert!(validate_capacity(i64::from(u32::MAX), 200).is_err());
        assert!(validate_capacity(i64::MAX, 200).is_err());
    }
}
