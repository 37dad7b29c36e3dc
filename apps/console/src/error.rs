//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shell line ──► parse ──► command ──► FareEngine / Database            │
//! │                   │          │                │                         │
//! │                   │          │     CoreError / DbError                  │
//! │                   ▼          ▼                ▼                         │
//! │               ApiError { code, message } ──► {"ok":false,"error":{..}}  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed settlement never shows its internal reason to the user; it is
//! logged and replaced by [`PAYMENT_FAILED_MESSAGE`].

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use ojra_core::{CoreError, ValidationError};
use ojra_db::DbError;

/// Shown when recording a payment fails for a reason the user can't fix.
/// ("An error occurred while recording the payment")
pub const PAYMENT_FAILED_MESSAGE: &str = "حدث خطأ أثناء تسجيل الدفع";

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Passenger not found: 17"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Passenger (or other record) not found
    NotFound,

    /// Input rejected; state unchanged
    ValidationError,

    /// Valid input that the current trip can't accept
    BusinessLogic,

    /// Payment could not be recorded
    PaymentError,

    /// Database operation failed
    DatabaseError,

    /// Shell line could not be understood
    InvalidCommand,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an invalid-command error.
    pub fn invalid_command(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidCommand, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PassengerNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::PayerCoversSelf(_) => ApiError::validation(err.to_string()),
            CoreError::NotCoverable(_)
            | CoreError::NoChangeOwed(_)
            | CoreError::EmptyLedger
            | CoreError::NoOpenPayment => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Settlement { reason } => {
                tracing::error!(%reason, "Settlement failed");
                ApiError::new(ErrorCode::PaymentError, PAYMENT_FAILED_MESSAGE)
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::Corrupt(e) => {
                tracing::error!("Corrupt stored payload: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Saved trip could not be read")
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Errors that stop the console from starting or running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
