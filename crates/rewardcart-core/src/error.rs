//! # Error Types
//!
//! Domain-specific error types for rewardcart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rewardcart-core errors (this file)                                    │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rewardcart-db errors                                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  rewardcart-sync errors                                                │
//! │  └── SyncError        - Network / config / sync failures               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError/SyncError → CliError      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation errors are user-correctable. Their `Display` output is the
//! inline message shown under the offending form field.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A queued payload could not be decoded back into a cart operation.
    #[error("Invalid cart operation payload: {0}")]
    InvalidPayload(String),


    /// Wallet does not hold enough balance for a debit.
    #[error("Insufficient wallet balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Money, requested: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A wallet update would leave the representable range.
    #[error("Amount out of range: {0}")]
    AmountOverflow(Money),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidPayload(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// `field` holds the human-readable field label ("Amount", "Bill date", ...)
/// so that `to_string()` is directly displayable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Text could not be read as a number.
    #[error("{field} must be a valid number")]
    NotANumber { field: String },

    /// Too many digits after the decimal point.
    #[error("{field} can have at most {max} decimal places")]
    TooManyDecimals { field: String, max: u32 },

    /// Amount below the accepted minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: Money },

    /// Amount above the accepted maximum.
    #[error("{field} cannot exceed {max}")]
    AboveMaximum { field: String, max: Money },

    /// Date lies after today.
    #[error("{field} cannot be in the future")]
    FutureDate { field: String },

    /// Date lies too far in the past.
    #[error("{field} cannot be older than {max_days} days")]
    TooOld { field: String, max_days: i64 },

    /// Invalid format (e.g., invalid date, disallowed characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the field label this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotANumber { field }
            | ValidationError::TooManyDecimals { field, .. }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::AboveMaximum { field, .. }
            | ValidationError::FutureDate { field }
            | ValidationError::TooOld { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
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
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "Merchant name".to_string(),
        };
        assert_eq!(err.to_string(), "Merchant name is required");

        let err = ValidationError::TooOld {
            field: "Bill date".to_string(),
            max_days: 30,
        };
        assert_eq!(err.to_string(), "Bill date cannot be older than 30 days");

        let err = ValidationError::AboveMaximum {
            field: "Amount".to_string(),
            max: Money::from_cents(100_000_000),
        };
        assert_eq!(err.to_string(), "Amount cannot exceed 1000000.00");
    }

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::FutureDate {
            field: "Bill date".to_string(),
        };
        assert_eq!(err.field(), "Bill date");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "Amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = CoreError::InsufficientBalance {
            available: Money::from_cents(500),
            requested: Money::from_cents(1250),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient wallet balance: available 5.00, requested 12.50"
        );
    }
}
