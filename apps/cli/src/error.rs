//! # CLI Error Type
//!
//! Every command returns `Result<T, CliError>`. Failures are printed as JSON
//! on stderr:
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Quantity must be between 1 and 999"
//! }
//! ```

use serde::Serialize;
use std::fmt;

use rewardcart_core::{CoreError, ValidationError};
use rewardcart_db::DbError;
use rewardcart_sync::SyncError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// Local database failure
    DatabaseError,

    /// Backend unreachable
    NetworkError,

    /// Backend answered with an error status
    ServerError,

    /// Bad config file or environment
    ConfigError,

    /// Wallet balance too low
    InsufficientBalance,

    Internal,
}

impl ErrorCode {
    /// Process exit code for this error class.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::ValidationError | ErrorCode::InsufficientBalance => 2,
            ErrorCode::ConfigError => 3,
            ErrorCode::NetworkError | ErrorCode::ServerError => 4,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::InsufficientBalance { .. } => {
                CliError::new(ErrorCode::InsufficientBalance, err.to_string())
            }
            CoreError::AmountOverflow(_) => CliError::validation(err.to_string()),
            CoreError::InvalidPayload(_) => CliError::internal(err.to_string()),
        }
    }
}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => CliError::validation(err.to_string()),
            DbError::QueryFailed(ref e) | DbError::Internal(ref e) => {
                // Log the details, keep the message short
                tracing::error!("Database operation failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            other => CliError::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::Validation(_) => ErrorCode::ValidationError,
            e if e.is_config_error() => ErrorCode::ConfigError,
            e if e.is_connectivity() => ErrorCode::NetworkError,
            SyncError::Http { .. } => ErrorCode::ServerError,
            SyncError::Database(_) => ErrorCode::DatabaseError,
            _ => ErrorCode::Internal,
        };
        CliError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Failed to encode output: {err}"))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rewardcart_core::Money;

    #[test]
    fn test_sync_error_mapping() {
        let err: CliError = SyncError::Timeout("15s".into()).into();
        assert_eq!(err.code, ErrorCode::NetworkError);

        let err: CliError = SyncError::Http {
            status: 400,
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ServerError);

        let err: CliError = SyncError::InvalidUrl("ftp://x".into()).into();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert_eq!(err.code.exit_code(), 3);
    }

    #[test]
    fn test_core_error_mapping() {
        let err: CliError = CoreError::InsufficientBalance {
            available: Money::from_cents(100),
            requested: Money::from_cents(500),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientBalance);

        let err: CliError = ValidationError::Required {
            field: "Amount".into(),
        }
        .into();
        assert_eq!(err.message, "Amount is required");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(CliError::validation("nope")).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "nope");
    }
}
