//! # Sync Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Connectivity   │  │     Server              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Offline        │  │  Http { status }        │ │
//! │  │  InvalidUrl     │  │  ConnectionFail │  │   5xx/408/429 retry     │ │
//! │  │  ConfigLoad     │  │  Timeout        │  │   other 4xx give up     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Payload      │  │    Database     │  │      Internal           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Serialization  │  │  Database       │  │  ChannelError           │ │
//! │  │  InvalidPayload │  │                 │  │  Internal               │ │
//! │  │  Validation     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The queue processor branches on [`SyncError::is_connectivity`] and
//! [`SyncError::is_retryable`].

use rewardcart_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Connectivity Errors
    // =========================================================================
    /// The device is known to be offline; no request was made.
    #[error("Device is offline")]
    Offline,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    // =========================================================================
    // Server Errors
    // =========================================================================
    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// A queued operation could not be decoded.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Database Errors
    // =========================================================================
    #[error("Database error: {0}")]
    Database(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<rewardcart_db::DbError> for SyncError {
    fn from(err: rewardcart_db::DbError) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => SyncError::Validation(v),
            other => SyncError::InvalidPayload(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

/// Maps transport failures onto the connectivity/server split.
///
/// ```text
/// timeout        → Timeout          (connectivity)
/// connect/request→ ConnectionFailed (connectivity)
/// status         → Http { status }
/// decode         → SerializationFailed
/// ```
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            SyncError::SerializationFailed(err.to_string())
        } else if err.is_builder() {
            SyncError::InvalidUrl(err.to_string())
        } else {
            SyncError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// The request never reached a server that could answer it.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            SyncError::Offline | SyncError::ConnectionFailed(_) | SyncError::Timeout(_)
        )
    }

    /// Trying the same request again later may succeed.
    ///
    /// ## Retryable
    /// - Connectivity errors
    /// - 5xx, 408 Request Timeout, 429 Too Many Requests
    ///
    /// ## Non-Retryable
    /// - Other 4xx (the server rejected the operation itself)
    /// - Payload, validation and configuration errors
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            other => other.is_connectivity(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
        )
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
