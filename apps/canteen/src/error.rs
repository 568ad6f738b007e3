//! # API Error Type
//!
//! Unified error type for application commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Campus Canteen                         │
//! │                                                                         │
//! │  UI Action                   Command Layer                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  checkout()                                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  No session? ───────── AUTHENTICATION_REQUIRED ───┐              │  │
//! │  │         │                                         │              │  │
//! │  │         ▼                                         ▼              │  │
//! │  │  Rule broken? ─── CoreError::EmptyCart ───────── ApiError ──────►│  │
//! │  │         │                                         ▲              │  │
//! │  │         ▼                                         │              │  │
//! │  │  Database Error? ─── DbError::QueryFailed(..) ────┘              │  │
//! │  │         │             (logged, generic message)                  │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "VALIDATION_FAILED", "message": "Cart is empty" }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors cross to the UI as JSON with a machine-readable `code` and a
//! human-readable `message`. Failures abort the one action that raised them.

use serde::Serialize;
use canteen_core::CoreError;
use canteen_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// This is what the UI receives when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 8c0e..."
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

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown order, menu item, inventory item or user.
    NotFound,

    /// Bad input or a broken business rule (empty cart, invalid
    /// status move, insufficient wallet balance, ...).
    ValidationFailed,

    /// Wallet or checkout action without a signed-in user.
    AuthenticationRequired,

    /// Storage failure. Details are logged, not returned.
    OperationFailed,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationFailed, message)
    }

    /// Creates an authentication error.
    pub fn auth_required() -> Self {
        ApiError::new(ErrorCode::AuthenticationRequired, "Please sign in to continue")
    }

    /// Creates a generic storage failure.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::OperationFailed, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Rule(core) => ApiError::from(core),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::operation_failed("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::operation_failed("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::operation_failed("Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored data could not be decoded: {}", e);
                ApiError::operation_failed("Database operation failed")
            }
            DbError::PoolExhausted => ApiError::operation_failed("Database pool exhausted"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::operation_failed("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
///
/// Every business-rule failure is a `VALIDATION_FAILED`; only the wording
/// differs.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientBalance { .. } => {
                ApiError::validation("Insufficient wallet balance")
            }
            CoreError::InvalidStatusTransition { from, to, .. } => {
                ApiError::validation(format!("Cannot move order from {} to {}", from, to))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type returned by every command.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use canteen_core::{Money, OrderStatus, ValidationError};

    #[test]
    fn test_serializes_code_and_message() {
        let json = serde_json::to_value(ApiError::auth_required()).unwrap();
        assert_eq!(json["code"], "AUTHENTICATION_REQUIRED");
        assert_eq!(json["message"], "Please sign in to continue");
    }

    #[test]
    fn test_not_found_from_db() {
        let err = ApiError::from(DbError::not_found("Order", "o-1"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found: o-1");
    }

    #[test]
    fn test_rule_from_db_is_validation() {
        let err = ApiError::from(DbError::Rule(CoreError::InsufficientBalance {
            available: Money::from_rupees(100),
            required: Money::from_rupees(231),
        }));
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Insufficient wallet balance");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = ApiError::from(CoreError::InvalidStatusTransition {
            order_id: "o-1".to_string(),
            from: OrderStatus::Pending,
            to: OrderStatus::Ready,
        });
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Cannot move order from pending to ready");
    }

    #[test]
    fn test_validation_message_kept() {
        let err = ApiError::from(CoreError::Validation(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }));
        assert_eq!(err.message, "amount must be positive");
    }

    #[test]
    fn test_internal_errors_hidden() {
        let err = ApiError::from(DbError::Internal("disk on fire".to_string()));
        assert_eq!(err.code, ErrorCode::OperationFailed);
        assert!(!err.message.contains("disk"));
    }
}
