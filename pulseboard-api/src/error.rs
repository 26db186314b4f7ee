//! Error types for the pulseboard API.
//!
//! `ApiError` is the single error type returned from route handlers.
//! Every error serializes as `{"success": false, "error": "...",
//! "code": "..."}` with the HTTP status implied by its `ErrorCode`,
//! so clients can rely on one failure shape across the whole surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses, each mapping to an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Table name failed the `_new_feed` allow-list (400). Rejected
    /// before any query is constructed.
    InvalidTableName,

    /// Some other request parameter failed validation (400).
    ValidationFailed,

    /// Table does not exist or has no columns (404).
    TableNotFound,

    /// Database operation failed (500).
    DatabaseError,

    /// Internal server error (500).
    InternalError,

    /// Service temporarily unavailable (503).
    ServiceUnavailable,

    /// Connection pool exhausted (503).
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidTableName | ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::TableNotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    /// Default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidTableName => {
                "Invalid table name. Table must end with \"_new_feed\""
            }
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::TableNotFound => "Table not found or has no columns",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error for API operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code categorizing the error.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the code's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    pub fn invalid_table_name(name: &str) -> Self {
        Self::new(
            ErrorCode::InvalidTableName,
            format!("Invalid table name {name:?}. Table must end with \"_new_feed\""),
        )
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn table_not_found(name: &str) -> Self {
        Self::new(
            ErrorCode::TableNotFound,
            format!("Table {name:?} not found or has no columns"),
        )
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }

    /// Wire representation: `{"success": false, "error": ..., "code": ...}`.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self.message,
            "code": self.code,
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.to_body())).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM STANDARD ERRORS
// ============================================================================

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        // Generic message on the wire; the detail stays in the logs.
        ApiError::database_error("Database operation failed")
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!("Connection pool error: {:?}", err);

        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Database connection pool is closed")
            }
            _ => ApiError::database_error("Failed to acquire database connection"),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::internal_error(format!("JSON error: {}", err))
    }
}

impl From<pulseboard_core::CoreError> for ApiError {
    fn from(err: pulseboard_core::CoreError) -> Self {
        match err {
            pulseboard_core::CoreError::InvalidTableName { name } => {
                ApiError::invalid_table_name(&name)
            }
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ErrorCode::InvalidTableName.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::TableNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DatabaseError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn wire_shape_carries_success_false_and_error() {
        let err = ApiError::invalid_table_name("abc;DROP_new_feed");
        let body = err.to_body();

        assert_eq!(body["success"], serde_json::json!(false));
        assert!(body["error"].as_str().unwrap().contains("abc;DROP_new_feed"));
        assert_eq!(body["code"], serde_json::json!("INVALID_TABLE_NAME"));
    }

    #[test]
    fn constructors_set_codes() {
        assert_eq!(
            ApiError::table_not_found("x_new_feed").code,
            ErrorCode::TableNotFound
        );
        assert_eq!(
            ApiError::database_error("boom").code,
            ErrorCode::DatabaseError
        );
        assert_eq!(
            ApiError::connection_pool_exhausted().message,
            ErrorCode::ConnectionPoolExhausted.default_message()
        );
    }

    #[test]
    fn core_validation_error_maps_to_400() {
        let core_err = pulseboard_core::FeedTable::parse("nope").unwrap_err();
        let api_err: ApiError = core_err.into();
        assert_eq!(api_err.code, ErrorCode::InvalidTableName);
        assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = ApiError::internal_error("broke");
        let text = format!("{}", err);
        assert!(text.contains("InternalError"));
        assert!(text.contains("broke"));
    }
}
