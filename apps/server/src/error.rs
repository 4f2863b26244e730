//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in AquaPOS                                │
//! │                                                                         │
//! │  Register Console                Rust Backend                           │
//! │  ────────────────                ────────────                           │
//! │                                                                         │
//! │  POST /api/transactions                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │                                                                  │  │
//! │  │  DbError::NotFound ──────────────► NOT_FOUND            404      │  │
//! │  │  DbError::UniqueViolation ───────► CONFLICT             409      │  │
//! │  │  CoreError::UsageAlreadySpent ───► USAGE_ALREADY_SPENT  409      │  │
//! │  │  CoreError::Validation ──────────► VALIDATION_ERROR     400      │  │
//! │  │  CoreError::InsufficientStock ───► INSUFFICIENT_STOCK   422      │  │
//! │  │  DbError::QueryFailed ───────────► DATABASE_ERROR       500      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for Shampoo: ..." }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business refusals (empty cart, short payment, no entitlement) are
//! 422: the request was well-formed, the till just says no. Infra
//! failures are 500 with the detail logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use aqua_core::CoreError;
use aqua_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Customer not found: 08123456789"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
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
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Duplicate value for a unique field (409)
    Conflict,

    /// Membership usage already priced a sale (409)
    UsageAlreadySpent,

    /// Shift already open / already closed (422)
    InvalidState,

    /// Kasir has no open shift (422)
    NoOpenShift,

    /// Checkout with zero lines (422)
    EmptyCart,

    /// Tendered amount below total (422)
    InsufficientPayment,

    /// No membership grants a free wash (422)
    NoEntitlement,

    /// Stock cannot cover the requested quantity (422)
    InsufficientStock,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// The HTTP status this code travels with.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict | ErrorCode::UsageAlreadySpent => StatusCode::CONFLICT,
            ErrorCode::InvalidState
            | ErrorCode::NoOpenShift
            | ErrorCode::EmptyCart
            | ErrorCode::InsufficientPayment
            | ErrorCode::NoEntitlement
            | ErrorCode::InsufficientStock => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
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
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts business errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::ShiftAlreadyOpen { .. } | CoreError::ShiftAlreadyClosed { .. } => {
                ErrorCode::InvalidState
            }
            CoreError::NoOpenShift { .. } => ErrorCode::NoOpenShift,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InsufficientPayment { .. } => ErrorCode::InsufficientPayment,
            CoreError::NoEntitlement { .. } => ErrorCode::NoEntitlement,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::UsageAlreadySpent { .. } => ErrorCode::UsageAlreadySpent,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
