//! # Error Module
//!
//! Provides error types for domain rule violations.
//!
//! ## Error Philosophy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ERRORS ARE VALUES, NOT EXCEPTIONS                                      │
//! │                                                                         │
//! │  Every rule a cashier can trip over has its own variant carrying        │
//! │  the data needed to explain the refusal:                                │
//! │                                                                         │
//! │    "Payment insufficient" ──► required + received amounts               │
//! │    "Out of stock"         ──► product name + requested + available      │
//! │    "No open shift"        ──► which kasir tried to sell                 │
//! │                                                                         │
//! │  The HTTP layer maps each variant to a stable error code; the          │
//! │  register UI renders the payload without re-deriving anything.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error Type
// =============================================================================

/// Domain errors for business rule violations.
///
/// These are the errors a request can earn by being wrong about the
/// world, as opposed to the database layer failing underneath it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Input failed validation before touching any aggregate.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Kasir already has an open shift; a second one may not be opened.
    #[error("Kasir {kasir_id} already has an open shift")]
    ShiftAlreadyOpen { kasir_id: String },

    /// Kasir has no open shift, so cash operations have no drawer to hit.
    #[error("Kasir {kasir_id} has no open shift")]
    NoOpenShift { kasir_id: String },

    /// The shift was already closed; closing is a one-way door.
    #[error("Shift {shift_id} is already closed")]
    ShiftAlreadyClosed { shift_id: String },

    /// Checkout requires at least one cart line.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash tendered does not cover the total.
    #[error("Insufficient payment: required {required}, received {received}")]
    InsufficientPayment { required: i64, received: i64 },

    /// Customer holds no membership that grants free washes.
    #[error("Customer {customer_id} has no active wash entitlement")]
    NoEntitlement { customer_id: String },

    /// Guarded stock decrement would go below zero.
    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: i64,
    },

    /// A recorded membership usage was already claimed by a transaction.
    #[error("Membership usage {usage_id} was already claimed by a transaction")]
    UsageAlreadySpent { usage_id: String },
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Validation Error Type
// =============================================================================

/// Validation errors with field context.
///
/// ## Example
/// ```rust
/// use aqua_core::error::ValidationError;
///
/// let err = ValidationError::Required { field: "name".to_string() };
/// assert_eq!(err.to_string(), "name is required");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
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

    /// Numeric value out of allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive (> 0).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (>= 0).
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed id or phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value not allowed in this context.
    #[error("{field} not allowed: {reason}")]
    NotAllowed { field: String, reason: String },

    /// Duplicate value where uniqueness is required.
    #[error("{field} already exists")]
    Duplicate { field: String },
}

// =============================================================================
// Helper Constructors
// =============================================================================

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        Self::Required {
            field: field.into(),
        }
    }

    /// Creates a MustBePositive error.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        Self::MustBePositive {
            field: field.into(),
        }
    }

    /// Creates a MustNotBeNegative error.
    pub fn must_not_be_negative(field: impl Into<String>) -> Self {
        Self::MustNotBeNegative {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
