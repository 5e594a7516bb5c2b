//! # Error Types
//!
//! Domain-specific error types for cashbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cashbook-core errors (this file)                                      │
//! │  ├── CoreError        - Serialization and domain failures              │
//! │  └── ValidationError  - Form input validation failures                 │
//! │                                                                         │
//! │  cashbook-store errors (separate crate)                                │
//! │  └── StoreError       - Remote data store failures                     │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── AppError         - What the terminal shows                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A row could not be converted to a JSON value.
    ///
    /// ## When This Occurs
    /// - CSV export of a type whose `Serialize` impl fails
    #[error("Failed to serialize row: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A row passed to the CSV serializer is not a JSON object.
    #[error("Row {index} is not an object")]
    NotAnObject { index: usize },

    /// Report date range ends before it starts.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Money arithmetic left the i64 cents range.
    ///
    /// ## When This Occurs
    /// - A line total or sale total that does not fit
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Form input was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Form input errors.
///
/// Raised by the view layer before any remote call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Longer than the column allows.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Zero or negative where a positive value is needed.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Outside the accepted bounds.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed phone number or line item).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
