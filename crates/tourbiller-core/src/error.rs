//! # Error Types
//!
//! Domain-specific error types for tourbiller-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tourbiller-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tourbiller-db errors (separate crate)                                 │
//! │  └── DbError          - Database failures, wraps the two above         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → view layer              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The arithmetic in `billing`, `quotation` and `schedule` never returns an
//! error: bad numbers are clamped to zero. Errors only come from validation
//! and from state transitions such as cancelling a finished booking.

use thiserror::Error;

use crate::types::BookingStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A booking can only be cancelled while it is still CONFIRMED.
    ///
    /// ## When This Occurs
    /// - Cancelling a booking that was already cancelled
    /// - Cancelling a booking whose bill closed it (COMPLETED)
    #[error("Booking {booking_id} is {current_status}, only CONFIRMED bookings can be cancelled")]
    BookingNotCancellable {
        booking_id: String,
        current_status: BookingStatus,
    },

    /// A booking can only be closed by a bill while it is CONFIRMED.
    #[error("Booking {booking_id} is {current_status}, cannot be completed")]
    BookingNotCompletable {
        booking_id: String,
        current_status: BookingStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any arithmetic runs, so the engine only ever sees
/// well-typed values.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Two fields are inconsistent with each other.
    ///
    /// ## Example
    /// End meter below start meter, booking end before booking start.
    #[error("{field} must be greater than {other}")]
    MustExceed { field: String, other: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
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
