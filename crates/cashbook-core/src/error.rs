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
//! │  ├── CoreError        - General ledger errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cashbook-db errors (separate crate)                                   │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  cashbook-sync errors (separate crate)                                 │
//! │  └── SyncError        - Mirror / config failures                       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → stderr                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Corrupted persisted data is deliberately NOT an error here: the
//! sanitizer repairs or discards it (see [`crate::sanitize`]).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core ledger errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An amount could not be parsed or is out of range.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised for operator input (new drafts, updates). Never raised while
/// loading persisted data.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value exceeds the largest amount or count the ledger accepts.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Breakdown key is not one of the configured denominations.
    #[error("{value} is not a supported denomination")]
    UnknownDenomination { value: u32 },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidAmount {
            reason: "'x' is not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid amount: 'x' is not a number");

        let err = ValidationError::UnknownDenomination { value: 3 };
        assert_eq!(err.to_string(), "3 is not a supported denomination");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "identity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
