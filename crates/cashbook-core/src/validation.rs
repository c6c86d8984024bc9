//! # Validation Module
//!
//! Input validation for operator-supplied data.
//!
//! ## Validation vs Sanitization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Operator input (CLI / front end)                                      │
//! │  └── THIS MODULE: reject with a ValidationError                        │
//! │                                                                         │
//! │  Persisted or mirrored data (blobs, spreadsheet rows)                  │
//! │  └── crate::sanitize: repair silently, never reject                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashbook_core::validation::validate_identity;
//!
//! assert_eq!(validate_identity("  asha ").unwrap(), "asha");
//! assert!(validate_identity("").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{PaymentMethod, TransactionDraft};
use crate::vault::is_denomination;
use crate::money::Money;
use crate::{MAX_AMOUNT_PAISE, MAX_LABEL_LEN, MAX_NOTES_LEN, MAX_NOTE_COUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Draft Validation
// =============================================================================

/// Validates a draft before it becomes (or replaces) a transaction.
///
/// ## Rules
/// - Amount must not be negative or above [`MAX_AMOUNT_PAISE`]
/// - Cash breakdown keys must be tracked denominations
/// - Breakdown counts must be in `0..=MAX_NOTE_COUNT`
/// - Company, person and location at most [`MAX_LABEL_LEN`] characters
/// - Notes at most [`MAX_NOTES_LEN`] characters
///
/// The breakdown of a UPI draft is not checked; it is dropped on
/// normalization anyway.
pub fn validate_draft(draft: &TransactionDraft) -> ValidationResult<()> {
    if draft.amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "amount".to_string(),
        });
    }
    if draft.amount.paise() > MAX_AMOUNT_PAISE {
        return Err(ValidationError::TooLarge {
            field: "amount".to_string(),
            max: Money::from_paise(MAX_AMOUNT_PAISE).to_string(),
        });
    }

    if draft.payment_method == PaymentMethod::Cash {
        for (denomination, count) in draft.breakdown.iter() {
            if !is_denomination(denomination) {
                return Err(ValidationError::UnknownDenomination { value: denomination });
            }
            if count < 0 {
                return Err(ValidationError::MustBeNonNegative {
                    field: format!("breakdown[{}]", denomination),
                });
            }
            if count > MAX_NOTE_COUNT {
                return Err(ValidationError::TooLarge {
                    field: format!("breakdown[{}]", denomination),
                    max: MAX_NOTE_COUNT.to_string(),
                });
            }
        }
    }

    validate_length("company", &draft.company, MAX_LABEL_LEN)?;
    validate_length("person", &draft.person, MAX_LABEL_LEN)?;
    validate_length("location", &draft.location, MAX_LABEL_LEN)?;
    validate_length("notes", &draft.notes, MAX_NOTES_LEN)?;

    Ok(())
}

fn validate_length(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Identity
// =============================================================================

/// Validates the acting identity and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_LABEL_LEN`] characters
pub fn validate_identity(identity: &str) -> ValidationResult<String> {
    let identity = identity.trim();

    if identity.is_empty() {
        return Err(ValidationError::Required {
            field: "identity".to_string(),
        });
    }

    validate_length("identity", identity, MAX_LABEL_LEN)?;

    Ok(identity.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::NoteCounts;

    fn cash_draft(notes: &[(u32, i64)]) -> TransactionDraft {
        TransactionDraft {
            payment_method: PaymentMethod::Cash,
            amount: Money::from_rupees(100),
            breakdown: notes.iter().copied().collect::<NoteCounts>(),
            ..TransactionDraft::default()
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_draft(&cash_draft(&[(100, 1)])).is_ok());
        assert!(validate_draft(&cash_draft(&[])).is_ok());
    }

    #[test]
    fn test_negative_amount() {
        let mut draft = cash_draft(&[]);
        draft.amount = Money::from_paise(-1);
        assert!(matches!(
            validate_draft(&draft),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
    }

    #[test]
    fn test_unknown_denomination() {
        assert!(matches!(
            validate_draft(&cash_draft(&[(25, 1)])),
            Err(ValidationError::UnknownDenomination { value: 25 })
        ));
    }

    #[test]
    fn test_negative_count() {
        assert!(validate_draft(&cash_draft(&[(50, -2)])).is_err());
    }

    #[test]
    fn test_amount_and_count_limits() {
        let mut draft = cash_draft(&[(500, MAX_NOTE_COUNT)]);
        draft.amount = Money::from_paise(MAX_AMOUNT_PAISE);
        assert!(validate_draft(&draft).is_ok());

        draft.amount = Money::from_paise(MAX_AMOUNT_PAISE + 1);
        assert!(matches!(
            validate_draft(&draft),
            Err(ValidationError::TooLarge { ref field, .. }) if field == "amount"
        ));

        let draft = cash_draft(&[(500, 100_000_000_000_000_000)]);
        assert!(matches!(
            validate_draft(&draft),
            Err(ValidationError::TooLarge { ref field, .. }) if field == "breakdown[500]"
        ));
    }

    #[test]
    fn test_upi_breakdown_ignored() {
        let mut draft = cash_draft(&[(25, -1)]);
        draft.payment_method = PaymentMethod::Upi;
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn test_label_too_long() {
        let mut draft = cash_draft(&[]);
        draft.company = "x".repeat(MAX_LABEL_LEN + 1);
        assert!(matches!(
            validate_draft(&draft),
            Err(ValidationError::TooLong { .. })
        ));
    }
}
