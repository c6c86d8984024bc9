//! # Domain Types
//!
//! The transaction record and the caller-supplied draft it is built from.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   assign id, date,   ┌──────────────────┐        │
//! │  │ TransactionDraft │ ───recordedBy──────► │   Transaction    │        │
//! │  │ ──────────────── │                      │ ──────────────── │        │
//! │  │ type             │                      │ id (UUID, fixed) │        │
//! │  │ paymentMethod    │                      │ date (fixed)     │        │
//! │  │ amount           │   update: replace    │ recordedBy       │        │
//! │  │ company/person   │ ◄──everything but────│ + draft fields   │        │
//! │  │ location, notes  │    id/date/owner     │                  │        │
//! │  │ breakdown        │                      │                  │        │
//! │  └──────────────────┘                      └──────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ TransactionType │   │  PaymentMethod  │                             │
//! │  │  credit | debit │   │   cash | upi    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record Rules
//! - `id` and `date` are set once at creation and never change
//! - UPI transactions carry an empty breakdown
//! - Lists are presented newest first ([`sort_by_date_desc`])

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::vault::NoteCounts;
use crate::DEFAULT_LABEL;

// =============================================================================
// Transaction Type
// =============================================================================

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    #[default]
    Credit,
    /// Money paid out.
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["credit".to_string(), "debit".to_string()],
            }),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the money moved. Only cash touches the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical notes and coins.
    #[default]
    Cash,
    /// Unified Payments Interface transfer.
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "upi" => Ok(PaymentMethod::Upi),
            _ => Err(ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: vec!["cash".to_string(), "upi".to_string()],
            }),
        }
    }
}

// =============================================================================
// Transaction Draft
// =============================================================================

/// The caller-supplied part of a transaction.
///
/// Used both for new entries and for full-replace updates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionType,

    pub payment_method: PaymentMethod,

    /// Amount in rupees on the wire.
    #[serde(with = "crate::money::as_rupees")]
    #[ts(type = "number")]
    pub amount: Money,

    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub person: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub notes: String,

    /// Notes handed over or paid out. Ignored for UPI.
    #[serde(default)]
    pub breakdown: NoteCounts,
}

impl TransactionDraft {
    /// Trims text fields, fills empty company/location with `"NA"` and
    /// drops the breakdown of UPI drafts.
    ///
    /// ```rust
    /// use cashbook_core::types::{PaymentMethod, TransactionDraft};
    /// use cashbook_core::vault::NoteCounts;
    ///
    /// let mut breakdown = NoteCounts::new();
    /// breakdown.set(500, 1);
    /// let draft = TransactionDraft {
    ///     payment_method: PaymentMethod::Upi,
    ///     company: "  ".to_string(),
    ///     breakdown,
    ///     ..TransactionDraft::default()
    /// }
    /// .normalized();
    ///
    /// assert_eq!(draft.company, "NA");
    /// assert!(draft.breakdown.is_empty());
    /// ```
    pub fn normalized(mut self) -> Self {
        self.company = label_or_default(&self.company);
        self.location = label_or_default(&self.location);
        self.person = self.person.trim().to_string();
        self.notes = self.notes.trim().to_string();
        if self.payment_method == PaymentMethod::Upi {
            self.breakdown = NoteCounts::new();
        }
        self
    }
}

fn label_or_default(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier (UUID v4). Never reused.
    pub id: String,

    /// When the transaction was created.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    pub payment_method: PaymentMethod,

    /// Non-negative amount, rupees on the wire.
    #[serde(with = "crate::money::as_rupees")]
    #[ts(type = "number")]
    pub amount: Money,

    pub company: String,

    pub person: String,

    pub location: String,

    /// Identity that created the transaction.
    pub recorded_by: String,

    pub notes: String,

    pub breakdown: NoteCounts,
}

impl Transaction {
    /// Builds a transaction from a draft with explicit identity fields.
    pub fn from_draft(
        draft: TransactionDraft,
        id: String,
        date: DateTime<Utc>,
        recorded_by: String,
    ) -> Self {
        let draft = draft.normalized();
        Transaction {
            id,
            date,
            kind: draft.kind,
            payment_method: draft.payment_method,
            amount: draft.amount,
            company: draft.company,
            person: draft.person,
            location: draft.location,
            recorded_by,
            notes: draft.notes,
            breakdown: draft.breakdown,
        }
    }

    /// Builds a new transaction stamped with a fresh id and the current time.
    pub fn create(draft: TransactionDraft, recorded_by: &str) -> Self {
        Transaction::from_draft(
            draft,
            Uuid::new_v4().to_string(),
            Utc::now(),
            recorded_by.to_string(),
        )
    }

    /// Full replace of everything except `id`, `date` and `recorded_by`.
    pub fn replaced_with(&self, draft: TransactionDraft) -> Self {
        Transaction::from_draft(draft, self.id.clone(), self.date, self.recorded_by.clone())
    }

    /// The editable part of this transaction.
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            kind: self.kind,
            payment_method: self.payment_method,
            amount: self.amount,
            company: self.company.clone(),
            person: self.person.clone(),
            location: self.location.clone(),
            notes: self.notes.clone(),
            breakdown: self.breakdown.clone(),
        }
    }

    #[inline]
    pub fn is_cash(&self) -> bool {
        self.payment_method == PaymentMethod::Cash
    }

    #[inline]
    pub fn is_visible_to(&self, identity: &str) -> bool {
        self.recorded_by == identity
    }

    /// Cash value of the breakdown (zero for UPI).
    pub fn breakdown_total(&self) -> Money {
        self.breakdown.total_value()
    }
}

/// Sorts newest first. Stable, so equal timestamps keep their order.
pub fn sort_by_date_desc(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn draft() -> TransactionDraft {
        let mut breakdown = NoteCounts::new();
        breakdown.set(100, 2);
        TransactionDraft {
            kind: TransactionType::Credit,
            payment_method: PaymentMethod::Cash,
            amount: Money::from_rupees(200),
            company: " Acme ".to_string(),
            person: "Ravi".to_string(),
            location: "".to_string(),
            notes: "advance".to_string(),
            breakdown,
        }
    }

    #[test]
    fn test_create_assigns_identity_fields() {
        let tx = Transaction::create(draft(), "asha");
        assert!(Uuid::parse_str(&tx.id).is_ok());
        assert_eq!(tx.recorded_by, "asha");
        assert_eq!(tx.company, "Acme");
        assert_eq!(tx.location, DEFAULT_LABEL);
        assert_eq!(tx.breakdown_total(), Money::from_rupees(200));
    }

    #[test]
    fn test_replaced_with_keeps_id_date_owner() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let tx = Transaction::from_draft(draft(), "tx-1".into(), date, "asha".into());

        let mut changed = draft();
        changed.kind = TransactionType::Debit;
        changed.payment_method = PaymentMethod::Upi;

        let updated = tx.replaced_with(changed);
        assert_eq!(updated.id, "tx-1");
        assert_eq!(updated.date, date);
        assert_eq!(updated.recorded_by, "asha");
        assert_eq!(updated.kind, TransactionType::Debit);
        assert!(updated.breakdown.is_empty());
    }

    #[test]
    fn test_sort_by_date_desc() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut txs: Vec<Transaction> = (0..3)
            .map(|i| {
                Transaction::from_draft(
                    draft(),
                    format!("tx-{}", i),
                    base + Duration::hours(i),
                    "asha".into(),
                )
            })
            .collect();

        sort_by_date_desc(&mut txs);
        let ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tx-2", "tx-1", "tx-0"]);
    }

    #[test]
    fn test_json_shape() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let tx = Transaction::from_draft(draft(), "tx-1".into(), date, "asha".into());
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["type"], "credit");
        assert_eq!(value["paymentMethod"], "cash");
        assert_eq!(value["amount"], 200.0);
        assert_eq!(value["recordedBy"], "asha");
        assert_eq!(value["breakdown"]["100"], 2);
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("DEBIT".parse::<TransactionType>().unwrap(), TransactionType::Debit);
        assert_eq!("upi".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("card".parse::<PaymentMethod>().is_err());
    }
}
