//! # Sanitize Module
//!
//! Defensive loading of persisted (or mirrored) ledger data.
//!
//! Nothing stored on disk or fetched from the spreadsheet is trusted. Older
//! builds wrote fewer fields, operators edit sheets by hand, and a crash can
//! leave half a blob behind. This module turns arbitrary JSON into a
//! well-formed `(Vec<Transaction>, NoteCounts)` pair and never fails.
//!
//! ## Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  transactions blob ──► serde_json ──┬── Err ──┐                        │
//! │                                     │         │                        │
//! │  vault blob ─────────► serde_json ──┼── Err ──┤                        │
//! │                                     │         ▼                        │
//! │                                     │   ResetPolicy::Both              │
//! │                                     │   → empty list + zero vault      │
//! │                                     │   → clear BOTH keys              │
//! │                                     ▼                                  │
//! │                        sanitize_transactions / sanitize_vault          │
//! │                        (repair field by field, drop bad entries)       │
//! │                                     │                                  │
//! │                                     ▼                                  │
//! │                               LoadOutcome                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Defaults
//! | Field | Valid | Default |
//! |---|---|---|
//! | type | credit, debit | credit |
//! | paymentMethod | cash, upi | cash |
//! | amount | finite number within `MAX_AMOUNT_PAISE` | 0 |
//! | date | parseable timestamp | now |
//! | company, location | string | "NA" |
//! | person, notes | string | "" |
//! | recordedBy | string | "system" |
//! | breakdown | cash only, per-denomination | {} |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{sort_by_date_desc, PaymentMethod, Transaction, TransactionType};
use crate::vault::{is_denomination, Denomination, NoteCounts, DENOMINATIONS};
use crate::{DEFAULT_LABEL, MAX_NOTE_COUNT, SYSTEM_RECORDER};

// =============================================================================
// Reset Policy
// =============================================================================

/// What to do when one of the two persisted blobs cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Either blob corrupt → reset and clear both.
    #[default]
    Both,
    /// Reset and clear only the blob that failed to parse.
    Independent,
}

impl ResetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetPolicy::Both => "both",
            ResetPolicy::Independent => "independent",
        }
    }
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResetPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(ResetPolicy::Both),
            "independent" => Ok(ResetPolicy::Independent),
            _ => Err(ValidationError::NotAllowed {
                field: "reset_policy".to_string(),
                allowed: vec!["both".to_string(), "independent".to_string()],
            }),
        }
    }
}

// =============================================================================
// Load Outcome
// =============================================================================

/// Sanitized ledger state plus which persisted keys must be cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub transactions: Vec<Transaction>,
    pub vault: NoteCounts,
    pub clear_transactions: bool,
    pub clear_vault: bool,
}

impl LoadOutcome {
    /// True when anything had to be thrown away.
    pub fn was_reset(&self) -> bool {
        self.clear_transactions || self.clear_vault
    }
}

/// Parses and sanitizes the two persisted blobs.
///
/// `None` means the key was never written (fresh install) and is not
/// treated as corruption.
pub fn parse_ledger_blobs(
    transactions_text: Option<&str>,
    vault_text: Option<&str>,
    policy: ResetPolicy,
) -> LoadOutcome {
    let transactions_raw = parse_optional(transactions_text);
    let vault_raw = parse_optional(vault_text);

    let (tx_corrupt, vault_corrupt) = match policy {
        ResetPolicy::Both => {
            let any = transactions_raw.is_err() || vault_raw.is_err();
            (any, any)
        }
        ResetPolicy::Independent => (transactions_raw.is_err(), vault_raw.is_err()),
    };

    let transactions = match (&transactions_raw, tx_corrupt) {
        (Ok(Some(raw)), false) => sanitize_transactions(raw),
        _ => Vec::new(),
    };
    let vault = match (&vault_raw, vault_corrupt) {
        (Ok(Some(raw)), false) => sanitize_vault(raw),
        _ => NoteCounts::zeroed(),
    };

    LoadOutcome {
        transactions,
        vault,
        clear_transactions: tx_corrupt,
        clear_vault: vault_corrupt,
    }
}

fn parse_optional(text: Option<&str>) -> Result<Option<Value>, serde_json::Error> {
    text.map(serde_json::from_str::<Value>).transpose()
}

// =============================================================================
// Transactions
// =============================================================================

/// Sanitizes a raw transaction list, defaulting missing dates to now.
pub fn sanitize_transactions(raw: &Value) -> Vec<Transaction> {
    sanitize_transactions_at(raw, Utc::now())
}

/// Sanitizes a raw transaction list with an explicit fallback date.
///
/// Non-array input yields an empty list. Entries without a string `id` are
/// discarded. The result is sorted newest first.
pub fn sanitize_transactions_at(raw: &Value, now: DateTime<Utc>) -> Vec<Transaction> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    let mut transactions: Vec<Transaction> = entries
        .iter()
        .filter_map(|entry| sanitize_transaction(entry, now))
        .collect();
    sort_by_date_desc(&mut transactions);
    transactions
}

/// Sanitizes one raw entry. `None` when it is not an object with a string id.
pub fn sanitize_transaction(raw: &Value, now: DateTime<Utc>) -> Option<Transaction> {
    let object = raw.as_object()?;
    let id = object.get("id")?.as_str()?.to_string();

    let kind = match string_field(object, "type").as_deref() {
        Some("debit") => TransactionType::Debit,
        _ => TransactionType::Credit,
    };
    let payment_method = match string_field(object, "paymentMethod").as_deref() {
        Some("upi") => PaymentMethod::Upi,
        _ => PaymentMethod::Cash,
    };

    let amount = object
        .get("amount")
        .and_then(Value::as_f64)
        .and_then(Money::from_rupees_f64)
        .unwrap_or_default();

    let date = object.get("date").and_then(parse_timestamp).unwrap_or(now);

    let breakdown = match (payment_method, object.get("breakdown")) {
        (PaymentMethod::Cash, Some(raw)) => sanitize_breakdown(raw),
        _ => NoteCounts::new(),
    };

    Some(Transaction {
        id,
        date,
        kind,
        payment_method,
        amount,
        company: string_field(object, "company").unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        person: string_field(object, "person").unwrap_or_default(),
        location: string_field(object, "location").unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        recorded_by: string_field(object, "recordedBy")
            .unwrap_or_else(|| SYSTEM_RECORDER.to_string()),
        notes: string_field(object, "notes").unwrap_or_default(),
        breakdown,
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

// =============================================================================
// Breakdown & Vault
// =============================================================================

/// Sanitizes a per-transaction breakdown.
///
/// Keys outside [`DENOMINATIONS`] are dropped. Negative, non-finite,
/// non-numeric or above-[`MAX_NOTE_COUNT`] counts drop their key. Remaining
/// counts are floored.
pub fn sanitize_breakdown(raw: &Value) -> NoteCounts {
    let Some(object) = raw.as_object() else {
        return NoteCounts::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| {
            let denomination: Denomination = key.trim().parse().ok()?;
            if !is_denomination(denomination) {
                return None;
            }
            let count = non_negative_count(value)?;
            Some((denomination, count))
        })
        .collect()
}

/// Sanitizes the persisted vault.
///
/// Must be a non-array object, otherwise all zeros. Every tracked
/// denomination gets a floored count in `0..=MAX_NOTE_COUNT`, or 0. Other
/// keys are ignored.
pub fn sanitize_vault(raw: &Value) -> NoteCounts {
    let Some(object) = raw.as_object() else {
        return NoteCounts::zeroed();
    };

    DENOMINATIONS
        .iter()
        .map(|d| {
            let count = object
                .get(&d.to_string())
                .and_then(non_negative_count)
                .unwrap_or(0);
            (*d, count)
        })
        .collect()
}

fn non_negative_count(value: &Value) -> Option<i64> {
    let number = value.as_f64()?;
    if !number.is_finite() || number < 0.0 || number > MAX_NOTE_COUNT as f64 {
        return None;
    }
    Some(number.floor() as i64)
}

// =============================================================================
// Timestamps
// =============================================================================

/// Parses a stored timestamp.
///
/// ## Accepted Forms
/// - RFC 3339 string (`2024-03-01T10:00:00Z`)
/// - `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS` (taken as UTC)
/// - `YYYY-MM-DD` (midnight UTC)
/// - A number of Unix epoch milliseconds
///
/// ```rust
/// use cashbook_core::sanitize::parse_timestamp;
/// use serde_json::json;
///
/// assert!(parse_timestamp(&json!("2024-03-01T10:00:00Z")).is_some());
/// assert!(parse_timestamp(&json!(1709287200000_i64)).is_some());
/// assert!(parse_timestamp(&json!("yesterday")).is_none());
/// ```
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(text) => parse_timestamp_str(text.trim()),
        Value::Number(number) => {
            let millis = number.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(millis as i64)
        }
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_entries_without_string_id_are_dropped() {
        let raw = json!([{ "id": 1 }, { "id": "a" }, "junk", null, { "amount": 5 }]);
        let txs = sanitize_transactions_at(&raw, now());
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "a");
    }

    #[test]
    fn test_defaults_for_bare_entry() {
        let txs = sanitize_transactions_at(&json!([{ "id": "a" }]), now());
        let tx = &txs[0];

        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.payment_method, PaymentMethod::Cash);
        assert_eq!(tx.amount, Money::zero());
        assert_eq!(tx.date, now());
        assert_eq!(tx.company, "NA");
        assert_eq!(tx.location, "NA");
        assert_eq!(tx.person, "");
        assert_eq!(tx.recorded_by, "system");
        assert_eq!(tx.notes, "");
        assert!(tx.breakdown.is_empty());
    }

    #[test]
    fn test_invalid_enums_fall_back() {
        let raw = json!([{ "id": "a", "type": "refund", "paymentMethod": 7, "amount": "12" }]);
        let tx = &sanitize_transactions_at(&raw, now())[0];
        assert_eq!(tx.kind, TransactionType::Credit);
        assert_eq!(tx.payment_method, PaymentMethod::Cash);
        assert_eq!(tx.amount, Money::zero());
    }

    #[test]
    fn test_breakdown_repair() {
        let breakdown = sanitize_breakdown(&json!({ "100": -5, "50": "x", "20": 3.7 }));
        let expected: NoteCounts = [(20, 3)].into_iter().collect();
        assert_eq!(breakdown, expected);
        assert_eq!(breakdown.iter().count(), 1);
    }

    #[test]
    fn test_breakdown_drops_unknown_denominations() {
        let breakdown = sanitize_breakdown(&json!({ "25": 4, "abc": 1, "500": 2, "1": 0 }));
        assert_eq!(breakdown.count(500), 2);
        assert_eq!(breakdown.count(25), 0);
        assert_eq!(breakdown.iter().count(), 2);
    }

    #[test]
    fn test_upi_breakdown_discarded() {
        let raw = json!([{ "id": "a", "paymentMethod": "upi", "breakdown": { "500": 3 } }]);
        let tx = &sanitize_transactions_at(&raw, now())[0];
        assert!(tx.breakdown.is_empty());
    }

    #[test]
    fn test_result_sorted_newest_first() {
        let raw = json!([
            { "id": "old", "date": "2024-01-01" },
            { "id": "new", "date": "2024-05-01T08:30:00Z" },
            { "id": "mid", "date": "2024-03-01 09:15:00" },
        ]);
        let ids: Vec<String> = sanitize_transactions_at(&raw, now())
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_non_array_transactions() {
        assert!(sanitize_transactions_at(&json!({ "id": "a" }), now()).is_empty());
    }

    #[test]
    fn test_vault_sanitize() {
        let vault = sanitize_vault(&json!({ "500": 2.9, "200": -1, "100": "x", "7": 5 }));
        assert_eq!(vault.count(500), 2);
        assert_eq!(vault.count(200), 0);
        assert_eq!(vault.count(100), 0);
        assert_eq!(vault.count(7), 0);
        assert_eq!(vault.iter().count(), DENOMINATIONS.len());

        assert_eq!(sanitize_vault(&json!([1, 2, 3])), NoteCounts::zeroed());
        assert_eq!(sanitize_vault(&json!(null)), NoteCounts::zeroed());
    }

    #[test]
    fn test_out_of_range_counts_and_amounts() {
        let vault = sanitize_vault(&json!({ "500": 1e300, "100": MAX_NOTE_COUNT }));
        assert_eq!(vault.count(500), 0);
        assert_eq!(vault.count(100), MAX_NOTE_COUNT);

        let raw = json!([{
            "id": "a",
            "amount": 1e300,
            "breakdown": { "500": 1e17, "200": 2 }
        }]);
        let tx = &sanitize_transactions_at(&raw, now())[0];
        assert_eq!(tx.amount, Money::zero());
        assert_eq!(tx.breakdown.count(500), 0);
        assert_eq!(tx.breakdown.count(200), 2);
        assert_eq!(tx.breakdown_total(), Money::from_rupees(400));

        // A repaired vault stays usable for further cash movements.
        let after = vault.apply(tx, crate::vault::Direction::Apply);
        assert_eq!(after.count(200), 2);
        assert_eq!(after.count(100), MAX_NOTE_COUNT);
    }

    #[test]
    fn test_timestamp_from_epoch_millis() {
        let parsed = parse_timestamp(&json!(1_717_243_200_000_i64)).unwrap();
        assert_eq!(parsed, now());
    }

    #[test]
    fn test_corrupt_transactions_resets_both() {
        let outcome = parse_ledger_blobs(Some("not json"), Some(r#"{"500": 4}"#), ResetPolicy::Both);
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.vault, NoteCounts::zeroed());
        assert!(outcome.clear_transactions);
        assert!(outcome.clear_vault);
        assert!(outcome.was_reset());
    }

    #[test]
    fn test_corrupt_vault_independent_keeps_transactions() {
        let outcome = parse_ledger_blobs(
            Some(r#"[{"id": "a"}]"#),
            Some("{broken"),
            ResetPolicy::Independent,
        );
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(outcome.vault, NoteCounts::zeroed());
        assert!(!outcome.clear_transactions);
        assert!(outcome.clear_vault);
    }

    #[test]
    fn test_missing_blobs_are_not_corruption() {
        let outcome = parse_ledger_blobs(None, None, ResetPolicy::Both);
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.vault, NoteCounts::zeroed());
        assert!(!outcome.was_reset());
    }

    #[test]
    fn test_reset_policy_from_str() {
        assert_eq!("Independent".parse::<ResetPolicy>().unwrap(), ResetPolicy::Independent);
        assert!("sometimes".parse::<ResetPolicy>().is_err());
    }
}
