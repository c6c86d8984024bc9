//! # Vault Module
//!
//! Denomination counts for the physical cash vault.
//!
//! ## How the Vault Moves
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vault Arithmetic                                   │
//! │                                                                         │
//! │                 │  Direction::Apply   │  Direction::Revert             │
//! │  ───────────────┼─────────────────────┼───────────────────────         │
//! │  Credit (cash)  │  + breakdown        │  - breakdown                   │
//! │  Debit  (cash)  │  - breakdown        │  + breakdown                   │
//! │  Any UPI        │  no effect          │  no effect                     │
//! │                                                                         │
//! │  vault == Σ apply(tx) over every cash transaction                      │
//! │  Counts are NOT clamped: paying out notes you never recorded           │
//! │  receiving shows up as a negative count. Sums saturate at i64 bounds.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashbook_core::vault::NoteCounts;
//!
//! let mut counts = NoteCounts::new();
//! counts.set(500, 2);
//! counts.set(100, 1);
//! assert_eq!(counts.total_value().paise(), 110_000);
//! assert_eq!(counts.count(200), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Transaction, TransactionType};

/// Face value of a note or coin, in whole rupees.
pub type Denomination = u32;

/// Every denomination the vault tracks, largest first.
pub const DENOMINATIONS: [Denomination; 9] = [500, 200, 100, 50, 20, 10, 5, 2, 1];

/// Returns true when `value` is a tracked denomination.
#[inline]
pub fn is_denomination(value: Denomination) -> bool {
    DENOMINATIONS.contains(&value)
}

// =============================================================================
// Direction
// =============================================================================

/// Whether a transaction's effect is being added or undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

impl Direction {
    fn sign(self, kind: TransactionType) -> i64 {
        match (kind, self) {
            (TransactionType::Credit, Direction::Apply)
            | (TransactionType::Debit, Direction::Revert) => 1,
            (TransactionType::Credit, Direction::Revert)
            | (TransactionType::Debit, Direction::Apply) => -1,
        }
    }
}

// =============================================================================
// Note Counts
// =============================================================================

/// Mapping from denomination to a signed count.
///
/// An absent key means zero, and equality treats the two the same, so
/// `{}` == `{"500": 0}`. Serialized as a JSON object with string keys:
/// `{"500": 2, "100": 1}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct NoteCounts(BTreeMap<Denomination, i64>);

impl NoteCounts {
    /// Empty counts (every denomination reads as zero).
    pub fn new() -> Self {
        NoteCounts(BTreeMap::new())
    }

    /// Counts with every tracked denomination present and set to zero.
    ///
    /// This is the shape a fresh or reset vault is persisted in.
    pub fn zeroed() -> Self {
        NoteCounts(DENOMINATIONS.iter().map(|d| (*d, 0)).collect())
    }

    /// Count for one denomination (0 when absent).
    #[inline]
    pub fn count(&self, denomination: Denomination) -> i64 {
        self.0.get(&denomination).copied().unwrap_or(0)
    }

    pub fn set(&mut self, denomination: Denomination, count: i64) {
        self.0.insert(denomination, count);
    }

    /// Entries actually stored, in ascending denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, i64)> + '_ {
        self.0.iter().map(|(d, c)| (*d, *c))
    }

    /// True when every count is zero.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|c| *c == 0)
    }

    /// Cash value of these counts: Σ denomination × count, saturating at
    /// the `Money` bounds.
    pub fn total_value(&self) -> Money {
        self.iter()
            .map(|(d, c)| Money::from_rupees(d as i64) * c)
            .sum()
    }

    /// Returns these counts with `tx`'s breakdown added or removed.
    ///
    /// Pure: `self` is untouched. UPI transactions return an unchanged copy.
    pub fn apply(&self, tx: &Transaction, direction: Direction) -> NoteCounts {
        let mut next = self.clone();
        if tx.payment_method != PaymentMethod::Cash {
            return next;
        }

        let sign = direction.sign(tx.kind);
        for (denomination, count) in tx.breakdown.iter() {
            let entry = next.0.entry(denomination).or_insert(0);
            *entry = entry.saturating_add(sign.saturating_mul(count));
        }
        next
    }

    /// Recomputes a vault from scratch over `transactions`.
    ///
    /// Starts from [`NoteCounts::zeroed`] so the result has the persisted
    /// shape.
    pub fn derive_from(transactions: &[Transaction]) -> NoteCounts {
        transactions
            .iter()
            .fold(NoteCounts::zeroed(), |vault, tx| vault.apply(tx, Direction::Apply))
    }

    fn keys_with<'a>(&'a self, other: &'a NoteCounts) -> impl Iterator<Item = Denomination> + 'a {
        let mut keys: Vec<Denomination> = self.0.keys().chain(other.0.keys()).copied().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();
        keys.into_iter()
    }
}

impl PartialEq for NoteCounts {
    fn eq(&self, other: &Self) -> bool {
        self.keys_with(other)
            .all(|d| self.count(d) == other.count(d))
    }
}

impl Eq for NoteCounts {}

impl FromIterator<(Denomination, i64)> for NoteCounts {
    fn from_iter<I: IntoIterator<Item = (Denomination, i64)>>(iter: I) -> Self {
        NoteCounts(iter.into_iter().collect())
    }
}

// =============================================================================
// Vault Drift
// =============================================================================

/// One denomination where the cached vault and a fresh derivation disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DenominationDrift {
    pub denomination: Denomination,
    pub cached: i64,
    pub derived: i64,
}

/// Result of comparing the cached vault against the transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VaultDrift {
    pub cached: NoteCounts,
    pub derived: NoteCounts,
    /// Largest denomination first.
    pub differences: Vec<DenominationDrift>,
}

impl VaultDrift {
    pub fn between(cached: NoteCounts, derived: NoteCounts) -> Self {
        let differences = cached
            .keys_with(&derived)
            .filter(|d| cached.count(*d) != derived.count(*d))
            .map(|d| DenominationDrift {
                denomination: d,
                cached: cached.count(d),
                derived: derived.count(d),
            })
            .collect();

        VaultDrift {
            cached,
            derived,
            differences,
        }
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.differences.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionDraft;
    use chrono::{Duration, TimeZone, Utc};

    fn cash(kind: TransactionType, notes: &[(Denomination, i64)]) -> Transaction {
        let breakdown: NoteCounts = notes.iter().copied().collect();
        let draft = TransactionDraft {
            kind,
            payment_method: PaymentMethod::Cash,
            amount: breakdown.total_value(),
            breakdown,
            ..TransactionDraft::default()
        };
        Transaction::from_draft(
            draft,
            uuid::Uuid::new_v4().to_string(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            "asha".to_string(),
        )
    }

    #[test]
    fn test_absent_equals_zero() {
        let mut a = NoteCounts::new();
        a.set(500, 0);
        assert_eq!(a, NoteCounts::new());
        assert_eq!(NoteCounts::zeroed(), NoteCounts::new());

        a.set(100, 1);
        assert_ne!(a, NoteCounts::new());
    }

    #[test]
    fn test_apply_signs() {
        let credit = cash(TransactionType::Credit, &[(500, 2), (10, 3)]);
        let debit = cash(TransactionType::Debit, &[(500, 1)]);
        let vault = NoteCounts::zeroed();

        let after = vault.apply(&credit, Direction::Apply);
        assert_eq!(after.count(500), 2);
        assert_eq!(after.count(10), 3);
        assert_eq!(vault.count(500), 0);

        let after = after.apply(&debit, Direction::Apply);
        assert_eq!(after.count(500), 1);

        let after = after.apply(&debit, Direction::Revert);
        assert_eq!(after.count(500), 2);

        let after = after.apply(&credit, Direction::Revert);
        assert_eq!(after, NoteCounts::zeroed());
    }

    #[test]
    fn test_upi_has_no_effect() {
        let mut tx = cash(TransactionType::Credit, &[(500, 4)]);
        tx.payment_method = PaymentMethod::Upi;

        let vault = NoteCounts::zeroed();
        assert_eq!(vault.apply(&tx, Direction::Apply), vault);
        assert_eq!(vault.apply(&tx, Direction::Revert), vault);
    }

    #[test]
    fn test_counts_go_negative() {
        let credit = cash(TransactionType::Credit, &[(500, 1)]);
        let debit = cash(TransactionType::Debit, &[(500, 1)]);

        let vault = [credit, debit.clone(), debit]
            .iter()
            .fold(NoteCounts::zeroed(), |v, tx| v.apply(tx, Direction::Apply));
        assert_eq!(vault.count(500), -1);
        assert_eq!(vault.total_value(), Money::from_rupees(-500));
    }

    #[test]
    fn test_extreme_counts_saturate() {
        let mut vault = NoteCounts::zeroed();
        vault.set(500, i64::MAX);

        let credit = cash(TransactionType::Credit, &[(500, 1)]);
        let after = vault.apply(&credit, Direction::Apply);
        assert_eq!(after.count(500), i64::MAX);
        assert_eq!(after.total_value().paise(), i64::MAX);

        let mut low = NoteCounts::zeroed();
        low.set(500, i64::MIN);
        let debit = cash(TransactionType::Debit, &[(500, 1)]);
        assert_eq!(low.apply(&debit, Direction::Apply).count(500), i64::MIN);
        assert_eq!(low.total_value().paise(), i64::MIN);
    }

    #[test]
    fn test_derive_from_matches_incremental() {
        let mut txs = vec![
            cash(TransactionType::Credit, &[(500, 3), (100, 2)]),
            cash(TransactionType::Debit, &[(100, 5), (1, 2)]),
            cash(TransactionType::Credit, &[(20, 7)]),
        ];
        txs[1].date = txs[1].date + Duration::minutes(5);

        let mut incremental = NoteCounts::zeroed();
        for tx in &txs {
            incremental = incremental.apply(tx, Direction::Apply);
        }

        let derived = NoteCounts::derive_from(&txs);
        assert_eq!(derived, incremental);
        assert_eq!(derived.count(100), -3);
        assert_eq!(derived.count(1), -2);
    }

    #[test]
    fn test_drift_reports_differences() {
        let mut cached = NoteCounts::zeroed();
        cached.set(200, 4);
        let derived = NoteCounts::zeroed();

        let drift = VaultDrift::between(cached, derived.clone());
        assert!(!drift.is_consistent());
        assert_eq!(
            drift.differences,
            vec![DenominationDrift {
                denomination: 200,
                cached: 4,
                derived: 0
            }]
        );

        assert!(VaultDrift::between(derived.clone(), derived).is_consistent());
    }

    #[test]
    fn test_serializes_with_string_keys() {
        let counts: NoteCounts = [(500, 2), (100, 1)].into_iter().collect();
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"100":1,"500":2}"#);

        let back: NoteCounts = serde_json::from_str(r#"{"500": 2, "100": 1}"#).unwrap();
        assert_eq!(back, counts);
    }
}
