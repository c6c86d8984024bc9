//! # Report Module
//!
//! Aggregates transactions into the printable ledger summary.
//!
//! ## Report Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LedgerReport                                                           │
//! │  ├── overall      credit / debit / net / count                         │
//! │  ├── cash         same totals, cash only                               │
//! │  ├── upi          same totals, UPI only                                │
//! │  ├── byCompany    company  → totals                                    │
//! │  ├── byLocation   location → totals                                    │
//! │  └── vault        current counts + cash value                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure data. Rendering (text table, JSON) belongs to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Transaction, TransactionType};
use crate::vault::NoteCounts;

// =============================================================================
// Filter
// =============================================================================

/// Restricts which transactions a report covers. Empty filter = everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Inclusive lower bound on `date`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `date`.
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive company match.
    pub company: Option<String>,
    /// Case-insensitive location match.
    pub location: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date > to) {
            return false;
        }
        if !label_matches(self.company.as_deref(), &tx.company) {
            return false;
        }
        label_matches(self.location.as_deref(), &tx.location)
    }
}

fn label_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        Some(wanted) => wanted.trim().eq_ignore_ascii_case(actual.trim()),
        None => true,
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Credit / debit totals for a group of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(with = "crate::money::as_rupees")]
    #[ts(type = "number")]
    pub credit: Money,

    #[serde(with = "crate::money::as_rupees")]
    #[ts(type = "number")]
    pub debit: Money,

    /// credit - debit. May be negative.
    #[serde(with = "crate::money::as_rupees")]
    #[ts(type = "number")]
    pub net: Money,

    pub count: usize,
}

impl Totals {
    pub fn record(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionType::Credit => self.credit += tx.amount,
            TransactionType::Debit => self.debit += tx.amount,
        }
        self.net = self.credit - self.debit;
        self.count += 1;
    }
}

// =============================================================================
// Ledger Report
// =============================================================================

/// Summary of a filtered set of transactions plus the vault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    pub overall: Totals,
    pub cash: Totals,
    pub upi: Totals,
    pub by_company: BTreeMap<String, Totals>,
    pub by_location: BTreeMap<String, Totals>,
    pub vault: NoteCounts,

    /// Cash value of the vault (Σ denomination × count).
    #[serde(with = "crate::money::as_rupees")]
    #[ts(type = "number")]
    pub vault_value: Money,
}

impl LedgerReport {
    /// Builds a report over the transactions matching `filter`.
    ///
    /// The vault section always reflects the full vault; it is not
    /// filtered.
    pub fn build(transactions: &[Transaction], vault: &NoteCounts, filter: &ReportFilter) -> Self {
        let mut report = LedgerReport {
            overall: Totals::default(),
            cash: Totals::default(),
            upi: Totals::default(),
            by_company: BTreeMap::new(),
            by_location: BTreeMap::new(),
            vault: vault.clone(),
            vault_value: vault.total_value(),
        };

        for tx in transactions.iter().filter(|tx| filter.matches(tx)) {
            report.overall.record(tx);
            match tx.payment_method {
                PaymentMethod::Cash => report.cash.record(tx),
                PaymentMethod::Upi => report.upi.record(tx),
            }
            report
                .by_company
                .entry(tx.company.clone())
                .or_default()
                .record(tx);
            report
                .by_location
                .entry(tx.location.clone())
                .or_default()
                .record(tx);
        }

        report
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overall.count == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionDraft;
    use chrono::{Duration, TimeZone};

    fn tx(
        id: &str,
        kind: TransactionType,
        method: PaymentMethod,
        rupees: i64,
        company: &str,
        day: i64,
    ) -> Transaction {
        let draft = TransactionDraft {
            kind,
            payment_method: method,
            amount: Money::from_rupees(rupees),
            company: company.to_string(),
            location: "Pune".to_string(),
            ..TransactionDraft::default()
        };
        Transaction::from_draft(
            draft,
            id.to_string(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            "asha".to_string(),
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("a", TransactionType::Credit, PaymentMethod::Cash, 1000, "Acme", 0),
            tx("b", TransactionType::Debit, PaymentMethod::Cash, 300, "Acme", 1),
            tx("c", TransactionType::Credit, PaymentMethod::Upi, 250, "Zen", 2),
            tx("d", TransactionType::Debit, PaymentMethod::Upi, 1200, "", 3),
        ]
    }

    #[test]
    fn test_totals_split_by_method() {
        let report = LedgerReport::build(&sample(), &NoteCounts::zeroed(), &ReportFilter::default());

        assert_eq!(report.overall.count, 4);
        assert_eq!(report.overall.credit, Money::from_rupees(1250));
        assert_eq!(report.overall.debit, Money::from_rupees(1500));
        assert_eq!(report.overall.net, Money::from_rupees(-250));

        assert_eq!(report.cash.net, Money::from_rupees(700));
        assert_eq!(report.upi.count, 2);
    }

    #[test]
    fn test_grouping() {
        let report = LedgerReport::build(&sample(), &NoteCounts::zeroed(), &ReportFilter::default());

        assert_eq!(report.by_company["Acme"].count, 2);
        assert_eq!(report.by_company["NA"].debit, Money::from_rupees(1200));
        assert_eq!(report.by_location["Pune"].count, 4);
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        let mut txs = sample();
        txs[0].amount = Money::from_paise(i64::MAX);
        txs[2].amount = Money::from_paise(i64::MAX);

        let report = LedgerReport::build(&txs, &NoteCounts::zeroed(), &ReportFilter::default());

        assert_eq!(report.overall.credit.paise(), i64::MAX);
        assert_eq!(
            report.overall.net,
            Money::from_paise(i64::MAX) - Money::from_rupees(1500)
        );
    }

    #[test]
    fn test_filter_by_date_and_company() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = ReportFilter {
            from: Some(base + Duration::days(1)),
            to: Some(base + Duration::days(2)),
            ..ReportFilter::default()
        };
        let report = LedgerReport::build(&sample(), &NoteCounts::zeroed(), &filter);
        assert_eq!(report.overall.count, 2);

        let filter = ReportFilter {
            company: Some("acme".to_string()),
            ..ReportFilter::default()
        };
        let report = LedgerReport::build(&sample(), &NoteCounts::zeroed(), &filter);
        assert_eq!(report.overall.count, 2);
        assert!(report.upi.count == 0);
    }

    #[test]
    fn test_vault_value() {
        let vault: NoteCounts = [(500, 2), (10, 3)].into_iter().collect();
        let report = LedgerReport::build(&[], &vault, &ReportFilter::default());
        assert!(report.is_empty());
        assert_eq!(report.vault_value, Money::from_rupees(1030));
    }
}
