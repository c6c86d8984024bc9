//! # Transaction Commands
//!
//! `add`, `update`, `delete` and `list`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cashbook add --type credit --cash 500=2 --company Acme                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  DraftArgs ──apply_to(TransactionDraft::default())──► draft            │
//! │        │      (amount falls back to the note total for cash)           │
//! │        ▼                                                                │
//! │  LedgerStore::add_transaction(draft) ──► vault updated, saved,         │
//! │                                          mirror job queued             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cashbook_core::{NoteCounts, PaymentMethod, Transaction, TransactionDraft};
use serde::Serialize;
use tracing::debug;

use super::{render, table};
use crate::cli::DraftArgs;
use crate::error::{AppError, AppResult};
use crate::state::LedgerStore;

impl DraftArgs {
    /// Overlays the given flags on `base`.
    ///
    /// For cash, a missing `--amount` becomes the total of the notes when
    /// notes were given.
    pub fn apply_to(&self, mut base: TransactionDraft) -> TransactionDraft {
        if let Some(kind) = self.kind {
            base.kind = kind;
        }
        if let Some(method) = self.method {
            base.payment_method = method;
        }
        if !self.cash.is_empty() {
            base.breakdown = self.cash.iter().copied().collect::<NoteCounts>();
        }
        match self.amount {
            Some(amount) => base.amount = amount,
            None if !self.cash.is_empty() && base.payment_method == PaymentMethod::Cash => {
                base.amount = base.breakdown.total_value();
            }
            None => {}
        }
        if let Some(company) = &self.company {
            base.company = company.clone();
        }
        if let Some(person) = &self.person {
            base.person = person.clone();
        }
        if let Some(location) = &self.location {
            base.location = location.clone();
        }
        if let Some(notes) = &self.notes {
            base.notes = notes.clone();
        }
        base
    }

    fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.method.is_none()
            && self.amount.is_none()
            && self.cash.is_empty()
            && self.company.is_none()
            && self.person.is_none()
            && self.location.is_none()
            && self.notes.is_none()
    }
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn add(store: &LedgerStore, args: &DraftArgs, json: bool) -> AppResult<String> {
    if args.amount.is_none() && args.cash.is_empty() {
        return Err(AppError::validation("give --amount or at least one --cash note"));
    }

    let draft = args.apply_to(TransactionDraft::default());
    let tx = store.add_transaction(draft).await?;

    render(json, &tx, |tx| format!("Recorded {}\n{}", tx.id, describe(tx)))
}

pub async fn update(
    store: &LedgerStore,
    id: &str,
    args: &DraftArgs,
    json: bool,
) -> AppResult<String> {
    if args.is_empty() {
        return Err(AppError::validation("nothing to change; pass at least one field"));
    }

    let Some(current) = store.transactions().await.into_iter().find(|tx| tx.id == id) else {
        debug!(id = %id, "Update target not visible");
        return render(json, &UpdateOutcome { id, updated: false }, |_| {
            format!("No transaction {} in your ledger; nothing changed", id)
        });
    };

    let draft = args.apply_to(current.to_draft());
    let updated = store.update_transaction(id, draft).await?;

    render(json, &UpdateOutcome { id, updated }, |outcome| {
        if outcome.updated {
            format!("Updated {}", outcome.id)
        } else {
            format!("No transaction {} in your ledger; nothing changed", outcome.id)
        }
    })
}

pub async fn delete(store: &LedgerStore, ids: &[String], json: bool) -> AppResult<String> {
    let removed = store.delete_transactions_by_ids(ids).await?;

    render(
        json,
        &DeleteOutcome {
            requested: ids.len(),
            removed,
        },
        |outcome| format!("Deleted {} of {} transaction(s)", outcome.removed, outcome.requested),
    )
}

pub async fn list(store: &LedgerStore, limit: Option<usize>, json: bool) -> AppResult<String> {
    let mut transactions = store.transactions().await;
    if let Some(limit) = limit {
        transactions.truncate(limit);
    }

    render(json, &transactions, |transactions| {
        if transactions.is_empty() {
            return "No transactions".to_string();
        }
        let rows: Vec<Vec<String>> = transactions.iter().map(row).collect();
        table(
            &["DATE", "TYPE", "METHOD", "AMOUNT", "COMPANY", "PERSON", "LOCATION", "ID"],
            &rows,
        )
    })
}

// =============================================================================
// Rendering
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateOutcome<'a> {
    id: &'a str,
    updated: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteOutcome {
    requested: usize,
    removed: usize,
}

fn row(tx: &Transaction) -> Vec<String> {
    vec![
        tx.date.format("%Y-%m-%d %H:%M").to_string(),
        tx.kind.to_string(),
        tx.payment_method.to_string(),
        tx.amount.to_string(),
        tx.company.clone(),
        tx.person.clone(),
        tx.location.clone(),
        tx.id.clone(),
    ]
}

fn describe(tx: &Transaction) -> String {
    let mut out = format!(
        "{} {} {} ({} / {})",
        tx.kind, tx.payment_method, tx.amount, tx.company, tx.location
    );
    if tx.is_cash() && !tx.breakdown.is_empty() {
        let notes: Vec<String> = tx
            .breakdown
            .iter()
            .filter(|(_, count)| *count != 0)
            .map(|(denomination, count)| format!("₹{}×{}", denomination, count))
            .collect();
        out.push_str(&format!("\nnotes: {}", notes.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_core::{Money, TransactionType};

    #[test]
    fn test_apply_to_fills_amount_from_notes() {
        let args = DraftArgs {
            cash: vec![(500, 2), (20, 1)],
            company: Some("Acme".into()),
            ..DraftArgs::default()
        };

        let draft = args.apply_to(TransactionDraft::default());

        assert_eq!(draft.amount, Money::from_rupees(1020));
        assert_eq!(draft.breakdown.count(500), 2);
        assert_eq!(draft.company, "Acme");
    }

    #[test]
    fn test_apply_to_keeps_unset_fields() {
        let base = TransactionDraft {
            kind: TransactionType::Debit,
            amount: Money::from_rupees(40),
            person: "Ravi".into(),
            ..TransactionDraft::default()
        };
        let args = DraftArgs {
            location: Some("Shop".into()),
            ..DraftArgs::default()
        };

        let draft = args.apply_to(base);

        assert_eq!(draft.kind, TransactionType::Debit);
        assert_eq!(draft.amount, Money::from_rupees(40));
        assert_eq!(draft.person, "Ravi");
        assert_eq!(draft.location, "Shop");
    }

    #[test]
    fn test_explicit_amount_wins() {
        let args = DraftArgs {
            cash: vec![(100, 1)],
            amount: Some(Money::from_rupees(95)),
            ..DraftArgs::default()
        };
        let draft = args.apply_to(TransactionDraft::default());
        assert_eq!(draft.amount, Money::from_rupees(95));
    }

    #[test]
    fn test_huge_note_count_is_rejected_not_overflowed() {
        let args = DraftArgs {
            cash: vec![(500, 100_000_000_000_000_000)],
            ..DraftArgs::default()
        };

        let draft = args.apply_to(TransactionDraft::default());

        assert_eq!(draft.amount.paise(), i64::MAX);
        assert!(cashbook_core::validation::validate_draft(&draft).is_err());
    }
}
