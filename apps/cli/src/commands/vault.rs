//! # Vault Commands
//!
//! `vault`, `verify` and `rebuild-vault`.

use cashbook_core::vault::VaultDrift;
use cashbook_core::{Money, NoteCounts, DENOMINATIONS};
use serde::Serialize;

use super::{render, table};
use crate::error::AppResult;
use crate::state::LedgerStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VaultView {
    notes: NoteCounts,
    #[serde(with = "cashbook_core::money::as_rupees")]
    total: Money,
}

impl VaultView {
    fn new(notes: NoteCounts) -> Self {
        let total = notes.total_value();
        VaultView { notes, total }
    }
}

pub async fn show(store: &LedgerStore, json: bool) -> AppResult<String> {
    let view = VaultView::new(store.vault().await);
    render(json, &view, |view| vault_table(&view.notes, view.total))
}

pub async fn verify(store: &LedgerStore, json: bool) -> AppResult<String> {
    let drift = store.verify_vault().await;
    render(json, &drift, drift_text)
}

pub async fn rebuild(store: &LedgerStore, json: bool) -> AppResult<String> {
    let view = VaultView::new(store.rebuild_vault().await?);
    render(json, &view, |view| {
        format!("Vault rebuilt\n{}", vault_table(&view.notes, view.total))
    })
}

/// One row per configured denomination, largest first, then the total.
pub(crate) fn vault_table(notes: &NoteCounts, total: Money) -> String {
    let rows: Vec<Vec<String>> = DENOMINATIONS
        .iter()
        .map(|&denomination| {
            let count = notes.count(denomination);
            vec![
                format!("₹{}", denomination),
                count.to_string(),
                (Money::from_rupees(denomination as i64) * count).to_string(),
            ]
        })
        .collect();

    format!("{}\nTOTAL  {}", table(&["NOTE", "COUNT", "VALUE"], &rows), total)
}

fn drift_text(drift: &VaultDrift) -> String {
    if drift.is_consistent() {
        return "Vault matches the transaction history".to_string();
    }

    let rows: Vec<Vec<String>> = drift
        .differences
        .iter()
        .map(|d| {
            vec![
                format!("₹{}", d.denomination),
                d.cached.to_string(),
                d.derived.to_string(),
            ]
        })
        .collect();

    format!(
        "Vault differs from the transaction history (run `cashbook rebuild-vault` to fix)\n{}",
        table(&["NOTE", "VAULT", "HISTORY"], &rows)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_table_lists_every_denomination() {
        let notes: NoteCounts = [(500, 2), (1, -1)].into_iter().collect();
        let out = vault_table(&notes, notes.total_value());

        assert_eq!(out.lines().count(), DENOMINATIONS.len() + 2);
        assert!(out.contains("₹1000.00"));
        assert!(out.contains("-₹1.00"));
        assert!(out.ends_with("TOTAL  ₹999.00"));
    }

    #[test]
    fn test_consistent_drift_text() {
        let drift = VaultDrift::between(NoteCounts::zeroed(), NoteCounts::new());
        assert_eq!(drift_text(&drift), "Vault matches the transaction history");
    }
}
