//! # Ledger Repository
//!
//! Loads and saves the two ledger blobs.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kv_store                                                               │
//! │  ┌────────────────────────┬──────────────────────────────────────────┐ │
//! │  │ key                    │ value                                    │ │
//! │  ├────────────────────────┼──────────────────────────────────────────┤ │
//! │  │ cashbook.transactions  │ [{"id":"…","type":"credit",…}, …]        │ │
//! │  │ cashbook.vault         │ {"500":3,"200":0,…,"1":7}                │ │
//! │  └────────────────────────┴──────────────────────────────────────────┘ │
//! │                                                                         │
//! │  load():  read both → sanitize::parse_ledger_blobs → clear bad keys    │
//! │  save():  write both in one SQLite transaction                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cashbook_core::sanitize::{parse_ledger_blobs, LoadOutcome, ResetPolicy};
use cashbook_core::{NoteCounts, Transaction};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::blob::BlobRepository;

/// Key of the transaction list blob.
pub const TRANSACTIONS_KEY: &str = "cashbook.transactions";

/// Key of the vault snapshot blob.
pub const VAULT_KEY: &str = "cashbook.vault";

/// Repository for the persisted ledger state.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    blobs: BlobRepository,
}

impl LedgerRepository {
    pub fn new(blobs: BlobRepository) -> Self {
        LedgerRepository { blobs }
    }

    /// Reads, sanitizes and (where needed) clears the persisted state.
    ///
    /// Corrupt blobs never surface as errors; they are reset according to
    /// `policy` and the corresponding keys removed. Only storage failures
    /// are returned as `Err`.
    pub async fn load(&self, policy: ResetPolicy) -> DbResult<LoadOutcome> {
        let transactions_text = self.blobs.get(TRANSACTIONS_KEY).await?;
        let vault_text = self.blobs.get(VAULT_KEY).await?;

        let outcome = parse_ledger_blobs(
            transactions_text.as_deref(),
            vault_text.as_deref(),
            policy,
        );

        if outcome.clear_transactions {
            warn!(key = TRANSACTIONS_KEY, policy = %policy, "Persisted ledger unreadable, clearing");
            self.blobs.delete(TRANSACTIONS_KEY).await?;
        }
        if outcome.clear_vault {
            warn!(key = VAULT_KEY, policy = %policy, "Persisted vault unreadable, clearing");
            self.blobs.delete(VAULT_KEY).await?;
        }

        info!(
            transactions = outcome.transactions.len(),
            reset = outcome.was_reset(),
            "Ledger state loaded"
        );
        Ok(outcome)
    }

    /// Persists both blobs atomically.
    pub async fn save(&self, transactions: &[Transaction], vault: &NoteCounts) -> DbResult<()> {
        let transactions_json = serde_json::to_string(transactions)?;
        let vault_json = serde_json::to_string(vault)?;

        self.blobs
            .put_many(&[
                (TRANSACTIONS_KEY, transactions_json.as_str()),
                (VAULT_KEY, vault_json.as_str()),
            ])
            .await?;

        debug!(transactions = transactions.len(), "Ledger state saved");
        Ok(())
    }

    /// Removes both blobs.
    pub async fn clear(&self) -> DbResult<()> {
        self.blobs.delete(TRANSACTIONS_KEY).await?;
        self.blobs.delete(VAULT_KEY).await?;
        info!("Ledger state cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
