//! # Ledger Store
//!
//! Owns the in-memory ledger (transactions + vault snapshot), persists it
//! after every mutation and hands mirror jobs to the [`MirrorQueue`].
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger Mutation Flow                                 │
//! │                                                                         │
//! │  add / update / delete                                                 │
//! │       │                                                                 │
//! │       ▼  lock Mutex<LedgerState> (held until persisted)                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ 1. validate draft                                               │   │
//! │  │ 2. build next transaction list (sorted, date desc)              │   │
//! │  │ 3. vault = vault.apply(old, Revert).apply(new, Apply)           │   │
//! │  │ 4. db.ledger().save(list, vault)  ── both blobs, one tx         │   │
//! │  │ 5. commit into memory                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼  unlock, then enqueue (never waits on the network)             │
//! │  MirrorQueue: Add | Update | Delete(id)…                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only transactions recorded by the acting identity are visible, and only
//! visible transactions can be updated or deleted.

use std::collections::HashSet;
use std::sync::Arc;

use cashbook_core::sanitize::ResetPolicy;
use cashbook_core::validation::{validate_draft, validate_identity};
use cashbook_core::vault::VaultDrift;
use cashbook_core::{
    sort_by_date_desc, Direction, LedgerReport, NoteCounts, ReportFilter, Transaction,
    TransactionDraft, SYSTEM_RECORDER,
};
use cashbook_db::Database;
use cashbook_sync::{MirrorClient, MirrorJob, MirrorQueue, SyncError, SyncStatus};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::AppResult;

/// Transactions and vault snapshot, always mutated together.
#[derive(Debug, Clone, Default)]
struct LedgerState {
    transactions: Vec<Transaction>,
    vault: NoteCounts,
}

/// The ledger as seen by one operator identity.
pub struct LedgerStore {
    db: Database,
    identity: String,
    state: Mutex<LedgerState>,
    queue: MirrorQueue,
    remote: Option<Arc<dyn MirrorClient>>,
}

impl LedgerStore {
    /// Loads the persisted ledger for `identity`.
    ///
    /// Unreadable persisted data is reset according to `policy`; that is
    /// logged, not returned as an error.
    pub async fn load(
        db: Database,
        identity: &str,
        policy: ResetPolicy,
        queue: MirrorQueue,
    ) -> AppResult<Self> {
        let identity = validate_identity(identity)?;
        let outcome = db.ledger().load(policy).await?;

        if outcome.was_reset() {
            warn!(identity = %identity, "Ledger started from a reset state");
        }

        info!(
            identity = %identity,
            transactions = outcome.transactions.len(),
            mirror = queue.is_enabled(),
            "Ledger store ready"
        );

        Ok(LedgerStore {
            db,
            identity,
            state: Mutex::new(LedgerState {
                transactions: outcome.transactions,
                vault: outcome.vault,
            }),
            queue,
            remote: None,
        })
    }

    /// Client used by [`LedgerStore::refresh_from_mirror`].
    pub fn with_remote(mut self, client: Arc<dyn MirrorClient>) -> Self {
        self.remote = Some(client);
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Records a new transaction for the acting identity.
    pub async fn add_transaction(&self, draft: TransactionDraft) -> AppResult<Transaction> {
        let draft = draft.normalized();
        validate_draft(&draft)?;

        let tx = Transaction::create(draft, &self.identity);

        {
            let mut state = self.state.lock().await;

            let mut transactions = state.transactions.clone();
            transactions.push(tx.clone());
            sort_by_date_desc(&mut transactions);
            let vault = state.vault.apply(&tx, Direction::Apply);

            self.commit(&mut state, transactions, vault).await?;
        }

        info!(
            id = %tx.id,
            kind = %tx.kind,
            method = %tx.payment_method,
            amount = %tx.amount,
            "Transaction added"
        );
        self.queue.enqueue(MirrorJob::Add(tx.clone()));
        Ok(tx)
    }

    /// Replaces a visible transaction, keeping its id, date and recorder.
    ///
    /// Returns `false` (and changes nothing) when no visible transaction has
    /// this id.
    pub async fn update_transaction(&self, id: &str, draft: TransactionDraft) -> AppResult<bool> {
        let draft = draft.normalized();
        validate_draft(&draft)?;

        let updated = {
            let mut state = self.state.lock().await;

            let Some(index) = state
                .transactions
                .iter()
                .position(|tx| tx.id == id && tx.is_visible_to(&self.identity))
            else {
                warn!(id = %id, identity = %self.identity, "Update of unknown transaction ignored");
                return Ok(false);
            };

            let original = &state.transactions[index];
            let updated = original.replaced_with(draft);
            let vault = state
                .vault
                .apply(original, Direction::Revert)
                .apply(&updated, Direction::Apply);

            let mut transactions = state.transactions.clone();
            transactions[index] = updated.clone();
            sort_by_date_desc(&mut transactions);

            self.commit(&mut state, transactions, vault).await?;
            updated
        };

        info!(id = %updated.id, amount = %updated.amount, "Transaction updated");
        self.queue.enqueue(MirrorJob::Update(updated));
        Ok(true)
    }

    /// Removes every visible transaction whose id is listed.
    ///
    /// Returns how many were removed. Unknown ids are skipped.
    pub async fn delete_transactions_by_ids(&self, ids: &[String]) -> AppResult<usize> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let removed = {
            let mut state = self.state.lock().await;

            let (removed, kept): (Vec<Transaction>, Vec<Transaction>) =
                state.transactions.iter().cloned().partition(|tx| {
                    wanted.contains(tx.id.as_str()) && tx.is_visible_to(&self.identity)
                });

            if removed.is_empty() {
                debug!(requested = ids.len(), "Nothing to delete");
                return Ok(0);
            }

            let vault = removed
                .iter()
                .fold(state.vault.clone(), |vault, tx| vault.apply(tx, Direction::Revert));

            self.commit(&mut state, kept, vault).await?;
            removed
        };

        info!(count = removed.len(), "Transactions deleted");
        for tx in &removed {
            self.queue.enqueue(MirrorJob::Delete(tx.id.clone()));
        }
        Ok(removed.len())
    }

    /// Recomputes the vault from every stored transaction and persists it.
    pub async fn rebuild_vault(&self) -> AppResult<NoteCounts> {
        let mut state = self.state.lock().await;

        let vault = NoteCounts::derive_from(&state.transactions);
        let transactions = state.transactions.clone();
        self.commit(&mut state, transactions, vault.clone()).await?;

        info!(value = %vault.total_value(), "Vault rebuilt from transactions");
        Ok(vault)
    }

    /// Replaces this identity's transactions with the mirror's copy.
    ///
    /// Fetched records owned by another identity are dropped; records with
    /// no recorded owner are claimed. Other identities' local transactions
    /// are left alone. The vault is recomputed afterwards.
    pub async fn refresh_from_mirror(&self) -> AppResult<usize> {
        let remote = self.remote.as_ref().ok_or(SyncError::MirrorDisabled)?;

        let fetched = remote.get_all_transactions(&self.identity).await?;
        let total = fetched.len();

        let mine: Vec<Transaction> = fetched
            .into_iter()
            .filter_map(|mut tx| {
                if tx.recorded_by == SYSTEM_RECORDER {
                    tx.recorded_by = self.identity.clone();
                }
                if tx.is_visible_to(&self.identity) {
                    Some(tx)
                } else {
                    warn!(id = %tx.id, owner = %tx.recorded_by, "Dropping mirrored record of another identity");
                    None
                }
            })
            .collect();
        let count = mine.len();

        let mut state = self.state.lock().await;

        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| !tx.is_visible_to(&self.identity))
            .cloned()
            .chain(mine)
            .collect();
        sort_by_date_desc(&mut transactions);
        let vault = NoteCounts::derive_from(&transactions);

        self.commit(&mut state, transactions, vault).await?;

        info!(fetched = total, kept = count, "Ledger refreshed from mirror");
        Ok(count)
    }

    /// Persists the next state, then swaps it in.
    async fn commit(
        &self,
        state: &mut LedgerState,
        transactions: Vec<Transaction>,
        vault: NoteCounts,
    ) -> AppResult<()> {
        self.db.ledger().save(&transactions, &vault).await?;
        state.transactions = transactions;
        state.vault = vault;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Transactions recorded by the acting identity, newest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        let state = self.state.lock().await;
        state
            .transactions
            .iter()
            .filter(|tx| tx.is_visible_to(&self.identity))
            .cloned()
            .collect()
    }

    /// Every stored transaction regardless of owner.
    pub async fn all_transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn vault(&self) -> NoteCounts {
        self.state.lock().await.vault.clone()
    }

    /// Compares the cached vault with one derived from all transactions.
    pub async fn verify_vault(&self) -> VaultDrift {
        let state = self.state.lock().await;
        VaultDrift::between(
            state.vault.clone(),
            NoteCounts::derive_from(&state.transactions),
        )
    }

    /// Aggregates the visible transactions.
    pub async fn report(&self, filter: &ReportFilter) -> LedgerReport {
        let state = self.state.lock().await;
        let visible: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| tx.is_visible_to(&self.identity))
            .cloned()
            .collect();
        LedgerReport::build(&visible, &state.vault, filter)
    }

    // =========================================================================
    // Mirror
    // =========================================================================

    pub fn sync_status(&self) -> watch::Receiver<SyncStatus> {
        self.queue.subscribe()
    }

    pub fn mirror_pending(&self) -> usize {
        self.queue.pending()
    }

    /// Waits for queued mirror jobs to finish, then closes the database.
    ///
    /// In-memory state stays readable; further mutations fail to persist.
    pub async fn shutdown(&self) -> AppResult<()> {
        self.queue.shutdown().await?;
        self.db.close().await;
        Ok(())
    }
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("identity", &self.identity)
            .field("mirror", &self.queue.is_enabled())
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
