//! # Sync Status
//!
//! Observable state of the mirror, published on a `tokio::sync::watch`
//! channel.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            job starts             call ok                               │
//! │   Idle ─────────────► Syncing ─────────────► Success                   │
//! │    ▲                     │                      │                       │
//! │    │                     │ call failed          │ next job starts      │
//! │    │                     ▼                      ▼                       │
//! │    └──── after ───── Error                   Syncing                    │
//! │       error_reset     ▲                                                 │
//! │                       └── queue full (job dropped)                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Success` is sticky until the next job. `Error` falls back to `Idle` on
//! its own after `error_reset` unless a newer status replaced it first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Mirror state as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Status Tracker
// =============================================================================

/// Publishes [`SyncStatus`] changes. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<SyncStatus>,
    error_reset: Duration,
    /// Bumped on every change so a stale reset timer can tell it lost.
    generation: AtomicU64,
}

impl StatusTracker {
    pub fn new(error_reset: Duration) -> Self {
        let (tx, _rx) = watch::channel(SyncStatus::Idle);
        StatusTracker {
            inner: Arc::new(Inner {
                tx,
                error_reset,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Receiver that observes every future change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.inner.tx.subscribe()
    }

    pub fn current(&self) -> SyncStatus {
        *self.inner.tx.borrow()
    }

    pub fn set_syncing(&self) {
        self.publish(SyncStatus::Syncing);
    }

    pub fn set_success(&self) {
        self.publish(SyncStatus::Success);
    }

    /// Moves to `Error` and schedules the automatic return to `Idle`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_error(&self) {
        let generation = self.publish(SyncStatus::Error);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.error_reset).await;
            if inner.generation.load(Ordering::SeqCst) == generation {
                debug!("Resetting sync status after error");
                inner.tx.send_replace(SyncStatus::Idle);
            }
        });
    }

    fn publish(&self, status: SyncStatus) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.tx.send_replace(status);
        generation
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
