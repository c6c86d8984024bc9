//! # Mirror Queue
//!
//! Bounded FIFO of mirror jobs served by a single background worker.
//!
//! ## Job Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mirror Queue Flow                                 │
//! │                                                                         │
//! │  LedgerStore (mutation already persisted locally)                      │
//! │       │                                                                 │
//! │       │ enqueue(job)  ← try_send, never waits                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  mpsc channel (capacity N)                                      │   │
//! │  │  [Add tx-1] [Update tx-1] [Delete tx-7] ...                     │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │       full? → job dropped,    │                                         │
//! │       warning, status=error   ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  MirrorWorker (one task)                                        │   │
//! │  │  status=syncing → client call → status=success | error          │   │
//! │  │  one job at a time, in enqueue order, no retries                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  shutdown(): stop accepting, finish every queued job, then exit        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cashbook_core::Transaction;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::MirrorClient;
use crate::error::{SyncError, SyncResult};
use crate::status::{StatusTracker, SyncStatus};

/// Default number of jobs the queue holds before dropping.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

// =============================================================================
// Mirror Job
// =============================================================================

/// One mirror call to make.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorJob {
    Add(Transaction),
    Update(Transaction),
    Delete(String),
}

impl MirrorJob {
    pub fn action(&self) -> &'static str {
        match self {
            MirrorJob::Add(_) => "add",
            MirrorJob::Update(_) => "update",
            MirrorJob::Delete(_) => "delete",
        }
    }

    /// Id of the transaction the job concerns.
    pub fn transaction_id(&self) -> &str {
        match self {
            MirrorJob::Add(tx) | MirrorJob::Update(tx) => &tx.id,
            MirrorJob::Delete(id) => id,
        }
    }
}

// =============================================================================
// Mirror Queue
// =============================================================================

/// Queue settings.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub capacity: usize,
    pub error_reset: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            capacity: DEFAULT_QUEUE_CAPACITY,
            error_reset: Duration::from_millis(3000),
        }
    }
}

/// Handle used by the ledger to hand jobs to the mirror worker.
///
/// A disabled queue accepts and discards every job without touching the
/// status.
#[derive(Debug)]
pub struct MirrorQueue {
    tx: Option<mpsc::Sender<MirrorJob>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    status: StatusTracker,
}

impl MirrorQueue {
    /// Spawns the worker task and returns the queue handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(client: Arc<dyn MirrorClient>, config: QueueConfig) -> Self {
        let capacity = config.capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let status = StatusTracker::new(config.error_reset);

        let worker = MirrorWorker {
            client,
            rx,
            shutdown_rx,
            status: status.clone(),
        };
        let handle = tokio::spawn(worker.run());

        info!(capacity, "Mirror queue started");

        MirrorQueue {
            tx: Some(tx),
            shutdown_tx: Some(shutdown_tx),
            worker: Mutex::new(Some(handle)),
            status,
        }
    }

    /// A queue with no worker. Used when the mirror is not configured.
    pub fn disabled() -> Self {
        debug!("Mirror disabled, jobs will be discarded");
        MirrorQueue {
            tx: None,
            shutdown_tx: None,
            worker: Mutex::new(None),
            status: StatusTracker::new(QueueConfig::default().error_reset),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Hands a job to the worker without waiting.
    ///
    /// Returns false when the job was dropped (queue full or shut down).
    pub fn enqueue(&self, job: MirrorJob) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };

        match tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!(
                    action = job.action(),
                    id = %job.transaction_id(),
                    "Mirror queue full, dropping job"
                );
                self.status.set_error();
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!(
                    action = job.action(),
                    id = %job.transaction_id(),
                    "Mirror queue closed, dropping job"
                );
                false
            }
        }
    }

    /// Jobs waiting to be picked up by the worker.
    pub fn pending(&self) -> usize {
        self.tx
            .as_ref()
            .map(|tx| tx.max_capacity() - tx.capacity())
            .unwrap_or(0)
    }

    pub fn status(&self) -> SyncStatus {
        self.status.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Stops accepting jobs, lets the worker finish every queued job, and
    /// waits for it to exit. Calling it twice is harmless.
    pub async fn shutdown(&self) -> SyncResult<()> {
        let Some(handle) = self.worker.lock().await.take() else {
            return Ok(());
        };

        if let Some(shutdown_tx) = &self.shutdown_tx {
            // A closed channel means the worker already stopped.
            let _ = shutdown_tx.send(()).await;
        }

        handle
            .await
            .map_err(|e| SyncError::Internal(format!("mirror worker failed: {}", e)))?;

        info!("Mirror queue stopped");
        Ok(())
    }
}

// =============================================================================
// Worker
// =============================================================================

struct MirrorWorker {
    client: Arc<dyn MirrorClient>,
    rx: mpsc::Receiver<MirrorJob>,
    shutdown_rx: mpsc::Receiver<()>,
    status: StatusTracker,
}

impl MirrorWorker {
    async fn run(mut self) {
        debug!("Mirror worker running");

        loop {
            tokio::select! {
                biased;

                job = self.rx.recv() => match job {
                    Some(job) => self.process(job).await,
                    None => break,
                },

                _ = self.shutdown_rx.recv() => {
                    self.rx.close();
                    while let Some(job) = self.rx.recv().await {
                        self.process(job).await;
                    }
                    break;
                }
            }
        }

        debug!("Mirror worker exiting");
    }

    async fn process(&self, job: MirrorJob) {
        self.status.set_syncing();

        let ok = match &job {
            MirrorJob::Add(tx) => self.client.add_transaction(tx).await,
            MirrorJob::Update(tx) => self.client.update_transaction(tx).await,
            MirrorJob::Delete(id) => self.client.delete_transaction(id).await,
        };

        if ok {
            debug!(action = job.action(), id = %job.transaction_id(), "Mirrored");
            self.status.set_success();
        } else {
            warn!(action = job.action(), id = %job.transaction_id(), "Mirror job failed");
            self.status.set_error();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
