//! # cashbook-sync: Spreadsheet Mirror for Cashbook
//!
//! Best-effort replication of ledger mutations to a hosted spreadsheet
//! script, plus the configuration shared by every cashbook front end.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mirror Architecture                              │
//! │                                                                         │
//! │  LedgerStore (cashbook-cli)                                            │
//! │       │  local mutation persisted first                                │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                        MirrorQueue                               │  │
//! │  │  bounded mpsc, try_send, drop + warn when full                   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ one worker, FIFO                        │
//! │                               ▼                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ MirrorClient   │  │ SheetsMirror   │  │ StatusTracker          │    │
//! │  │ (trait)        │◄─│ JSON over HTTP │  │ idle/syncing/success/  │    │
//! │  │ injected as    │  │ (reqwest)      │  │ error, auto-reset      │    │
//! │  │ Arc<dyn _>     │  │                │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  CashbookConfig: identity, mirror endpoint, storage (TOML + env)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - `MirrorClient` trait and the HTTP `SheetsMirror`
//! - [`config`] - `CashbookConfig` (file, environment, defaults)
//! - [`error`] - Sync error types
//! - [`queue`] - `MirrorQueue` and its background worker
//! - [`status`] - `SyncStatus` and the watch-based tracker
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashbook_sync::{CashbookConfig, MirrorQueue, SheetsMirror};
//! use std::sync::Arc;
//!
//! let config = CashbookConfig::load(None)?;
//!
//! let queue = match config.mirror.active_endpoint() {
//!     Some(endpoint) => {
//!         let client = SheetsMirror::new(endpoint, config.mirror_timeout())?;
//!         MirrorQueue::spawn(Arc::new(client), config.queue_config())
//!     }
//!     None => MirrorQueue::disabled(),
//! };
//!
//! // ... hand `queue` to the ledger, then on exit:
//! queue.shutdown().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod queue;
pub mod status;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{MirrorClient, SheetsMirror};
pub use config::{CashbookConfig, MirrorSettings, StorageSettings, UserConfig};
pub use error::{SyncError, SyncResult};
pub use queue::{MirrorJob, MirrorQueue, QueueConfig, DEFAULT_QUEUE_CAPACITY};
pub use status::{StatusTracker, SyncStatus};
