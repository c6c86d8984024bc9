//! # State Module
//!
//! Long-lived state shared by the command handlers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │        LedgerStore           │   │       CashbookConfig         │   │
//! │  │                              │   │                              │   │
//! │  │  Mutex<transactions + vault> │   │  identity, mirror, storage   │   │
//! │  │  Database (SQLite pool)      │   │  read-only after startup     │   │
//! │  │  MirrorQueue (+ worker)      │   │                              │   │
//! │  └──────────────────────────────┘   └──────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • LedgerStore: tokio Mutex held across the persist await              │
//! │  • MirrorQueue: mpsc sender, safe to share                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod ledger;

pub use ledger::LedgerStore;
