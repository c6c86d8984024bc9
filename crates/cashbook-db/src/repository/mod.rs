//! # Repository Module
//!
//! Database repository implementations for Cashbook.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LedgerStore (apps/cli)                                                │
//! │       │  db.ledger().load(policy) / save(txs, vault)                   │
//! │       ▼                                                                 │
//! │  LedgerRepository   ← knows the two keys, sanitizes, clears bad ones   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BlobRepository     ← get / put / put_many / delete on kv_store        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BlobRepository`](blob::BlobRepository) - Raw key/value access
//! - [`LedgerRepository`](ledger::LedgerRepository) - Transactions + vault

pub mod blob;
pub mod ledger;
