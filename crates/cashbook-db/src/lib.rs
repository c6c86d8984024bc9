//! # cashbook-db: Local Persistence for Cashbook
//!
//! This crate stores the ledger on the device. State is two JSON blobs in a
//! SQLite key/value table, accessed with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashbook Data Flow                               │
//! │                                                                         │
//! │  LedgerStore::add_transaction                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cashbook-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  BlobRepo      │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │  LedgerRepo    │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite file under the platform data dir (cashbook.db)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Blob and ledger repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashbook_core::ResetPolicy;
//! use cashbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("cashbook.db")).await?;
//! let outcome = db.ledger().load(ResetPolicy::Both).await?;
//! db.ledger().save(&outcome.transactions, &outcome.vault).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::blob::BlobRepository;
pub use repository::ledger::{LedgerRepository, TRANSACTIONS_KEY, VAULT_KEY};
