//! # cashbook-core: Pure Ledger Logic for Cashbook
//!
//! This crate holds the ledger model: transactions, the denomination vault,
//! and the rules that keep them consistent. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cashbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CLI (apps/cli)                               │   │
//! │  │    add / update / delete / vault / report / sync               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    LedgerStore                                  │   │
//! │  │    mutate list + vault, persist, enqueue mirror job            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cashbook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │  types  │ │  vault  │ │  money  │ │ sanitize │ │ report │ │   │
//! │  │   │  Tx     │ │ Counts  │ │  paise  │ │  repair  │ │ totals │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         cashbook-db (blobs)      cashbook-sync (mirror)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Transaction, TransactionDraft, enums
//! - [`vault`] - NoteCounts and the vault arithmetic
//! - [`money`] - Money type with integer paise
//! - [`validation`] - Operator input checks
//! - [`sanitize`] - Repair of persisted / mirrored JSON
//! - [`report`] - Totals and groupings for the printable summary
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cashbook_core::{Direction, Money, NoteCounts, PaymentMethod, Transaction, TransactionDraft, TransactionType};
//!
//! let mut breakdown = NoteCounts::new();
//! breakdown.set(500, 1);
//!
//! let received = Transaction::create(
//!     TransactionDraft {
//!         kind: TransactionType::Credit,
//!         payment_method: PaymentMethod::Cash,
//!         amount: Money::from_rupees(500),
//!         breakdown,
//!         ..TransactionDraft::default()
//!     },
//!     "asha",
//! );
//!
//! let vault = NoteCounts::zeroed().apply(&received, Direction::Apply);
//! assert_eq!(vault.count(500), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod sanitize;
pub mod types;
pub mod validation;
pub mod vault;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{LedgerReport, ReportFilter, Totals};
pub use sanitize::{LoadOutcome, ResetPolicy};
pub use types::*;
pub use vault::{Denomination, Direction, NoteCounts, VaultDrift, DENOMINATIONS};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Placeholder for an empty company or location.
pub const DEFAULT_LABEL: &str = "NA";

/// `recordedBy` given to persisted records that lost their owner.
pub const SYSTEM_RECORDER: &str = "system";

/// Maximum length of company, person, location and identity strings.
pub const MAX_LABEL_LEN: usize = 100;

/// Maximum length of free-text notes.
pub const MAX_NOTES_LEN: usize = 500;

/// Largest note count a breakdown or vault entry may hold.
pub const MAX_NOTE_COUNT: i64 = 1_000_000_000;

/// Largest transaction amount, in paise (₹1,000,000,000,000).
pub const MAX_AMOUNT_PAISE: i64 = 100_000_000_000_000;
