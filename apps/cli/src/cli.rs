//! # Command-Line Arguments
//!
//! clap definitions for the `cashbook` binary.
//!
//! ```text
//! cashbook [--user NAME] [--db PATH] [--config PATH] [--json] <COMMAND>
//!
//!   add            record a transaction
//!   update <ID>    replace fields of one of your transactions
//!   delete <ID>…   remove transactions
//!   list           your transactions, newest first
//!   vault          notes currently in the drawer
//!   verify         compare the vault with the transaction history
//!   rebuild-vault  recompute the vault from the transaction history
//!   report         totals by method, company and location
//!   sync …         test | init | pull | status
//!   config …       show | init
//! ```

use std::path::PathBuf;

use cashbook_core::{Denomination, Money, PaymentMethod, TransactionType, MAX_NOTE_COUNT};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cashbook", version)]
#[command(about = "Cash and UPI ledger with a note-by-note cash vault")]
pub struct Cli {
    /// Acting identity (overrides config and CASHBOOK_USER).
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// SQLite database file (overrides config and CASHBOOK_DB_PATH).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file to read instead of the platform default.
    #[arg(long, global = true, env = "CASHBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a transaction.
    Add(DraftArgs),

    /// Replace fields of one of your transactions. Omitted fields keep
    /// their current value.
    Update {
        id: String,

        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Remove one or more of your transactions.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List your transactions, newest first.
    List {
        /// Show at most this many.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the notes currently in the vault.
    Vault,

    /// Compare the vault with one recomputed from the transactions.
    Verify,

    /// Recompute the vault from the transactions and save it.
    RebuildVault,

    /// Totals by payment method, company and location.
    Report(ReportArgs),

    /// Spreadsheet mirror actions.
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },

    /// Configuration file actions.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Fields of a transaction draft. All optional so `update` can patch.
#[derive(Args, Debug, Clone, Default)]
pub struct DraftArgs {
    /// credit (money in) or debit (money out).
    #[arg(long = "type")]
    pub kind: Option<TransactionType>,

    /// cash or upi.
    #[arg(long)]
    pub method: Option<PaymentMethod>,

    /// Amount in rupees, e.g. 1,250.50. Defaults to the note total for cash.
    #[arg(long, value_parser = parse_money)]
    pub amount: Option<Money>,

    /// Notes handed over, as DENOMINATION=COUNT. Repeatable.
    #[arg(long = "cash", value_name = "DENOMINATION=COUNT", value_parser = parse_note_count)]
    pub cash: Vec<(Denomination, i64)>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub person: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// Free-text remarks.
    #[arg(long = "memo")]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// First day to include (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, UTC).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Check that the mirror endpoint answers.
    Test,
    /// Ask the mirror to create its sheet.
    Init,
    /// Replace your transactions with the mirror's copy.
    Pull,
    /// Show the mirror settings.
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Write a config file.
    Init {
        /// Mirror endpoint to store (enables the mirror).
        #[arg(long)]
        mirror_url: Option<String>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn parse_money(raw: &str) -> Result<Money, String> {
    Money::parse(raw).map_err(|e| e.to_string())
}

fn parse_note_count(raw: &str) -> Result<(Denomination, i64), String> {
    let (denomination, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DENOMINATION=COUNT, got '{raw}'"))?;

    let denomination = denomination
        .trim()
        .parse::<Denomination>()
        .map_err(|_| format!("invalid denomination '{denomination}'"))?;
    let count = count
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid count '{count}'"))?;
    if !(0..=MAX_NOTE_COUNT).contains(&count) {
        return Err(format!("count must be between 0 and {MAX_NOTE_COUNT}, got {count}"));
    }

    Ok((denomination, count))
}
