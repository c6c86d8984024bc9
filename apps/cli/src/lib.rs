//! # Cashbook CLI Library
//!
//! Everything behind the `cashbook` binary: argument definitions, the
//! ledger store and the command handlers.
//!
//! ## Module Organization
//! ```text
//! cashbook_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   └── ledger.rs   ◄─── LedgerStore (transactions + vault + mirror)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Output helpers
//! │   ├── transaction.rs
//! │   ├── vault.rs
//! │   ├── report.rs
//! │   ├── sync.rs
//! │   └── config.rs
//! └── error.rs        ◄─── AppError for command handlers
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use cashbook_db::{Database, DbConfig};
use cashbook_sync::{CashbookConfig, MirrorClient, MirrorQueue, SheetsMirror, SyncStatus};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigCommand, SyncCommand};
use error::{AppError, AppResult};
use state::LedgerStore;

/// Runs one command and returns what to print.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Command Startup                                   │
/// │                                                                         │
/// │  1. Load Config ──────────────────────────────────────────────────────► │
/// │     • cashbook.toml, then CASHBOOK_* env, then --user / --db, validate  │
/// │                                                                         │
/// │  2. Config / sync test / sync init need nothing else ─────────────────► │
/// │                                                                         │
/// │  3. Open Database ────────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, run pending migrations                      │
/// │                                                                         │
/// │  4. Build LedgerStore ────────────────────────────────────────────────► │
/// │     • sanitize persisted blobs                                          │
/// │     • spawn MirrorQueue when the mirror is enabled                      │
/// │                                                                         │
/// │  5. Run handler, then drain the mirror queue before returning ────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> AppResult<String> {
    let config = load_config(&cli)?;

    let json = cli.json;
    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Show => commands::config::show(&config, cli.config.as_deref(), json),
            ConfigCommand::Init { mirror_url, force } => commands::config::init(
                config,
                cli.config.as_deref(),
                mirror_url,
                force,
                json,
            ),
        },
        Command::Sync {
            command: SyncCommand::Status,
        } => commands::sync::status(&config, json),
        Command::Sync {
            command: SyncCommand::Test,
        } => {
            let client = mirror_client(&config)?.ok_or(cashbook_sync::SyncError::MirrorDisabled)?;
            commands::sync::test(client.as_ref(), json).await
        }
        Command::Sync {
            command: SyncCommand::Init,
        } => {
            let client = mirror_client(&config)?.ok_or(cashbook_sync::SyncError::MirrorDisabled)?;
            commands::sync::init(client.as_ref(), json).await
        }
        command => {
            let store = open_store(&config).await?;
            let result = dispatch(&store, command, json).await;

            let pending = store.mirror_pending();
            if pending > 0 {
                debug!(pending, "Waiting for mirror jobs");
            }
            store.shutdown().await?;
            if *store.sync_status().borrow() == SyncStatus::Error {
                warn!("Mirror sync failed; the local ledger is up to date");
            }

            result
        }
    }
}

/// Loads the config file and environment, applies `--user` / `--db`, and
/// validates the result.
pub fn load_config(cli: &Cli) -> AppResult<CashbookConfig> {
    let mut config = CashbookConfig::load(cli.config.clone())?;
    if let Some(user) = &cli.user {
        config.user.identity = Some(user.clone());
    }
    if let Some(db) = &cli.db {
        config.storage.database_path = Some(db.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn dispatch(store: &LedgerStore, command: Command, json: bool) -> AppResult<String> {
    match command {
        Command::Add(draft) => commands::transaction::add(store, &draft, json).await,
        Command::Update { id, draft } => {
            commands::transaction::update(store, &id, &draft, json).await
        }
        Command::Delete { ids } => commands::transaction::delete(store, &ids, json).await,
        Command::List { limit } => commands::transaction::list(store, limit, json).await,
        Command::Vault => commands::vault::show(store, json).await,
        Command::Verify => commands::vault::verify(store, json).await,
        Command::RebuildVault => commands::vault::rebuild(store, json).await,
        Command::Report(args) => commands::report::run(store, &args, json).await,
        Command::Sync {
            command: SyncCommand::Pull,
        } => commands::sync::pull(store, json).await,
        Command::Sync { .. } | Command::Config { .. } => {
            Err(AppError::internal("command does not use the ledger"))
        }
    }
}

/// Builds the HTTP mirror client when the mirror is enabled.
pub fn mirror_client(config: &CashbookConfig) -> AppResult<Option<Arc<dyn MirrorClient>>> {
    let Some(endpoint) = config.mirror.active_endpoint() else {
        return Ok(None);
    };
    let client: Arc<dyn MirrorClient> =
        Arc::new(SheetsMirror::new(endpoint, config.mirror_timeout())?);
    Ok(Some(client))
}

/// Opens the database and loads the ledger for the configured identity.
pub async fn open_store(config: &CashbookConfig) -> AppResult<LedgerStore> {
    let identity = config.identity()?;

    let db_path = config
        .database_path()
        .ok_or_else(|| AppError::config("Could not determine a database path; pass --db"))?;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;

    let client = mirror_client(config)?;
    let queue = match &client {
        Some(client) => MirrorQueue::spawn(Arc::clone(client), config.queue_config()),
        None => MirrorQueue::disabled(),
    };

    let store = LedgerStore::load(db, &identity, config.reset_policy(), queue).await?;
    Ok(match client {
        Some(client) => store.with_remote(client),
        None => store,
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays clean.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cashbook_sync=trace` - Trace the mirror only
/// - Default: INFO, DEBUG for cashbook crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cashbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let config = std::env::temp_dir().join("cashbook-missing-config.toml");
        let mut argv = vec!["cashbook", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_and_are_validated() {
        let config = load_config(&parse(&["--user", " asha ", "--db", "/tmp/c.db", "vault"])).unwrap();
        assert_eq!(config.user.identity.as_deref(), Some(" asha "));
        assert_eq!(config.database_path(), Some("/tmp/c.db".into()));

        let err = load_config(&parse(&["--user", "   ", "config", "show"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let long = "x".repeat(cashbook_core::MAX_LABEL_LEN + 1);
        assert!(load_config(&parse(&["--user", &long, "config", "show"])).is_err());
    }
}
