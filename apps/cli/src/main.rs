//! # Cashbook Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           cashbook                                      │
//! │                                                                         │
//! │  main.rs ────► parse args, init tracing, run, print, exit status       │
//! │                                                                         │
//! │  lib.rs ─────► config, database, LedgerStore, dispatch                 │
//! │                                                                         │
//! │  commands/ ──► add, update, delete, list, vault, report, sync, config  │
//! │                                                                         │
//! │  state/ ─────► LedgerStore                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use cashbook_cli::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    cashbook_cli::init_tracing();

    match cashbook_cli::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) if json => {
            match serde_json::to_string_pretty(&err) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {}", err.message);
            ExitCode::FAILURE
        }
    }
}
