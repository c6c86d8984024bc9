//! # Sync Commands
//!
//! Explicit mirror actions. Unlike the background jobs queued by ledger
//! mutations, these wait for the endpoint and report failure through the
//! exit status.

use cashbook_sync::{CashbookConfig, MirrorClient};
use serde::Serialize;

use super::render;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::state::LedgerStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionOutcome {
    action: &'static str,
    ok: bool,
}

pub async fn test(client: &dyn MirrorClient, json: bool) -> AppResult<String> {
    let ok = client.test_connection().await;
    outcome("testConnection", ok, json, "Mirror endpoint is reachable")
}

pub async fn init(client: &dyn MirrorClient, json: bool) -> AppResult<String> {
    let ok = client.initialize_sheet().await;
    outcome("initializeSheet", ok, json, "Mirror sheet initialized")
}

fn outcome(action: &'static str, ok: bool, json: bool, success: &str) -> AppResult<String> {
    if !ok {
        return Err(AppError::new(
            ErrorCode::MirrorError,
            format!("Mirror action {} failed; see log for details", action),
        ));
    }
    render(json, &ActionOutcome { action, ok }, |_| success.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PullOutcome<'a> {
    identity: &'a str,
    transactions: usize,
}

pub async fn pull(store: &LedgerStore, json: bool) -> AppResult<String> {
    let transactions = store.refresh_from_mirror().await?;
    render(
        json,
        &PullOutcome {
            identity: store.identity(),
            transactions,
        },
        |outcome| {
            format!(
                "Replaced {}'s ledger with {} transaction(s) from the mirror",
                outcome.identity, outcome.transactions
            )
        },
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MirrorView<'a> {
    enabled: bool,
    endpoint: Option<&'a str>,
    timeout_secs: u64,
    queue_capacity: usize,
}

pub fn status(config: &CashbookConfig, json: bool) -> AppResult<String> {
    let view = MirrorView {
        enabled: config.mirror.active_endpoint().is_some(),
        endpoint: config.mirror.endpoint.as_deref(),
        timeout_secs: config.mirror.timeout_secs,
        queue_capacity: config.mirror.queue_capacity,
    };

    render(json, &view, |view| match (view.enabled, view.endpoint) {
        (true, Some(endpoint)) => format!(
            "Mirror enabled: {} (timeout {}s, queue {})",
            endpoint, view.timeout_secs, view.queue_capacity
        ),
        (_, Some(endpoint)) => format!("Mirror disabled (endpoint {} configured)", endpoint),
        _ => "Mirror not configured".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        let mut config = CashbookConfig::default();
        assert_eq!(status(&config, false).unwrap(), "Mirror not configured");

        config.mirror.endpoint = Some("https://script.example.com/exec".into());
        assert!(status(&config, false).unwrap().starts_with("Mirror disabled"));

        config.mirror.enabled = true;
        assert!(status(&config, false).unwrap().starts_with("Mirror enabled"));
    }

    #[test]
    fn test_failed_action_is_error() {
        let err = outcome("testConnection", false, false, "ok").unwrap_err();
        assert_eq!(err.code, ErrorCode::MirrorError);
    }
}
