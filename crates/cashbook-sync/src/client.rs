//! # Mirror Client
//!
//! The remote spreadsheet the ledger is mirrored to.
//!
//! ## Wire Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Hosted Script Endpoint                               │
//! │                                                                         │
//! │  Mutations:                                                            │
//! │    POST {endpoint}                                                     │
//! │    { "action": "addTransaction",    "data": { ...transaction } }       │
//! │    { "action": "updateTransaction", "data": { ...transaction } }       │
//! │    { "action": "deleteTransaction", "data": { "id": "…" } }            │
//! │    { "action": "initializeSheet",   "data": null }                     │
//! │    { "action": "testConnection",    "data": null }                     │
//! │                                                                         │
//! │  Reads:                                                                │
//! │    GET {endpoint}?action=getAllTransactions&user=<owner>               │
//! │    → [ ...transactions ]  or  { "success": true, "data": [ … ] }       │
//! │                                                                         │
//! │  Failure = transport error | non-2xx | JSON body with success:false    │
//! │  Anything else (including an unreadable body) counts as success.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations return `bool` and log their own failures; the ledger never
//! waits on or reacts to them beyond the sync status. The read is an
//! explicit operator action and returns a `Result`.

use async_trait::async_trait;
use cashbook_core::sanitize::sanitize_transactions;
use cashbook_core::Transaction;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Mirror Client Trait
// =============================================================================

/// Best-effort remote copy of the ledger.
///
/// Implemented by [`SheetsMirror`] for real use and by in-memory fakes in
/// tests.
#[async_trait]
pub trait MirrorClient: Send + Sync {
    /// Checks that the endpoint is reachable and answering.
    async fn test_connection(&self) -> bool;

    /// Creates the sheet and its header row if missing.
    async fn initialize_sheet(&self) -> bool;

    async fn add_transaction(&self, transaction: &Transaction) -> bool;

    async fn update_transaction(&self, transaction: &Transaction) -> bool;

    async fn delete_transaction(&self, id: &str) -> bool;

    /// Fetches every transaction recorded by `owner`, sanitized.
    async fn get_all_transactions(&self, owner: &str) -> SyncResult<Vec<Transaction>>;
}

// =============================================================================
// Sheets Mirror
// =============================================================================

#[derive(Debug, Serialize)]
struct MirrorRequest<'a> {
    action: &'a str,
    data: Value,
}

/// HTTP client for the hosted spreadsheet script.
#[derive(Debug, Clone)]
pub struct SheetsMirror {
    endpoint: Url,
    http: reqwest::Client,
}

impl SheetsMirror {
    /// Creates a client for `endpoint` with a per-request timeout.
    ///
    /// ## Errors
    /// - `InvalidUrl` if the endpoint does not parse or is not http(s)
    pub fn new(endpoint: &str, timeout: Duration) -> SyncResult<Self> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SyncError::InvalidUrl(format!(
                "Mirror URL must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::ConnectionFailed(e.to_string()))?;

        Ok(SheetsMirror { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one mutation and classifies the response.
    async fn post(&self, action: &str, data: Value) -> SyncResult<()> {
        debug!(action, "Posting to mirror");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&MirrorRequest { action, data })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => check_body(&body),
            Err(e) => {
                debug!(action, error = %e, "Unreadable mirror response body, treating as success");
                Ok(())
            }
        }
    }

    /// Converts a mutation result into the boolean contract, logging failures.
    fn outcome(action: &str, id: Option<&str>, result: SyncResult<()>) -> bool {
        match result {
            Ok(()) => {
                debug!(action, id = id.unwrap_or("-"), "Mirror call succeeded");
                true
            }
            Err(e) => {
                warn!(action, id = id.unwrap_or("-"), error = %e, "Mirror call failed");
                false
            }
        }
    }
}

/// A body is a failure only if it is JSON carrying `"success": false`.
fn check_body(body: &str) -> SyncResult<()> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Ok(());
    };

    if value.get("success") == Some(&Value::Bool(false)) {
        let reason = value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("no reason given")
            .to_string();
        return Err(SyncError::Rejected(reason));
    }

    Ok(())
}

/// Extracts the transaction array from a read response.
fn transactions_payload(value: Value) -> SyncResult<Value> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Object(mut object) => {
            if object.get("success") == Some(&Value::Bool(false)) {
                let reason = object
                    .get("error")
                    .or_else(|| object.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("no reason given")
                    .to_string();
                return Err(SyncError::Rejected(reason));
            }
            object
                .remove("data")
                .or_else(|| object.remove("transactions"))
                .filter(Value::is_array)
                .ok_or_else(|| {
                    SyncError::DeserializationFailed("response has no transaction list".into())
                })
        }
        _ => Err(SyncError::DeserializationFailed(
            "expected a JSON array or object".into(),
        )),
    }
}

#[async_trait]
impl MirrorClient for SheetsMirror {
    async fn test_connection(&self) -> bool {
        let result = self.post("testConnection", Value::Null).await;
        Self::outcome("testConnection", None, result)
    }

    async fn initialize_sheet(&self) -> bool {
        let result = self.post("initializeSheet", Value::Null).await;
        Self::outcome("initializeSheet", None, result)
    }

    async fn add_transaction(&self, transaction: &Transaction) -> bool {
        let result = match serde_json::to_value(transaction) {
            Ok(data) => self.post("addTransaction", data).await,
            Err(e) => Err(e.into()),
        };
        Self::outcome("addTransaction", Some(&transaction.id), result)
    }

    async fn update_transaction(&self, transaction: &Transaction) -> bool {
        let result = match serde_json::to_value(transaction) {
            Ok(data) => self.post("updateTransaction", data).await,
            Err(e) => Err(e.into()),
        };
        Self::outcome("updateTransaction", Some(&transaction.id), result)
    }

    async fn delete_transaction(&self, id: &str) -> bool {
        let result = self.post("deleteTransaction", json!({ "id": id })).await;
        Self::outcome("deleteTransaction", Some(id), result)
    }

    async fn get_all_transactions(&self, owner: &str) -> SyncResult<Vec<Transaction>> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("action", "getAllTransactions")
            .append_pair("user", owner);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;
        let payload = transactions_payload(value)?;
        let transactions = sanitize_transactions(&payload);

        info!(owner, count = transactions.len(), "Fetched transactions from mirror");
        Ok(transactions)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use cashbook_core::{Money, PaymentMethod, TransactionDraft, TransactionType};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Value>>>;

    /// Starts a local stand-in for the script endpoint.
    ///
    /// POST bodies are recorded; the response depends on the action so
    /// each classification branch can be hit.
    async fn spawn_endpoint() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);

        let app = Router::new().route(
            "/exec",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let user = params.get("user").cloned().unwrap_or_default();
                Json(json!({
                    "success": true,
                    "data": [
                        { "id": "r1", "recordedBy": user, "amount": 12.5, "type": "debit" },
                        { "id": 7 },
                    ]
                }))
            })
            .post(move |Json(body): Json<Value>| {
                let recorded = Arc::clone(&recorded);
                async move {
                    let action = body["action"].as_str().unwrap_or_default().to_string();
                    recorded.lock().unwrap().push(body);
                    match action.as_str() {
                        "deleteTransaction" => (StatusCode::OK, "<html>ok</html>".to_string()),
                        "initializeSheet" => (
                            StatusCode::OK,
                            r#"{"success": false, "error": "no access"}"#.to_string(),
                        ),
                        "updateTransaction" => {
                            (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
                        }
                        _ => (StatusCode::OK, r#"{"success": true}"#.to_string()),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/exec", addr), seen)
    }

    fn sample() -> Transaction {
        Transaction::create(
            TransactionDraft {
                kind: TransactionType::Credit,
                payment_method: PaymentMethod::Upi,
                amount: Money::from_rupees(40),
                ..TransactionDraft::default()
            },
            "asha",
        )
    }

    fn mirror(url: &str) -> SheetsMirror {
        SheetsMirror::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            SheetsMirror::new("ftp://example.com", Duration::from_secs(1)),
            Err(SyncError::InvalidUrl(_))
        ));
        assert!(SheetsMirror::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_check_body() {
        assert!(check_body(r#"{"success": true}"#).is_ok());
        assert!(check_body("plain text").is_ok());
        assert!(check_body(r#"{"result": "done"}"#).is_ok());
        assert!(matches!(
            check_body(r#"{"success": false, "message": "bad row"}"#),
            Err(SyncError::Rejected(reason)) if reason == "bad row"
        ));
    }

    #[tokio::test]
    async fn test_mutation_classification() {
        let (url, seen) = spawn_endpoint().await;
        let client = mirror(&url);
        let tx = sample();

        assert!(client.test_connection().await);
        assert!(client.add_transaction(&tx).await);
        assert!(client.delete_transaction(&tx.id).await);
        assert!(!client.initialize_sheet().await);
        assert!(!client.update_transaction(&tx).await);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[1]["action"], "addTransaction");
        assert_eq!(seen[1]["data"]["id"], tx.id.as_str());
        assert_eq!(seen[1]["data"]["paymentMethod"], "upi");
        assert_eq!(seen[2]["data"], json!({ "id": tx.id }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_false() {
        // Bind then drop so the port is (almost certainly) closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = mirror(&format!("http://{}/exec", addr));
        assert!(!client.test_connection().await);
        assert!(client.get_all_transactions("asha").await.is_err());
    }

    #[tokio::test]
    async fn test_get_all_transactions_sanitizes() {
        let (url, _) = spawn_endpoint().await;
        let client = mirror(&url);

        let txs = client.get_all_transactions("asha").await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, "r1");
        assert_eq!(txs[0].recorded_by, "asha");
        assert_eq!(txs[0].kind, TransactionType::Debit);
        assert_eq!(txs[0].amount, Money::from_paise(1250));
    }

    #[test]
    fn test_transactions_payload_shapes() {
        assert!(transactions_payload(json!([])).is_ok());
        assert!(transactions_payload(json!({ "transactions": [] })).is_ok());
        assert!(matches!(
            transactions_payload(json!({ "success": false, "error": "denied" })),
            Err(SyncError::Rejected(_))
        ));
        assert!(transactions_payload(json!({ "data": "nope" })).is_err());
        assert!(transactions_payload(json!(42)).is_err());
    }
}
