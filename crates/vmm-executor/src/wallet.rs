//! Wallet service client.
//!
//! Transactions are signed and broadcast by the wallet service through its
//! JSON-RPC endpoint (`POST /api/v2/requests`), authenticated with a
//! long-lived API token (`Authorization: VWT <token>`). The agent never
//! holds key material.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use vmm_core::Transaction;

use crate::error::{ExecutorError, ExecutorResult};
use crate::submitter::{BoxFuture, SubmitResult, TransactionSubmitter};
use crate::transaction::to_wallet_json;

/// Default timeout for wallet requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const SEND_TRANSACTION: &str = "client.send_transaction";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionParams<'a> {
    public_key: &'a str,
    sending_mode: &'static str,
    transaction: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    method: &'static str,
    params: P,
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionResult {
    #[serde(default)]
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<SendTransactionResult>,
    error: Option<RpcError>,
}

/// Client for the wallet service.
pub struct WalletClient {
    client: Client,
    endpoint: String,
    token: String,
    public_key: String,
}

impl WalletClient {
    /// Create a client for `wallet_url` signing with `public_key`.
    pub fn new(
        wallet_url: &str,
        token: impl Into<String>,
        public_key: impl Into<String>,
    ) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ExecutorError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/v2/requests", wallet_url.trim_end_matches('/')),
            token: token.into(),
            public_key: public_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one transaction synchronously (the wallet waits for the
    /// network's check result). Returns the transaction hash.
    pub async fn send_transaction(&self, tx: &Transaction) -> ExecutorResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: SEND_TRANSACTION,
            params: SendTransactionParams {
                public_key: &self.public_key,
                sending_mode: "TYPE_SYNC",
                transaction: to_wallet_json(tx)?,
            },
            id: &id,
        };
        debug!(request_id = %id, kind = tx.kind(), "Sending transaction to wallet");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("VWT {}", self.token))
            .json(&request)
            .send()
            .await
            .map_err(|e| ExecutorError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutorError::HttpClient(format!("Failed to read response: {e}")))?;

        // JSON-RPC errors may come with a non-2xx status; prefer the RPC error
        let parsed: Option<RpcResponse> = serde_json::from_str(&body).ok();
        if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_ref()) {
            return Err(ExecutorError::Rpc {
                code: error.code,
                message: match &error.data {
                    Some(data) => format!("{}: {data}", error.message),
                    None => error.message.clone(),
                },
            });
        }
        if !status.is_success() {
            return Err(ExecutorError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let result = parsed
            .and_then(|r| r.result)
            .ok_or(ExecutorError::MissingResult)?;
        info!(kind = tx.kind(), tx_hash = %result.transaction_hash, "Transaction sent");
        Ok(result.transaction_hash)
    }
}

impl TransactionSubmitter for WalletClient {
    fn submit(&self, tx: Transaction) -> BoxFuture<'_, SubmitResult> {
        Box::pin(async move {
            match self.send_transaction(&tx).await {
                Ok(tx_hash) => SubmitResult::Accepted { tx_hash },
                Err(e @ ExecutorError::Rpc { .. }) => {
                    warn!(kind = tx.kind(), error = %e, "Transaction rejected by wallet");
                    SubmitResult::Rejected(e.to_string())
                }
                Err(e) => {
                    warn!(kind = tx.kind(), error = %e, "Transaction submission failed");
                    SubmitResult::Error(e.to_string())
                }
            }
        })
    }
}
