//! Mock wallet service.
//!
//! Records every JSON-RPC request with its `Authorization` header and
//! answers with a transaction hash, or with an RPC error once
//! [`MockWallet::reject_with`] was called.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: String,
    pub body: Value,
}

#[derive(Default)]
struct Shared {
    requests: Mutex<Vec<RecordedRequest>>,
    reject: Mutex<Option<String>>,
}

pub struct MockWallet {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let count = {
        let mut requests = shared.requests.lock().await;
        requests.push(RecordedRequest {
            authorization,
            body,
        });
        requests.len()
    };

    match shared.reject.lock().await.clone() {
        Some(message) => Json(json!({
            "jsonrpc": "2.0",
            "error": { "code": -32001, "message": message, "data": "margin check failed" },
            "id": id,
        })),
        None => Json(json!({
            "jsonrpc": "2.0",
            "result": { "transactionHash": format!("HASH{count}"), "receivedAt": "2024-01-01T00:00:00Z" },
            "id": id,
        })),
    }
}

impl MockWallet {
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .route("/api/v2/requests", post(handle))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, shared }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().await.clone()
    }

    /// Answer every following request with an RPC error.
    pub async fn reject_with(&self, message: &str) {
        *self.shared.reject.lock().await = Some(message.to_string());
    }
}
