//! HTTP server implementation using axum.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use vmm_telemetry::Metrics;

use crate::config::StatusConfig;
use crate::error::{StatusError, StatusResult};
use crate::state::StatusState;
use crate::types::{HealthDocument, StateDocument};

/// Create the axum router.
pub fn create_router(state: StatusState, config: &StatusConfig) -> Router {
    let router = Router::new()
        .route("/state", get(get_state))
        .route("/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .with_state(state);

    if config.cors_any_origin {
        router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
    } else {
        router
    }
}

async fn get_state(State(state): State<StatusState>) -> Json<StateDocument> {
    Json(state.collect_state())
}

/// 200 when every stream is live, 503 otherwise. The body is the same.
async fn get_health(State(state): State<StatusState>) -> (StatusCode, Json<HealthDocument>) {
    let doc = state.collect_health();
    let code = if doc.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(doc))
}

async fn get_metrics(State(state): State<StatusState>) -> Response {
    state.refresh_metrics();
    match Metrics::gather_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve on an already-bound listener until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: StatusState,
    config: &StatusConfig,
    shutdown: CancellationToken,
) -> StatusResult<()> {
    let app = create_router(state, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Status server stopped");
    Ok(())
}

/// Bind `config.bind_addr()`.
pub async fn bind(config: &StatusConfig) -> StatusResult<TcpListener> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StatusError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "Status server listening");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use vmm_feed::{ReferencePriceFeed, StateStore, StreamHealth, StreamKind, StreamStatus};

    async fn spawn_server() -> (String, Arc<StreamHealth>, CancellationToken) {
        let store = Arc::new(StateStore::new());
        let reference = Arc::new(ReferencePriceFeed::new());
        reference.set(dec!(99), dec!(101));
        let health = Arc::new(StreamHealth::with_streams(&[StreamKind::Orders]));
        let state = StatusState::new(store, reference, health.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let token = CancellationToken::new();
        let shutdown = token.clone();
        tokio::spawn(async move {
            serve(listener, state, &StatusConfig::default(), shutdown)
                .await
                .unwrap();
        });
        (format!("http://{addr}"), health, token)
    }

    #[tokio::test]
    async fn test_state_endpoint() {
        let (base, _health, token) = spawn_server().await;
        let body: serde_json::Value = reqwest::get(format!("{base}/state"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["best_bid"], "99");
        assert_eq!(body["best_ask"], "101");
        assert!(body["market"].is_null());
        assert_eq!(body["streams"][0]["stream"], "orders");
        token.cancel();
    }

    #[tokio::test]
    async fn test_health_status_code_follows_streams() {
        let (base, health, token) = spawn_server().await;
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        health.set_status(StreamKind::Orders, StreamStatus::Live);
        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        token.cancel();
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (base, _health, token) = spawn_server().await;
        let body = reqwest::get(format!("{base}/metrics"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("vmm_stream_live"));
        token.cancel();
    }

    #[tokio::test]
    async fn test_bind_reports_address_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = StatusConfig {
            host: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
            ..StatusConfig::default()
        };
        let err = bind(&config).await.unwrap_err();
        assert!(matches!(err, StatusError::Bind { ref addr, .. } if *addr == config.bind_addr()));

        let free = StatusConfig {
            port: 0,
            ..config
        };
        assert!(bind(&free).await.is_ok());
    }
}
