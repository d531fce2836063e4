//! Mock data node REST API.
//!
//! Serves one perpetual market `m1` (price dp 2, position dp 1) settled in
//! `usdt` (6 decimals) for party `p1`, with a configurable general balance.

use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub const MARKET_ID: &str = "m1";
pub const PARTY_ID: &str = "p1";

pub struct MockDataNode {
    addr: SocketAddr,
}

fn page(key: &str, nodes: Vec<Value>) -> Value {
    let edges: Vec<Value> = nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| json!({ "node": node, "cursor": format!("c{i}") }))
        .collect();
    let mut envelope = Map::new();
    envelope.insert(
        key.to_string(),
        json!({ "edges": edges, "pageInfo": { "hasNextPage": false, "endCursor": "" } }),
    );
    Value::Object(envelope)
}

/// Route answering every GET with the same document.
fn fixed(body: Value) -> MethodRouter {
    get(move || std::future::ready(Json(body.clone())))
}

impl MockDataNode {
    /// Start with `general_balance` in fixed-point units of `usdt`.
    pub async fn start(general_balance: &str) -> Self {
        let market = json!({
            "market": {
                "id": MARKET_ID,
                "decimalPlaces": "2",
                "positionDecimalPlaces": "1",
                "tradableInstrument": {
                    "instrument": {
                        "name": "BTC/USDT Perp",
                        "perpetual": { "settlementAsset": "usdt" }
                    }
                }
            }
        });
        let market_data = json!({
            "marketData": {
                "market": MARKET_ID,
                "markPrice": "10000",
                "bestBidPrice": "9990",
                "bestOfferPrice": "10010",
                "marketTradingMode": "TRADING_MODE_CONTINUOUS",
                "targetStake": "1000000",
                "suppliedStake": "0"
            }
        });
        let accounts = page(
            "accounts",
            vec![json!({
                "owner": PARTY_ID,
                "balance": general_balance,
                "asset": "usdt",
                "marketId": "",
                "type": "ACCOUNT_TYPE_GENERAL"
            })],
        );
        let assets = page(
            "assets",
            vec![json!({ "id": "usdt", "details": { "symbol": "USDT", "decimals": "6" } })],
        );

        let app = Router::new()
            .route("/api/v2/market/m1", fixed(market))
            .route("/api/v2/market/data/m1/latest", fixed(market_data))
            .route("/api/v2/accounts", fixed(accounts))
            .route("/api/v2/orders", fixed(page("orders", vec![])))
            .route("/api/v2/positions", fixed(page("positions", vec![])))
            .route("/api/v2/assets", fixed(assets))
            .route(
                "/api/v2/liquidity/provisions",
                fixed(page("liquidityProvisions", vec![])),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}
