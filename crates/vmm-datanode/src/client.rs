//! HTTP client for data-node bootstrap loads.
//!
//! Each load is one request/response against the REST gateway. List
//! endpoints are paginated with `pagination.after=<cursor>` until
//! `pageInfo.hasNextPage` is false.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use vmm_core::{
    AccountBalance, Asset, LiquidityProvision, Market, MarketData, MarketId, Order, Position,
};

use crate::error::{DataNodeError, DataNodeResult};
use crate::wire::{
    Connection, MarketDataResponse, MarketResponse, RawAccount, RawAsset, RawLiquidityProvision,
    RawOrder, RawPosition,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on pages followed for one list load.
const MAX_PAGES: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountsPage {
    accounts: Connection<RawAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrdersPage {
    orders: Connection<RawOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionsPage {
    positions: Connection<RawPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetsPage {
    assets: Connection<RawAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiquidityProvisionsPage {
    liquidity_provisions: Connection<RawLiquidityProvision>,
}

/// Client for the data-node REST API.
pub struct DataNodeClient {
    /// HTTP client.
    client: Client,
    /// Base URL (e.g., "https://api.n07.testnet.vega.rocks").
    base_url: String,
}

impl DataNodeClient {
    /// Create a new data-node client.
    pub fn new(base_url: impl Into<String>) -> DataNodeResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| DataNodeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> DataNodeResult<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "Data node request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DataNodeError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataNodeError::HttpStatus {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DataNodeError::HttpClient(format!("Failed to read response: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Follow the connection cursor across pages.
    async fn get_all<P, R>(
        &self,
        path: &str,
        query: &[(&str, String)],
        connection: impl Fn(P) -> Connection<R>,
    ) -> DataNodeResult<Vec<R>>
    where
        P: DeserializeOwned,
    {
        let mut nodes = Vec::new();
        let mut after: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut q = query.to_vec();
            if let Some(cursor) = &after {
                q.push(("pagination.after", cursor.clone()));
            }
            let page = connection(self.get::<P>(path, &q).await?);
            let more = page.page_info.has_next_page && !page.page_info.end_cursor.is_empty();
            after = Some(page.page_info.end_cursor.clone());
            nodes.extend(page.into_nodes());
            if !more {
                break;
            }
        }
        Ok(nodes)
    }

    pub async fn market(&self, market_id: &MarketId) -> DataNodeResult<Market> {
        let resp: MarketResponse = self
            .get(&format!("/api/v2/market/{market_id}"), &[])
            .await?;
        let market = resp.market.into_domain()?;
        info!(market = %market.id, name = %market.name, "Loaded market");
        Ok(market)
    }

    pub async fn latest_market_data(&self, market_id: &MarketId) -> DataNodeResult<MarketData> {
        let resp: MarketDataResponse = self
            .get(&format!("/api/v2/market/data/{market_id}/latest"), &[])
            .await?;
        resp.market_data.into_domain()
    }

    pub async fn accounts(&self, party_id: &str) -> DataNodeResult<Vec<AccountBalance>> {
        let raw = self
            .get_all(
                "/api/v2/accounts",
                &[("filter.partyIds", party_id.to_string())],
                |p: AccountsPage| p.accounts,
            )
            .await?;
        raw.into_iter().map(RawAccount::into_domain).collect()
    }

    /// Live orders of the party on the market.
    pub async fn orders(&self, party_id: &str, market_id: &MarketId) -> DataNodeResult<Vec<Order>> {
        let raw = self
            .get_all(
                "/api/v2/orders",
                &[
                    ("filter.partyIds", party_id.to_string()),
                    ("filter.marketIds", market_id.to_string()),
                    ("filter.liveOnly", "true".to_string()),
                ],
                |p: OrdersPage| p.orders,
            )
            .await?;
        raw.into_iter().map(RawOrder::into_domain).collect()
    }

    /// The party's position on the market, if any. More than one is an error.
    pub async fn position(
        &self,
        party_id: &str,
        market_id: &MarketId,
    ) -> DataNodeResult<Option<Position>> {
        let mut raw = self
            .get_all(
                "/api/v2/positions",
                &[
                    ("partyId", party_id.to_string()),
                    ("marketId", market_id.to_string()),
                ],
                |p: PositionsPage| p.positions,
            )
            .await?;
        if raw.len() > 1 {
            return Err(DataNodeError::TooManyPositions(raw.len()));
        }
        raw.pop().map(RawPosition::into_domain).transpose()
    }

    pub async fn assets(&self) -> DataNodeResult<Vec<Asset>> {
        let raw = self
            .get_all("/api/v2/assets", &[], |p: AssetsPage| p.assets)
            .await?;
        raw.into_iter().map(RawAsset::into_domain).collect()
    }

    /// The party's live commitment on the market, if any.
    pub async fn liquidity_provision(
        &self,
        party_id: &str,
        market_id: &MarketId,
    ) -> DataNodeResult<Option<LiquidityProvision>> {
        let raw = self
            .get_all(
                "/api/v2/liquidity/provisions",
                &[
                    ("marketId", market_id.to_string()),
                    ("partyId", party_id.to_string()),
                    ("live", "true".to_string()),
                ],
                |p: LiquidityProvisionsPage| p.liquidity_provisions,
            )
            .await?;
        raw.into_iter()
            .next()
            .map(RawLiquidityProvision::into_domain)
            .transpose()
    }
}
