//! Bootstrap loads and supervised stream ingestion into the [`StateStore`].

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vmm_core::MarketId;
use vmm_feed::{StateStore, StreamEvent, StreamHealth, StreamKind};
use vmm_ws::{ConnectionConfig, ConnectionManager, ConnectionState, FrameHandler, WsError, WsResult};

use crate::client::DataNodeClient;
use crate::error::DataNodeResult;
use crate::wire::{decode_frame, is_live_provision_status, StreamFrame};

/// Data-node subscriptions, in start order.
pub const DATANODE_STREAMS: [StreamKind; 5] = [
    StreamKind::MarketData,
    StreamKind::Accounts,
    StreamKind::Orders,
    StreamKind::Positions,
    StreamKind::LiquidityProvisions,
];

/// Whose state is being tracked.
#[derive(Debug, Clone)]
pub struct Scope {
    pub party_id: String,
    pub market_id: MarketId,
}

/// Populate the store from the REST API. Everything but the liquidity
/// provision is required.
pub async fn bootstrap(
    client: &DataNodeClient,
    store: &StateStore,
    scope: &Scope,
) -> DataNodeResult<()> {
    info!(market = %scope.market_id, party = %scope.party_id, "Bootstrapping state from data node");

    store.set_market(client.market(&scope.market_id).await?);
    store.set_market_data(client.latest_market_data(&scope.market_id).await?);

    let accounts = client.accounts(&scope.party_id).await?;
    debug!(count = accounts.len(), "Loaded accounts");
    store.set_accounts(accounts);

    let orders = client.orders(&scope.party_id, &scope.market_id).await?;
    debug!(count = orders.len(), "Loaded live orders");
    store.set_orders(orders);

    if let Some(position) = client.position(&scope.party_id, &scope.market_id).await? {
        store.set_position(position);
    }

    let assets = client.assets().await?;
    debug!(count = assets.len(), "Loaded assets");
    store.set_assets(assets);

    match client
        .liquidity_provision(&scope.party_id, &scope.market_id)
        .await
    {
        Ok(lp) => store.set_liquidity_provision(lp),
        Err(e) => warn!(error = %e, "Could not load liquidity provision"),
    }

    info!("Bootstrap complete");
    Ok(())
}

/// `http(s)://host` -> `ws(s)://host`.
pub fn ws_base_from_rest(rest_url: &str) -> String {
    let trimmed = rest_url.trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        trimmed.to_string()
    }
}

/// Full websocket URL of one topic.
pub fn topic_url(ws_base: &str, kind: StreamKind, scope: &Scope) -> String {
    let base = ws_base.trim_end_matches('/');
    let (party, market) = (&scope.party_id, &scope.market_id);
    match kind {
        StreamKind::MarketData => format!("{base}/api/v2/stream/markets/data?marketIds={market}"),
        StreamKind::Accounts => format!("{base}/api/v2/stream/accounts?partyId={party}"),
        StreamKind::Orders => {
            format!("{base}/api/v2/stream/orders?marketIds={market}&partyIds={party}")
        }
        StreamKind::Positions => {
            format!("{base}/api/v2/stream/positions?partyId={party}&marketId={market}")
        }
        StreamKind::LiquidityProvisions => {
            format!("{base}/api/v2/stream/liquidity-provisions?marketId={market}&partyId={party}")
        }
        StreamKind::ReferencePrice => base.to_string(),
    }
}

/// Decodes one data-node topic and applies it to the store.
pub struct DataNodeStream {
    kind: StreamKind,
    scope: Scope,
    store: Arc<StateStore>,
    health: Arc<StreamHealth>,
}

impl DataNodeStream {
    pub fn new(
        kind: StreamKind,
        scope: Scope,
        store: Arc<StateStore>,
        health: Arc<StreamHealth>,
    ) -> Self {
        Self {
            kind,
            scope,
            store,
            health,
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Route a decoded frame to the matching setter.
    pub fn apply(&self, frame: StreamFrame) {
        match frame {
            StreamFrame::MarketData(event) => {
                let latest = event
                    .into_items()
                    .into_iter()
                    .filter(|md| md.market == self.scope.market_id.as_str())
                    .last();
                if let Some(md) = latest {
                    self.store.set_market_data(md);
                }
            }
            StreamFrame::Accounts(event) => {
                self.store.set_accounts(event.into_items());
            }
            StreamFrame::Orders(event) => {
                self.store.set_orders(event.into_items());
            }
            StreamFrame::Positions(event) => {
                let latest = event
                    .into_items()
                    .into_iter()
                    .filter(|p| p.market_id == self.scope.market_id)
                    .last();
                if let Some(position) = latest {
                    self.store.set_position(position);
                }
            }
            StreamFrame::LiquidityProvisions(event) => {
                let ours = event.into_items().into_iter().filter(|lp| {
                    lp.party_id == self.scope.party_id && lp.market_id == self.scope.market_id
                });
                for lp in ours {
                    if is_live_provision_status(&lp.status) {
                        self.store.set_liquidity_provision(Some(lp));
                    } else {
                        debug!(id = %lp.id, status = %lp.status, "Liquidity provision no longer live");
                        self.store.set_liquidity_provision(None);
                    }
                }
            }
        }
    }
}

impl FrameHandler for DataNodeStream {
    fn handle_text(&self, text: &str) -> WsResult<()> {
        let frame =
            decode_frame(self.kind, text).map_err(|e| WsError::Decode(format!("{}: {e}", self.kind)))?;
        if matches!(
            &frame,
            StreamFrame::Accounts(StreamEvent::Snapshot(_))
                | StreamFrame::Orders(StreamEvent::Snapshot(_))
                | StreamFrame::Positions(StreamEvent::Snapshot(_))
        ) {
            debug!(stream = %self.kind, items = frame.len(), "Snapshot received");
        }
        self.apply(frame);
        self.health.record_update(self.kind);
        Ok(())
    }

    fn on_state_change(&self, state: ConnectionState) {
        self.health.set_status(self.kind, state.into());
    }
}

/// Run one data-node subscription until shutdown.
pub async fn run_stream(
    kind: StreamKind,
    ws_base: &str,
    scope: Scope,
    store: Arc<StateStore>,
    health: Arc<StreamHealth>,
    template: ConnectionConfig,
    shutdown: CancellationToken,
) -> WsResult<()> {
    let config = ConnectionConfig {
        url: topic_url(ws_base, kind, &scope),
        ..template
    };
    let handler = Arc::new(DataNodeStream::new(kind, scope, store, health));
    let manager = ConnectionManager::new(kind.as_str(), config, handler, shutdown);
    manager.connect().await
}
