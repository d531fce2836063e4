//! Data-node JSON wire format.
//!
//! The data node encodes 64-bit integers as strings, enums as upper-case
//! names (`STATUS_ACTIVE`, `ACCOUNT_TYPE_GENERAL`), and wraps list results
//! in `edges[].node` connections. Raw structs mirror the wire; the
//! `into_domain` conversions validate and produce `vmm-core` types.
//!
//! Stream frames arrive as `{"result": {...}}`. Party-scoped topics carry
//! either `{"snapshot": {...}}` (first frame after subscribing) or
//! `{"updates": {...}}`.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;

use vmm_core::{
    parse_decimal, AccountBalance, AccountType, Asset, AssetId, CoreError, Instrument,
    LiquidityProviderSla, LiquidityProvision, Market, MarketData, MarketId, Order, OrderSide,
    OrderStatus, Position,
};
use vmm_feed::{StreamEvent, StreamKind};

use crate::error::{DataNodeError, DataNodeResult};

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Integers may arrive quoted or bare depending on the gateway version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireInt {
    Str(String),
    Num(i64),
}

impl Default for WireInt {
    fn default() -> Self {
        Self::Num(0)
    }
}

impl WireInt {
    fn to_i64(&self, field: &'static str) -> DataNodeResult<i64> {
        match self {
            Self::Num(n) => Ok(*n),
            Self::Str(s) if s.is_empty() => Ok(0),
            Self::Str(s) => s.parse().map_err(|_| {
                CoreError::InvalidValue {
                    field,
                    value: s.clone(),
                }
                .into()
            }),
        }
    }

    fn to_u32(&self, field: &'static str) -> DataNodeResult<u32> {
        let n = self.to_i64(field)?;
        u32::try_from(n).map_err(|_| {
            CoreError::InvalidValue {
                field,
                value: n.to_string(),
            }
            .into()
        })
    }
}

/// Unset numeric fields come through as `""`.
fn decimal_or_zero(s: &str) -> DataNodeResult<Decimal> {
    if s.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    Ok(parse_decimal(s)?)
}

// ---------------------------------------------------------------------------
// Connections (edges/node pagination)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
    #[serde(default)]
    pub cursor: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettlement {
    pub settlement_asset: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstrument {
    #[serde(default)]
    pub name: String,
    pub future: Option<RawSettlement>,
    pub perpetual: Option<RawSettlement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTradableInstrument {
    pub instrument: RawInstrument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarket {
    pub id: String,
    pub tradable_instrument: RawTradableInstrument,
    #[serde(default)]
    pub decimal_places: WireInt,
    #[serde(default)]
    pub position_decimal_places: WireInt,
}

impl RawMarket {
    pub fn into_domain(self) -> DataNodeResult<Market> {
        let raw = self.tradable_instrument.instrument;
        let instrument = match (raw.future, raw.perpetual) {
            (Some(f), _) => Instrument::Future {
                settlement_asset: AssetId::new(f.settlement_asset),
            },
            (None, Some(p)) => Instrument::Perpetual {
                settlement_asset: AssetId::new(p.settlement_asset),
            },
            (None, None) => {
                return Err(DataNodeError::UnsupportedInstrument(self.id));
            }
        };
        Ok(Market {
            decimal_places: self.decimal_places.to_u32("decimalPlaces")?,
            position_decimal_places: self
                .position_decimal_places
                .to_u32("positionDecimalPlaces")?,
            id: MarketId::new(self.id),
            name: raw.name,
            instrument,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLiquidityProviderSla {
    pub party: String,
    #[serde(default)]
    pub current_epoch_fraction_of_time_on_book: String,
    #[serde(default)]
    pub last_epoch_fraction_of_time_on_book: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarketData {
    pub market: String,
    #[serde(default)]
    pub mark_price: String,
    #[serde(default)]
    pub best_bid_price: String,
    #[serde(default)]
    pub best_offer_price: String,
    #[serde(default)]
    pub market_trading_mode: String,
    #[serde(default)]
    pub target_stake: String,
    #[serde(default)]
    pub supplied_stake: String,
    #[serde(default)]
    pub liquidity_provider_sla: Vec<RawLiquidityProviderSla>,
}

impl RawMarketData {
    pub fn into_domain(self) -> DataNodeResult<MarketData> {
        let liquidity_provider_sla = self
            .liquidity_provider_sla
            .into_iter()
            .map(|s| {
                Ok(LiquidityProviderSla {
                    party: s.party,
                    current_epoch_fraction_of_time_on_book: decimal_or_zero(
                        &s.current_epoch_fraction_of_time_on_book,
                    )?,
                    last_epoch_fraction_of_time_on_book: decimal_or_zero(
                        &s.last_epoch_fraction_of_time_on_book,
                    )?,
                })
            })
            .collect::<DataNodeResult<Vec<_>>>()?;

        Ok(MarketData {
            market: self.market,
            mark_price: decimal_or_zero(&self.mark_price)?,
            best_bid_price: decimal_or_zero(&self.best_bid_price)?,
            best_offer_price: decimal_or_zero(&self.best_offer_price)?,
            market_trading_mode: self.market_trading_mode,
            target_stake: decimal_or_zero(&self.target_stake)?,
            supplied_stake: decimal_or_zero(&self.supplied_stake)?,
            liquidity_provider_sla,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccount {
    #[serde(default)]
    pub owner: String,
    pub balance: String,
    pub asset: String,
    #[serde(default)]
    pub market_id: String,
    #[serde(rename = "type")]
    pub account_type: String,
}

impl RawAccount {
    pub fn into_domain(self) -> DataNodeResult<AccountBalance> {
        Ok(AccountBalance {
            owner: self.owner,
            account_type: AccountType::from_wire(&self.account_type),
            asset: AssetId::new(self.asset),
            market_id: MarketId::new(self.market_id),
            balance: decimal_or_zero(&self.balance)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub id: String,
    pub market_id: String,
    pub side: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub size: WireInt,
    #[serde(default)]
    pub remaining: WireInt,
    pub status: String,
    #[serde(default)]
    pub reference: String,
}

impl RawOrder {
    pub fn into_domain(self) -> DataNodeResult<Order> {
        Ok(Order {
            side: OrderSide::from_str(&self.side)?,
            price: decimal_or_zero(&self.price)?,
            size: Decimal::from(self.size.to_i64("size")?),
            remaining: Decimal::from(self.remaining.to_i64("remaining")?),
            status: OrderStatus::from_str(&self.status)?,
            id: self.id,
            market_id: MarketId::new(self.market_id),
            reference: self.reference,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosition {
    pub market_id: String,
    pub party_id: String,
    #[serde(default)]
    pub open_volume: WireInt,
    #[serde(default)]
    pub average_entry_price: String,
    #[serde(default)]
    pub realised_pnl: String,
    #[serde(default)]
    pub unrealised_pnl: String,
}

impl RawPosition {
    pub fn into_domain(self) -> DataNodeResult<Position> {
        Ok(Position {
            open_volume: self.open_volume.to_i64("openVolume")?,
            average_entry_price: decimal_or_zero(&self.average_entry_price)?,
            realised_pnl: decimal_or_zero(&self.realised_pnl)?,
            unrealised_pnl: decimal_or_zero(&self.unrealised_pnl)?,
            market_id: MarketId::new(self.market_id),
            party_id: self.party_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssetDetails {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub decimals: WireInt,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    pub id: String,
    pub details: RawAssetDetails,
}

impl RawAsset {
    pub fn into_domain(self) -> DataNodeResult<Asset> {
        Ok(Asset {
            decimals: self.details.decimals.to_u32("decimals")?,
            id: AssetId::new(self.id),
            symbol: self.details.symbol,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLiquidityProvision {
    #[serde(default)]
    pub id: String,
    pub party_id: String,
    pub market_id: String,
    #[serde(default)]
    pub commitment_amount: String,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub status: String,
}

impl RawLiquidityProvision {
    pub fn into_domain(self) -> DataNodeResult<LiquidityProvision> {
        Ok(LiquidityProvision {
            commitment_amount: decimal_or_zero(&self.commitment_amount)?,
            fee: decimal_or_zero(&self.fee)?,
            id: self.id,
            party_id: self.party_id,
            market_id: MarketId::new(self.market_id),
            status: self.status,
        })
    }
}

/// Commitment states that still bind the party. Anything else means the
/// provision is gone and the store entry should be cleared.
pub fn is_live_provision_status(status: &str) -> bool {
    matches!(
        status,
        "STATUS_ACTIVE" | "STATUS_PENDING" | "STATUS_UNDEPLOYED"
    )
}

// ---------------------------------------------------------------------------
// REST response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MarketResponse {
    pub market: RawMarket,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataResponse {
    pub market_data: RawMarketData,
}

// ---------------------------------------------------------------------------
// Stream frames
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

/// One decoded frame, tagged by the stream it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    MarketData(StreamEvent<MarketData>),
    Accounts(StreamEvent<AccountBalance>),
    Orders(StreamEvent<Order>),
    Positions(StreamEvent<Position>),
    LiquidityProvisions(StreamEvent<LiquidityProvision>),
}

impl StreamFrame {
    pub fn len(&self) -> usize {
        match self {
            Self::MarketData(e) => e.items().len(),
            Self::Accounts(e) => e.items().len(),
            Self::Orders(e) => e.items().len(),
            Self::Positions(e) => e.items().len(),
            Self::LiquidityProvisions(e) => e.items().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn items<R: DeserializeOwned>(
    body: &serde_json::Value,
    key: &'static str,
) -> DataNodeResult<Vec<R>> {
    match body.get(key) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(v) => Ok(serde_json::from_value(v.clone())?),
    }
}

/// Split `{"snapshot": {key: [...]}}` / `{"updates": {key: [...]}}`.
fn snapshot_or_updates<R: DeserializeOwned>(
    result: &serde_json::Value,
    key: &'static str,
) -> DataNodeResult<StreamEvent<R>> {
    if let Some(body) = result.get("snapshot") {
        return Ok(StreamEvent::Snapshot(items(body, key)?));
    }
    if let Some(body) = result.get("updates") {
        return Ok(StreamEvent::Update(items(body, key)?));
    }
    Err(DataNodeError::UnexpectedFrame(format!(
        "expected snapshot or updates, got {result}"
    )))
}

fn convert<R, T>(
    event: StreamEvent<R>,
    f: impl Fn(R) -> DataNodeResult<T>,
) -> DataNodeResult<StreamEvent<T>> {
    match event {
        StreamEvent::Snapshot(items) => Ok(StreamEvent::Snapshot(
            items.into_iter().map(f).collect::<DataNodeResult<_>>()?,
        )),
        StreamEvent::Update(items) => Ok(StreamEvent::Update(
            items.into_iter().map(f).collect::<DataNodeResult<_>>()?,
        )),
    }
}

/// Decode one text frame of the given data-node stream.
pub fn decode_frame(kind: StreamKind, text: &str) -> DataNodeResult<StreamFrame> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if let Some(error) = envelope.error {
        return Err(DataNodeError::StreamError(error.to_string()));
    }
    let result = envelope
        .result
        .ok_or_else(|| DataNodeError::UnexpectedFrame(format!("missing result: {text}")))?;

    match kind {
        StreamKind::MarketData => {
            let raw: Vec<RawMarketData> = items(&result, "marketData")?;
            let event = convert(StreamEvent::Update(raw), RawMarketData::into_domain)?;
            Ok(StreamFrame::MarketData(event))
        }
        StreamKind::Accounts => {
            let raw = snapshot_or_updates::<RawAccount>(&result, "accounts")?;
            Ok(StreamFrame::Accounts(convert(raw, RawAccount::into_domain)?))
        }
        StreamKind::Orders => {
            let raw = snapshot_or_updates::<RawOrder>(&result, "orders")?;
            Ok(StreamFrame::Orders(convert(raw, RawOrder::into_domain)?))
        }
        StreamKind::Positions => {
            let raw = snapshot_or_updates::<RawPosition>(&result, "positions")?;
            Ok(StreamFrame::Positions(convert(raw, RawPosition::into_domain)?))
        }
        StreamKind::LiquidityProvisions => {
            let raw: Vec<RawLiquidityProvision> = items(&result, "liquidityProvisions")?;
            let event = convert(StreamEvent::Update(raw), RawLiquidityProvision::into_domain)?;
            Ok(StreamFrame::LiquidityProvisions(event))
        }
        StreamKind::ReferencePrice => Err(DataNodeError::UnexpectedFrame(
            "reference price is not a data-node stream".to_string(),
        )),
    }
}
