//! Strategy engine.
//!
//! Bootstrapping runs once and is fatal on failure: cancel the party's
//! orders, then create or amend the liquidity commitment. After that the
//! engine ticks on a fixed interval. Each tick reads the store and the
//! reference price, reconciles the commitment and submits one batch of
//! cancel-all plus a fresh bid and ask ladder.
//!
//! ```text
//! tick ─┬─ guards: market loaded, streams live, reference price fresh
//!       ├─ balance = general(asset) + bond(asset, market)
//!       ├─ exposure = open_volume * average_entry_price
//!       ├─ reconcile(commitment = balance * commitment_fraction)
//!       └─ batch: cancel-all + bids(balance*q - exposure) + asks(balance*q + exposure)
//! ```

use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use vmm_core::{
    AccountKey, AccountType, Asset, BatchMarketInstructions, Market, MarketId, OrderCancellation,
    OrderSide, PrecisionConverter, Transaction,
};
use vmm_executor::{DynSubmitter, SubmitResult};
use vmm_feed::{ReferencePriceFeed, StateStore, StreamHealth, StreamKind};
use vmm_telemetry::Metrics;

use crate::config::StrategyConfig;
use crate::error::{StrategyError, StrategyResult};
use crate::liquidity::{reconcile_pending, CommitmentTarget};
use crate::quote_engine::{build_ladder, to_submissions};

/// Why a tick did not quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoMarket,
    StreamsNotLive(Vec<StreamKind>),
    NoReferencePrice,
    StaleReferencePrice,
    AssetNotFound,
    InvalidPrecision,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMarket => "no_market",
            Self::StreamsNotLive(_) => "streams_not_live",
            Self::NoReferencePrice => "no_reference_price",
            Self::StaleReferencePrice => "stale_reference_price",
            Self::AssetNotFound => "asset_not_found",
            Self::InvalidPrecision => "invalid_precision",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamsNotLive(streams) => {
                let names: Vec<&str> = streams.iter().map(|s| s.as_str()).collect();
                write!(f, "streams not live: {}", names.join(","))
            }
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of one steady-state tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A batch went out with this many order submissions.
    Submitted { orders: usize },
    Skipped(SkipReason),
    SubmitFailed(String),
}

impl TickOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Skipped(_) => "skipped",
            Self::SubmitFailed(_) => "submit_failed",
        }
    }
}

/// Inputs read from the store for one decision, in human units.
struct Snapshot {
    market: Market,
    converter: PrecisionConverter,
    balance: Decimal,
}

pub struct StrategyEngine {
    config: StrategyConfig,
    market_id: MarketId,
    store: Arc<StateStore>,
    reference: Arc<ReferencePriceFeed>,
    health: Arc<StreamHealth>,
    submitter: DynSubmitter,
    required_streams: Vec<StreamKind>,
    /// Last commitment sent, until the store reflects it.
    pending_commitment: Mutex<Option<CommitmentTarget>>,
}

impl StrategyEngine {
    pub fn new(
        config: StrategyConfig,
        market_id: MarketId,
        store: Arc<StateStore>,
        reference: Arc<ReferencePriceFeed>,
        health: Arc<StreamHealth>,
        submitter: DynSubmitter,
    ) -> Self {
        Self {
            config,
            market_id,
            store,
            reference,
            health,
            submitter,
            required_streams: StreamKind::ALL.to_vec(),
            pending_commitment: Mutex::new(None),
        }
    }

    /// Streams that must be live for a tick to quote.
    pub fn with_required_streams(mut self, streams: Vec<StreamKind>) -> Self {
        self.required_streams = streams;
        self
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Settlement asset of the loaded market, with its reference data.
    fn settlement_asset(&self, market: &Market) -> Option<Asset> {
        self.store.asset(market.settlement_asset())
    }

    /// General balance of the asset plus whatever is already bonded to the
    /// market, in human units.
    fn available_balance(&self, asset: &Asset, converter: &PrecisionConverter) -> Decimal {
        let general = self
            .store
            .account(&AccountKey::general(asset.id.clone()))
            .map_or(Decimal::ZERO, |a| a.balance);
        let bond = self
            .store
            .account(&AccountKey::new(
                AccountType::Bond,
                asset.id.clone(),
                self.market_id.clone(),
            ))
            .map_or(Decimal::ZERO, |a| a.balance);
        converter.from_asset_precision(general + bond)
    }

    fn snapshot(&self) -> StrategyResult<Snapshot> {
        let market = self.store.market().ok_or(StrategyError::MarketNotLoaded)?;
        let asset = self
            .settlement_asset(&market)
            .ok_or_else(|| StrategyError::AssetNotFound(market.settlement_asset().to_string()))?;
        let converter = PrecisionConverter::for_market(&market, &asset)?;
        let balance = self.available_balance(&asset, &converter);
        Ok(Snapshot {
            market,
            converter,
            balance,
        })
    }

    async fn submit(&self, tx: Transaction) -> Result<String, String> {
        let kind = tx.kind();
        let started = Instant::now();
        let result =
            match tokio::time::timeout(self.config.submit_timeout(), self.submitter.submit(tx)).await {
                Ok(result) => result,
                Err(_) => SubmitResult::Error(format!(
                    "timed out after {}ms",
                    self.config.submit_timeout_ms
                )),
            };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        Metrics::submission(kind, result.label(), elapsed_ms);

        match result {
            SubmitResult::Accepted { tx_hash } => {
                debug!(kind, %tx_hash, elapsed_ms, "Transaction accepted");
                Ok(tx_hash)
            }
            SubmitResult::Rejected(reason) | SubmitResult::Error(reason) => {
                warn!(kind, %reason, elapsed_ms, "Transaction failed");
                Err(reason)
            }
        }
    }

    /// Submit a commitment change if one is needed. Returns whether
    /// anything was sent.
    async fn reconcile_liquidity(&self, snapshot: &Snapshot) -> Result<bool, String> {
        let commitment = snapshot
            .converter
            .to_asset_precision(snapshot.balance * self.config.commitment_fraction);
        if commitment <= Decimal::ZERO {
            debug!("Commitment rounds to zero, leaving liquidity provision as is");
            return Ok(false);
        }

        let current = self.store.liquidity_provision();
        let pending = {
            let mut pending = self.pending_commitment.lock();
            if let (Some(p), Some(lp)) = (pending.as_ref(), current.as_ref()) {
                if p.is_reflected_by(lp) {
                    *pending = None;
                }
            }
            *pending
        };
        let Some(command) =
            reconcile_pending(current.as_ref(), pending.as_ref(), commitment, self.config.fee)
        else {
            if pending.is_some() {
                debug!("Commitment sent, waiting for the data node to report it");
            }
            return Ok(false);
        };

        info!(?command, "Reconciling liquidity commitment");
        let target = CommitmentTarget::from(&command);
        let tx = command.into_transaction(&snapshot.market.id, &self.config.order_reference);
        self.submit(tx).await?;
        *self.pending_commitment.lock() = Some(target);
        Ok(true)
    }

    /// One-time startup sequence. Any error is fatal.
    pub async fn bootstrap(&self) -> StrategyResult<()> {
        let snapshot = self.snapshot()?;
        Metrics::available_balance(snapshot.balance.to_f64().unwrap_or(0.0));
        if snapshot.balance <= Decimal::ZERO {
            return Err(StrategyError::NoFunds {
                asset: snapshot.market.settlement_asset().to_string(),
            });
        }
        info!(
            market = %snapshot.market.id,
            balance = %snapshot.balance,
            "Bootstrapping strategy"
        );

        let cancel_all = Transaction::BatchMarketInstructions(BatchMarketInstructions {
            cancellations: vec![OrderCancellation {
                market_id: self.market_id.clone(),
            }],
            submissions: Vec::new(),
        });
        self.submit(cancel_all)
            .await
            .map_err(StrategyError::Submission)?;

        self.reconcile_liquidity(&snapshot)
            .await
            .map_err(StrategyError::Submission)?;

        info!("Strategy bootstrap complete");
        Ok(())
    }

    /// Staleness guard. `None` means quoting may proceed.
    fn stale_reason(&self) -> Option<SkipReason> {
        let not_live = self.health.not_live(&self.required_streams);
        if !not_live.is_empty() {
            return Some(SkipReason::StreamsNotLive(not_live));
        }
        match self.reference.age() {
            None => Some(SkipReason::NoReferencePrice),
            Some(age) if age > self.config.max_reference_age() => {
                Some(SkipReason::StaleReferencePrice)
            }
            Some(_) => None,
        }
    }

    /// One steady-state iteration.
    pub async fn tick(&self) -> TickOutcome {
        let outcome = self.tick_inner().await;
        match &outcome {
            TickOutcome::Skipped(reason) => {
                debug!(%reason, "Tick skipped");
                Metrics::tick(outcome.label(), reason.as_str());
            }
            other => Metrics::tick(other.label(), ""),
        }
        outcome
    }

    async fn tick_inner(&self) -> TickOutcome {
        if self.store.market().is_none() {
            return TickOutcome::Skipped(SkipReason::NoMarket);
        }
        if let Some(reason) = self.stale_reason() {
            return TickOutcome::Skipped(reason);
        }

        let snapshot = match self.snapshot() {
            Ok(s) => s,
            Err(StrategyError::AssetNotFound(asset)) => {
                warn!(%asset, "Settlement asset missing from store");
                return TickOutcome::Skipped(SkipReason::AssetNotFound);
            }
            Err(e) => {
                warn!(error = %e, "Cannot build precision converter");
                return TickOutcome::Skipped(SkipReason::InvalidPrecision);
            }
        };
        let conv = &snapshot.converter;
        let reference = self.reference.get();
        Metrics::reference_price(
            reference.bid.to_f64().unwrap_or(0.0),
            reference.ask.to_f64().unwrap_or(0.0),
        );
        Metrics::available_balance(snapshot.balance.to_f64().unwrap_or(0.0));

        let (volume, entry_price) = match self.store.position() {
            Some(p) => (
                conv.from_position_precision(Decimal::from(p.open_volume)),
                conv.from_price_precision(p.average_entry_price),
            ),
            None => (Decimal::ZERO, Decimal::ZERO),
        };
        let exposure = volume * entry_price;
        let target = snapshot.balance * self.config.quote_fraction;
        let bid_volume = target - exposure;
        let offer_volume = target + exposure;

        debug!(
            balance = %snapshot.balance,
            %exposure,
            %bid_volume,
            %offer_volume,
            bid = %reference.bid,
            ask = %reference.ask,
            "Computing quotes"
        );

        if let Err(reason) = self.reconcile_liquidity(&snapshot).await {
            // Quotes still go out; the commitment is retried next tick
            warn!(%reason, "Liquidity reconciliation failed");
        }

        let market_id = &snapshot.market.id;
        let reference_tag = &self.config.order_reference;
        let bids = build_ladder(
            OrderSide::Buy,
            reference.bid,
            bid_volume,
            self.config.num_levels,
            self.config.level_step,
        );
        let asks = build_ladder(
            OrderSide::Sell,
            reference.ask,
            offer_volume,
            self.config.num_levels,
            self.config.level_step,
        );

        let mut submissions = to_submissions(market_id, OrderSide::Buy, &bids, conv, reference_tag);
        submissions.extend(to_submissions(
            market_id,
            OrderSide::Sell,
            &asks,
            conv,
            reference_tag,
        ));
        let orders = submissions.len();

        let batch = Transaction::BatchMarketInstructions(BatchMarketInstructions {
            cancellations: vec![OrderCancellation {
                market_id: market_id.clone(),
            }],
            submissions,
        });

        match self.submit(batch).await {
            Ok(_) => {
                Metrics::quoted_orders(orders);
                TickOutcome::Submitted { orders }
            }
            Err(reason) => TickOutcome::SubmitFailed(reason),
        }
    }

    /// Tick every `tick_interval` until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            interval_ms = self.config.tick_interval_ms,
            "Strategy loop started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.tick().await {
                        TickOutcome::Submitted { orders } => {
                            info!(orders, "Quotes submitted");
                        }
                        TickOutcome::SubmitFailed(reason) => {
                            error!(%reason, "Quote submission failed");
                        }
                        TickOutcome::Skipped(_) => {}
                    }
                }
                () = shutdown.cancelled() => {
                    info!("Strategy loop stopping");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use vmm_core::{AccountBalance, AssetId, Instrument, LiquidityProvision, Position};
    use vmm_executor::MockSubmitter;
    use vmm_feed::StreamStatus;

    struct Fixture {
        store: Arc<StateStore>,
        reference: Arc<ReferencePriceFeed>,
        health: Arc<StreamHealth>,
        submitter: Arc<MockSubmitter>,
        engine: StrategyEngine,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(StateStore::new());
        let reference = Arc::new(ReferencePriceFeed::new());
        let health = Arc::new(StreamHealth::with_streams(&StreamKind::ALL));
        let submitter = Arc::new(MockSubmitter::new());
        let engine = StrategyEngine::new(
            StrategyConfig::default(),
            MarketId::new("m1"),
            store.clone(),
            reference.clone(),
            health.clone(),
            submitter.clone(),
        );
        Fixture {
            store,
            reference,
            health,
            submitter,
            engine,
        }
    }

    fn seed_market(store: &StateStore) {
        store.set_market(Market {
            id: MarketId::new("m1"),
            name: "BTC/USDT".to_string(),
            decimal_places: 2,
            position_decimal_places: 1,
            instrument: Instrument::Perpetual {
                settlement_asset: AssetId::new("usdt"),
            },
        });
        store.set_asset(Asset {
            id: AssetId::new("usdt"),
            symbol: "USDT".to_string(),
            decimals: 0,
        });
    }

    fn seed_balance(store: &StateStore, general: Decimal) {
        store.set_accounts(vec![AccountBalance {
            owner: "p1".to_string(),
            account_type: AccountType::General,
            asset: AssetId::new("usdt"),
            market_id: MarketId::new(""),
            balance: general,
        }]);
    }

    fn all_live(health: &StreamHealth) {
        for kind in StreamKind::ALL {
            health.set_status(kind, StreamStatus::Live);
        }
    }

    fn batches(submitter: &MockSubmitter) -> Vec<BatchMarketInstructions> {
        submitter
            .submissions()
            .into_iter()
            .filter_map(|tx| match tx {
                Transaction::BatchMarketInstructions(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_bootstrap_without_funds_is_fatal() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, Decimal::ZERO);

        let err = f.engine.bootstrap().await.unwrap_err();
        assert!(matches!(err, StrategyError::NoFunds { .. }));
        assert!(f.submitter.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_cancels_then_commits() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(600));
        // Already-bonded funds count towards the balance
        f.store.set_accounts(vec![AccountBalance {
            owner: "p1".to_string(),
            account_type: AccountType::Bond,
            asset: AssetId::new("usdt"),
            market_id: MarketId::new("m1"),
            balance: dec!(400),
        }]);

        f.engine.bootstrap().await.unwrap();
        let subs = f.submitter.submissions();
        assert_eq!(subs.len(), 2);
        let Transaction::BatchMarketInstructions(cancel) = &subs[0] else {
            panic!("expected cancel-all first");
        };
        assert_eq!(cancel.cancellations.len(), 1);
        assert!(cancel.submissions.is_empty());
        let Transaction::LiquidityProvisionSubmission(lp) = &subs[1] else {
            panic!("expected liquidity submission");
        };
        assert_eq!(lp.commitment_amount, "500");
        assert_eq!(lp.fee, "0.001");
    }

    #[tokio::test]
    async fn test_bootstrap_amends_existing_commitment() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        f.store.set_liquidity_provision(Some(LiquidityProvision {
            id: "lp1".to_string(),
            party_id: "p1".to_string(),
            market_id: MarketId::new("m1"),
            commitment_amount: dec!(200),
            fee: dec!(0.001),
            status: "STATUS_ACTIVE".to_string(),
        }));

        f.engine.bootstrap().await.unwrap();
        assert!(matches!(
            f.submitter.submissions().last(),
            Some(Transaction::LiquidityProvisionAmendment(a)) if a.commitment_amount == "500"
        ));
    }

    fn liquidity_txs(submitter: &MockSubmitter) -> Vec<Transaction> {
        submitter
            .submissions()
            .into_iter()
            .filter(|tx| !matches!(tx, Transaction::BatchMarketInstructions(_)))
            .collect()
    }

    #[tokio::test]
    async fn test_commitment_not_resent_before_stream_reports_it() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));

        f.engine.bootstrap().await.unwrap();
        assert_eq!(f.engine.tick().await, TickOutcome::Submitted { orders: 10 });
        assert_eq!(f.engine.tick().await, TickOutcome::Submitted { orders: 10 });

        let lp = liquidity_txs(&f.submitter);
        assert_eq!(lp.len(), 1);
        assert!(matches!(&lp[0], Transaction::LiquidityProvisionSubmission(s) if s.commitment_amount == "500"));
    }

    #[tokio::test]
    async fn test_pending_commitment_amended_when_target_moves() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));
        f.engine.bootstrap().await.unwrap();

        // Balance grows before the submission is echoed back
        seed_balance(&f.store, dec!(2000));
        f.engine.tick().await;
        let lp = liquidity_txs(&f.submitter);
        assert_eq!(lp.len(), 2);
        assert!(matches!(&lp[1], Transaction::LiquidityProvisionAmendment(a) if a.commitment_amount == "1000"));

        // Echo of the amendment: nothing further to send
        f.store.set_liquidity_provision(Some(LiquidityProvision {
            id: "lp1".to_string(),
            party_id: "p1".to_string(),
            market_id: MarketId::new("m1"),
            commitment_amount: dec!(1000),
            fee: dec!(0.001),
            status: "STATUS_ACTIVE".to_string(),
        }));
        f.engine.tick().await;
        assert_eq!(liquidity_txs(&f.submitter).len(), 2);

        // Once the network drops it, the commitment is submitted afresh
        f.store.set_liquidity_provision(None);
        f.engine.tick().await;
        let lp = liquidity_txs(&f.submitter);
        assert_eq!(lp.len(), 3);
        assert!(matches!(&lp[2], Transaction::LiquidityProvisionSubmission(_)));
    }

    #[tokio::test]
    async fn test_failed_commitment_is_retried() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));

        f.submitter
            .set_next_result(SubmitResult::Rejected("margin check failed".to_string()));
        f.engine.tick().await;
        f.engine.tick().await;
        let submissions: Vec<_> = liquidity_txs(&f.submitter)
            .into_iter()
            .filter(|tx| matches!(tx, Transaction::LiquidityProvisionSubmission(_)))
            .collect();
        assert_eq!(submissions.len(), 2);
    }

    #[tokio::test]
    async fn test_bootstrap_submission_failure_is_fatal() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        f.submitter
            .set_next_result(SubmitResult::Rejected("wallet refused".to_string()));
        assert!(matches!(
            f.engine.bootstrap().await,
            Err(StrategyError::Submission(_))
        ));
    }

    #[tokio::test]
    async fn test_tick_without_market_skips() {
        let f = fixture();
        assert_eq!(f.engine.tick().await, TickOutcome::Skipped(SkipReason::NoMarket));
    }

    #[tokio::test]
    async fn test_tick_skips_while_streams_not_live() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        f.reference.set(dec!(99), dec!(101));
        all_live(&f.health);
        f.health
            .set_status(StreamKind::Orders, StreamStatus::Reconnecting);

        assert_eq!(
            f.engine.tick().await,
            TickOutcome::Skipped(SkipReason::StreamsNotLive(vec![StreamKind::Orders]))
        );
        assert!(f.submitter.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_only_required_streams_gate_quoting() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        f.reference.set(dec!(99), dec!(101));
        f.health
            .set_status(StreamKind::ReferencePrice, StreamStatus::Live);
        let engine = StrategyEngine::new(
            StrategyConfig::default(),
            MarketId::new("m1"),
            f.store.clone(),
            f.reference.clone(),
            f.health.clone(),
            f.submitter.clone(),
        )
        .with_required_streams(vec![StreamKind::ReferencePrice]);

        assert_eq!(engine.tick().await, TickOutcome::Submitted { orders: 10 });
    }

    #[tokio::test]
    async fn test_tick_skips_without_reference_price() {
        let f = fixture();
        seed_market(&f.store);
        all_live(&f.health);
        assert_eq!(
            f.engine.tick().await,
            TickOutcome::Skipped(SkipReason::NoReferencePrice)
        );
    }

    #[tokio::test]
    async fn test_tick_skips_on_stale_reference_price() {
        let mut f = fixture();
        f.engine.config.tick_interval_ms = 10;
        f.engine.config.staleness_ticks = 1;
        seed_market(&f.store);
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            f.engine.tick().await,
            TickOutcome::Skipped(SkipReason::StaleReferencePrice)
        );
    }

    #[tokio::test]
    async fn test_tick_skips_when_asset_missing() {
        let f = fixture();
        f.store.set_market(Market {
            id: MarketId::new("m1"),
            name: String::new(),
            decimal_places: 2,
            position_decimal_places: 1,
            instrument: Instrument::Future {
                settlement_asset: AssetId::new("unknown"),
            },
        });
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));
        assert_eq!(
            f.engine.tick().await,
            TickOutcome::Skipped(SkipReason::AssetNotFound)
        );
    }

    #[tokio::test]
    async fn test_tick_quotes_both_sides() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));

        assert_eq!(f.engine.tick().await, TickOutcome::Submitted { orders: 10 });

        let batch = batches(&f.submitter).pop().unwrap();
        assert_eq!(batch.cancellations.len(), 1);
        assert_eq!(batch.submissions.len(), 10);
        let first_bid = &batch.submissions[0];
        assert_eq!(first_bid.side, OrderSide::Buy);
        // 99 * 0.998 = 98.802 -> "9880"; 500 / (5 * 99) = 1.0101 -> "10"
        assert_eq!(first_bid.price, "9880");
        assert_eq!(first_bid.size, "10");
        let first_ask = &batch.submissions[5];
        assert_eq!(first_ask.side, OrderSide::Sell);
        assert_eq!(first_ask.price, "10120");
        assert_eq!(first_ask.size, "9");

        // No commitment yet, so one went out ahead of the quotes
        assert!(f
            .submitter
            .submissions()
            .iter()
            .any(|tx| matches!(tx, Transaction::LiquidityProvisionSubmission(_))));
    }

    #[tokio::test]
    async fn test_tick_long_position_skews_ladder() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));
        // Long 5.0 @ 100.00 -> exposure 500 = balance * 0.5: no room to buy
        f.store.set_position(Position {
            market_id: MarketId::new("m1"),
            party_id: "p1".to_string(),
            open_volume: 50,
            average_entry_price: dec!(10000),
            realised_pnl: Decimal::ZERO,
            unrealised_pnl: Decimal::ZERO,
        });

        assert_eq!(f.engine.tick().await, TickOutcome::Submitted { orders: 5 });
        let batch = batches(&f.submitter).pop().unwrap();
        assert!(batch.submissions.iter().all(|s| s.side == OrderSide::Sell));
        // offer volume 1000 over 5 levels at 101 -> 1.98 -> "19"
        assert_eq!(batch.submissions[0].size, "19");
    }

    #[tokio::test]
    async fn test_tick_submit_timeout() {
        let mut f = fixture();
        f.engine.config.submit_timeout_ms = 20;
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));
        f.submitter.set_delay(Duration::from_millis(500));

        let outcome = f.engine.tick().await;
        assert!(matches!(outcome, TickOutcome::SubmitFailed(reason) if reason.contains("timed out")));
    }

    #[tokio::test]
    async fn test_tick_rejection_reported() {
        let f = fixture();
        seed_market(&f.store);
        seed_balance(&f.store, dec!(1000));
        all_live(&f.health);
        f.reference.set(dec!(99), dec!(101));
        f.submitter
            .set_next_result(SubmitResult::Rejected("margin check failed".to_string()));
        assert_eq!(
            f.engine.tick().await,
            TickOutcome::SubmitFailed("margin check failed".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let f = fixture();
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), f.engine.run(token))
            .await
            .unwrap();
    }
}
