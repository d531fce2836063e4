//! Aggregated exchange state for the agent's party and market.
//!
//! One read/write lock guards the whole aggregate. Writers (the stream
//! ingestion adapters) go through narrow setters; readers get clones.
//! A reader never observes half of a write, but two getters called one
//! after the other may see entities from different points in time.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use vmm_core::{
    AccountBalance, AccountKey, Asset, AssetId, LiquidityProvision, Market, MarketData, Order,
    Position,
};

#[derive(Debug, Default)]
struct StoreInner {
    market: Option<Market>,
    market_data: Option<MarketData>,
    liquidity_provision: Option<LiquidityProvision>,
    accounts: HashMap<AccountKey, AccountBalance>,
    orders: HashMap<String, Order>,
    position: Option<Position>,
    assets: HashMap<AssetId, Asset>,
}

/// Exchange-derived state, shared as `Arc<StateStore>`.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<StoreInner>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_market(&self, market: Market) {
        self.inner.write().market = Some(market);
    }

    pub fn market(&self) -> Option<Market> {
        self.inner.read().market.clone()
    }

    /// Replaces the previous market data wholesale.
    pub fn set_market_data(&self, market_data: MarketData) {
        self.inner.write().market_data = Some(market_data);
    }

    pub fn market_data(&self) -> Option<MarketData> {
        self.inner.read().market_data.clone()
    }

    /// Replaces the previous position wholesale.
    pub fn set_position(&self, position: Position) {
        self.inner.write().position = Some(position);
    }

    pub fn position(&self) -> Option<Position> {
        self.inner.read().position.clone()
    }

    /// Upsert a batch of orders (snapshot or update alike).
    ///
    /// Any order reported with a non-active status is removed, so the
    /// store only ever holds live orders.
    pub fn set_orders(&self, orders: impl IntoIterator<Item = Order>) {
        let mut inner = self.inner.write();
        for order in orders {
            if !order.status.is_active() {
                inner.orders.remove(&order.id);
                continue;
            }
            inner.orders.insert(order.id.clone(), order);
        }
        debug!(open_orders = inner.orders.len(), "Orders updated");
    }

    pub fn order(&self, id: &str) -> Option<Order> {
        self.inner.read().orders.get(id).cloned()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.read().orders.values().cloned().collect()
    }

    /// Upsert a batch of balances keyed by (type, asset, market).
    pub fn set_accounts(&self, accounts: impl IntoIterator<Item = AccountBalance>) {
        let mut inner = self.inner.write();
        for account in accounts {
            inner.accounts.insert(account.key(), account);
        }
    }

    pub fn account(&self, key: &AccountKey) -> Option<AccountBalance> {
        self.inner.read().accounts.get(key).cloned()
    }

    pub fn accounts(&self) -> Vec<AccountBalance> {
        self.inner.read().accounts.values().cloned().collect()
    }

    pub fn set_asset(&self, asset: Asset) {
        self.inner.write().assets.insert(asset.id.clone(), asset);
    }

    /// Bulk reload of asset reference data. Replaces every known asset.
    pub fn set_assets(&self, assets: impl IntoIterator<Item = Asset>) {
        let assets: HashMap<AssetId, Asset> =
            assets.into_iter().map(|a| (a.id.clone(), a)).collect();
        self.inner.write().assets = assets;
    }

    pub fn asset(&self, id: &AssetId) -> Option<Asset> {
        self.inner.read().assets.get(id).cloned()
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.inner.read().assets.values().cloned().collect()
    }

    /// `None` clears a commitment that is no longer live.
    pub fn set_liquidity_provision(&self, lp: Option<LiquidityProvision>) {
        self.inner.write().liquidity_provision = lp;
    }

    pub fn liquidity_provision(&self) -> Option<LiquidityProvision> {
        self.inner.read().liquidity_provision.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use vmm_core::{AccountType, MarketId, OrderSide, OrderStatus};

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            market_id: MarketId::new("m1"),
            side: OrderSide::Buy,
            price: dec!(9900),
            size: dec!(10),
            remaining: dec!(10),
            status,
            reference: String::new(),
        }
    }

    fn balance(account_type: AccountType, asset: &str, market: &str, value: Decimal) -> AccountBalance {
        AccountBalance {
            owner: "party".to_string(),
            account_type,
            asset: AssetId::new(asset),
            market_id: MarketId::new(market),
            balance: value,
        }
    }

    #[test]
    fn test_orders_keep_only_latest_active() {
        let store = StateStore::new();
        store.set_orders(vec![
            order("a", OrderStatus::Active),
            order("b", OrderStatus::Active),
            order("c", OrderStatus::Active),
        ]);
        store.set_orders(vec![
            order("a", OrderStatus::Filled),
            order("c", OrderStatus::Cancelled),
            order("d", OrderStatus::Active),
        ]);
        // An id that was terminal and comes back active is retained again
        store.set_orders(vec![order("e", OrderStatus::Expired), order("e", OrderStatus::Active)]);

        let mut ids: Vec<String> = store.orders().into_iter().map(|o| o.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["b", "d", "e"]);
        assert!(store.order("a").is_none());
    }

    #[test]
    fn test_terminal_status_for_unknown_id_is_noop() {
        let store = StateStore::new();
        store.set_orders(vec![order("x", OrderStatus::Rejected)]);
        assert!(store.orders().is_empty());
    }

    #[test]
    fn test_accounts_last_write_wins_per_composite_key() {
        let store = StateStore::new();
        store.set_accounts(vec![
            balance(AccountType::General, "usdt", "", dec!(100)),
            balance(AccountType::Margin, "usdt", "m1", dec!(5)),
            balance(AccountType::Bond, "usdt", "m1", dec!(50)),
        ]);
        store.set_accounts(vec![balance(AccountType::General, "usdt", "", dec!(120))]);
        store.set_accounts(vec![balance(AccountType::Margin, "usdt", "m2", dec!(7))]);

        let general = AccountKey::general(AssetId::new("usdt"));
        assert_eq!(store.account(&general).unwrap().balance, dec!(120));

        let margin_m1 = AccountKey::new(AccountType::Margin, AssetId::new("usdt"), MarketId::new("m1"));
        let margin_m2 = AccountKey::new(AccountType::Margin, AssetId::new("usdt"), MarketId::new("m2"));
        assert_eq!(store.account(&margin_m1).unwrap().balance, dec!(5));
        assert_eq!(store.account(&margin_m2).unwrap().balance, dec!(7));
        assert_eq!(store.accounts().len(), 4);
    }

    #[test]
    fn test_position_replaced_wholesale() {
        let store = StateStore::new();
        assert!(store.position().is_none());
        store.set_position(Position {
            market_id: MarketId::new("m1"),
            party_id: "party".to_string(),
            open_volume: 10,
            average_entry_price: dec!(10000),
            realised_pnl: dec!(3),
            unrealised_pnl: Decimal::ZERO,
        });
        store.set_position(Position {
            market_id: MarketId::new("m1"),
            party_id: "party".to_string(),
            open_volume: -4,
            average_entry_price: dec!(10100),
            realised_pnl: Decimal::ZERO,
            unrealised_pnl: Decimal::ZERO,
        });
        let pos = store.position().unwrap();
        assert_eq!(pos.open_volume, -4);
        assert_eq!(pos.realised_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_liquidity_provision_set_and_clear() {
        let store = StateStore::new();
        assert!(store.liquidity_provision().is_none());
        store.set_liquidity_provision(Some(LiquidityProvision {
            id: "lp1".to_string(),
            party_id: "party".to_string(),
            market_id: MarketId::new("m1"),
            commitment_amount: dec!(1000),
            fee: dec!(0.001),
            status: "STATUS_ACTIVE".to_string(),
        }));
        assert_eq!(store.liquidity_provision().unwrap().fee, dec!(0.001));
        store.set_liquidity_provision(None);
        assert!(store.liquidity_provision().is_none());
    }

    #[test]
    fn test_asset_reload_is_wholesale() {
        let asset = |id: &str, decimals: u32| Asset {
            id: AssetId::new(id),
            symbol: id.to_uppercase(),
            decimals,
        };
        let store = StateStore::new();
        store.set_assets(vec![asset("usdt", 6), asset("old", 18)]);
        store.set_asset(asset("extra", 0));
        store.set_assets(vec![asset("usdt", 8)]);

        assert_eq!(store.assets().len(), 1);
        assert_eq!(store.asset(&AssetId::new("usdt")).unwrap().decimals, 8);
        assert!(store.asset(&AssetId::new("old")).is_none());
    }

    #[test]
    fn test_concurrent_writers_on_different_entities() {
        let store = Arc::new(StateStore::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.set_orders(vec![order(&format!("{t}-{i}"), OrderStatus::Active)]);
                        store.set_accounts(vec![balance(
                            AccountType::General,
                            &format!("asset{t}"),
                            "",
                            Decimal::from(i),
                        )]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.orders().len(), 400);
        assert_eq!(store.accounts().len(), 4);
        let key = AccountKey::general(AssetId::new("asset0"));
        assert_eq!(store.account(&key).unwrap().balance, Decimal::from(99));
    }
}
