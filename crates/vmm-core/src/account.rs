//! Account balances keyed by (type, asset, market).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::market::{AssetId, MarketId};

/// Exchange account type.
///
/// Types the agent acts on are modelled; every other type keeps its wire
/// name (lowercased, without the `ACCOUNT_TYPE_` prefix) so that distinct
/// accounts never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccountType {
    /// Free collateral, not tied to a market.
    General,
    /// Margin posted for positions on a market.
    Margin,
    /// Liquidity commitment escrowed to a market.
    Bond,
    /// Any other account, e.g. `vested_rewards` or `lp_liquidity_fees`.
    Other(String),
}

impl AccountType {
    pub fn from_wire(s: &str) -> Self {
        let name = s.strip_prefix("ACCOUNT_TYPE_").unwrap_or(s).to_ascii_lowercase();
        match name.as_str() {
            "general" => Self::General,
            "margin" => Self::Margin,
            "bond" => Self::Bond,
            _ => Self::Other(name),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::Margin => "margin",
            Self::Bond => "bond",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(CoreError::UnknownVariant {
                kind: "account type",
                value: s.to_string(),
            });
        }
        Ok(Self::from_wire(s))
    }
}

impl TryFrom<String> for AccountType {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountType> for String {
    fn from(t: AccountType) -> Self {
        t.as_str().to_string()
    }
}

/// Composite uniqueness key of a balance.
///
/// General accounts carry an empty market id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountKey {
    pub account_type: AccountType,
    pub asset: AssetId,
    pub market_id: MarketId,
}

impl AccountKey {
    pub fn new(account_type: AccountType, asset: AssetId, market_id: MarketId) -> Self {
        Self {
            account_type,
            asset,
            market_id,
        }
    }

    /// General account for an asset (no market).
    pub fn general(asset: AssetId) -> Self {
        Self::new(AccountType::General, asset, MarketId::new(""))
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.account_type, self.asset, self.market_id)
    }
}

/// One sub-balance. `balance` is in settlement-asset fixed-point units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub owner: String,
    pub account_type: AccountType,
    pub asset: AssetId,
    pub market_id: MarketId,
    pub balance: Decimal,
}

impl AccountBalance {
    pub fn key(&self) -> AccountKey {
        AccountKey::new(
            self.account_type.clone(),
            self.asset.clone(),
            self.market_id.clone(),
        )
    }
}
