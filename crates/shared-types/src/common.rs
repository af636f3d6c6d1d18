//! # Common Value Objects
//!
//! Chains, assets, coins and the identifiers used across the bridge.

use crate::errors::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// One whole unit of any asset in base units (8 decimals).
pub const ONE: u128 = 100_000_000;

/// External chain identifier, always upper case (`BTC`, `ETH`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Chain(String);

impl Chain {
    pub fn new(symbol: &str) -> TypesResult<Self> {
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypesError::InvalidChain(symbol.to_string()));
        }
        Ok(Self(symbol.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The asset used to pay gas on this chain (`BTC.BTC`).
    pub fn gas_asset(&self) -> Asset {
        Asset {
            chain: self.clone(),
            symbol: self.0.clone(),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Chain {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::new(s)
    }
}

/// Asset on an external chain, written `CHAIN.SYMBOL`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Asset {
    pub chain: Chain,
    pub symbol: String,
}

impl Asset {
    pub fn new(chain: Chain, symbol: &str) -> Self {
        Self {
            chain,
            symbol: symbol.to_ascii_uppercase(),
        }
    }

    pub fn is_gas_asset(&self) -> bool {
        self.symbol == self.chain.as_str()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chain, self.symbol)
    }
}

impl FromStr for Asset {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain, symbol) = s
            .split_once('.')
            .ok_or_else(|| TypesError::InvalidAsset(s.to_string()))?;
        if symbol.is_empty() {
            return Err(TypesError::InvalidAsset(s.to_string()));
        }
        Ok(Asset::new(Chain::new(chain)?, symbol))
    }
}

/// An amount of one asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub asset: Asset,
    pub amount: u128,
}

impl Coin {
    pub fn new(asset: Asset, amount: u128) -> Self {
        Self { asset, amount }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset)
    }
}

/// Ordered bag of coins, at most one entry per asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Amount held of `asset` (zero when absent).
    pub fn get(&self, asset: &Asset) -> u128 {
        self.0
            .iter()
            .find(|c| &c.asset == asset)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    pub fn has(&self, asset: &Asset) -> bool {
        self.0.iter().any(|c| &c.asset == asset)
    }

    pub fn add(&mut self, coin: &Coin) {
        match self.0.iter_mut().find(|c| c.asset == coin.asset) {
            Some(existing) => existing.amount = existing.amount.saturating_add(coin.amount),
            None => self.0.push(coin.clone()),
        }
    }

    pub fn add_all(&mut self, coins: &Coins) {
        for coin in coins.iter() {
            self.add(coin);
        }
    }

    /// Saturating subtraction; the entry stays (at zero) so the asset is still known.
    pub fn sub(&mut self, coin: &Coin) {
        if let Some(existing) = self.0.iter_mut().find(|c| c.asset == coin.asset) {
            existing.amount = existing.amount.saturating_sub(coin.amount);
        }
    }

    pub fn sub_all(&mut self, coins: &Coins) {
        for coin in coins.iter() {
            self.sub(coin);
        }
    }

    /// Exact match on asset and amount.
    pub fn contains(&self, coin: &Coin) -> bool {
        self.0.iter().any(|c| c == coin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no entry holds a positive amount.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|c| c.is_empty())
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(coins: Vec<Coin>) -> Self {
        let mut out = Coins::new();
        for coin in &coins {
            out.add(coin);
        }
        out
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Coins(vec![coin])
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Address on an external chain.
    Address
);
string_id!(
    /// Public key of a vault or node (bech32 text on the wire).
    PubKey
);
string_id!(
    /// Validator identity used as a signer.
    NodeAddress
);
string_id!(
    /// External transaction hash, upper-case hex.
    TxId
);

impl Address {
    pub fn new(addr: &str) -> Self {
        Self(addr.to_string())
    }

    /// Sentinel destination meaning "do not send".
    pub fn is_noop(&self) -> bool {
        self.0.eq_ignore_ascii_case("noop")
    }
}

impl PubKey {
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Deterministic per-chain address controlled by this key.
    pub fn address(&self, chain: &Chain) -> Address {
        let mut hasher = Sha256::new();
        hasher.update(chain.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(self.0.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Address(format!("{}1{}", chain.as_str().to_ascii_lowercase(), &digest[..38]))
    }
}

impl NodeAddress {
    pub fn new(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl TxId {
    pub fn new(hash: &str) -> Self {
        Self(hash.to_ascii_uppercase())
    }

    /// Placeholder used for outbounds that have no inbound (migrations).
    pub fn blank() -> Self {
        Self("0".repeat(64))
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty() || self.0.chars().all(|c| c == '0')
    }
}

/// A transaction on an external chain as reported by an observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tx {
    pub id: TxId,
    pub chain: Chain,
    pub from_address: Address,
    pub to_address: Address,
    pub coins: Coins,
    pub gas: Coins,
    pub memo: String,
}

impl Tx {
    /// Coins moved plus gas paid, as one bag.
    pub fn total_spend(&self) -> Coins {
        let mut total = self.coins.clone();
        total.add_all(&self.gas);
        total
    }
}
