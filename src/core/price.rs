//! Pricing abstractions and provider contracts

use crate::core::component::PriceComponent;
use crate::core::config::Feed;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Yesterday's reference prices, keyed by price account.
///
/// The backend responds keyed by symbol; construction re-keys each entry to
/// the configured feed's price account so consumers can join against live
/// prices without holding the symbol table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePrices {
    prices: HashMap<String, f64>,
}

impl ReferencePrices {
    /// Re-keys a symbol-keyed response using the configured feeds. Symbols
    /// that match no feed are dropped.
    pub fn from_symbol_prices(feeds: &[Feed], by_symbol: HashMap<String, f64>) -> Self {
        let accounts: HashMap<&str, &str> = feeds
            .iter()
            .map(|feed| (feed.symbol.as_str(), feed.price_account.as_str()))
            .collect();

        let mut prices = HashMap::with_capacity(by_symbol.len());
        for (symbol, price) in by_symbol {
            match accounts.get(symbol.as_str()) {
                Some(account) => {
                    prices.insert((*account).to_string(), price);
                }
                None => {
                    debug!("Dropping reference price for unconfigured symbol '{symbol}'");
                }
            }
        }

        Self { prices }
    }

    pub fn get(&self, price_account: &str) -> Option<f64> {
        self.prices.get(price_account).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Lifecycle of an asynchronously fetched value.
///
/// `Loaded` data is replaced wholesale by the next successful refresh. A
/// failed refresh parks the state in `Failed` until a later refresh
/// succeeds; consumers render nothing for it, not a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    NotLoaded,
    Loading,
    Loaded(T),
    Failed(String),
}

/// Latest aggregate price of a single feed, as served by the backend.
/// Consumers only read `aggregate.price`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LivePrice {
    pub aggregate: AggregatePrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AggregatePrice {
    pub price: f64,
}

#[async_trait]
pub trait ReferencePriceProvider: Send + Sync {
    /// Fetches yesterday's prices for all `feeds` in one call, re-keyed by
    /// price account.
    async fn fetch(&self, feeds: &[Feed]) -> Result<ReferencePrices>;
}

#[async_trait]
pub trait LivePriceProvider: Send + Sync {
    /// Latest price for one feed. `Ok(None)` means the backend knows no
    /// current price for the account (treated as still loading, not an
    /// error).
    async fn latest(&self, feed: &Feed) -> Result<Option<LivePrice>>;
}

#[async_trait]
pub trait ComponentProvider: Send + Sync {
    /// All publisher quality records for one feed symbol.
    async fn fetch_components(&self, symbol: &str) -> Result<Vec<PriceComponent>>;
}
