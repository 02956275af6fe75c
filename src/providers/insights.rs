//! Providers backed by the insights dashboard HTTP API
//!
//! All three endpoints live on one backend: `/yesterdays-prices` (reference
//! prices for the change column), `/live-prices` (latest aggregate per
//! account) and `/price-components` (publisher quality records per symbol).

use crate::core::component::PriceComponent;
use crate::core::config::Feed;
use crate::core::price::{
    ComponentProvider, LivePrice, LivePriceProvider, ReferencePriceProvider, ReferencePrices,
};
use crate::providers::http::{build_client, get_with_retry};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub struct InsightsReferenceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl InsightsReferenceProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }
}

#[async_trait]
impl ReferencePriceProvider for InsightsReferenceProvider {
    #[instrument(name = "ReferencePriceFetch", skip_all, fields(feeds = feeds.len()))]
    async fn fetch(&self, feeds: &[Feed]) -> Result<ReferencePrices> {
        let url = format!("{}/yesterdays-prices", self.base_url);
        // One `symbols` parameter per feed; symbols may contain '/' so they
        // go through query encoding rather than the path.
        let query: Vec<(&str, &str)> = feeds
            .iter()
            .map(|feed| ("symbols", feed.symbol.as_str()))
            .collect();
        debug!("Requesting reference prices from {}", url);

        let response = get_with_retry(&self.client, &url, &query).await?;
        if !response.status().is_success() {
            bail!("HTTP error: {} from {}", response.status(), url);
        }

        let text = response.text().await?;
        let by_symbol: HashMap<String, f64> = serde_json::from_str(&text)
            .with_context(|| format!("Malformed reference price response: '{text}'"))?;

        Ok(ReferencePrices::from_symbol_prices(feeds, by_symbol))
    }
}

pub struct InsightsLivePriceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl InsightsLivePriceProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }
}

#[async_trait]
impl LivePriceProvider for InsightsLivePriceProvider {
    #[instrument(name = "LivePriceFetch", skip_all, fields(symbol = %feed.symbol))]
    async fn latest(&self, feed: &Feed) -> Result<Option<LivePrice>> {
        let url = format!("{}/live-prices", self.base_url);
        let query = [("account", feed.price_account.as_str())];
        debug!("Requesting live price from {}", url);

        let response = get_with_retry(&self.client, &url, &query).await?;
        if response.status() == StatusCode::NOT_FOUND {
            // The backend has not seen a price for this account yet
            debug!("No live price for account {}", feed.price_account);
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!(
                "HTTP error: {} for account: {}",
                response.status(),
                feed.price_account
            );
        }

        let price = response
            .json::<LivePrice>()
            .await
            .with_context(|| format!("Malformed live price response for {}", feed.symbol))?;
        Ok(Some(price))
    }
}

pub struct InsightsComponentProvider {
    base_url: String,
    client: reqwest::Client,
}

impl InsightsComponentProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }
}

#[async_trait]
impl ComponentProvider for InsightsComponentProvider {
    #[instrument(name = "ComponentFetch", skip(self))]
    async fn fetch_components(&self, symbol: &str) -> Result<Vec<PriceComponent>> {
        let url = format!("{}/price-components", self.base_url);
        debug!("Requesting price components from {}", url);

        let response = get_with_retry(&self.client, &url, &[("symbol", symbol)]).await?;
        if !response.status().is_success() {
            bail!("HTTP error: {} for symbol: {symbol}", response.status());
        }

        let text = response.text().await?;
        let components: Vec<PriceComponent> = serde_json::from_str(&text)
            .with_context(|| format!("Malformed price component response for {symbol}"))?;

        debug!("Fetched {} price components for {symbol}", components.len());
        Ok(components)
    }
}
