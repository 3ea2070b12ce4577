//! Fiat estimates for a wallet balance.
//!
//! Three tiers, first hit wins: a live market quote for the first listed coin
//! id, then the node's own `usd_value`, then an explicit `Unlisted` marker.

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::domain::format_grouped;
use crate::core::errors::WalletError;

/// Market price lookup for a single coin id.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Unit price of `coin_id` in `vs_currency`; `None` when the coin is not listed.
    async fn quote(&self, coin_id: &str, vs_currency: &str) -> Result<Option<Decimal>, WalletError>;
}

/// CoinGecko `simple/price` client.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com";

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url: base_url.trim().trim_end_matches('/').to_string(), client })
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn quote(&self, coin_id: &str, vs_currency: &str) -> Result<Option<Decimal>, WalletError> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("ids", coin_id), ("vs_currencies", vs_currency)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(WalletError::NodeUnavailable(format!(
                "price feed returned {} for {}",
                resp.status(),
                coin_id
            )));
        }
        // {"velcoin": {"usd": 0.42}}; unknown ids come back as `{}`.
        let body: HashMap<String, HashMap<String, f64>> = resp
            .json()
            .await
            .map_err(|e| WalletError::NodeUnavailable(format!("malformed price response: {}", e)))?;
        Ok(body
            .get(coin_id)
            .and_then(|prices| prices.get(vs_currency))
            .and_then(|p| Decimal::from_f64(*p)))
    }
}

/// Fiat value of a balance and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FiatEstimate {
    /// `balance * price` from a market quote. A zero balance yields a real zero.
    Quoted { value: Decimal, price: Decimal, coin_id: String, currency: String },
    /// The node's own `usd_value`.
    NodeEstimate { value: Decimal },
    /// No source produced a value.
    Unlisted,
}

impl FiatEstimate {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            FiatEstimate::Quoted { value, .. } | FiatEstimate::NodeEstimate { value } => Some(*value),
            FiatEstimate::Unlisted => None,
        }
    }
}

impl fmt::Display for FiatEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiatEstimate::Quoted { value, currency, .. } if !currency.eq_ignore_ascii_case("usd") => {
                write!(f, "≈ {} {}", format_grouped(*value, 2), currency.to_ascii_uppercase())
            }
            FiatEstimate::Quoted { value, .. } | FiatEstimate::NodeEstimate { value } => {
                write!(f, "≈ ${}", format_grouped(*value, 2))
            }
            FiatEstimate::Unlisted => f.write_str("unlisted"),
        }
    }
}

/// Combines a price feed with the node's fallback estimate.
#[derive(Clone)]
pub struct PriceEnricher {
    feed: Option<Arc<dyn PriceFeed>>,
    coin_ids: Vec<String>,
    vs_currency: String,
}

impl PriceEnricher {
    pub fn new(feed: Arc<dyn PriceFeed>, coin_ids: Vec<String>, vs_currency: &str) -> Self {
        Self { feed: Some(feed), coin_ids, vs_currency: vs_currency.to_ascii_lowercase() }
    }

    /// Enricher that never queries a market and relies on the node estimate.
    pub fn offline() -> Self {
        Self { feed: None, coin_ids: Vec::new(), vs_currency: "usd".into() }
    }

    pub async fn enrich(&self, balance: Decimal, fallback_fiat: Option<Decimal>) -> FiatEstimate {
        if let Some(feed) = &self.feed {
            for coin_id in &self.coin_ids {
                match feed.quote(coin_id, &self.vs_currency).await {
                    Ok(Some(price)) if price > Decimal::ZERO => match balance.checked_mul(price) {
                        Some(value) => {
                            debug!(coin_id = %coin_id, price = %price, "Price quote found");
                            return FiatEstimate::Quoted {
                                value,
                                price,
                                coin_id: coin_id.clone(),
                                currency: self.vs_currency.clone(),
                            };
                        }
                        None => warn!(coin_id = %coin_id, price = %price, "Fiat value out of range"),
                    },
                    Ok(_) => debug!(coin_id = %coin_id, "Coin not listed"),
                    Err(e) => warn!(coin_id = %coin_id, "Price lookup failed: {}", e),
                }
            }
        }

        match fallback_fiat {
            Some(value) if value > Decimal::ZERO => FiatEstimate::NodeEstimate { value },
            _ => FiatEstimate::Unlisted,
        }
    }
}
