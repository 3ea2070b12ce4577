//! Wallet Manager Core Module
//!
//! Engine facade over the injected store, node client, price enricher and
//! nonce source. Holds no global state.
//!
//! ## Module Structure
//! - `lifecycle` - create, import, load, logout
//! - `balance` - balance with fiat estimate
//! - `transactions` - send, mine
//! - `tx_history` - reconciliation against the node's blocks

pub mod balance;
pub mod lifecycle;
pub mod transactions;
pub mod tx_history;

pub use balance::BalanceView;
pub use transactions::SendOutcome;

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::blockchain::node::HttpNodeClient;
use crate::blockchain::price::{CoinGeckoClient, PriceEnricher};
use crate::blockchain::traits::NodeClient;
use crate::core::{
    config::WalletConfig,
    errors::WalletError,
    nonce::{NonceSource, TimeNonce},
};
use crate::storage::{FileWalletStore, WalletStore};
use tx_history::AppliedHistory;

/// wallet manager
pub struct WalletManager {
    pub config: WalletConfig,

    store: Arc<dyn WalletStore>,
    node: Arc<dyn NodeClient>,
    prices: PriceEnricher,
    nonce_source: Arc<dyn NonceSource>,

    /// Last completed reconciliation; replaced wholesale by the next one
    history: RwLock<Option<AppliedHistory>>,
}

impl WalletManager {
    /// Manager over explicit collaborators, with no market price feed and
    /// clock-based nonces.
    pub fn new(config: WalletConfig, store: Arc<dyn WalletStore>, node: Arc<dyn NodeClient>) -> Self {
        Self {
            config,
            store,
            node,
            prices: PriceEnricher::offline(),
            nonce_source: Arc::new(TimeNonce::new()),
            history: RwLock::new(None),
        }
    }

    pub fn with_price_enricher(mut self, prices: PriceEnricher) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_nonce_source(mut self, nonce_source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = nonce_source;
        self
    }

    /// File store, HTTP node client and (when enabled) CoinGecko prices, all
    /// taken from `config`.
    pub fn from_config(config: WalletConfig) -> Result<Self, WalletError> {
        config.validate()?;
        let store = Arc::new(FileWalletStore::from_config(&config.storage)?);
        let node = Arc::new(HttpNodeClient::new(&config.node.base_url, config.node.timeout())?);

        let prices = if config.price.enabled {
            let feed = Arc::new(CoinGeckoClient::new(&config.price.base_url, config.price.timeout())?);
            PriceEnricher::new(feed, config.price.coin_ids.clone(), &config.price.vs_currency)
        } else {
            PriceEnricher::offline()
        };

        info!(
            node = %config.node.base_url,
            data_dir = %config.storage.data_dir.display(),
            prices = config.price.enabled,
            "Wallet manager initialized"
        );
        Ok(Self::new(config, store, node).with_price_enricher(prices))
    }

    pub fn node(&self) -> &dyn NodeClient {
        self.node.as_ref()
    }

    pub fn store(&self) -> &dyn WalletStore {
        self.store.as_ref()
    }
}
