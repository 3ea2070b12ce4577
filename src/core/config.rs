use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::domain::SchemeId;
use crate::core::errors::WalletError;

/// Node connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "NodeConfig::default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "NodeConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NodeConfig {
    fn default_base_url() -> String { "http://127.0.0.1:5000".to_string() }
    fn default_timeout_secs() -> u64 { 10 }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Market price lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "PriceConfig::default_enabled")]
    pub enabled: bool,

    #[serde(default = "PriceConfig::default_base_url")]
    pub base_url: String,

    /// Tried in order; the first listed id with a non-zero price wins
    #[serde(default = "PriceConfig::default_coin_ids")]
    pub coin_ids: Vec<String>,

    #[serde(default = "PriceConfig::default_vs_currency")]
    pub vs_currency: String,

    #[serde(default = "PriceConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PriceConfig {
    fn default_enabled() -> bool { true }
    fn default_base_url() -> String { "https://api.coingecko.com".to_string() }
    fn default_coin_ids() -> Vec<String> {
        vec!["velcoin".to_string(), "velcoin-2".to_string(), "vlc".to_string()]
    }
    fn default_vs_currency() -> String { "usd".to_string() }
    fn default_timeout_secs() -> u64 { 5 }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            base_url: Self::default_base_url(),
            coin_ids: Self::default_coin_ids(),
            vs_currency: Self::default_vs_currency(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Local files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "StorageConfig::default_wallet_file")]
    pub wallet_file: String,

    #[serde(default = "StorageConfig::default_history_file")]
    pub history_file: String,

    #[serde(default = "StorageConfig::default_ledger_cache_file")]
    pub ledger_cache_file: String,
}

impl StorageConfig {
    fn default_data_dir() -> PathBuf { PathBuf::from("./data") }
    fn default_wallet_file() -> String { "wallet.json".to_string() }
    fn default_history_file() -> String { "history.jsonl".to_string() }
    fn default_ledger_cache_file() -> String { "ledger_cache.json".to_string() }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            wallet_file: Self::default_wallet_file(),
            history_file: Self::default_history_file(),
            ledger_cache_file: Self::default_ledger_cache_file(),
        }
    }
}

/// wallet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub price: PriceConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Scheme for newly created wallets and for records that carry none
    #[serde(default)]
    pub default_scheme: SchemeId,

    #[serde(default = "WalletConfig::default_ticker")]
    pub ticker: String,
}

impl WalletConfig {
    fn default_ticker() -> String { "VLC".to_string() }

    /// Parses TOML text; missing sections and fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, WalletError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` if it exists, otherwise starts from defaults. Environment
    /// overrides are applied and the result validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => {
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&text)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                return Err(WalletError::ConfigError(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// `CONFIG_PATH` or `config.toml` in the working directory.
    pub fn load_default() -> Result<Self, WalletError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load(path)
    }

    /// `VEL_NODE_URL`, `VEL_DATA_DIR`, `VEL_SCHEME`, `VEL_PRICE_ENABLED`.
    pub fn apply_env_overrides(&mut self) -> Result<(), WalletError> {
        if let Some(url) = env_non_empty("VEL_NODE_URL") {
            self.node.base_url = url;
        }
        if let Some(dir) = env_non_empty("VEL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(scheme) = env_non_empty("VEL_SCHEME") {
            self.default_scheme = scheme.parse()?;
        }
        if let Some(flag) = env_non_empty("VEL_PRICE_ENABLED") {
            self.price.enabled = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(WalletError::ConfigError(format!(
                        "VEL_PRICE_ENABLED must be a boolean, got '{}'",
                        other
                    )))
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        let url = self.node.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(WalletError::ConfigError(format!(
                "node.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.node.timeout_secs == 0 {
            return Err(WalletError::ConfigError("node.timeout_secs must be positive".into()));
        }
        if self.price.enabled {
            if self.price.coin_ids.iter().all(|id| id.trim().is_empty()) {
                return Err(WalletError::ConfigError("price.coin_ids is empty".into()));
            }
            if self.price.timeout_secs == 0 {
                return Err(WalletError::ConfigError("price.timeout_secs must be positive".into()));
            }
        }
        for (name, file) in [
            ("wallet_file", &self.storage.wallet_file),
            ("history_file", &self.storage.history_file),
            ("ledger_cache_file", &self.storage.ledger_cache_file),
        ] {
            if file.trim().is_empty() {
                return Err(WalletError::ConfigError(format!("storage.{} is empty", name)));
            }
        }
        Ok(())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            price: PriceConfig::default(),
            storage: StorageConfig::default(),
            default_scheme: SchemeId::default(),
            ticker: Self::default_ticker(),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
