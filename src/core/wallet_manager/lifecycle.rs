//! Wallet lifecycle management
//!
//! Create, import, load and logout of the single active wallet.

use super::WalletManager;
use crate::core::{
    domain::{SchemeId, Wallet},
    errors::WalletError,
};
use crate::crypto::scheme::scheme_for;
use crate::storage::WalletRecord;
use tracing::{info, warn};

impl WalletManager {
    /// Generates a fresh wallet and persists it as the active wallet.
    ///
    /// `scheme` defaults to the configured `default_scheme`. Any wallet already
    /// in the store is replaced.
    pub fn create_wallet(&self, scheme: Option<SchemeId>) -> Result<Wallet, WalletError> {
        let scheme = scheme.unwrap_or(self.config.default_scheme);
        let wallet = scheme_for(scheme).generate()?;
        self.activate(&wallet)?;
        info!(address = %wallet.address, scheme = %scheme, "Wallet created");
        Ok(wallet)
    }

    /// Rebuilds a wallet from its private key and persists it as the active wallet.
    ///
    /// `address` is honored by the asymmetric scheme only.
    ///
    /// # Errors
    /// * `WalletError::InvalidKeyFormat` - malformed private key
    pub fn import_wallet(
        &self,
        scheme: Option<SchemeId>,
        private_key: &str,
        address: Option<&str>,
    ) -> Result<Wallet, WalletError> {
        let scheme = scheme.unwrap_or(self.config.default_scheme);
        let wallet = scheme_for(scheme).import(private_key, address)?;
        self.activate(&wallet)?;
        info!(address = %wallet.address, scheme = %scheme, "Wallet imported");
        Ok(wallet)
    }

    /// The active wallet, if one is stored.
    pub fn active_wallet(&self) -> Result<Option<Wallet>, WalletError> {
        match self.store.load_wallet()? {
            Some(record) => Ok(Some(record.to_wallet(self.config.default_scheme)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn require_wallet(&self) -> Result<Wallet, WalletError> {
        self.active_wallet()?.ok_or(WalletError::NoActiveWallet)
    }

    /// Clears the wallet record and the ledger cache. The local submission
    /// log is kept; it is filtered by address on read.
    pub fn logout(&self) -> Result<(), WalletError> {
        let mut history = self.history.write();
        self.store.clear_wallet()?;
        if let Err(e) = self.store.clear_ledger_cache() {
            warn!("Failed to clear ledger cache: {}", e);
        }
        *history = None;
        drop(history);
        info!("Wallet logged out");
        Ok(())
    }

    // Store writes happen under the history lock; refresh checks the active wallet under it too.
    fn activate(&self, wallet: &Wallet) -> Result<(), WalletError> {
        let mut history = self.history.write();
        if let Some(previous) = self.store.load_wallet()? {
            if previous.address != wallet.address {
                warn!(previous = %previous.address, "Replacing the active wallet");
            }
        }
        self.store.save_wallet(&WalletRecord::from_wallet(wallet))?;
        if let Err(e) = self.store.clear_ledger_cache() {
            warn!("Failed to clear ledger cache: {}", e);
        }
        *history = None;
        Ok(())
    }
}
