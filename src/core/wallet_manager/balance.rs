//! Balance query with fiat estimate

use rust_decimal::Decimal;
use std::fmt;

use super::WalletManager;
use crate::blockchain::price::FiatEstimate;
use crate::core::domain::format_grouped;
use crate::core::errors::WalletError;
use tracing::info;

/// Balance of the active wallet with its best fiat estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceView {
    pub address: String,
    pub balance: Decimal,
    pub ticker: String,
    pub fiat: FiatEstimate,
}

impl fmt::Display for BalanceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", format_grouped(self.balance, 2), self.ticker, self.fiat)
    }
}

impl WalletManager {
    /// Queries the node for the active wallet's balance and enriches it.
    ///
    /// Node failures surface as `NodeUnavailable`; price failures only
    /// downgrade the estimate.
    pub async fn balance(&self) -> Result<BalanceView, WalletError> {
        let wallet = self.require_wallet()?;
        let report = self.node.get_balance(&wallet.address).await?;
        let fiat = self.prices.enrich(report.balance, report.usd_value).await;
        info!(address = %wallet.address, balance = %report.balance, "Balance fetched");
        Ok(BalanceView {
            address: wallet.address,
            balance: report.balance,
            ticker: self.config.ticker.clone(),
            fiat,
        })
    }
}
