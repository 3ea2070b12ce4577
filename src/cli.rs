use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;

use crate::blockchain::traits::MineOutcome;
use crate::core::config::WalletConfig;
use crate::core::domain::{short_id, SchemeId};
use crate::core::reconciler::{EntryStatus, LedgerEntry};
use crate::core::wallet_manager::WalletManager;
use crate::security::SecretString;

/// VelCoin light wallet (library-facing definitions)
#[derive(Debug, Parser)]
#[command(name = "vel-wallet", about = "VelCoin light wallet", version)]
pub struct Cli {
    /// Configuration file (defaults to $CONFIG_PATH or ./config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Node URL, overrides the configuration
    #[arg(long, global = true)]
    pub node: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new wallet and make it active
    Create {
        /// `asymmetric` or `hash_chain`
        #[arg(long)]
        scheme: Option<SchemeId>,
        /// Replace an existing active wallet
        #[arg(long)]
        force: bool,
    },
    /// Import a wallet from its private key
    Import {
        #[arg(long)]
        scheme: Option<SchemeId>,
        /// Hex private key; read from VEL_PRIVATE_KEY or stdin when omitted
        #[arg(long)]
        key: Option<String>,
        /// Address to use as-is (asymmetric wallets only)
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        force: bool,
    },
    /// Print the active wallet's address
    Address,
    Balance,
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Ask the node to mine pending transactions
    Mine,
    History {
        /// Show the last reconciled history without contacting the node
        #[arg(long)]
        offline: bool,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Forget the active wallet on this device
    Logout,
}

impl Cli {
    pub fn load_config(&self) -> Result<WalletConfig> {
        let mut config = match &self.config {
            Some(path) => WalletConfig::load(path),
            None => WalletConfig::load_default(),
        }
        .context("failed to load configuration")?;
        if let Some(node) = &self.node {
            config.node.base_url = node.clone();
            config.validate()?;
        }
        Ok(config)
    }
}

/// Runs one command against `manager`, returning the text to print.
pub async fn run(command: Commands, manager: &WalletManager) -> Result<String> {
    match command {
        Commands::Create { scheme, force } => {
            ensure_replaceable(manager, force)?;
            let wallet = manager.create_wallet(scheme)?;
            Ok(format!("Created {} wallet\naddress: {}", wallet.scheme, wallet.address))
        }
        Commands::Import { scheme, key, address, force } => {
            ensure_replaceable(manager, force)?;
            let key = match key {
                Some(k) => SecretString::new(k),
                None => read_private_key()?,
            };
            let wallet = manager.import_wallet(scheme, &key, address.as_deref())?;
            Ok(format!("Imported {} wallet\naddress: {}", wallet.scheme, wallet.address))
        }
        Commands::Address => {
            let wallet = manager.active_wallet()?.context("no active wallet")?;
            Ok(wallet.address)
        }
        Commands::Balance => Ok(manager.balance().await?.to_string()),
        Commands::Send { to, amount } => {
            let outcome = manager.send_str(&to, &amount).await?;
            Ok(format!(
                "Sent {} {} to {}\ntx: {}",
                outcome.transaction.amount(),
                manager.config.ticker,
                outcome.transaction.to(),
                outcome.tx_id()
            ))
        }
        Commands::Mine => Ok(match manager.mine().await? {
            MineOutcome::Mined { index } => format!("Mined block #{}", index),
            MineOutcome::Pending => "Mining pending".to_string(),
        }),
        Commands::History { offline, limit } => {
            let wallet = manager.active_wallet()?.context("no active wallet")?;
            let entries = if offline {
                manager.cached_history()?
            } else {
                manager.refresh_history().await?
            };
            if entries.is_empty() {
                return Ok("No transactions".to_string());
            }
            let lines: Vec<String> = entries
                .iter()
                .take(limit)
                .map(|e| format_entry(e, &wallet.address, &manager.config.ticker))
                .collect();
            Ok(lines.join("\n"))
        }
        Commands::Logout => {
            manager.logout()?;
            Ok("Logged out".to_string())
        }
    }
}

fn ensure_replaceable(manager: &WalletManager, force: bool) -> Result<()> {
    if !force {
        if let Some(existing) = manager.active_wallet()? {
            bail!(
                "wallet {} is already active; pass --force to replace it",
                existing.short_address()
            );
        }
    }
    Ok(())
}

fn read_private_key() -> Result<SecretString> {
    if let Ok(key) = std::env::var("VEL_PRIVATE_KEY") {
        return Ok(SecretString::new(key));
    }
    let mut line = SecretString::new(String::new());
    std::io::stdin().lock().read_line(&mut line).context("failed to read private key")?;
    Ok(line)
}

/// One history line: time, direction, amount, counterparty, id, status.
pub fn format_entry(entry: &LedgerEntry, address: &str, ticker: &str) -> String {
    let when = entry
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let (arrow, counterparty) = if entry.is_outgoing(address) {
        ("->", &entry.destinatario)
    } else {
        ("<-", &entry.remitente)
    };
    let status = match entry.status {
        EntryStatus::Confirmed => "",
        EntryStatus::Pending => " (pending)",
    };
    format!(
        "{}  {} {} {} {}  {}{}",
        when,
        arrow,
        entry.monto,
        ticker,
        short_id(counterparty, 8, 6),
        &entry.tx_hash,
        status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Amount;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from(["vel-wallet", "send", "--to", "bob", "--amount", "2.5"]).unwrap();
        match cli.command {
            Commands::Send { to, amount } => {
                assert_eq!(to, "bob");
                assert_eq!(amount, "2.5");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_scheme_and_global_node() {
        let cli = Cli::try_parse_from([
            "vel-wallet",
            "create",
            "--scheme",
            "hash_chain",
            "--node",
            "http://localhost:5000",
        ])
        .unwrap();
        assert_eq!(cli.node.as_deref(), Some("http://localhost:5000"));
        assert!(matches!(cli.command, Commands::Create { scheme: Some(SchemeId::HashChain), force: false }));
        assert!(Cli::try_parse_from(["vel-wallet", "create", "--scheme", "rsa"]).is_err());
    }

    #[test]
    fn test_format_entry() {
        let entry = LedgerEntry {
            remitente: "A".into(),
            destinatario: "0123456789abcdef0123".into(),
            monto: Amount::from(10),
            nonce: None,
            public_key: String::new(),
            signature: String::new(),
            tx_hash: "7f6e20b62405093d".into(),
            block_hash: None,
            timestamp: Utc.timestamp_opt(0, 0).single(),
            status: EntryStatus::Pending,
            node_tx_hash: None,
        };
        assert_eq!(
            format_entry(&entry, "A", "VLC"),
            "1970-01-01 00:00  -> 10.0 VLC 01234567...ef0123  7f6e20b62405093d (pending)"
        );
    }
}
