// src/main.rs
//! VelCoin light wallet entry point
use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vel_wallet::cli::{run, Cli};
use vel_wallet::core::wallet_manager::WalletManager;
use vel_wallet::WalletError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;
    debug!("Starting vel-wallet v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.load_config()?;
    let manager = WalletManager::from_config(config)?;

    match run(cli.command, &manager).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            match e.downcast_ref::<WalletError>() {
                Some(err) if err.is_retryable() => error!("{} (retry once the node is reachable)", err),
                Some(err) if err.is_user_correctable() => error!("{} (check the input and try again)", err),
                _ => error!("{:#}", e),
            }
            Err(e)
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
