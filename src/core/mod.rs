pub mod config;
pub mod domain;
pub mod errors;
pub mod nonce;
pub mod reconciler;
pub mod transaction_builder;
pub mod wallet_manager;

pub use domain::{Amount, SchemeId, Wallet};
pub use errors::WalletError;
pub use wallet_manager::WalletManager;
