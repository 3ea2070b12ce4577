// src/lib.rs

pub mod blockchain;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod security;
pub mod storage;

pub use crate::core::{Amount, SchemeId, Wallet, WalletError, WalletManager};
