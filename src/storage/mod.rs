//! Wallet persistence
//!
//! One active wallet record per store, an append-only log of self-submitted
//! transfers and a disposable cache of the last reconciled ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::core::domain::{Amount, SchemeId, Wallet};
use crate::core::errors::WalletError;
use crate::core::reconciler::LedgerEntry;
use crate::crypto::scheme::scheme_for;

mod file;
mod memory;

pub use file::FileWalletStore;
pub use memory::MemoryWalletStore;

/// Persisted form of the active wallet.
///
/// `pub`/`priv` are accepted as aliases for records written by older clients;
/// a record without `scheme` belongs to the configured default scheme.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct WalletRecord {
    #[zeroize(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<SchemeId>,
    pub address: String,
    #[serde(alias = "pub")]
    pub public_key: String,
    #[serde(alias = "priv")]
    pub private_key: String,
}

impl WalletRecord {
    pub fn from_wallet(wallet: &Wallet) -> Self {
        Self {
            scheme: Some(wallet.scheme),
            address: wallet.address.clone(),
            public_key: wallet.public_key.clone(),
            private_key: wallet.private_key().to_string(),
        }
    }

    /// Rebuilds the wallet, checking the stored public key against the private key.
    pub fn to_wallet(&self, default_scheme: SchemeId) -> Result<Wallet, WalletError> {
        let scheme = self.scheme.unwrap_or(default_scheme);
        let derived = scheme_for(scheme).derive_public(&self.private_key).map_err(|e| {
            WalletError::StorageError(format!("stored private key is unusable: {}", e))
        })?;
        if !derived.eq_ignore_ascii_case(&self.public_key) {
            return Err(WalletError::StorageError(format!(
                "stored public key does not match private key under scheme {}",
                scheme
            )));
        }
        if self.address.trim().is_empty() {
            return Err(WalletError::StorageError("stored wallet has no address".into()));
        }
        Ok(Wallet::from_parts(
            scheme,
            Zeroizing::new(self.private_key.clone()),
            derived,
            self.address.clone(),
        ))
    }
}

impl std::fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRecord")
            .field("scheme", &self.scheme)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &crate::security::redact_key(&self.private_key))
            .finish()
    }
}

/// One line of the local submission log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Id returned by the node on submission.
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

/// Storage contract for the wallet engine.
pub trait WalletStore: Send + Sync {
    fn load_wallet(&self) -> Result<Option<WalletRecord>, WalletError>;

    /// Replaces the active wallet record.
    fn save_wallet(&self, record: &WalletRecord) -> Result<(), WalletError>;

    fn clear_wallet(&self) -> Result<(), WalletError>;

    /// Appends to the local log. Existing records are never rewritten.
    fn append_history(&self, record: &HistoryRecord) -> Result<(), WalletError>;

    /// Every logged record, oldest first.
    fn load_history(&self) -> Result<Vec<HistoryRecord>, WalletError>;

    /// Overwrites the ledger cache with the result of a completed reconciliation.
    fn save_ledger_cache(&self, entries: &[LedgerEntry]) -> Result<(), WalletError>;

    fn load_ledger_cache(&self) -> Result<Vec<LedgerEntry>, WalletError>;

    fn clear_ledger_cache(&self) -> Result<(), WalletError>;
}

/// Parses JSON-lines history, skipping lines that do not decode.
pub(crate) fn parse_history_lines(text: &str) -> Vec<HistoryRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str::<HistoryRecord>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(line = n + 1, "Skipping unreadable history record: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::scheme::{HashChainScheme, KeyScheme};

    #[test]
    fn test_record_accepts_short_aliases() {
        let wallet = HashChainScheme.import(&"aa".repeat(32), None).unwrap();
        let raw = serde_json::json!({
            "address": wallet.address,
            "pub": wallet.public_key,
            "priv": "aa".repeat(32),
        });
        let record: WalletRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.scheme, None);
        let restored = record.to_wallet(SchemeId::HashChain).unwrap();
        assert_eq!(restored, wallet);
    }

    #[test]
    fn test_record_rejects_mismatched_public_key() {
        let wallet = HashChainScheme.generate().unwrap();
        let mut record = WalletRecord::from_wallet(&wallet);
        record.public_key = "00".repeat(32);
        assert!(matches!(record.to_wallet(SchemeId::Asymmetric), Err(WalletError::StorageError(_))));
    }

    #[test]
    fn test_record_debug_redacts() {
        let wallet = HashChainScheme.import(&"bb".repeat(32), None).unwrap();
        let dbg = format!("{:?}", WalletRecord::from_wallet(&wallet));
        assert!(!dbg.contains(&"bb".repeat(32)));
    }

    #[test]
    fn test_history_lines_skip_garbage() {
        let text = "{\"tx_hash\":\"t1\",\"from\":\"a\",\"to\":\"b\",\"amount\":1.5,\"timestamp\":1700000000}\nnot json\n\n";
        let records = parse_history_lines(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount.canonical(), "1.5");
    }
}
