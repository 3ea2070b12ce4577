use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{parse_history_lines, HistoryRecord, WalletRecord, WalletStore};
use crate::core::config::StorageConfig;
use crate::core::errors::WalletError;
use crate::core::reconciler::LedgerEntry;

/// JSON files under a data directory:
/// - wallet record (`wallet.json`), owner-only permissions on unix
/// - append-only submission log (`history.jsonl`), one record per line
/// - ledger cache (`ledger_cache.json`)
#[derive(Debug, Clone)]
pub struct FileWalletStore {
    wallet_path: PathBuf,
    history_path: PathBuf,
    ledger_cache_path: PathBuf,
}

impl FileWalletStore {
    /// Store with the default file names under `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, WalletError> {
        Self::from_config(&StorageConfig {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..StorageConfig::default()
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, WalletError> {
        fs::create_dir_all(&config.data_dir).map_err(|e| {
            WalletError::StorageError(format!(
                "cannot create data directory {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;
        debug!(dir = %config.data_dir.display(), "File wallet store ready");
        Ok(Self {
            wallet_path: config.data_dir.join(&config.wallet_file),
            history_path: config.data_dir.join(&config.history_file),
            ledger_cache_path: config.data_dir.join(&config.ledger_cache_file),
        })
    }

    pub fn wallet_path(&self) -> &Path {
        &self.wallet_path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Writes via a sibling temp file and rename so readers never see a torn file.
    fn write_atomic(path: &Path, bytes: &[u8], private: bool) -> Result<(), WalletError> {
        let tmp = path.with_extension("tmp");
        {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true);
            restrict_permissions(&mut options, private);
            let mut file = options.open(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn read_optional(path: &Path) -> Result<Option<String>, WalletError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WalletError::StorageError(format!("{}: {}", path.display(), e))),
        }
    }

    fn remove_optional(path: &Path) -> Result<(), WalletError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WalletError::StorageError(format!("{}: {}", path.display(), e))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(options: &mut OpenOptions, private: bool) {
    use std::os::unix::fs::OpenOptionsExt;
    if private {
        options.mode(0o600);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_options: &mut OpenOptions, _private: bool) {}

impl WalletStore for FileWalletStore {
    fn load_wallet(&self) -> Result<Option<WalletRecord>, WalletError> {
        match Self::read_optional(&self.wallet_path)? {
            Some(text) if !text.trim().is_empty() => Ok(Some(serde_json::from_str(&text)?)),
            _ => Ok(None),
        }
    }

    fn save_wallet(&self, record: &WalletRecord) -> Result<(), WalletError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        Self::write_atomic(&self.wallet_path, &bytes, true)?;
        info!(address = %record.address, "Wallet record saved");
        Ok(())
    }

    fn clear_wallet(&self) -> Result<(), WalletError> {
        Self::remove_optional(&self.wallet_path)
    }

    fn append_history(&self, record: &HistoryRecord) -> Result<(), WalletError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.history_path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>, WalletError> {
        Ok(Self::read_optional(&self.history_path)?
            .map(|text| parse_history_lines(&text))
            .unwrap_or_default())
    }

    fn save_ledger_cache(&self, entries: &[LedgerEntry]) -> Result<(), WalletError> {
        let bytes = serde_json::to_vec(entries)?;
        Self::write_atomic(&self.ledger_cache_path, &bytes, false)
    }

    fn load_ledger_cache(&self) -> Result<Vec<LedgerEntry>, WalletError> {
        match Self::read_optional(&self.ledger_cache_path)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    fn clear_ledger_cache(&self) -> Result<(), WalletError> {
        Self::remove_optional(&self.ledger_cache_path)
    }
}
