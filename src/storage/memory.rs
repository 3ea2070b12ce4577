use parking_lot::Mutex;

use super::{HistoryRecord, WalletRecord, WalletStore};
use crate::core::errors::WalletError;
use crate::core::reconciler::LedgerEntry;

/// In-process store for tests and embedding.
#[derive(Default)]
pub struct MemoryWalletStore {
    wallet: Mutex<Option<WalletRecord>>,
    history: Mutex<Vec<HistoryRecord>>,
    ledger_cache: Mutex<Vec<LedgerEntry>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryWalletStore {
    fn load_wallet(&self) -> Result<Option<WalletRecord>, WalletError> {
        Ok(self.wallet.lock().clone())
    }

    fn save_wallet(&self, record: &WalletRecord) -> Result<(), WalletError> {
        *self.wallet.lock() = Some(record.clone());
        Ok(())
    }

    fn clear_wallet(&self) -> Result<(), WalletError> {
        self.wallet.lock().take();
        Ok(())
    }

    fn append_history(&self, record: &HistoryRecord) -> Result<(), WalletError> {
        self.history.lock().push(record.clone());
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>, WalletError> {
        Ok(self.history.lock().clone())
    }

    fn save_ledger_cache(&self, entries: &[LedgerEntry]) -> Result<(), WalletError> {
        *self.ledger_cache.lock() = entries.to_vec();
        Ok(())
    }

    fn load_ledger_cache(&self) -> Result<Vec<LedgerEntry>, WalletError> {
        Ok(self.ledger_cache.lock().clone())
    }

    fn clear_ledger_cache(&self) -> Result<(), WalletError> {
        self.ledger_cache.lock().clear();
        Ok(())
    }
}
