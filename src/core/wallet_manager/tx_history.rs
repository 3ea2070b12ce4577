//! Transaction history
//!
//! The node's block list is authoritative. A pass that completes replaces
//! the applied history wholesale; a pass that fails leaves it untouched.
//! Nodes without block listing fall back to the local submission log.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::WalletManager;
use crate::core::errors::WalletError;
use crate::core::reconciler::{HistoryReconciler, LedgerEntry};

/// History applied for one address.
pub(crate) struct AppliedHistory {
    address: String,
    entries: Arc<Vec<LedgerEntry>>,
}

impl WalletManager {
    /// Rescans the node's blocks for the active wallet.
    ///
    /// A pass that completes after the active wallet changed is returned to
    /// the caller but not applied.
    pub async fn refresh_history(&self) -> Result<Arc<Vec<LedgerEntry>>, WalletError> {
        let wallet = self.require_wallet()?;
        let local = self.store.load_history()?;

        let entries = match self.node.get_blocks().await {
            Ok(blocks) => {
                debug!(blocks = blocks.len(), "Reconciling history");
                HistoryReconciler::reconcile_with_pending(&wallet.address, &blocks, &local)
            }
            Err(WalletError::BlocksUnsupported) => {
                info!("Node does not list blocks, using local history");
                HistoryReconciler::from_local_log(&wallet.address, &local)
            }
            Err(e) => {
                warn!("History refresh failed, keeping previous view: {}", e);
                return Err(e);
            }
        };

        let entries = Arc::new(entries);
        let mut applied = self.history.write();
        let still_active = self
            .store
            .load_wallet()?
            .is_some_and(|record| record.address == wallet.address);
        if !still_active {
            info!(address = %wallet.address, "Active wallet changed during refresh, result not applied");
            return Ok(entries);
        }
        *applied = Some(AppliedHistory { address: wallet.address.clone(), entries: Arc::clone(&entries) });
        if let Err(e) = self.store.save_ledger_cache(&entries) {
            warn!("Failed to write ledger cache: {}", e);
        }
        drop(applied);
        info!(address = %wallet.address, entries = entries.len(), "History refreshed");
        Ok(entries)
    }

    /// Last applied history, falling back to the on-disk ledger cache.
    pub fn cached_history(&self) -> Result<Arc<Vec<LedgerEntry>>, WalletError> {
        let wallet = self.require_wallet()?;
        if let Some(applied) = self.history.read().as_ref() {
            if applied.address == wallet.address {
                return Ok(Arc::clone(&applied.entries));
            }
        }
        let cached: Vec<LedgerEntry> = self
            .store
            .load_ledger_cache()?
            .into_iter()
            .filter(|e| e.remitente == wallet.address || e.destinatario == wallet.address)
            .collect();
        Ok(Arc::new(cached))
    }
}
