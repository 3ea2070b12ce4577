//! History reconciliation
//!
//! The node's block list is the source of truth. Each pass rebuilds the
//! wallet's ledger view from scratch:
//!
//! 1. keep transactions where the wallet is sender or recipient
//! 2. derive `tx_hash` from `(from, to, amount, nonce)`
//! 3. stamp with the enclosing block's hash and time
//! 4. drop repeats of an already seen transaction
//! 5. newest block first, intra-block order preserved
//!
//! Locally logged submissions that no block contains yet are overlaid as
//! `Pending` entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::blockchain::traits::{Block, BlockTransaction};
use crate::core::domain::Amount;
use crate::crypto::hash::sha256_hex_prefix;
use crate::storage::HistoryRecord;

/// Width of a derived transaction id, in hex characters.
pub const TX_HASH_LEN: usize = 16;

/// `sha256(from ++ to ++ amount ++ nonce)[..16]`; an absent nonce hashes as empty.
pub fn tx_hash(from: &str, to: &str, amount: Amount, nonce: Option<&str>) -> String {
    let preimage = format!("{}{}{}{}", from, to, amount.canonical(), nonce.unwrap_or(""));
    sha256_hex_prefix(&preimage, TX_HASH_LEN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Found in a block.
    Confirmed,
    /// Submitted from this device, not yet seen in any block.
    Pending,
}

/// One row of the wallet's reconciled history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub remitente: String,
    pub destinatario: String,
    pub monto: Amount,
    pub nonce: Option<String>,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub signature: String,
    pub tx_hash: String,
    pub block_hash: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    /// Id the node assigned on submission, for locally logged entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_tx_hash: Option<String>,
}

impl LedgerEntry {
    fn confirmed(tx: &BlockTransaction, block: &Block) -> Self {
        Self {
            remitente: tx.from.clone(),
            destinatario: tx.to.clone(),
            monto: tx.amount,
            nonce: tx.nonce.clone(),
            public_key: tx.public_key.clone(),
            signature: tx.signature.clone(),
            tx_hash: tx_hash(&tx.from, &tx.to, tx.amount, tx.nonce.as_deref()),
            block_hash: Some(block.block_hash.clone()).filter(|h| !h.is_empty()),
            timestamp: block.timestamp,
            status: EntryStatus::Confirmed,
            node_tx_hash: None,
        }
    }

    fn pending(record: &HistoryRecord) -> Self {
        Self {
            remitente: record.from.clone(),
            destinatario: record.to.clone(),
            monto: record.amount,
            nonce: None,
            public_key: String::new(),
            signature: String::new(),
            tx_hash: tx_hash(&record.from, &record.to, record.amount, None),
            block_hash: None,
            timestamp: Some(record.timestamp),
            status: EntryStatus::Pending,
            node_tx_hash: Some(record.tx_hash.clone()).filter(|h| !h.is_empty()),
        }
    }

    /// Whether `address` sent this transaction.
    pub fn is_outgoing(&self, address: &str) -> bool {
        self.remitente == address
    }
}

fn touches(address: &str, from: &str, to: &str) -> bool {
    from == address || to == address
}

/// Stateless ledger reconstruction over a block list.
pub struct HistoryReconciler;

impl HistoryReconciler {
    /// Ledger entries for `address`, newest block first.
    ///
    /// Blocks are expected oldest first, as the node lists them. When the same
    /// transaction (`tx_hash` and signature) appears in several blocks, only the
    /// earliest block's copy is kept. An empty address matches nothing.
    pub fn reconcile(address: &str, blocks: &[Block]) -> Vec<LedgerEntry> {
        if address.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut groups: Vec<Vec<LedgerEntry>> = Vec::with_capacity(blocks.len());

        for block in blocks {
            let mut group = Vec::new();
            for tx in block.transactions.iter().filter(|tx| touches(address, &tx.from, &tx.to)) {
                let entry = LedgerEntry::confirmed(tx, block);
                if !seen.insert((entry.tx_hash.clone(), entry.signature.clone())) {
                    debug!(tx_hash = %entry.tx_hash, block = %block.block_hash, "Skipping repeated transaction");
                    continue;
                }
                group.push(entry);
            }
            groups.push(group);
        }

        groups.into_iter().rev().flatten().collect()
    }

    /// [`reconcile`](Self::reconcile) with unconfirmed local submissions on top.
    ///
    /// Each confirmed entry absorbs at most one pending record with the same
    /// `(from, to, amount)`, oldest record first. Remaining records are
    /// prepended as `Pending`, newest first.
    pub fn reconcile_with_pending(
        address: &str,
        blocks: &[Block],
        pending: &[HistoryRecord],
    ) -> Vec<LedgerEntry> {
        if address.is_empty() {
            return Vec::new();
        }
        let confirmed = Self::reconcile(address, blocks);

        let mut available: HashMap<&str, usize> = HashMap::new();
        for entry in &confirmed {
            *available.entry(entry.tx_hash.as_str()).or_insert(0) += 1;
        }

        let mut unseen = Vec::new();
        for record in pending.iter().filter(|r| touches(address, &r.from, &r.to)) {
            let entry = LedgerEntry::pending(record);
            match available.get_mut(entry.tx_hash.as_str()) {
                Some(count) if *count > 0 => *count -= 1,
                _ => unseen.push(entry),
            }
        }

        debug!(confirmed = confirmed.len(), pending = unseen.len(), "History reconciled");
        unseen.into_iter().rev().chain(confirmed).collect()
    }

    /// Ledger built from the local log alone, newest first.
    ///
    /// Used when the node does not list blocks; every entry is `Pending`.
    pub fn from_local_log(address: &str, records: &[HistoryRecord]) -> Vec<LedgerEntry> {
        if address.is_empty() {
            return Vec::new();
        }
        records
            .iter()
            .rev()
            .filter(|r| touches(address, &r.from, &r.to))
            .map(LedgerEntry::pending)
            .collect()
    }
}
