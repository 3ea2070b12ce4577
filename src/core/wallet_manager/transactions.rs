//! Transaction operations

use chrono::Utc;
use tracing::{info, warn};

use super::WalletManager;
use crate::blockchain::traits::{MineOutcome, SubmitReceipt};
use crate::core::{
    domain::{Amount, SchemeId},
    errors::WalletError,
    reconciler::tx_hash,
    transaction_builder::{SignedTransaction, TransactionBuilder},
};
use crate::storage::HistoryRecord;

/// An accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub transaction: SignedTransaction,
    pub receipt: SubmitReceipt,
}

impl SendOutcome {
    /// The node's id if it returned one, else the locally derived id.
    pub fn tx_id(&self) -> String {
        self.receipt.tx_hash.clone().unwrap_or_else(|| {
            let tx = &self.transaction;
            let nonce = tx.nonce().map(|n| n.to_string());
            tx_hash(tx.from(), tx.to(), tx.amount(), nonce.as_deref())
        })
    }
}

impl WalletManager {
    /// Builds, signs and submits a transfer from the active wallet.
    ///
    /// Asymmetric transfers accepted by the node are appended to the local
    /// log. A failed append does not undo an accepted submission.
    ///
    /// # Errors
    /// * `NoActiveWallet`, `InvalidRecipient`, `InvalidAmount` - before signing
    /// * `TransactionRejected` - the node refused, with its message
    /// * `NodeUnavailable` - transport or protocol failure
    pub async fn send(&self, recipient: &str, amount: Amount) -> Result<SendOutcome, WalletError> {
        let wallet = self.active_wallet()?;
        let tx = TransactionBuilder::new(self.nonce_source.as_ref()).build(
            wallet.as_ref(),
            recipient,
            amount,
        )?;

        let receipt = self.node.submit(&tx).await?;
        let outcome = SendOutcome { transaction: tx, receipt };
        info!(tx_id = %outcome.tx_id(), to = %outcome.transaction.to(), "Transaction accepted");

        if outcome.transaction.scheme() == SchemeId::Asymmetric {
            let record = HistoryRecord {
                tx_hash: outcome.tx_id(),
                from: outcome.transaction.from().to_string(),
                to: outcome.transaction.to().to_string(),
                amount: outcome.transaction.amount(),
                timestamp: Utc::now(),
            };
            if let Err(e) = self.store.append_history(&record) {
                warn!(tx_hash = %record.tx_hash, "Failed to record transfer locally: {}", e);
            }
        }

        Ok(outcome)
    }

    /// [`send`](Self::send) with the amount given as user text.
    pub async fn send_str(&self, recipient: &str, amount: &str) -> Result<SendOutcome, WalletError> {
        let amount: Amount = amount.parse()?;
        self.send(recipient, amount).await
    }

    /// Asks the node to mine. A response without a block index is `Pending`.
    pub async fn mine(&self) -> Result<MineOutcome, WalletError> {
        let outcome = self.node.mine().await?;
        if let MineOutcome::Mined { index } = outcome {
            info!(index, "Node mined a block");
        }
        Ok(outcome)
    }
}
