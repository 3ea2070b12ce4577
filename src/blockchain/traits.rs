use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::domain::Amount;
use crate::core::errors::WalletError;
use crate::core::transaction_builder::SignedTransaction;

/// Balance as reported by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Node-side fiat estimate, when the node offers one.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub usd_value: Option<Decimal>,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmitReceipt {
    /// Node-assigned transaction id (`/transfer` only).
    pub tx_hash: Option<String>,
}

/// Outcome of a mining trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum MineOutcome {
    Mined { index: u64 },
    /// The node answered but did not report a new block.
    Pending,
}

/// A transaction as listed inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTransaction {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    #[serde(default, deserialize_with = "nonce_text")]
    pub nonce: Option<String>,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock")]
pub struct Block {
    pub transactions: Vec<BlockTransaction>,
    pub block_hash: String,
    pub timestamp: Option<DateTime<Utc>>,
}

// Nodes name the block id `block_hash`, `hash`, or both; `block_hash` wins.
#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    transactions: Vec<BlockTransaction>,
    #[serde(default)]
    block_hash: Option<String>,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default, deserialize_with = "block_time")]
    timestamp: Option<DateTime<Utc>>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let block_hash = raw
            .block_hash
            .filter(|h| !h.is_empty())
            .or(raw.hash)
            .unwrap_or_default();
        Self { transactions: raw.transactions, block_hash, timestamp: raw.timestamp }
    }
}

/// Remote ledger operations used by the wallet engine.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Retrieves the balance of a given address.
    async fn get_balance(&self, address: &str) -> Result<BalanceReport, WalletError>;

    /// Submits a signed transaction to the endpoint matching its scheme.
    async fn submit(&self, tx: &SignedTransaction) -> Result<SubmitReceipt, WalletError>;

    /// Lists the full chain, oldest block first.
    ///
    /// Returns `BlocksUnsupported` when the node does not expose block listing.
    async fn get_blocks(&self) -> Result<Vec<Block>, WalletError>;

    /// Asks the node to mine pending transactions.
    async fn mine(&self) -> Result<MineOutcome, WalletError>;

    /// Human-readable node location for logs.
    fn endpoint(&self) -> &str;
}

// Nonces arrive as JSON numbers from some nodes and strings from others.
fn nonce_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

// Unix seconds (integer or fractional) or an RFC 3339 string.
fn block_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().and_then(|secs| {
            let whole = secs.trunc() as i64;
            let nanos = ((secs - secs.trunc()) * 1e9) as u32;
            Utc.timestamp_opt(whole, nanos).single()
        }),
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| s.parse::<f64>().ok().and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())),
        _ => None,
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_accepts_numeric_nonce_and_float_time() {
        let raw = r#"{
            "transactions": [{"from":"a","to":"b","amount":10,"nonce":5,"public_key":"p","signature":"s"}],
            "hash": "abc",
            "timestamp": 1700000000.5
        }"#;
        let block: Block = serde_json::from_str(raw).unwrap();
        assert_eq!(block.block_hash, "abc");
        assert_eq!(block.transactions[0].nonce.as_deref(), Some("5"));
        assert_eq!(block.transactions[0].amount.canonical(), "10.0");
        assert_eq!(block.timestamp.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_block_tolerates_missing_fields() {
        let raw = r#"{"transactions":[{"from":"a","to":"b","amount":"1.5"}],"block_hash":"h","timestamp":"2024-01-02T03:04:05Z"}"#;
        let block: Block = serde_json::from_str(raw).unwrap();
        let tx = &block.transactions[0];
        assert_eq!(tx.nonce, None);
        assert!(tx.signature.is_empty());
        assert_eq!(block.timestamp.unwrap().to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_block_with_both_hash_names_prefers_block_hash() {
        let raw = r#"{"transactions": [], "hash": "short", "block_hash": "full", "timestamp": 1}"#;
        let block: Block = serde_json::from_str(raw).unwrap();
        assert_eq!(block.block_hash, "full");

        let raw = r#"{"transactions": [], "hash": "only", "block_hash": ""}"#;
        let block: Block = serde_json::from_str(raw).unwrap();
        assert_eq!(block.block_hash, "only");

        let blocks: Vec<Block> = serde_json::from_str(
            r#"[{"hash": "a", "block_hash": "a"}, {"block_hash": "b"}]"#,
        )
        .unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_balance_report_optional_usd() {
        let r: BalanceReport = serde_json::from_str(r#"{"balance": 12.5}"#).unwrap();
        assert_eq!(r.usd_value, None);
        let r: BalanceReport = serde_json::from_str(r#"{"balance": 1, "usd_value": 3.25}"#).unwrap();
        assert_eq!(r.usd_value, Some(Decimal::new(325, 2)));
    }
}
