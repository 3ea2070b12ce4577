//! HTTP client for a VelCoin node.
//!
//! Every request runs under the client-wide timeout; transport failures,
//! timeouts, unexpected statuses and unreadable bodies all surface as
//! `NodeUnavailable`. Structured rejections from the node are passed through
//! verbatim as `TransactionRejected`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::traits::{BalanceReport, Block, MineOutcome, NodeClient, SubmitReceipt};
use crate::core::errors::WalletError;
use crate::core::transaction_builder::SignedTransaction;
use crate::security::redaction::truncate_body;

const BODY_PREVIEW: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpNodeClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlockList {
    Bare(Vec<Block>),
    Wrapped { chain: Vec<Block> },
}

impl HttpNodeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WalletError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed).map_err(|e| {
            WalletError::ConfigError(format!("Invalid node URL '{}': {}", trimmed, e))
        })?;

        // Short timeout; honor proxy environment variables.
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
            if let Ok(p) = reqwest::Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }
        let client = builder
            .build()
            .map_err(|e| WalletError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        info!("Using VelCoin node at {}", parsed);
        Ok(Self { base_url: trimmed.to_string(), client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads the status and body, parsing the body as JSON when possible.
    async fn read(
        resp: reqwest::Response,
    ) -> Result<(StatusCode, String, Option<serde_json::Value>), WalletError> {
        let status = resp.status();
        let text = resp.text().await?;
        let json = serde_json::from_str::<serde_json::Value>(&text).ok();
        Ok((status, text, json))
    }

    fn unavailable(path: &str, status: StatusCode, body: &str) -> WalletError {
        WalletError::NodeUnavailable(format!(
            "{} returned {}: {}",
            path,
            status,
            truncate_body(body, BODY_PREVIEW)
        ))
    }

    fn error_message(json: &Option<serde_json::Value>) -> Option<String> {
        let value = json.as_ref()?.get("error")?;
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn get_balance(&self, address: &str) -> Result<BalanceReport, WalletError> {
        let path = format!("/balance/{}", address);
        debug!(address = %address, "Querying balance");
        let resp = self.client.get(self.url(&path)).send().await?;
        let (status, text, _) = Self::read(resp).await?;
        if !status.is_success() {
            return Err(Self::unavailable(&path, status, &text));
        }
        serde_json::from_str::<BalanceReport>(&text).map_err(|e| {
            WalletError::NodeUnavailable(format!("malformed balance response: {}", e))
        })
    }

    async fn submit(&self, tx: &SignedTransaction) -> Result<SubmitReceipt, WalletError> {
        let path = tx.endpoint();
        info!(from = %tx.from(), to = %tx.to(), amount = %tx.amount(), endpoint = path, "Submitting transaction");

        let resp = self.client.post(self.url(path)).json(&tx.wire_body()).send().await?;
        let (status, text, json) = Self::read(resp).await?;

        if let Some(message) = Self::error_message(&json) {
            warn!(endpoint = path, status = %status, "Node rejected transaction: {}", message);
            return Err(WalletError::TransactionRejected(message));
        }
        if !status.is_success() {
            return Err(Self::unavailable(path, status, &text));
        }

        let body = json.ok_or_else(|| {
            WalletError::NodeUnavailable(format!(
                "{} returned a non-JSON body: {}",
                path,
                truncate_body(&text, BODY_PREVIEW)
            ))
        })?;

        match tx.nonce() {
            // `/send` answers with an acceptance flag.
            Some(_) => match body.get("accepted").and_then(|v| v.as_bool()) {
                Some(true) => Ok(SubmitReceipt::default()),
                Some(false) => Err(WalletError::TransactionRejected(
                    "transaction not accepted by node".into(),
                )),
                None => Err(Self::unavailable(path, status, &text)),
            },
            // `/transfer` answers with a status and the node's tx id.
            None => {
                if body.get("status").and_then(|v| v.as_str()) == Some("success") {
                    let tx_hash = body.get("tx_hash").and_then(|v| v.as_str()).map(str::to_string);
                    info!(tx_hash = ?tx_hash, "Transfer accepted");
                    Ok(SubmitReceipt { tx_hash })
                } else {
                    Err(Self::unavailable(path, status, &text))
                }
            }
        }
    }

    async fn get_blocks(&self) -> Result<Vec<Block>, WalletError> {
        let resp = self.client.get(self.url("/blocks")).send().await?;
        let (status, text, _) = Self::read(resp).await?;

        if matches!(
            status,
            StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            debug!(status = %status, "Node does not list blocks");
            return Err(WalletError::BlocksUnsupported);
        }
        if !status.is_success() {
            return Err(Self::unavailable("/blocks", status, &text));
        }

        let blocks = match serde_json::from_str::<BlockList>(&text) {
            Ok(BlockList::Bare(blocks)) | Ok(BlockList::Wrapped { chain: blocks }) => blocks,
            Err(e) => {
                return Err(WalletError::NodeUnavailable(format!("malformed block list: {}", e)))
            }
        };
        debug!(count = blocks.len(), "Fetched blocks");
        Ok(blocks)
    }

    async fn mine(&self) -> Result<MineOutcome, WalletError> {
        let resp = self.client.post(self.url("/mine")).send().await?;
        let (status, _, json) = Self::read(resp).await?;

        let index = json.as_ref().and_then(|v| v.get("index")).and_then(|v| v.as_u64());
        match index {
            Some(index) => {
                info!(index, "Block mined");
                Ok(MineOutcome::Mined { index })
            }
            None => {
                debug!(status = %status, "Mine request returned no block index");
                Ok(MineOutcome::Pending)
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}
