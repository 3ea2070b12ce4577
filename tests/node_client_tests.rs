//! tests/node_client_tests.rs
//!
//! `HttpNodeClient` against a mocked VelCoin node:
//! - balance parsing and failure mapping
//! - `/transfer` and `/send` submission outcomes
//! - block listing and the unsupported-listing signal
//! - mine outcomes

use httpmock::{Method, MockServer};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;

use vel_wallet::blockchain::traits::{MineOutcome, NodeClient};
use vel_wallet::blockchain::HttpNodeClient;
use vel_wallet::core::domain::Amount;
use vel_wallet::core::nonce::FixedNonce;
use vel_wallet::core::transaction_builder::TransactionBuilder;
use vel_wallet::crypto::scheme::{AsymmetricScheme, HashChainScheme, KeyScheme};
use vel_wallet::WalletError;

fn client(server: &MockServer) -> HttpNodeClient {
    HttpNodeClient::new(&server.base_url(), Duration::from_secs(2)).unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn test_get_balance_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/balance/abc123");
            then.status(200).json_body(json!({"balance": 42.5, "usd_value": 8.5}));
        })
        .await;

    let report = client(&server).get_balance("abc123").await.unwrap();
    mock.assert_async().await;
    assert_eq!(report.balance, Decimal::new(425, 1));
    assert_eq!(report.usd_value, Some(Decimal::new(85, 1)));
}

#[tokio::test(flavor = "current_thread")]
async fn test_get_balance_server_error_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/balance/abc");
            then.status(500).body("boom");
        })
        .await;

    let err = client(&server).get_balance("abc").await.unwrap_err();
    assert!(matches!(err, WalletError::NodeUnavailable(_)), "{:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test(flavor = "current_thread")]
async fn test_get_balance_malformed_body_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/balance/abc");
            then.status(200).body("<html>not json</html>");
        })
        .await;

    let err = client(&server).get_balance("abc").await.unwrap_err();
    assert!(matches!(err, WalletError::NodeUnavailable(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn test_timeout_is_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/balance/slow");
            then.status(200).delay(Duration::from_secs(3)).json_body(json!({"balance": 1}));
        })
        .await;

    let client = HttpNodeClient::new(&server.base_url(), Duration::from_millis(300)).unwrap();
    let err = client.get_balance("slow").await.unwrap_err();
    assert!(matches!(err, WalletError::NodeUnavailable(_)), "{:?}", err);
}

#[tokio::test(flavor = "current_thread")]
async fn test_transfer_success_returns_node_tx_hash() {
    let server = MockServer::start_async().await;
    let wallet = AsymmetricScheme.generate().unwrap();
    let nonce = FixedNonce(1);
    let tx = TransactionBuilder::new(&nonce).build(Some(&wallet), "bob", Amount::from(3)).unwrap();

    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST)
                .path("/transfer")
                .json_body_partial(r#"{"to": "bob", "amount": 3.0}"#);
            then.status(200).json_body(json!({"status": "success", "tx_hash": "deadbeefcafebabe00"}));
        })
        .await;

    let receipt = client(&server).submit(&tx).await.unwrap();
    mock.assert_async().await;
    assert_eq!(receipt.tx_hash.as_deref(), Some("deadbeefcafebabe00"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_transfer_error_message_is_verbatim() {
    let server = MockServer::start_async().await;
    let wallet = AsymmetricScheme.generate().unwrap();
    let nonce = FixedNonce(1);
    let tx = TransactionBuilder::new(&nonce).build(Some(&wallet), "bob", Amount::from(3)).unwrap();

    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/transfer");
            then.status(400).json_body(json!({"error": "Saldo insuficiente"}));
        })
        .await;

    match client(&server).submit(&tx).await {
        Err(WalletError::TransactionRejected(msg)) => assert_eq!(msg, "Saldo insuficiente"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_transfer_without_success_status_is_not_accepted() {
    let server = MockServer::start_async().await;
    let wallet = AsymmetricScheme.generate().unwrap();
    let nonce = FixedNonce(1);
    let tx = TransactionBuilder::new(&nonce).build(Some(&wallet), "bob", Amount::from(3)).unwrap();

    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/transfer");
            then.status(200).json_body(json!({"status": "queued"}));
        })
        .await;

    assert!(client(&server).submit(&tx).await.is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn test_send_accepted() {
    let server = MockServer::start_async().await;
    let wallet = HashChainScheme.import(&"aa".repeat(32), None).unwrap();
    let nonce = FixedNonce(5);
    let tx = TransactionBuilder::new(&nonce)
        .build(Some(&wallet), "recipient", Amount::from(10))
        .unwrap();

    let mock = server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/send").json_body_partial(
                r#"{"nonce": 5, "public_key": "ffe054fe7ae0cb6dc65c3af9b61d5209f439851db43d0ba5997337df154668eb"}"#,
            );
            then.status(200).json_body(json!({"accepted": true}));
        })
        .await;

    let receipt = client(&server).submit(&tx).await.unwrap();
    mock.assert_async().await;
    assert_eq!(receipt.tx_hash, None);
}

#[tokio::test(flavor = "current_thread")]
async fn test_send_not_accepted_is_rejection() {
    let server = MockServer::start_async().await;
    let wallet = HashChainScheme.generate().unwrap();
    let nonce = FixedNonce(5);
    let tx = TransactionBuilder::new(&nonce).build(Some(&wallet), "r", Amount::from(1)).unwrap();

    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/send");
            then.status(200).json_body(json!({"accepted": false, "error": "Firma inválida"}));
        })
        .await;

    match client(&server).submit(&tx).await {
        Err(WalletError::TransactionRejected(msg)) => assert_eq!(msg, "Firma inválida"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_get_blocks_parses_chain() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/blocks");
            then.status(200).json_body(json!([
                {"transactions": [], "block_hash": "genesis", "timestamp": 1700000000},
                {"transactions": [
                    {"from": "A", "to": "B", "amount": 10, "nonce": 5, "public_key": "p", "signature": "s"}
                ], "block_hash": "h1", "timestamp": 1700000100.25}
            ]));
        })
        .await;

    let blocks = client(&server).get_blocks().await.unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].transactions[0].nonce.as_deref(), Some("5"));
}

#[tokio::test(flavor = "current_thread")]
async fn test_get_blocks_not_found_is_unsupported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/blocks");
            then.status(404);
        })
        .await;

    let err = client(&server).get_blocks().await.unwrap_err();
    assert!(matches!(err, WalletError::BlocksUnsupported));
}

#[tokio::test(flavor = "current_thread")]
async fn test_mine_outcomes() {
    let server = MockServer::start_async().await;
    let mut mined = server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/mine");
            then.status(200).json_body(json!({"index": 7, "hash": "x"}));
        })
        .await;

    assert_eq!(client(&server).mine().await.unwrap(), MineOutcome::Mined { index: 7 });
    mined.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(Method::POST).path("/mine");
            then.status(200).json_body(json!({"message": "No transactions to mine"}));
        })
        .await;
    assert_eq!(client(&server).mine().await.unwrap(), MineOutcome::Pending);
}

#[tokio::test(flavor = "current_thread")]
async fn test_unreachable_node_is_unavailable() {
    // Nothing listens on port 9 on CI hosts.
    let client = HttpNodeClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let err = client.mine().await.unwrap_err();
    assert!(matches!(err, WalletError::NodeUnavailable(_)));
}
