//! tests/price_feed_tests.rs
//!
//! CoinGecko client and the three-tier fiat estimate against a mocked feed.

use httpmock::{Method, MockServer};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use vel_wallet::blockchain::price::{CoinGeckoClient, FiatEstimate, PriceEnricher, PriceFeed};

fn coin_ids() -> Vec<String> {
    vec!["velcoin".into(), "velcoin-2".into(), "vlc".into()]
}

#[tokio::test(flavor = "current_thread")]
async fn test_quote_parses_simple_price() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(Method::GET)
                .path("/api/v3/simple/price")
                .query_param("ids", "velcoin")
                .query_param("vs_currencies", "usd");
            then.status(200).json_body(json!({"velcoin": {"usd": 0.25}}));
        })
        .await;

    let feed = CoinGeckoClient::new(&server.base_url(), Duration::from_secs(2)).unwrap();
    let price = feed.quote("velcoin", "usd").await.unwrap();
    mock.assert_async().await;
    assert_eq!(price, Some(Decimal::new(25, 2)));
}

#[tokio::test(flavor = "current_thread")]
async fn test_unknown_coin_is_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v3/simple/price");
            then.status(200).json_body(json!({}));
        })
        .await;

    let feed = CoinGeckoClient::new(&server.base_url(), Duration::from_secs(2)).unwrap();
    assert_eq!(feed.quote("nope", "usd").await.unwrap(), None);
}

#[tokio::test(flavor = "current_thread")]
async fn test_enricher_skips_unlisted_ids() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v3/simple/price").query_param("ids", "velcoin");
            then.status(200).json_body(json!({}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v3/simple/price").query_param("ids", "velcoin-2");
            then.status(429).body("rate limited");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v3/simple/price").query_param("ids", "vlc");
            then.status(200).json_body(json!({"vlc": {"usd": 2.0}}));
        })
        .await;

    let feed = Arc::new(CoinGeckoClient::new(&server.base_url(), Duration::from_secs(2)).unwrap());
    let enricher = PriceEnricher::new(feed, coin_ids(), "usd");
    let estimate = enricher.enrich(Decimal::new(61728, 2), None).await;
    assert!(matches!(estimate, FiatEstimate::Quoted { ref coin_id, .. } if coin_id == "vlc"));
    assert_eq!(estimate.to_string(), "≈ $1,234.56");
}

#[tokio::test(flavor = "current_thread")]
async fn test_feed_down_without_node_estimate_is_unlisted() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET).path("/api/v3/simple/price");
            then.status(503);
        })
        .await;

    let feed = Arc::new(CoinGeckoClient::new(&server.base_url(), Duration::from_secs(2)).unwrap());
    let enricher = PriceEnricher::new(feed, coin_ids(), "usd");
    let estimate = enricher.enrich(Decimal::from(100), None).await;
    assert_eq!(estimate, FiatEstimate::Unlisted);
    assert_ne!(estimate.to_string(), "$0.00");
}
