//! Tradier adapter tests against a mock REST server.
//!
//! Verifies envelope normalization, request shapes and status mapping.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calendar_engine::application::ports::{
    BrokerError, BrokerPort, MarketDataError, MarketDataPort, SessionError, StreamSessionPort,
};
use calendar_engine::domain::streaming::StreamKind;
use calendar_engine::{TradierAdapter, TradierConfig, TradierEnvironment};

fn adapter(server: &MockServer) -> TradierAdapter {
    let config = TradierConfig::new("test-token", TradierEnvironment::Sandbox)
        .with_api_base_url(server.uri());
    TradierAdapter::new(&config).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn expirations_accept_single_date_and_sort() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/options/expirations"))
        .and(query_param("symbol", "SPY"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expirations": {"date": ["2024-01-19", "2024-01-17"]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/options/expirations"))
        .and(query_param("symbol", "XSP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expirations": {"date": "2024-01-17"}
        })))
        .mount(&server)
        .await;

    let adapter = adapter(&server);
    assert_eq!(
        adapter.get_expirations("SPY").await.unwrap(),
        vec![date(2024, 1, 17), date(2024, 1, 19)]
    );
    assert_eq!(
        adapter.get_expirations("XSP").await.unwrap(),
        vec![date(2024, 1, 17)]
    );
}

#[tokio::test]
async fn null_collections_are_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/options/strikes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"strikes": null})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/accounts/VA000001/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"positions": "null"})))
        .mount(&server)
        .await;

    let adapter = adapter(&server);
    assert!(
        adapter
            .get_strikes("SPY", date(2024, 1, 19))
            .await
            .unwrap()
            .is_empty()
    );
    assert!(adapter.get_positions("VA000001").await.unwrap().is_empty());
}

#[tokio::test]
async fn option_chain_requests_greeks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/options/chains"))
        .and(query_param("symbol", "SPY"))
        .and(query_param("expiration", "2024-01-19"))
        .and(query_param("greeks", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "options": {"option": {
                "symbol": "SPY240119C00480000",
                "underlying": "SPY",
                "strike": 480.0,
                "expiration_date": "2024-01-19",
                "option_type": "call",
                "bid": 1.10,
                "ask": 1.15,
                "greeks": {"delta": 0.36, "theta": -0.21}
            }}
        })))
        .mount(&server)
        .await;

    let chain = adapter(&server)
        .get_option_chain("SPY", date(2024, 1, 19))
        .await
        .unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].strike(), dec!(480));
    assert_eq!(chain[0].delta(), Some(0.36));
}

#[tokio::test]
async fn long_quote_lists_are_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/markets/quotes"))
        .and(body_string_contains("symbols=S0%2CS1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quotes": {"quote": {"symbol": "S0", "last": 10.0}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let symbols: Vec<String> = (0..150).map(|i| format!("S{i}")).collect();
    let quotes = adapter(&server).get_quotes(&symbols, false).await.unwrap();
    assert_eq!(quotes.len(), 1);
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/options/expirations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Access Token"))
        .mount(&server)
        .await;

    let err = adapter(&server).get_expirations("SPY").await.unwrap_err();
    assert!(matches!(err, MarketDataError::AuthenticationFailed));
}

#[tokio::test]
async fn orders_are_listed_with_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/accounts/VA000001/orders"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "100"))
        .and(query_param("includeTags", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": {"order": [
                {"id": 1, "status": "open", "class": "multileg", "symbol": "SPY", "tag": "SPY_35D_CALL_CAL_2024-01-15"},
                {"id": 2, "status": "filled", "class": "option", "symbol": "SPY"}
            ]}
        })))
        .mount(&server)
        .await;

    let orders = adapter(&server).get_orders("VA000001").await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].tag.as_deref(), Some("SPY_35D_CALL_CAL_2024-01-15"));
}

#[tokio::test]
async fn cancel_of_unknown_order_names_it() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/accounts/VA000001/orders/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Order not found"})))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .cancel_order("VA000001", 77)
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::OrderNotFound { order_id } if order_id == "77"));
}

#[tokio::test]
async fn rejected_order_carries_reason() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/accounts/VA000001/orders/5"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": {"error": "Order is not in an open state"}
        })))
        .mount(&server)
        .await;

    let change = calendar_engine::domain::order_composition::OrderChange {
        price: Some(dec!(1.05)),
        ..Default::default()
    };
    let err = adapter(&server)
        .change_order("VA000001", 5, &change)
        .await
        .unwrap_err();
    assert!(
        matches!(err, BrokerError::OrderRejected { reason } if reason.contains("not in an open state"))
    );
}

#[tokio::test]
async fn session_is_created_for_each_feed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/markets/events/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stream": {"url": "https://stream.tradier.com/v1/markets/events", "sessionid": "m-1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts/events/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stream": {"url": "wss://x"}})))
        .mount(&server)
        .await;

    let adapter = adapter(&server);
    let session = adapter.create_session(StreamKind::Market).await.unwrap();
    assert_eq!(session.session_id(), "m-1");

    let err = adapter.create_session(StreamKind::Account).await.unwrap_err();
    assert!(matches!(err, SessionError::MalformedResponse { .. }));
}
