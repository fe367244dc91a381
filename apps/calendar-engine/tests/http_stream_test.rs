//! HTTP stream client against a mock chunked events endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use tokio::sync::mpsc;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calendar_engine::infrastructure::streaming::{
    HttpStreamClient, MarketSubscription, StreamConfig, StreamError, StreamEvent, StreamState,
};

const FEED: &str = concat!(
    "{\"type\":\"quote\",\"symbol\":\"SPY\",\"bid\":480.1,\"ask\":480.2}\n",
    "{\"type\":\"trade\",\"symbol\":\"Q",
    "QQ\",\"price\":410.5}\n",
    "{truncated\n",
    "\n",
    "{\"type\":\"summary\",\"symbol\":\"SPY\"}\n",
);

fn config(max_reconnect_attempts: u32) -> StreamConfig {
    StreamConfig {
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(40),
        max_reconnect_attempts,
    }
}

fn subscription() -> MarketSubscription {
    MarketSubscription::new(vec!["SPY".to_string(), "QQQ".to_string()])
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<StreamEvent>) -> StreamEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for stream event")
        .expect("event channel closed")
}

fn feed_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .set_body_string(FEED)
}

#[tokio::test]
async fn get_stream_emits_each_valid_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/events"))
        .and(query_param("sessionid", "s-1"))
        .and(query_param("symbols", "SPY,QQQ"))
        .and(header("authorization", "Bearer token"))
        .respond_with(feed_response())
        .mount(&server)
        .await;

    let (client, mut events) = HttpStreamClient::new(
        format!("{}/v1/markets/events", server.uri()),
        "token",
        subscription(),
        &config(0),
    );
    client.update_session("s-1");
    client.start().unwrap();

    assert!(matches!(next_event(&mut events).await, StreamEvent::Open));
    let mut types = Vec::new();
    loop {
        match next_event(&mut events).await {
            StreamEvent::Data(value) => types.push(value["type"].as_str().unwrap().to_string()),
            StreamEvent::Closed => break,
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(types, vec!["quote", "trade", "summary"]);

    assert!(matches!(
        next_event(&mut events).await,
        StreamEvent::Error(StreamError::ReconnectExhausted { attempts: 0 })
    ));
    assert!(!client.is_streaming());
}

#[tokio::test]
async fn post_stream_sends_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/markets/events"))
        .and(body_string_contains("sessionid=s-1"))
        .and(body_string_contains("symbols=SPY%2CQQQ"))
        .and(body_string_contains("filter=quote"))
        .respond_with(feed_response())
        .mount(&server)
        .await;

    let (client, mut events) = HttpStreamClient::new(
        format!("{}/v1/markets/events", server.uri()),
        "token",
        subscription().with_filter(vec!["quote".to_string()]),
        &config(0),
    );
    let client = client.with_post(true);
    client.update_session("s-1");
    client.start().unwrap();

    assert!(matches!(next_event(&mut events).await, StreamEvent::Open));
    assert!(matches!(next_event(&mut events).await, StreamEvent::Data(_)));
    client.stop();
}

#[tokio::test]
async fn error_status_is_reported_then_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Session not found"))
        .expect(3)
        .mount(&server)
        .await;

    let (client, mut events) = HttpStreamClient::new(
        format!("{}/v1/markets/events", server.uri()),
        "token",
        subscription(),
        &config(2),
    );
    client.update_session("s-1");
    client.start().unwrap();

    match next_event(&mut events).await {
        StreamEvent::Error(StreamError::HttpStatus { status }) => assert!(status.starts_with("401")),
        other => panic!("expected status error, got {other:?}"),
    }

    let mut reconnects = Vec::new();
    loop {
        match next_event(&mut events).await {
            StreamEvent::Reconnecting { attempt, .. } => reconnects.push(attempt),
            StreamEvent::Error(StreamError::ReconnectExhausted { attempts }) => {
                assert_eq!(attempts, 2);
                break;
            }
            StreamEvent::Open => panic!("request never succeeds"),
            _ => {}
        }
    }
    assert_eq!(reconnects, vec![1, 2]);
    assert_eq!(client.state(), StreamState::Closed);
}

#[tokio::test]
async fn update_symbols_restarts_with_new_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/markets/events"))
        .and(query_param("symbols", "DIA"))
        .respond_with(feed_response().set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let (client, mut events) = HttpStreamClient::new(
        format!("{}/v1/markets/events", server.uri()),
        "token",
        MarketSubscription::new(vec![]),
        &config(3),
    );
    client.update_session("s-1");
    assert_eq!(client.start(), Err(StreamError::EmptySubscription));

    client.update_symbols(vec!["DIA".to_string()]).unwrap();
    assert!(client.is_streaming());
    assert_eq!(client.symbols(), vec!["DIA".to_string()]);

    client.stop();
    assert!(matches!(next_event(&mut events).await, StreamEvent::Stopped));
    assert!(!client.is_streaming());
}
