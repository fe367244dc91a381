//! Reconnecting HTTP client for the newline-delimited market event feed.

use std::sync::Arc;

use futures_util::StreamExt;
use parking_lot::Mutex;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::codec::{FeedMessage, LineBuffer, parse_message};
use super::state::{ConnectDecision, ReconnectDecision, StreamStateMachine};
use super::subscription::MarketSubscription;
use super::types::{StreamConfig, StreamError, StreamEvent, StreamState, Transport};
use crate::infrastructure::telemetry::{
    record_stream_error, record_stream_message, record_stream_reconnect, record_stream_state,
};

const TRANSPORT: Transport = Transport::Http;

enum Ended {
    Cancelled,
    Closed,
}

#[derive(Debug)]
struct Shared {
    machine: StreamStateMachine,
    session_id: Option<String>,
    subscription: MarketSubscription,
    cancel: Option<CancellationToken>,
}

/// HTTP streaming client for market events.
///
/// Sends one long-lived request and reads the chunked body line by line.
/// Changing the symbols restarts the request.
#[derive(Clone)]
pub struct HttpStreamClient {
    client: Client,
    url: String,
    access_token: String,
    use_post: bool,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<StreamEvent>,
}

impl std::fmt::Debug for HttpStreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStreamClient")
            .field("url", &self.url)
            .field("use_post", &self.use_post)
            .finish_non_exhaustive()
    }
}

impl HttpStreamClient {
    /// Create a stopped client for `url`.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        access_token: impl Into<String>,
        subscription: MarketSubscription,
        config: &StreamConfig,
    ) -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let client = Self {
            client: Client::new(),
            url: url.into(),
            access_token: access_token.into(),
            use_post: false,
            shared: Arc::new(Mutex::new(Shared {
                machine: StreamStateMachine::new(config),
                session_id: None,
                subscription,
                cancel: None,
            })),
            events,
        };
        (client, receiver)
    }

    /// Send the parameters as a POST form, for long symbol lists.
    #[must_use]
    pub const fn with_post(mut self, use_post: bool) -> Self {
        self.use_post = use_post;
        self
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.shared.lock().machine.state()
    }

    /// Whether a request is active or a restart is pending.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        let shared = self.shared.lock();
        shared.machine.state().is_active() || shared.machine.reconnect_pending()
    }

    /// Symbols currently requested.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.shared.lock().subscription.symbols.clone()
    }

    /// Start streaming in a background task.
    pub fn start(&self) -> Result<(), StreamError> {
        let mut shared = self.shared.lock();
        let has_session = shared.session_id.is_some();
        let has_symbols = !shared.subscription.symbols.is_empty();
        let decision = shared.machine.connect(has_session, has_symbols)?;
        let ConnectDecision::Start(generation) = decision else {
            return Ok(());
        };
        let cancel = CancellationToken::new();
        shared.cancel = Some(cancel.clone());
        drop(shared);

        record_stream_state(TRANSPORT.as_str(), StreamState::Connecting.gauge_value());
        tracing::info!(url = %self.url, generation, "Starting HTTP event stream");

        let task = self.clone();
        tokio::spawn(async move { task.run(generation, cancel).await });
        Ok(())
    }

    /// Abort the request and cancel any pending restart.
    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        let was_active = shared.machine.disconnect();
        if let Some(cancel) = shared.cancel.take() {
            cancel.cancel();
        }
        drop(shared);

        record_stream_state(TRANSPORT.as_str(), StreamState::Closed.gauge_value());
        if was_active {
            tracing::info!(url = %self.url, "HTTP event stream stopped");
            let _ = self.events.send(StreamEvent::Stopped);
        }
    }

    /// Replace the symbols and restart the request.
    pub fn update_symbols(&self, symbols: Vec<String>) -> Result<(), StreamError> {
        if self.is_streaming() {
            self.stop();
        }
        self.shared.lock().subscription.symbols = symbols;
        self.start()
    }

    /// Swap the session id used by the next request.
    pub fn update_session(&self, session_id: impl Into<String>) {
        self.shared.lock().session_id = Some(session_id.into());
    }

    fn emit(&self, generation: u64, event: StreamEvent) -> bool {
        let shared = self.shared.lock();
        if !shared.machine.is_current(generation) {
            return false;
        }
        let _ = self.events.send(event);
        true
    }

    async fn run(self, generation: u64, cancel: CancellationToken) {
        loop {
            if let Ended::Cancelled = self.request_and_read(generation, &cancel).await {
                return;
            }
            if !self.emit(generation, StreamEvent::Closed) {
                return;
            }
            record_stream_state(TRANSPORT.as_str(), StreamState::Closed.gauge_value());

            let decision = self.shared.lock().machine.on_transport_end(generation);
            match decision {
                ReconnectDecision::Reconnect { attempt, delay } => {
                    tracing::info!(
                        url = %self.url,
                        attempt,
                        backoff_ms = delay.as_millis(),
                        "Restarting HTTP event stream"
                    );
                    record_stream_reconnect(TRANSPORT.as_str());
                    self.emit(generation, StreamEvent::Reconnecting { attempt, delay });

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = cancel.cancelled() => return,
                    }
                    if !self.shared.lock().machine.on_reconnect_due(generation) {
                        return;
                    }
                    record_stream_state(TRANSPORT.as_str(), StreamState::Connecting.gauge_value());
                }
                ReconnectDecision::Exhausted { attempts } => {
                    tracing::error!(url = %self.url, attempts, "HTTP event stream restart attempts exhausted");
                    record_stream_error(TRANSPORT.as_str(), "exhausted");
                    self.emit(
                        generation,
                        StreamEvent::Error(StreamError::ReconnectExhausted { attempts }),
                    );
                    return;
                }
                ReconnectDecision::Stopped | ReconnectDecision::Stale => return,
            }
        }
    }

    fn build_request(&self) -> Option<reqwest::RequestBuilder> {
        let shared = self.shared.lock();
        let session_id = shared.session_id.as_deref()?;
        let params = shared.subscription.http_params(session_id);
        let request = if self.use_post {
            self.client.post(&self.url).form(&params)
        } else {
            self.client.get(&self.url).query(&params)
        };
        Some(
            request
                .bearer_auth(&self.access_token)
                .header(ACCEPT, "application/json"),
        )
    }

    async fn request_and_read(&self, generation: u64, cancel: &CancellationToken) -> Ended {
        let Some(request) = self.build_request() else {
            return Ended::Closed;
        };
        let sent = tokio::select! {
            result = request.send() => result,
            () = cancel.cancelled() => return Ended::Cancelled,
        };

        let response = match sent {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let status = response.status().to_string();
                return self.request_failed(generation, StreamError::HttpStatus { status });
            }
            Err(e) => {
                return self.request_failed(
                    generation,
                    StreamError::ConnectionFailed {
                        message: e.to_string(),
                    },
                );
            }
        };

        if !self.shared.lock().machine.on_open(generation) {
            return Ended::Cancelled;
        }
        record_stream_state(TRANSPORT.as_str(), StreamState::Open.gauge_value());
        tracing::info!(url = %self.url, "HTTP event stream open");
        self.emit(generation, StreamEvent::Open);

        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::new();
        loop {
            tokio::select! {
                chunk = body.next() => {
                    match chunk {
                        Some(Ok(bytes)) => {
                            for line in lines.push(&bytes) {
                                self.handle_line(generation, &line);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(url = %self.url, error = %e, "HTTP event stream read failed");
                            record_stream_error(TRANSPORT.as_str(), "transport");
                            self.emit(
                                generation,
                                StreamEvent::Error(StreamError::ConnectionClosed {
                                    reason: e.to_string(),
                                }),
                            );
                            return Ended::Closed;
                        }
                        None => {
                            tracing::info!(url = %self.url, "HTTP event stream ended");
                            return Ended::Closed;
                        }
                    }
                }
                () = cancel.cancelled() => return Ended::Cancelled,
            }
        }
    }

    fn request_failed(&self, generation: u64, error: StreamError) -> Ended {
        tracing::warn!(url = %self.url, error = %error, "HTTP event stream request failed");
        record_stream_error(TRANSPORT.as_str(), "connect");
        self.emit(generation, StreamEvent::Error(error));
        Ended::Closed
    }

    fn handle_line(&self, generation: u64, line: &str) {
        match parse_message(line) {
            Ok(FeedMessage::Data(value)) => {
                let event_type = value
                    .get("type")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown");
                record_stream_message(TRANSPORT.as_str(), event_type);
                self.emit(generation, StreamEvent::Data(value));
            }
            Ok(FeedMessage::ServerError(message)) => {
                tracing::warn!(url = %self.url, error = %message, "HTTP event stream reported an error");
                record_stream_error(TRANSPORT.as_str(), "server");
                self.emit(generation, StreamEvent::Error(StreamError::Server { message }));
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, line, "Skipping malformed event line");
                record_stream_error(TRANSPORT.as_str(), "parse");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> (HttpStreamClient, mpsc::UnboundedReceiver<StreamEvent>) {
        HttpStreamClient::new(
            "http://127.0.0.1:9/v1/markets/events",
            "token",
            MarketSubscription::new(vec!["SPY".to_string()]),
            &StreamConfig::default(),
        )
    }

    #[tokio::test]
    async fn start_requires_session() {
        let (client, _events) = client();
        assert_eq!(client.start(), Err(StreamError::NoSession));
        assert!(!client.is_streaming());
    }

    #[tokio::test]
    async fn update_symbols_without_session_keeps_symbols() {
        let (client, mut events) = client();
        let result = client.update_symbols(vec!["QQQ".to_string()]);
        assert_eq!(result, Err(StreamError::NoSession));
        assert_eq!(client.symbols(), vec!["QQQ".to_string()]);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn debug_hides_token() {
        let (client, _events) = client();
        let debug = format!("{client:?}");
        assert!(!debug.contains("token"));
        assert!(debug.contains("127.0.0.1"));
    }
}
