//! Reconnecting WebSocket client for the market and account event feeds.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use super::codec::{FeedMessage, parse_message};
use super::state::{ConnectDecision, ReconnectDecision, StreamStateMachine};
use super::subscription::{AccountSubscription, MarketSubscription, Subscription};
use super::types::{StreamConfig, StreamError, StreamEvent, StreamState, Transport};
use crate::infrastructure::telemetry::{
    record_stream_error, record_stream_message, record_stream_reconnect, record_stream_state,
};

const TRANSPORT: Transport = Transport::WebSocket;

/// Command for the running connection task.
#[derive(Debug, Clone, Copy)]
enum Command {
    /// Send the current subscription payload again.
    Resend,
}

/// How one connection ended.
enum Ended {
    /// Superseded or disconnected.
    Cancelled,
    /// Transport closed or failed.
    Closed,
}

#[derive(Debug)]
struct Shared {
    machine: StreamStateMachine,
    session_id: Option<String>,
    subscription: Subscription,
    commands: Option<mpsc::UnboundedSender<Command>>,
    cancel: Option<CancellationToken>,
}

/// WebSocket stream client.
///
/// Events arrive on the receiver returned by [`WebSocketStreamClient::new`].
/// A dropped receiver does not stop the client; call
/// [`WebSocketStreamClient::disconnect`].
#[derive(Debug, Clone)]
pub struct WebSocketStreamClient {
    url: String,
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<StreamEvent>,
}

impl WebSocketStreamClient {
    /// Create a closed client for `url` with `subscription`.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        subscription: Subscription,
        config: &StreamConfig,
    ) -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let client = Self {
            url: url.into(),
            shared: Arc::new(Mutex::new(Shared {
                machine: StreamStateMachine::new(config),
                session_id: None,
                subscription,
                commands: None,
                cancel: None,
            })),
            events,
        };
        (client, receiver)
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.shared.lock().machine.state()
    }

    /// Reconnect attempts since the last successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.lock().machine.reconnect_attempts()
    }

    /// Current subscription.
    #[must_use]
    pub fn subscription(&self) -> Subscription {
        self.shared.lock().subscription.clone()
    }

    /// Open the connection in a background task.
    ///
    /// A no-op while connecting, open or waiting to reconnect.
    pub fn connect(&self) -> Result<(), StreamError> {
        let mut shared = self.shared.lock();
        let has_session = shared.session_id.is_some();
        let has_subscription = !shared.subscription.is_empty();
        let decision = shared.machine.connect(has_session, has_subscription)?;
        let ConnectDecision::Start(generation) = decision else {
            return Ok(());
        };

        let cancel = CancellationToken::new();
        let (commands, command_rx) = mpsc::unbounded_channel();
        shared.cancel = Some(cancel.clone());
        shared.commands = Some(commands);
        drop(shared);

        record_stream_state(TRANSPORT.as_str(), StreamState::Connecting.gauge_value());
        tracing::info!(url = %self.url, generation, "Connecting event stream");

        let task = self.clone();
        tokio::spawn(async move { task.run(generation, cancel, command_rx).await });
        Ok(())
    }

    /// Stop the stream. Cancels any pending reconnect and the open
    /// transport; the state is `Closed` when this returns.
    pub fn disconnect(&self) {
        let mut shared = self.shared.lock();
        let was_active = shared.machine.disconnect();
        if let Some(cancel) = shared.cancel.take() {
            cancel.cancel();
        }
        shared.commands = None;
        drop(shared);

        record_stream_state(TRANSPORT.as_str(), StreamState::Closed.gauge_value());
        if was_active {
            tracing::info!(url = %self.url, "Event stream stopped");
            let _ = self.events.send(StreamEvent::Stopped);
        }
    }

    /// Replace the market subscription; resent at once when open.
    pub fn subscribe(&self, subscription: MarketSubscription) -> Result<(), StreamError> {
        self.modify("subscribe", |current| match current {
            Subscription::Market(market) => {
                *market = subscription;
                true
            }
            Subscription::Account(_) => false,
        })
    }

    /// Clear the market symbols; resent at once when open.
    pub fn unsubscribe(&self) -> Result<(), StreamError> {
        self.modify("unsubscribe", |current| match current {
            Subscription::Market(market) => {
                market.symbols.clear();
                true
            }
            Subscription::Account(_) => false,
        })
    }

    /// Replace the account events and exclusions; resent at once when open.
    pub fn update(
        &self,
        events: Vec<String>,
        exclude_accounts: Vec<String>,
    ) -> Result<(), StreamError> {
        self.modify("update", |current| match current {
            Subscription::Account(account) => {
                *account = AccountSubscription {
                    events,
                    exclude_accounts,
                };
                true
            }
            Subscription::Market(_) => false,
        })
    }

    /// Swap the session id. Resends the payload when open; the transport
    /// is not reconnected.
    pub fn update_session(&self, session_id: impl Into<String>) {
        let mut shared = self.shared.lock();
        shared.session_id = Some(session_id.into());
        Self::resend_if_open(&shared);
    }

    fn modify(
        &self,
        operation: &str,
        apply: impl FnOnce(&mut Subscription) -> bool,
    ) -> Result<(), StreamError> {
        let mut shared = self.shared.lock();
        if !apply(&mut shared.subscription) {
            return Err(StreamError::WrongFeed {
                operation: operation.to_string(),
                feed: shared.subscription.kind().to_string(),
            });
        }
        Self::resend_if_open(&shared);
        Ok(())
    }

    fn resend_if_open(shared: &Shared) {
        if shared.machine.state().is_open()
            && let Some(commands) = &shared.commands
        {
            let _ = commands.send(Command::Resend);
        }
    }

    /// Send an event unless the task has been superseded.
    fn emit(&self, generation: u64, event: StreamEvent) -> bool {
        let shared = self.shared.lock();
        if !shared.machine.is_current(generation) {
            return false;
        }
        let _ = self.events.send(event);
        true
    }

    fn current_payload(&self) -> Option<String> {
        let shared = self.shared.lock();
        let session_id = shared.session_id.as_deref()?;
        Some(shared.subscription.ws_payload(session_id).to_string())
    }

    /// Connection loop with reconnection.
    async fn run(
        self,
        generation: u64,
        cancel: CancellationToken,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) {
        loop {
            if let Ended::Cancelled = self.connect_and_run(generation, &cancel, &mut commands).await {
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
                        "Reconnecting event stream"
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
                    tracing::error!(url = %self.url, attempts, "Event stream reconnection attempts exhausted");
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

    /// One connection: open, send the payload, pump messages.
    async fn connect_and_run(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> Ended {
        let connected = tokio::select! {
            result = connect_async(self.url.as_str()) => result,
            () = cancel.cancelled() => return Ended::Cancelled,
        };
        let (ws_stream, _) = match connected {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Event stream connection failed");
                record_stream_error(TRANSPORT.as_str(), "connect");
                self.emit(
                    generation,
                    StreamEvent::Error(StreamError::ConnectionFailed {
                        message: e.to_string(),
                    }),
                );
                return Ended::Closed;
            }
        };
        let (mut write, mut read) = ws_stream.split();

        if !self.shared.lock().machine.on_open(generation) {
            let _ = write.send(Message::Close(None)).await;
            return Ended::Cancelled;
        }
        record_stream_state(TRANSPORT.as_str(), StreamState::Open.gauge_value());

        let Some(payload) = self.current_payload() else {
            return Ended::Closed;
        };
        if let Err(e) = write.send(Message::Text(payload.into())).await {
            record_stream_error(TRANSPORT.as_str(), "send");
            self.emit(
                generation,
                StreamEvent::Error(StreamError::SendFailed {
                    message: e.to_string(),
                }),
            );
            return Ended::Closed;
        }
        tracing::info!(url = %self.url, "Event stream open");
        self.emit(generation, StreamEvent::Open);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => self.handle_text(generation, text.as_str()),
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(url = %self.url, frame = ?frame, "Event stream received close frame");
                            self.shared.lock().machine.on_server_close(generation);
                            record_stream_state(TRANSPORT.as_str(), StreamState::Closing.gauge_value());
                        }
                        Some(Err(e)) => {
                            tracing::warn!(url = %self.url, error = %e, "Event stream transport error");
                            record_stream_error(TRANSPORT.as_str(), "transport");
                            self.emit(
                                generation,
                                StreamEvent::Error(StreamError::ConnectionClosed {
                                    reason: e.to_string(),
                                }),
                            );
                            return Ended::Closed;
                        }
                        None => return Ended::Closed,
                        _ => {}
                    }
                }
                Some(Command::Resend) = commands.recv() => {
                    let Some(payload) = self.current_payload() else {
                        continue;
                    };
                    tracing::debug!(url = %self.url, "Resending subscription payload");
                    if let Err(e) = write.send(Message::Text(payload.into())).await {
                        record_stream_error(TRANSPORT.as_str(), "send");
                        self.emit(
                            generation,
                            StreamEvent::Error(StreamError::SendFailed {
                                message: e.to_string(),
                            }),
                        );
                    }
                }
                () = cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ended::Cancelled;
                }
            }
        }
    }

    fn handle_text(&self, generation: u64, text: &str) {
        match parse_message(text) {
            Ok(FeedMessage::Data(value)) => {
                let event_type = value
                    .get("type")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown");
                record_stream_message(TRANSPORT.as_str(), event_type);
                self.emit(generation, StreamEvent::Data(value));
            }
            Ok(FeedMessage::ServerError(message)) => {
                tracing::warn!(url = %self.url, error = %message, "Event stream reported an error");
                record_stream_error(TRANSPORT.as_str(), "server");
                self.emit(generation, StreamEvent::Error(StreamError::Server { message }));
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Malformed event stream frame");
                record_stream_error(TRANSPORT.as_str(), "parse");
                self.emit(generation, StreamEvent::Error(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn market_client() -> (WebSocketStreamClient, mpsc::UnboundedReceiver<StreamEvent>) {
        WebSocketStreamClient::new(
            "ws://127.0.0.1:9/v1/markets/events",
            Subscription::Market(MarketSubscription::new(vec!["SPY".to_string()])),
            &StreamConfig::default(),
        )
    }

    #[tokio::test]
    async fn connect_without_session_is_rejected() {
        let (client, _events) = market_client();
        assert_eq!(client.connect(), Err(StreamError::NoSession));
        assert_eq!(client.state(), StreamState::Closed);
    }

    #[tokio::test]
    async fn connect_with_empty_subscription_is_rejected() {
        let (client, _events) = WebSocketStreamClient::new(
            "ws://127.0.0.1:9",
            Subscription::Market(MarketSubscription::default()),
            &StreamConfig::default(),
        );
        client.update_session("S1");
        assert_eq!(client.connect(), Err(StreamError::EmptySubscription));
    }

    #[tokio::test]
    async fn wrong_feed_operations() {
        let (client, _events) = market_client();
        assert!(matches!(
            client.update(vec!["order".to_string()], Vec::new()),
            Err(StreamError::WrongFeed { .. })
        ));
        client.unsubscribe().unwrap();
        assert!(client.subscription().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_cancels_pending_reconnect() {
        let (client, mut events) = market_client();
        client.update_session("S1");
        client.connect().unwrap();

        let delay = loop {
            match events.recv().await.unwrap() {
                StreamEvent::Reconnecting { attempt, delay } => {
                    assert_eq!(attempt, 1);
                    break delay;
                }
                StreamEvent::Open => panic!("nothing listens on the discard port"),
                _ => {}
            }
        };
        assert_eq!(delay, Duration::from_secs(2));

        client.disconnect();
        assert!(matches!(events.recv().await, Some(StreamEvent::Stopped)));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(events.try_recv().is_err());
        assert_eq!(client.state(), StreamState::Closed);
        assert_eq!(client.connect(), Ok(()));
        client.disconnect();
    }

    #[tokio::test]
    async fn disconnect_when_closed_emits_nothing() {
        let (client, mut events) = market_client();
        client.disconnect();
        assert_eq!(client.state(), StreamState::Closed);
        assert!(events.try_recv().is_err());
    }
}
