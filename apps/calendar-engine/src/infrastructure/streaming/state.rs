//! Stream client state machine.
//!
//! Pure bookkeeping for the reconnecting clients: no I/O, no timers. The
//! client's background task reports transport milestones tagged with the
//! generation it was started under; reports from a superseded generation
//! are ignored.

use std::time::Duration;

use super::reconnect::ReconnectPolicy;
use super::types::{StreamConfig, StreamError, StreamState};

/// Outcome of a connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectDecision {
    /// Start a transport task under this generation.
    Start(u64),
    /// Already connecting, open or waiting to reconnect.
    AlreadyActive,
}

/// What to do after the transport ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait `delay`, then reconnect.
    Reconnect {
        /// Attempt number, starting at 1.
        attempt: u32,
        /// Delay before the attempt.
        delay: Duration,
    },
    /// Attempts used up; stay closed.
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// Manually stopped; stay closed.
    Stopped,
    /// Report from a superseded task.
    Stale,
}

/// Connection state, reconnect counter and manual-stop flag.
#[derive(Debug, Clone)]
pub struct StreamStateMachine {
    state: StreamState,
    policy: ReconnectPolicy,
    manual_stop: bool,
    reconnect_pending: bool,
    generation: u64,
}

impl StreamStateMachine {
    /// Closed machine with the configured backoff.
    #[must_use]
    pub const fn new(config: &StreamConfig) -> Self {
        Self {
            state: StreamState::Closed,
            policy: ReconnectPolicy::new(config),
            manual_stop: false,
            reconnect_pending: false,
            generation: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Reconnect attempts since the last successful open.
    #[must_use]
    pub const fn reconnect_attempts(&self) -> u32 {
        self.policy.current_attempt()
    }

    /// Whether a reconnect timer is pending.
    #[must_use]
    pub const fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Whether the consumer stopped the stream.
    #[must_use]
    pub const fn is_manually_stopped(&self) -> bool {
        self.manual_stop
    }

    /// Whether `generation` is the live task.
    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Explicit connect. Clears the manual-stop flag.
    pub fn connect(
        &mut self,
        has_session: bool,
        has_subscription: bool,
    ) -> Result<ConnectDecision, StreamError> {
        if self.state != StreamState::Closed || self.reconnect_pending {
            return Ok(ConnectDecision::AlreadyActive);
        }
        if !has_session {
            return Err(StreamError::NoSession);
        }
        if !has_subscription {
            return Err(StreamError::EmptySubscription);
        }
        self.manual_stop = false;
        self.policy.reset();
        self.generation += 1;
        self.state = StreamState::Connecting;
        Ok(ConnectDecision::Start(self.generation))
    }

    /// Transport opened. Returns false for a stale report.
    pub const fn on_open(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.manual_stop {
            return false;
        }
        self.state = StreamState::Open;
        self.policy.reset();
        true
    }

    /// Server sent a close frame.
    pub fn on_server_close(&mut self, generation: u64) {
        if self.is_current(generation) && self.state == StreamState::Open {
            self.state = StreamState::Closing;
        }
    }

    /// Transport ended (closed, errored or failed to open).
    pub fn on_transport_end(&mut self, generation: u64) -> ReconnectDecision {
        if !self.is_current(generation) {
            return ReconnectDecision::Stale;
        }
        self.state = StreamState::Closed;
        if self.manual_stop {
            return ReconnectDecision::Stopped;
        }
        match self.policy.next_backoff() {
            Some(delay) => {
                self.reconnect_pending = true;
                ReconnectDecision::Reconnect {
                    attempt: self.policy.current_attempt(),
                    delay,
                }
            }
            None => ReconnectDecision::Exhausted {
                attempts: self.policy.current_attempt(),
            },
        }
    }

    /// Reconnect timer fired. Returns false when the attempt is cancelled.
    pub fn on_reconnect_due(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.manual_stop {
            return false;
        }
        self.reconnect_pending = false;
        self.state = StreamState::Connecting;
        true
    }

    /// Manual stop: supersedes the running task, cancels any pending
    /// reconnect and forces `Closed`. Returns whether anything was active.
    pub fn disconnect(&mut self) -> bool {
        let was_active = self.state.is_active() || self.reconnect_pending;
        self.manual_stop = true;
        self.reconnect_pending = false;
        self.state = StreamState::Closed;
        self.generation += 1;
        was_active
    }
}

impl Default for StreamStateMachine {
    fn default() -> Self {
        Self::new(&StreamConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(machine: &mut StreamStateMachine) -> u64 {
        match machine.connect(true, true).unwrap() {
            ConnectDecision::Start(generation) => generation,
            ConnectDecision::AlreadyActive => panic!("expected a fresh start"),
        }
    }

    #[test]
    fn connect_requires_session_and_subscription() {
        let mut machine = StreamStateMachine::default();
        assert_eq!(machine.connect(false, true), Err(StreamError::NoSession));
        assert_eq!(
            machine.connect(true, false),
            Err(StreamError::EmptySubscription)
        );
        assert_eq!(machine.state(), StreamState::Closed);
    }

    #[test]
    fn connect_is_noop_while_active() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        assert_eq!(machine.state(), StreamState::Connecting);
        assert_eq!(
            machine.connect(true, true),
            Ok(ConnectDecision::AlreadyActive)
        );

        assert!(machine.on_open(generation));
        assert_eq!(
            machine.connect(true, true),
            Ok(ConnectDecision::AlreadyActive)
        );
    }

    #[test]
    fn open_resets_counter() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        machine.on_transport_end(generation);
        assert!(machine.on_reconnect_due(generation));
        machine.on_transport_end(generation);
        assert_eq!(machine.reconnect_attempts(), 2);

        assert!(machine.on_reconnect_due(generation));
        assert!(machine.on_open(generation));
        assert_eq!(machine.reconnect_attempts(), 0);
        assert_eq!(machine.state(), StreamState::Open);
    }

    #[test]
    fn close_frame_then_transport_end() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        machine.on_open(generation);
        machine.on_server_close(generation);
        assert_eq!(machine.state(), StreamState::Closing);

        let decision = machine.on_transport_end(generation);
        assert_eq!(machine.state(), StreamState::Closed);
        assert_eq!(
            decision,
            ReconnectDecision::Reconnect {
                attempt: 1,
                delay: Duration::from_millis(2000),
            }
        );
        assert!(machine.reconnect_pending());
        assert_eq!(
            machine.connect(true, true),
            Ok(ConnectDecision::AlreadyActive)
        );
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        for attempt in 1..=10 {
            match machine.on_transport_end(generation) {
                ReconnectDecision::Reconnect { attempt: a, .. } => assert_eq!(a, attempt),
                other => panic!("unexpected {other:?}"),
            }
            assert!(machine.on_reconnect_due(generation));
        }
        assert_eq!(
            machine.on_transport_end(generation),
            ReconnectDecision::Exhausted { attempts: 10 }
        );
        assert_eq!(machine.state(), StreamState::Closed);
        assert!(!machine.reconnect_pending());
    }

    #[test]
    fn disconnect_while_open_is_terminal() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        machine.on_open(generation);

        assert!(machine.disconnect());
        assert_eq!(machine.state(), StreamState::Closed);
        assert!(machine.is_manually_stopped());
        assert!(!machine.reconnect_pending());
        assert_eq!(
            machine.on_transport_end(generation),
            ReconnectDecision::Stale
        );
    }

    #[test]
    fn disconnect_cancels_pending_reconnect() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        machine.on_transport_end(generation);
        assert!(machine.reconnect_pending());

        machine.disconnect();
        assert!(!machine.reconnect_pending());
        assert!(!machine.on_reconnect_due(generation));
        assert_eq!(machine.state(), StreamState::Closed);
    }

    #[test]
    fn explicit_connect_clears_manual_stop() {
        let mut machine = StreamStateMachine::default();
        started(&mut machine);
        machine.disconnect();
        assert!(machine.is_manually_stopped());

        let generation = started(&mut machine);
        assert!(!machine.is_manually_stopped());
        assert!(machine.on_open(generation));
    }

    #[test]
    fn manual_stop_suppresses_reconnect() {
        let mut machine = StreamStateMachine::default();
        let generation = started(&mut machine);
        machine.on_open(generation);
        machine.manual_stop = true;
        assert_eq!(
            machine.on_transport_end(generation),
            ReconnectDecision::Stopped
        );
    }
}
