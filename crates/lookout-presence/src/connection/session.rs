//! Connection lifecycle state machine.
//!
//! ```text
//!            open()                transport open
//!  disconnected ──────► connecting ───────────────► connected
//!       ▲                   │                           │
//!       │ reconnect timer   │ transport error           │ transport error
//!       │                   ▼                           ▼
//!       └────────────── disconnected ◄── close ──── error
//! ```
//!
//! Errors only change the status; the close that follows is what schedules
//! a reconnect, so a failing transport can never queue two of them.
//! `teardown` is terminal.

use std::time::Duration;

use crate::protocol::OutboundCommand;

use super::types::{ConnectionStatus, NORMAL_CLOSURE, TEARDOWN_REASON};

/// Work the driver must carry out after a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Start establishing a new transport.
    Connect,
    /// Drop a connect attempt that is still in flight.
    AbortConnect,
    Send(OutboundCommand),
    StartKeepAlive(Duration),
    StopKeepAlive,
    ScheduleReconnect(Duration),
    CancelReconnect,
    Close { code: u16, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportState {
    Idle,
    Opening,
    Open,
    Closed,
}

/// State of the single logical connection owned by a client.
#[derive(Debug)]
pub struct ConnectionSession {
    status: ConnectionStatus,
    transport: TransportState,
    keepalive_armed: bool,
    reconnect_pending: bool,
    intentionally_closed: bool,
    keepalive_interval: Duration,
    reconnect_delay: Duration,
}

impl ConnectionSession {
    pub fn new(keepalive_interval: Duration, reconnect_delay: Duration) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            transport: TransportState::Idle,
            keepalive_armed: false,
            reconnect_pending: false,
            intentionally_closed: false,
            keepalive_interval,
            reconnect_delay,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.transport == TransportState::Open
    }

    pub fn is_torn_down(&self) -> bool {
        self.intentionally_closed
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Begin connecting unless a transport is already opening or open.
    pub fn open(&mut self) -> Vec<SessionAction> {
        if self.intentionally_closed
            || matches!(self.transport, TransportState::Opening | TransportState::Open)
        {
            return Vec::new();
        }

        let mut actions = Vec::with_capacity(2);
        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(SessionAction::CancelReconnect);
        }
        self.status = ConnectionStatus::Connecting;
        self.transport = TransportState::Opening;
        actions.push(SessionAction::Connect);
        actions
    }

    pub fn on_transport_open(&mut self) -> Vec<SessionAction> {
        if self.intentionally_closed {
            self.transport = TransportState::Closed;
            return vec![SessionAction::Close {
                code: NORMAL_CLOSURE,
                reason: TEARDOWN_REASON,
            }];
        }

        self.transport = TransportState::Open;
        self.status = ConnectionStatus::Connected;
        self.keepalive_armed = true;
        vec![
            SessionAction::Send(OutboundCommand::GetVisitors),
            SessionAction::StartKeepAlive(self.keepalive_interval),
        ]
    }

    pub fn on_keepalive_tick(&mut self) -> Vec<SessionAction> {
        if self.is_open() {
            vec![SessionAction::Send(OutboundCommand::Ping)]
        } else {
            Vec::new()
        }
    }

    pub fn on_transport_error(&mut self) {
        if !self.intentionally_closed {
            self.status = ConnectionStatus::Error;
        }
    }

    pub fn on_transport_close(&mut self) -> Vec<SessionAction> {
        self.transport = TransportState::Closed;
        self.keepalive_armed = false;
        self.status = ConnectionStatus::Disconnected;

        let mut actions = vec![SessionAction::StopKeepAlive];
        if !self.intentionally_closed && !self.reconnect_pending {
            self.reconnect_pending = true;
            actions.push(SessionAction::ScheduleReconnect(self.reconnect_delay));
        }
        actions
    }

    pub fn on_reconnect_timer(&mut self) -> Vec<SessionAction> {
        self.reconnect_pending = false;
        self.open()
    }

    /// Ask for the full visitor list; ignored unless the transport is open.
    pub fn request_refresh(&mut self) -> Vec<SessionAction> {
        if self.is_open() {
            vec![SessionAction::Send(OutboundCommand::GetVisitors)]
        } else {
            Vec::new()
        }
    }

    /// Stop for good. The flag is set before anything else so a close that
    /// races this call cannot schedule a reconnect.
    pub fn teardown(&mut self) -> Vec<SessionAction> {
        if self.intentionally_closed {
            return Vec::new();
        }
        self.intentionally_closed = true;

        let mut actions = Vec::with_capacity(3);
        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(SessionAction::CancelReconnect);
        }
        if self.keepalive_armed {
            self.keepalive_armed = false;
            actions.push(SessionAction::StopKeepAlive);
        }
        match self.transport {
            TransportState::Open => actions.push(SessionAction::Close {
                code: NORMAL_CLOSURE,
                reason: TEARDOWN_REASON,
            }),
            TransportState::Opening => actions.push(SessionAction::AbortConnect),
            TransportState::Idle | TransportState::Closed => {}
        }
        self.transport = TransportState::Closed;
        self.status = ConnectionStatus::Disconnected;
        actions
    }
}
