//! Background task that owns the transport and timers of one client.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info, trace, warn};

use lookout_common::SessionId;

use crate::codec;
use crate::error::TransportError;

use super::session::{ConnectionSession, SessionAction};
use super::transport::{Connector, Transport};
use super::types::{ConnectionCommand, ConnectionConfig, ConnectionEvent, ConnectionStatus};

type ConnectFuture = BoxFuture<'static, Result<Box<dyn Transport>, TransportError>>;

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Runs the connection state machine against a real transport.
///
/// Transport callbacks, the keep-alive interval and the reconnect timer are
/// all branches of one `select!`, so they never run concurrently.
pub(crate) struct SessionDriver {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    session: ConnectionSession,
    session_id: SessionId,
    last_status: ConnectionStatus,
    transport: Option<Box<dyn Transport>>,
    connecting: Option<ConnectFuture>,
    keepalive: Option<Interval>,
    reconnect: Option<Pin<Box<Sleep>>>,
    event_tx: mpsc::Sender<ConnectionEvent>,
    command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
}

impl SessionDriver {
    pub(crate) fn new(
        config: ConnectionConfig,
        connector: Arc<dyn Connector>,
        event_tx: mpsc::Sender<ConnectionEvent>,
        command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    ) -> Self {
        let session = ConnectionSession::new(config.keepalive_interval, config.reconnect_delay);
        Self {
            config,
            connector,
            session,
            session_id: SessionId::new(),
            last_status: ConnectionStatus::Disconnected,
            transport: None,
            connecting: None,
            keepalive: None,
            reconnect: None,
            event_tx,
            command_rx,
        }
    }

    /// Open the session and process events until teardown.
    pub(crate) async fn run(mut self) {
        let actions = self.session.open();
        self.apply(actions).await;

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(ConnectionCommand::Open) => {
                        let actions = self.session.open();
                        if actions.is_empty() {
                            debug!(session = %self.session_id, "Open ignored, session already active");
                        }
                        self.apply(actions).await;
                    }
                    Some(ConnectionCommand::RequestRefresh) => {
                        let actions = self.session.request_refresh();
                        if actions.is_empty() {
                            debug!("Refresh ignored, transport not open");
                        }
                        self.apply(actions).await;
                    }
                    Some(ConnectionCommand::Teardown { done }) => {
                        self.teardown().await;
                        self.emit(ConnectionEvent::Stopped { done }).await;
                        break;
                    }
                    None => {
                        debug!("Client handle dropped");
                        self.teardown().await;
                        break;
                    }
                },
                result = next_connect(&mut self.connecting) => {
                    self.connecting = None;
                    self.on_connect_result(result).await;
                }
                frame = next_frame(&mut self.transport) => {
                    self.on_frame(frame).await;
                }
                _ = next_tick(&mut self.keepalive) => {
                    let actions = self.session.on_keepalive_tick();
                    self.apply(actions).await;
                }
                _ = next_reconnect(&mut self.reconnect) => {
                    self.reconnect = None;
                    debug!("Reconnect timer fired");
                    let actions = self.session.on_reconnect_timer();
                    self.apply(actions).await;
                }
            }
        }

        info!("Presence connection stopped");
    }

    // -----------------------------------------------------------------------
    // Transport events
    // -----------------------------------------------------------------------

    async fn on_connect_result(&mut self, result: Result<Box<dyn Transport>, TransportError>) {
        match result {
            Ok(transport) => {
                info!(session = %self.session_id, "Connected to presence server");
                self.transport = Some(transport);
                let actions = self.session.on_transport_open();
                self.apply(actions).await;
            }
            Err(e) => {
                let actions = self.record_failure(e).await;
                self.apply(actions).await;
            }
        }
    }

    async fn on_frame(&mut self, frame: Option<Result<String, TransportError>>) {
        match frame {
            Some(Ok(text)) => {
                trace!(session = %self.session_id, bytes = text.len(), "Frame received");
                self.emit(ConnectionEvent::Frame(text)).await;
            }
            Some(Err(e)) => {
                let actions = self.record_failure(e).await;
                self.apply(actions).await;
            }
            None => {
                info!(session = %self.session_id, "Presence server closed the connection");
                self.transport = None;
                let actions = self.session.on_transport_close();
                self.apply(actions).await;
            }
        }
    }

    /// Report `error` followed by a close, dropping the transport. Returns the
    /// actions of the close transition.
    async fn record_failure(&mut self, error: TransportError) -> Vec<SessionAction> {
        warn!(session = %self.session_id, error = %error, "Presence transport failed");
        self.transport = None;
        self.connecting = None;
        self.session.on_transport_error();
        self.publish_status().await;
        self.session.on_transport_close()
    }

    async fn teardown(&mut self) {
        let actions = self.session.teardown();
        self.apply(actions).await;
        // Drop anything the session did not know about yet.
        self.transport = None;
        self.connecting = None;
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    async fn apply(&mut self, actions: Vec<SessionAction>) {
        let mut queue: VecDeque<SessionAction> = actions.into();

        while let Some(action) = queue.pop_front() {
            match action {
                SessionAction::Connect => self.start_connect(),
                SessionAction::AbortConnect => {
                    debug!(session = %self.session_id, "Aborting connect attempt");
                    self.connecting = None;
                }
                SessionAction::Send(command) => {
                    let Some(transport) = self.transport.as_mut() else {
                        debug!(command = command.frame_type(), "No transport, command dropped");
                        continue;
                    };
                    debug!(command = command.frame_type(), "Sending command");
                    let result = transport.send(codec::encode(command)).await;
                    if let Err(e) = result {
                        queue.extend(self.record_failure(e).await);
                    }
                }
                SessionAction::StartKeepAlive(period) => {
                    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.keepalive = Some(interval);
                }
                SessionAction::StopKeepAlive => self.keepalive = None,
                SessionAction::ScheduleReconnect(delay) => {
                    info!(delay_ms = delay.as_millis() as u64, "Reconnecting in {:?}", delay);
                    self.reconnect = Some(Box::pin(tokio::time::sleep(delay)));
                }
                SessionAction::CancelReconnect => self.reconnect = None,
                SessionAction::Close { code, reason } => {
                    if let Some(mut transport) = self.transport.take() {
                        debug!(session = %self.session_id, code, reason, "Closing transport");
                        if let Err(e) = transport.close(code, reason).await {
                            debug!(error = %e, "Close handshake failed");
                        }
                    }
                }
            }
        }

        self.publish_status().await;
    }

    fn start_connect(&mut self) {
        self.session_id = SessionId::new();
        info!(
            session = %self.session_id,
            url = %self.config.redacted_url(),
            "Connecting to presence server"
        );

        let connector = Arc::clone(&self.connector);
        let url = self.config.url.clone();
        let timeout = self.config.connect_timeout;
        self.connecting = Some(Box::pin(async move {
            match tokio::time::timeout(timeout, connector.connect(&url)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(TransportError::Timeout(timeout)),
            }
        }));
    }

    async fn publish_status(&mut self) {
        let status = self.session.status();
        if status != self.last_status {
            debug!(from = %self.last_status, to = %status, "Connection status changed");
            self.last_status = status;
            self.emit(ConnectionEvent::Status(status)).await;
        }
    }

    async fn emit(&mut self, event: ConnectionEvent) {
        if self.event_tx.send(event).await.is_err() {
            debug!("Sync task gone, event dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// select! helpers: pend forever when the resource is absent
// ---------------------------------------------------------------------------

async fn next_connect(
    connecting: &mut Option<ConnectFuture>,
) -> Result<Box<dyn Transport>, TransportError> {
    match connecting {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(
    transport: &mut Option<Box<dyn Transport>>,
) -> Option<Result<String, TransportError>> {
    match transport {
        Some(transport) => transport.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_reconnect(reconnect: &mut Option<Pin<Box<Sleep>>>) {
    match reconnect {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
