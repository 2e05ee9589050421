//! Presence sync client: one connection, one registry, observable snapshots.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use lookout_common::{ConfigError, EventBus};

use crate::connection::{
    ConnectionCommand, ConnectionConfig, ConnectionStatus, Connector, SessionDriver, WsConnector,
};
use crate::error::InviteDeliveryError;
use crate::invite::InviteClient;
use crate::protocol::Visitor;

use super::sync::{sync_task, SyncState};
use super::types::{PresenceConfig, PresenceEvent};

enum Lifecycle {
    /// Not opened yet; the sync state waits to be handed to its task.
    Idle(SyncState),
    Running {
        commands: mpsc::UnboundedSender<ConnectionCommand>,
        driver: JoinHandle<()>,
        sync: JoinHandle<()>,
    },
    TornDown,
}

/// Keeps a local list of visitors in sync with the presence server.
///
/// Dropping the client closes its command channel, which tears the
/// connection down in the background.
pub struct PresenceSyncClient {
    connection: ConnectionConfig,
    connector: Arc<dyn Connector>,
    invites: InviteClient,
    event_channel_capacity: usize,
    visitors_rx: watch::Receiver<Vec<Visitor>>,
    status_rx: watch::Receiver<ConnectionStatus>,
    events: EventBus<PresenceEvent>,
    lifecycle: Mutex<Lifecycle>,
}

impl PresenceSyncClient {
    /// Client that connects with `tokio-tungstenite`.
    pub fn new(config: PresenceConfig) -> Result<Self, ConfigError> {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    pub fn with_connector(
        config: PresenceConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, ConfigError> {
        let connection = ConnectionConfig {
            url: config.ws_url()?,
            keepalive_interval: config.keepalive_interval,
            reconnect_delay: config.reconnect_delay,
            connect_timeout: config.connect_timeout,
        };
        let invites = InviteClient::new(config.invite_url()?, config.api_key.clone());

        let (visitors_tx, visitors_rx) = watch::channel(Vec::new());
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let events = EventBus::new(config.event_channel_capacity);
        let state = SyncState::new(visitors_tx, status_tx, events.clone());

        debug!(config = ?config, "Presence client created");

        Ok(Self {
            connection,
            connector,
            invites,
            event_channel_capacity: config.event_channel_capacity.max(1),
            visitors_rx,
            status_rx,
            events,
            lifecycle: Mutex::new(Lifecycle::Idle(state)),
        })
    }

    /// Start the connection. Must be called inside a Tokio runtime.
    ///
    /// Calling it again while connecting or connected does nothing; after
    /// [`teardown`](Self::teardown) it is ignored.
    pub fn open(&self) {
        let mut lifecycle = self.lock();
        match &*lifecycle {
            Lifecycle::Running { commands, .. } => {
                let _ = commands.send(ConnectionCommand::Open);
                return;
            }
            Lifecycle::TornDown => {
                debug!("Open after teardown ignored");
                return;
            }
            Lifecycle::Idle(_) => {}
        }

        let Lifecycle::Idle(state) = std::mem::replace(&mut *lifecycle, Lifecycle::TornDown) else {
            return;
        };

        let (event_tx, event_rx) = mpsc::channel(self.event_channel_capacity);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let driver = SessionDriver::new(
            self.connection.clone(),
            Arc::clone(&self.connector),
            event_tx,
            command_rx,
        );
        let sync = tokio::spawn(sync_task(event_rx, state));
        let driver = tokio::spawn(driver.run());

        info!(url = %self.connection.redacted_url(), "Presence client opened");
        *lifecycle = Lifecycle::Running {
            commands: command_tx,
            driver,
            sync,
        };
    }

    /// Close the connection for good and wait until it is closed.
    /// Safe to call before `open` and more than once.
    pub async fn teardown(&self) {
        let previous = std::mem::replace(&mut *self.lock(), Lifecycle::TornDown);

        match previous {
            Lifecycle::Idle(_) => debug!("Teardown before open"),
            Lifecycle::TornDown => {}
            Lifecycle::Running {
                commands,
                driver,
                sync,
            } => {
                let (done_tx, done_rx) = oneshot::channel();
                if commands
                    .send(ConnectionCommand::Teardown { done: done_tx })
                    .is_ok()
                {
                    let _ = done_rx.await;
                }
                let _ = driver.await;
                let _ = sync.await;
                info!("Presence client torn down");
            }
        }
    }

    /// Ask the server for the full visitor list. Ignored unless connected.
    pub fn request_refresh(&self) {
        if let Lifecycle::Running { commands, .. } = &*self.lock() {
            let _ = commands.send(ConnectionCommand::RequestRefresh);
        }
    }

    /// Ask the server to invite a visitor into a call.
    ///
    /// Local state only changes once the server confirms with a
    /// `VIDEO_INVITE_SENT` frame.
    pub async fn send_invite(
        &self,
        visitor_id: &str,
        guest_url: &str,
    ) -> Result<(), InviteDeliveryError> {
        self.invites.send(visitor_id, guest_url).await
    }

    /// Current visitors, most recent arrival first.
    pub fn visitors(&self) -> Vec<Visitor> {
        self.visitors_rx.borrow().clone()
    }

    pub fn watch_visitors(&self) -> watch::Receiver<Vec<Visitor>> {
        self.visitors_rx.clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for PresenceSyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceSyncClient")
            .field("connection", &self.connection)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
