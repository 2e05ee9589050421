//! Background task that applies connection events to the visitor registry.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use lookout_common::EventBus;

use crate::codec;
use crate::connection::{ConnectionEvent, ConnectionStatus};
use crate::protocol::{InboundMessage, Visitor};
use crate::registry::{UpsertOutcome, VisitorRegistry};

use super::types::PresenceEvent;

/// Everything the sync task owns or publishes to.
pub(crate) struct SyncState {
    registry: VisitorRegistry,
    visitors_tx: watch::Sender<Vec<Visitor>>,
    status_tx: watch::Sender<ConnectionStatus>,
    events: EventBus<PresenceEvent>,
}

impl SyncState {
    pub(crate) fn new(
        visitors_tx: watch::Sender<Vec<Visitor>>,
        status_tx: watch::Sender<ConnectionStatus>,
        events: EventBus<PresenceEvent>,
    ) -> Self {
        Self {
            registry: VisitorRegistry::new(),
            visitors_tx,
            status_tx,
            events,
        }
    }

    fn apply_status(&mut self, status: ConnectionStatus) {
        let previous = self.status_tx.send_replace(status);
        if previous != status {
            self.events.publish(PresenceEvent::StatusChanged(status));
        }
    }

    /// Decode and apply one raw frame. Bad frames are logged and dropped.
    pub(crate) fn apply_frame(&mut self, raw: &str) {
        match codec::decode(raw) {
            Ok(Some(message)) => self.apply_message(message),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring undecodable presence frame"),
        }
    }

    pub(crate) fn apply_message(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::InitialVisitors(list) | InboundMessage::VisitorList(list) => {
                self.registry.replace_all(list);
                let count = self.registry.len();
                debug!(count, "Visitor list replaced");
                self.publish_snapshot();
                self.events.publish(PresenceEvent::VisitorsReplaced { count });
            }
            InboundMessage::VisitorUpdate(visitor) => {
                let event_visitor = visitor.clone();
                match self.registry.upsert(visitor) {
                    UpsertOutcome::Inserted => {
                        debug!(visitor_id = %event_visitor.visitor_id, "Visitor arrived");
                        self.publish_snapshot();
                        self.events
                            .publish(PresenceEvent::VisitorInserted(event_visitor));
                    }
                    UpsertOutcome::Updated { index } => {
                        trace!(visitor_id = %event_visitor.visitor_id, index, "Visitor updated");
                        self.publish_snapshot();
                        self.events.publish(PresenceEvent::VisitorUpdated(event_visitor));
                    }
                }
            }
            InboundMessage::VideoInviteSent {
                visitor_id,
                guest_url,
            } => {
                if self.registry.mark_invited(&visitor_id, &guest_url) {
                    info!(visitor_id = %visitor_id, "Invite confirmed");
                    self.publish_snapshot();
                    self.events.publish(PresenceEvent::InviteConfirmed {
                        visitor_id,
                        guest_url,
                    });
                } else {
                    debug!(visitor_id = %visitor_id, "Invite confirmed for unknown visitor");
                    self.events
                        .publish(PresenceEvent::InviteForUnknownVisitor { visitor_id });
                }
            }
            InboundMessage::Pong => trace!("Keep-alive answered"),
        }
    }

    fn publish_snapshot(&self) {
        self.visitors_tx.send_replace(self.registry.snapshot());
    }
}

/// Apply driver events in order until the driver stops.
pub(crate) async fn sync_task(mut events_rx: mpsc::Receiver<ConnectionEvent>, mut state: SyncState) {
    while let Some(event) = events_rx.recv().await {
        match event {
            ConnectionEvent::Status(status) => state.apply_status(status),
            ConnectionEvent::Frame(raw) => state.apply_frame(&raw),
            ConnectionEvent::Stopped { done } => {
                let _ = done.send(());
                break;
            }
        }
    }
    debug!("Presence sync task finished");
}
