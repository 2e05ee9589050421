//! Real-time visitor presence for Lookout.
//!
//! [`PresenceSyncClient`] keeps a local, ordered list of website visitors in
//! sync with the presence server over a WebSocket, reconnecting on failure,
//! and sends video invites through the server's HTTP API.

pub mod client;
pub mod codec;
pub mod connection;
pub mod error;
pub mod invite;
pub mod protocol;
pub mod registry;

pub use client::{PresenceConfig, PresenceEvent, PresenceSyncClient};
pub use connection::{ConnectionStatus, Connector, Transport, WsConnector};
pub use error::{DecodeError, InviteDeliveryError, TransportError};
pub use invite::InviteClient;
pub use protocol::{InboundMessage, OutboundCommand, Visitor, VisitorStatus};
pub use registry::{UpsertOutcome, VisitorRegistry};
