//! Persistent connection to the presence server.
//!
//! `session` is the lifecycle state machine; it never touches I/O and
//! answers every input with the actions to perform. `driver` is the
//! background task that owns the transport and timers and carries those
//! actions out. `transport` is the seam between the driver and the
//! WebSocket library.

mod driver;
mod session;
mod transport;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub(crate) use driver::SessionDriver;
pub use session::{ConnectionSession, SessionAction};
pub use transport::{Connector, Transport, WsConnector};
pub(crate) use types::{ConnectionCommand, ConnectionEvent};
pub use types::{ConnectionConfig, ConnectionStatus, NORMAL_CLOSURE, TEARDOWN_REASON};
