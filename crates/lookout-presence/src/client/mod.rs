//! Presence sync client.
//!
//! Owns one connection session to the presence server and the local
//! visitor registry it feeds. The connection runs in a driver task; frames
//! are applied to the registry by a second task, in arrival order, and
//! observers read snapshots through `watch` channels.

#[allow(clippy::module_inception)]
mod client;
mod sync;
mod types;


pub use client::PresenceSyncClient;
pub use types::{PresenceConfig, PresenceEvent};
