//! Error types for the presence client.

use std::time::Duration;

/// Connection-level failure. Contained inside the session driver; callers
/// only ever see it as a status change.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("send failed: {0}")]
    Send(String),

    #[error("receive failed: {0}")]
    Receive(String),

    #[error("close failed: {0}")]
    Close(String),
}

/// A single inbound frame that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The invite side channel did not accept the request.
#[derive(Debug, thiserror::Error)]
pub enum InviteDeliveryError {
    #[error("invite endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invite rejected: {0}")]
    Rejected(String),

    #[error("invite request failed: {0}")]
    Transport(String),
}
