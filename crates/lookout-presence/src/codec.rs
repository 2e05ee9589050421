//! JSON frame codec.
//!
//! `decode` turns a text frame into an [`InboundMessage`]. Frames with an
//! unknown `type` decode to `Ok(None)` so newer servers can add messages
//! without breaking older clients.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::DecodeError;
use crate::protocol::{
    frames, InboundMessage, InviteSentPayload, OutboundCommand, VisitorPayload, VisitorsPayload,
};

/// Decode one inbound text frame.
pub fn decode(raw: &str) -> Result<Option<InboundMessage>, DecodeError> {
    let value: Value = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();

    let message = match kind.as_str() {
        frames::INITIAL_VISITORS => {
            let p: VisitorsPayload = payload(&kind, value)?;
            InboundMessage::InitialVisitors(p.visitors)
        }
        frames::VISITOR_LIST => {
            let p: VisitorsPayload = payload(&kind, value)?;
            InboundMessage::VisitorList(p.visitors)
        }
        frames::VISITOR_UPDATE => {
            let p: VisitorPayload = payload(&kind, value)?;
            InboundMessage::VisitorUpdate(p.visitor)
        }
        frames::VIDEO_INVITE_SENT => {
            let p: InviteSentPayload = payload(&kind, value)?;
            InboundMessage::VideoInviteSent {
                visitor_id: p.visitor_id,
                guest_url: p.guest_url,
            }
        }
        frames::PONG => InboundMessage::Pong,
        _ => {
            debug!(frame_type = %kind, "Ignoring unrecognized frame");
            return Ok(None);
        }
    };

    Ok(Some(message))
}

/// Encode an outbound command as a text frame.
pub fn encode(command: OutboundCommand) -> String {
    serde_json::json!({ "type": command.frame_type() }).to_string()
}

fn payload<T: DeserializeOwned>(kind: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::InvalidPayload {
        kind: kind.to_string(),
        source,
    })
}
