//! Protocol types for the visitor presence stream.
//!
//! Every frame on the socket is a JSON object whose `type` field names the
//! message. Decoding and encoding live in `codec.rs`.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Frame type names
// ---------------------------------------------------------------------------

/// Values of the `type` discriminator.
pub mod frames {
    pub const INITIAL_VISITORS: &str = "INITIAL_VISITORS";
    pub const VISITOR_UPDATE: &str = "VISITOR_UPDATE";
    pub const VIDEO_INVITE_SENT: &str = "VIDEO_INVITE_SENT";
    pub const VISITOR_LIST: &str = "VISITOR_LIST";
    pub const PONG: &str = "PONG";

    pub const GET_VISITORS: &str = "GET_VISITORS";
    pub const PING: &str = "PING";
}

// ---------------------------------------------------------------------------
// Visitor
// ---------------------------------------------------------------------------

/// Engagement state of a visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    #[default]
    Active,
    VideoInvited,
    InCall,
    /// A status this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// A tracked website visitor.
///
/// Only `visitorId` is required. Descriptive fields sent as `null` take
/// their defaults, and the two time markers may be strings or epoch numbers,
/// so one sloppy record never sinks a whole visitor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub visitor_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_views: u64,
    #[serde(default, deserialize_with = "time_marker")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "time_marker")]
    pub last_activity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: VisitorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_url: Option<String>,
}

impl Visitor {
    /// A visitor with only an id; every other field takes its default.
    pub fn new(visitor_id: impl Into<String>) -> Self {
        Self {
            visitor_id: visitor_id.into(),
            company: String::new(),
            location: String::new(),
            last_role: String::new(),
            website: String::new(),
            page_views: 0,
            timestamp: String::new(),
            last_activity: String::new(),
            status: VisitorStatus::Active,
            guest_url: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Wire shapes seen for `timestamp` and `lastActivity`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeMarker {
    Text(String),
    Millis(i64),
    Fractional(f64),
}

/// Keep time markers as text; epoch numbers are stored in decimal form.
fn time_marker<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TimeMarker>::deserialize(deserializer)? {
        None => String::new(),
        Some(TimeMarker::Text(text)) => text,
        Some(TimeMarker::Millis(millis)) => millis.to_string(),
        Some(TimeMarker::Fractional(value)) => value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A decoded frame from the presence server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Full list sent right after a connection opens.
    InitialVisitors(Vec<Visitor>),
    /// One visitor was created or changed.
    VisitorUpdate(Visitor),
    /// The server delivered an invite to a visitor.
    VideoInviteSent { visitor_id: String, guest_url: String },
    /// Full list sent in reply to `GET_VISITORS`.
    VisitorList(Vec<Visitor>),
    Pong,
}

/// A command sent to the presence server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Ask for the full visitor list.
    GetVisitors,
    /// Keep-alive probe.
    Ping,
}

impl OutboundCommand {
    pub fn frame_type(self) -> &'static str {
        match self {
            OutboundCommand::GetVisitors => frames::GET_VISITORS,
            OutboundCommand::Ping => frames::PING,
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct VisitorsPayload {
    pub visitors: Vec<Visitor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VisitorPayload {
    pub visitor: Visitor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InviteSentPayload {
    pub visitor_id: String,
    pub guest_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visitor_uses_camel_case_on_the_wire() {
        let mut visitor = Visitor::new("v-1");
        visitor.last_role = "CTO".into();
        visitor.page_views = 4;
        let json = serde_json::to_value(&visitor).unwrap();
        assert_eq!(json["visitorId"], "v-1");
        assert_eq!(json["lastRole"], "CTO");
        assert_eq!(json["pageViews"], 4);
        assert_eq!(json["status"], "active");
        assert!(json.get("guestUrl").is_none());
    }

    #[test]
    fn visitor_defaults_missing_fields() {
        let visitor: Visitor = serde_json::from_str(r#"{"visitorId":"v-2"}"#).unwrap();
        assert_eq!(visitor, Visitor::new("v-2"));
    }

    #[test]
    fn visitor_requires_id() {
        let result: Result<Visitor, _> = serde_json::from_str(r#"{"company":"Acme"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn null_fields_take_defaults() {
        let visitor: Visitor = serde_json::from_str(
            r#"{"visitorId":"v-3","company":null,"location":null,"pageViews":null,
                "status":null,"timestamp":null,"guestUrl":null}"#,
        )
        .unwrap();
        assert_eq!(visitor, Visitor::new("v-3"));
    }

    #[test]
    fn numeric_time_markers_are_kept_as_text() {
        let visitor: Visitor = serde_json::from_str(
            r#"{"visitorId":"v-4","timestamp":1718000000000,"lastActivity":"2024-06-10T06:13:20Z"}"#,
        )
        .unwrap();
        assert_eq!(visitor.timestamp, "1718000000000");
        assert_eq!(visitor.last_activity, "2024-06-10T06:13:20Z");

        let visitor: Visitor =
            serde_json::from_str(r#"{"visitorId":"v-5","lastActivity":1718000000.5}"#).unwrap();
        assert_eq!(visitor.last_activity, "1718000000.5");
    }

    #[test]
    fn wrong_shape_for_a_time_marker_still_fails() {
        let result: Result<Visitor, _> =
            serde_json::from_str(r#"{"visitorId":"v-6","timestamp":{"at":1}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn status_values() {
        let status: VisitorStatus = serde_json::from_str(r#""video_invited""#).unwrap();
        assert_eq!(status, VisitorStatus::VideoInvited);
        let status: VisitorStatus = serde_json::from_str(r#""in_call""#).unwrap();
        assert_eq!(status, VisitorStatus::InCall);
    }

    #[test]
    fn unknown_status_does_not_fail() {
        let status: VisitorStatus = serde_json::from_str(r#""browsing_pricing""#).unwrap();
        assert_eq!(status, VisitorStatus::Unknown);
    }
}
