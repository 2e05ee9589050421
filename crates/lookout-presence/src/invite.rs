//! HTTP side channel that asks the presence server to invite a visitor.
//!
//! A successful request does not change local state; the server confirms
//! the invite later with a `VIDEO_INVITE_SENT` frame on the WebSocket.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lookout_common::new_correlation_id;

use crate::error::InviteDeliveryError;

/// Path of the invite endpoint, relative to the HTTP base URL.
pub const INVITE_PATH: &str = "/api/send-video-invite";

/// Longest error body kept in `InviteDeliveryError::Status`.
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendInviteRequest<'a> {
    api_key: &'a str,
    visitor_id: &'a str,
    guest_url: &'a str,
}

/// Optional envelope some deployments wrap responses in.
#[derive(Deserialize)]
struct ApiEnvelope {
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

/// Posts invite requests to one endpoint.
#[derive(Clone)]
pub struct InviteClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl InviteClient {
    /// `endpoint` is the full URL of the invite route.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn send(&self, visitor_id: &str, guest_url: &str) -> Result<(), InviteDeliveryError> {
        let request_id = new_correlation_id();
        debug!(request_id = %request_id, visitor_id = %visitor_id, "Sending invite request");

        let body = SendInviteRequest {
            api_key: &self.api_key,
            visitor_id,
            guest_url,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, error = %e, "Invite request failed");
                InviteDeliveryError::Transport(e.to_string())
            })?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(request_id = %request_id, error = %e, "Could not read invite response body");
                String::new()
            }
        };

        if !status.is_success() {
            warn!(request_id = %request_id, status = status.as_u16(), "Invite endpoint refused");
            return Err(InviteDeliveryError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        if let Ok(ApiEnvelope {
            success: Some(false),
            error,
        }) = serde_json::from_str::<ApiEnvelope>(&text)
        {
            let reason = error.unwrap_or_else(|| "unspecified error".to_string());
            warn!(request_id = %request_id, reason = %reason, "Invite rejected");
            return Err(InviteDeliveryError::Rejected(reason));
        }

        info!(request_id = %request_id, visitor_id = %visitor_id, "Invite accepted");
        Ok(())
    }
}

impl fmt::Debug for InviteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InviteClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::respond_once;
    use super::*;

    #[tokio::test]
    async fn posts_camel_case_body_to_endpoint() {
        let (base, captured) = respond_once(200, r#"{"success":true}"#).await;
        let client = InviteClient::new(format!("{base}{INVITE_PATH}"), "key-1");

        client
            .send("v-42", "https://meet.example.com/room/9")
            .await
            .unwrap();

        let request = captured.await.unwrap();
        assert!(request.head.starts_with("POST /api/send-video-invite HTTP/1.1"));
        let head = request.head.to_ascii_lowercase();
        assert_eq!(head.matches("content-type:").count(), 1);
        assert!(head.contains("content-type: application/json"));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "apiKey": "key-1",
                "visitorId": "v-42",
                "guestUrl": "https://meet.example.com/room/9",
            })
        );
    }

    #[tokio::test]
    async fn empty_success_body_is_accepted() {
        let (base, _captured) = respond_once(200, "").await;
        let client = InviteClient::new(format!("{base}{INVITE_PATH}"), "k");
        assert!(client.send("v", "https://g").await.is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _captured) = respond_once(500, r#"{"error":"boom"}"#).await;
        let client = InviteClient::new(format!("{base}{INVITE_PATH}"), "k");

        match client.send("v", "https://g").await {
            Err(InviteDeliveryError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_false_envelope_is_rejected() {
        let (base, _captured) =
            respond_once(200, r#"{"success":false,"error":"visitor left"}"#).await;
        let client = InviteClient::new(format!("{base}{INVITE_PATH}"), "k");

        match client.send("v", "https://g").await {
            Err(InviteDeliveryError::Rejected(reason)) => assert_eq!(reason, "visitor left"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = InviteClient::new(format!("http://{addr}{INVITE_PATH}"), "k");
        assert!(matches!(
            client.send("v", "https://g").await,
            Err(InviteDeliveryError::Transport(_))
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let client = InviteClient::new("https://x/api/send-video-invite", "secret-key");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn truncate_long_bodies() {
        assert_eq!(truncate("short", 10), "short");
        let long = "x".repeat(250);
        let cut = truncate(&long, MAX_ERROR_BODY);
        assert_eq!(cut.len(), MAX_ERROR_BODY + 3);
        assert!(cut.ends_with("..."));
    }
}
