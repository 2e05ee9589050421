//! In-memory connector for driving the session without sockets.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportError;

use super::transport::{Connector, Transport};

/// What the client wrote to a fake transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Text(String),
    Close { code: u16, reason: String },
}

/// Frames a test pushes to the client.
#[derive(Debug)]
enum Push {
    Text(String),
    Error(String),
}

/// Server side of one fake connection. Dropping it closes the connection.
pub(crate) struct FakeServer {
    to_client: mpsc::UnboundedSender<Push>,
    from_client: mpsc::UnboundedReceiver<Sent>,
}

impl FakeServer {
    pub(crate) fn push(&self, text: &str) {
        let _ = self.to_client.send(Push::Text(text.to_string()));
    }

    pub(crate) fn fail(&self, message: &str) {
        let _ = self.to_client.send(Push::Error(message.to_string()));
    }

    /// Next thing the client sent, or `None` once the client dropped its side.
    pub(crate) async fn next_sent(&mut self) -> Option<Sent> {
        self.from_client.recv().await
    }
}

pub(crate) struct FakeConnector {
    attempts: AtomicUsize,
    refuse: AtomicBool,
    servers: mpsc::UnboundedSender<FakeServer>,
}

impl FakeConnector {
    /// Returns the connector and a stream of accepted connections.
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<FakeServer>) {
        let (servers, accepted) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            attempts: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
            servers,
        });
        (connector, accepted)
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make subsequent connect attempts fail.
    pub(crate) fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, _url: &str) -> Result<Box<dyn Transport>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Connect("connection refused".into()));
        }

        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        let _ = self.servers.send(FakeServer {
            to_client,
            from_client,
        });
        Ok(Box::new(FakeTransport { incoming, outgoing }))
    }
}

struct FakeTransport {
    incoming: mpsc::UnboundedReceiver<Push>,
    outgoing: mpsc::UnboundedSender<Sent>,
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.outgoing
            .send(Sent::Text(text))
            .map_err(|_| TransportError::Send("peer gone".into()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        match self.incoming.recv().await? {
            Push::Text(text) => Some(Ok(text)),
            Push::Error(message) => Some(Err(TransportError::Receive(message))),
        }
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError> {
        let _ = self.outgoing.send(Sent::Close {
            code,
            reason: reason.to_string(),
        });
        Ok(())
    }
}
