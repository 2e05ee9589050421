//! Fan-out event bus shared by the presence client and its hosts.

use tokio::sync::broadcast;
use tracing::trace;

/// A cloneable-event broadcaster. Slow subscribers lag instead of blocking
/// the publisher.
pub struct EventBus<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: T) -> usize {
        match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                trace!("event dropped, no subscribers");
                0
            }
        }
    }
}

impl<T: Clone> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
