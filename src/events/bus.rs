use tokio::sync::broadcast;

use super::types::NodeEvent;

/// Default number of events the bus retains per subscriber before the oldest
/// are dropped.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Bounded fan-out channel for lifecycle events.
///
/// Built on `tokio::sync::broadcast`: publishing is non-blocking and a
/// subscriber that lags further than the buffer capacity loses the oldest
/// events first. Subscribers register once at startup via [`subscribe`];
/// publishing with no subscribers at all is a silent no-op.
///
/// [`subscribe`]: EventBus::subscribe
pub struct EventBus {
    tx: broadcast::Sender<NodeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: NodeEvent) {
        // Err only means nobody is subscribed right now.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

/// Awaits the next event on a subscription, absorbing overflow.
///
/// When the subscriber lagged behind and lost events, the skipped count is
/// logged at warning and the next retained event is returned. `None` means
/// the bus side was dropped and no further events will arrive.
pub async fn next_event(rx: &mut broadcast::Receiver<NodeEvent>) -> Option<NodeEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("event subscriber lagged, dropped {} oldest events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
