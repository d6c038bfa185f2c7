use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Buffered events per subscriber before slow readers start lagging.
pub const OUTCOME_STREAM_CAPACITY: usize = 64;

/// Broadcast hub fanning outcome notifications out to SSE subscribers.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Send an event to all current subscribers. Returns how many received it.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for SseHub {
    fn default() -> Self {
        Self::new(OUTCOME_STREAM_CAPACITY)
    }
}
