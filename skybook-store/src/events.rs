use tokio::sync::broadcast;
use tracing::{debug, info};

/// In-process topic. Every subscriber sees every event published after it
/// subscribed; slow subscribers lag rather than block the publisher.
#[derive(Clone)]
pub struct EventBus<T> {
    topic: String,
    sender: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    pub fn new(topic: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            topic: topic.into(),
            sender,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    /// Raw sender, for producers that only need to emit.
    pub fn sender(&self) -> broadcast::Sender<T> {
        self.sender.clone()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, key: &str, event: T) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => {
                info!("Sent message to {}/{}: {} subscribers", self.topic, key, receivers);
                receivers
            }
            Err(_) => {
                debug!("No subscribers on {}, dropped {}", self.topic, key);
                0
            }
        }
    }
}
