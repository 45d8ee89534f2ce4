use tokio::sync::broadcast;

use crate::domain::event::{BusMessage, ChannelMessage};
use crate::events::EventPublisher;

/// In-process fan-out for single-instance deployments.
#[derive(Debug, Clone)]
pub struct InProcessBus {
    sender: broadcast::Sender<ChannelMessage>,
}

impl InProcessBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every message published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessBus {
    fn publish(&self, channel: &str, message: BusMessage) {
        let event = message.event.clone();
        let payload = ChannelMessage {
            channel: channel.to_string(),
            message,
        };
        if self.sender.send(payload).is_err() {
            log::debug!("No subscribers for {event} on {channel}");
        }
    }
}
