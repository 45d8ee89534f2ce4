use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread;

use crate::domain::event::{BusMessage, ChannelMessage};
use crate::events::EventPublisher;
use crate::repository::EventStore;

/// Appends messages to the shared `bus_events` table from a background
/// thread, so other instances can consume them.
#[derive(Debug, Clone)]
pub struct OutboxPublisher {
    sender: SyncSender<ChannelMessage>,
}

impl OutboxPublisher {
    /// Start the writer thread. At most `capacity` messages wait in memory;
    /// further messages are dropped until the writer catches up.
    pub fn spawn<R>(repo: R, capacity: usize) -> Self
    where
        R: EventStore + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel::<ChannelMessage>(capacity.max(1));

        let writer = thread::Builder::new()
            .name("bus-outbox".to_string())
            .spawn(move || {
                for item in receiver {
                    if let Err(err) = repo.append_bus_event(&item.channel, &item.message) {
                        log::error!(
                            "Failed to store {} for {}: {err}",
                            item.message.event,
                            item.channel
                        );
                    }
                }
                log::debug!("Outbox writer stopped");
            });

        if let Err(err) = writer {
            log::error!("Failed to start outbox writer: {err}");
        }

        Self { sender }
    }
}

impl EventPublisher for OutboxPublisher {
    fn publish(&self, channel: &str, message: BusMessage) {
        let item = ChannelMessage {
            channel: channel.to_string(),
            message,
        };
        match self.sender.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(item)) => {
                log::warn!("Outbox full, dropping {} for {}", item.message.event, item.channel);
            }
            Err(TrySendError::Disconnected(item)) => {
                log::warn!(
                    "Outbox writer gone, dropping {} for {}",
                    item.message.event,
                    item.channel
                );
            }
        }
    }
}
