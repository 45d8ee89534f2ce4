use crate::domain::event::BusMessage;
use crate::events::EventPublisher;

/// Publisher used when no event bus is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, channel: &str, message: BusMessage) {
        log::trace!("Dropping {} for {channel}", message.event);
    }
}
