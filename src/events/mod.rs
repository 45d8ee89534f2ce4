//! Fire-and-forget notifications of bill state changes.

use crate::domain::event::BusMessage;

pub mod memory;
pub mod noop;
pub mod outbox;

pub use memory::InProcessBus;
pub use noop::NoopPublisher;
pub use outbox::OutboxPublisher;

/// Publishes messages on tenant/table scoped channels.
///
/// Delivery is at most once. Implementations never fail the caller and
/// never block on slow consumers.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, channel: &str, message: BusMessage);
}
