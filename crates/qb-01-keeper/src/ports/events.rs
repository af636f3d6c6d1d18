//! Event emission port.

use shared_types::BridgeEvent;

/// Receives audit events after the message that produced them committed.
///
/// Publication is fire-and-forget: a sink cannot fail the message.
pub trait EventSink: Send + Sync {
    fn publish(&self, events: Vec<BridgeEvent>);
}
