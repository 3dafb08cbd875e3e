//! Gossip dedup gate: every inbound wire message is admitted at most
//! once, so broadcasts stay idempotent across however many peers relay
//! the same message.

use shared_bus::SeenMessageCache;
use shared_types::wire::WireMessage;

/// Wraps a [`SeenMessageCache`] keyed by [`WireMessage::id`].
pub struct GossipGate {
    seen: SeenMessageCache,
}

impl GossipGate {
    #[must_use]
    pub fn new() -> Self {
        Self { seen: SeenMessageCache::new() }
    }

    /// `true` if `message` has not been processed before and should be
    /// handled/relayed; `false` if it is a re-delivery to drop.
    pub fn admit(&mut self, message: &WireMessage) -> bool {
        self.seen.insert(message.id())
    }
}

impl Default for GossipGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn first_delivery_is_admitted_repeats_are_dropped() {
        let mut gate = GossipGate::new();
        let msg = WireMessage::Ping { id: Uuid::new_v4() };
        assert!(gate.admit(&msg));
        assert!(!gate.admit(&msg));
    }

    #[test]
    fn distinct_ids_are_each_admitted_once() {
        let mut gate = GossipGate::new();
        assert!(gate.admit(&WireMessage::Ping { id: Uuid::new_v4() }));
        assert!(gate.admit(&WireMessage::Pong { id: Uuid::new_v4() }));
    }
}
