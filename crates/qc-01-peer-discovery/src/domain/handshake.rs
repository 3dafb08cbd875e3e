//! Outbound handshake sequencing: which messages to send in response to
//! each step of a fresh connection, independent of the transport.

use shared_types::regime::Regime;
use shared_types::wire::{PeerRecord, WireMessage};
use uuid::Uuid;

/// Messages to send immediately after an outbound connection opens.
/// A node with no chain yet announces itself first so the remote has
/// something to reply `known_peers` to even before it has peers of its
/// own; every connection always probes with `ping`.
#[must_use]
pub fn on_connect(have_chain: bool, self_record: PeerRecord) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(2);
    if !have_chain {
        messages.push(WireMessage::AddPeer { id: Uuid::new_v4(), data: self_record });
    }
    messages.push(WireMessage::Ping { id: Uuid::new_v4() });
    messages
}

/// Reply to an inbound `pong`: announce this node's own identity.
#[must_use]
pub fn on_pong(self_record: PeerRecord) -> WireMessage {
    WireMessage::PeerInfo { id: Uuid::new_v4(), data: self_record }
}

/// Reply to an inbound `peer_info` or `add_peer`: share everything this
/// node knows.
#[must_use]
pub fn on_peer_announced(known_peers: Vec<PeerRecord>) -> WireMessage {
    WireMessage::KnownPeers { id: Uuid::new_v4(), peers: known_peers }
}

/// Follow-up once a peer directory snapshot arrives: request the
/// remote's chain, prefixed by a roster request under PoA.
#[must_use]
pub fn on_known_peers(regime: Regime) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(2);
    if regime == Regime::PoA {
        messages.push(WireMessage::NetworkDetailsRequest { id: Uuid::new_v4() });
    }
    messages.push(WireMessage::ChainRequest { id: Uuid::new_v4() });
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_record() -> PeerRecord {
        PeerRecord { host: "h".into(), port: 1, name: "n".into(), public_key: "PK".into(), node_id: None }
    }

    #[test]
    fn on_connect_announces_itself_only_without_a_chain() {
        let with_chain = on_connect(true, self_record());
        assert!(matches!(with_chain.as_slice(), [WireMessage::Ping { .. }]));

        let without_chain = on_connect(false, self_record());
        assert!(matches!(without_chain.as_slice(), [WireMessage::AddPeer { .. }, WireMessage::Ping { .. }]));
    }

    #[test]
    fn on_known_peers_requests_roster_first_under_poa() {
        let pow = on_known_peers(Regime::PoW);
        assert!(matches!(pow.as_slice(), [WireMessage::ChainRequest { .. }]));

        let poa = on_known_peers(Regime::PoA);
        assert!(matches!(
            poa.as_slice(),
            [WireMessage::NetworkDetailsRequest { .. }, WireMessage::ChainRequest { .. }]
        ));
    }
}
