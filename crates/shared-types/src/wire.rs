//! # Peer Wire Protocol
//!
//! JSON-over-WebSocket messages exchanged between nodes, one message per
//! frame. Every message carries `{type, id}`; `id` is a UUID used for
//! gossip deduplication (`shared-bus`'s seen-message cache).

use crate::entities::{Block, Stake, Transaction};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A peer endpoint as exchanged during discovery/handshake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerRecord {
    /// Hostname or IP the peer listens on.
    pub host: String,
    /// Port the peer listens on.
    pub port: u16,
    /// Display name, possibly server-assigned via `change_name`.
    pub name: String,
    /// Public key in PEM.
    pub public_key: String,
    /// Stable node identifier, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub node_id: Option<String>,
}

/// Every message on the peer wire, tagged by `type` with `id` always
/// present for dedup, matching the wire table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireMessage {
    /// Liveness probe.
    #[serde(rename = "ping")]
    Ping {
        /// Dedup id.
        id: Uuid,
    },
    /// Liveness reply.
    #[serde(rename = "pong")]
    Pong {
        /// Dedup id.
        id: Uuid,
    },
    /// Offered by the connecting node on first contact.
    #[serde(rename = "add_peer")]
    AddPeer {
        /// Dedup id.
        id: Uuid,
        /// The sender's own endpoint/identity.
        data: PeerRecord,
    },
    /// Announces a newly learned peer.
    #[serde(rename = "new_peer")]
    NewPeer {
        /// Dedup id.
        id: Uuid,
        /// The newly learned peer.
        data: PeerRecord,
    },
    /// Reply to a handshake probe, carrying the sender's own identity.
    #[serde(rename = "peer_info")]
    PeerInfo {
        /// Dedup id.
        id: Uuid,
        /// The sender's own endpoint/identity.
        data: PeerRecord,
    },
    /// The peer directory, sent in reply to `peer_info`/`add_peer`.
    #[serde(rename = "known_peers")]
    KnownPeers {
        /// Dedup id.
        id: Uuid,
        /// All peers known to the sender.
        peers: Vec<PeerRecord>,
    },
    /// Server-assigned, de-duplicated display name.
    #[serde(rename = "change_name")]
    ChangeName {
        /// Dedup id.
        id: Uuid,
        /// The id of the message this renames a peer in response to.
        new_peer_msg_id: Uuid,
        /// The uniquified name.
        new_name: String,
    },
    /// Request the recipient's full chain.
    #[serde(rename = "chain_request")]
    ChainRequest {
        /// Dedup id.
        id: Uuid,
    },
    /// A full serialized chain, sent in reply to `chain_request`.
    #[serde(rename = "chain")]
    Chain {
        /// Dedup id.
        id: Uuid,
        /// Blocks in height order.
        chain: Vec<Block>,
    },
    /// A newly broadcast transaction.
    #[serde(rename = "new_tx")]
    NewTx {
        /// Dedup id.
        id: Uuid,
        /// The canonical signable string the signature covers.
        transaction: String,
        /// Base64-encoded signature.
        sign: String,
        /// Sender public key in PEM.
        sender_pem: String,
    },
    /// A newly produced block.
    #[serde(rename = "new_block")]
    NewBlock {
        /// Dedup id.
        id: Uuid,
        /// The produced block.
        block: Block,
        /// Base64-encoded VRF proof (PoS only).
        #[serde(skip_serializing_if = "Option::is_none", default)]
        vrf_proof: Option<String>,
        /// Base64-encoded producer signature (PoS only; PoA embeds its
        /// signature in `block.regime` instead).
        #[serde(skip_serializing_if = "Option::is_none", default)]
        sign: Option<String>,
    },
    /// A newly submitted PoS stake.
    #[serde(rename = "stake_announcement")]
    StakeAnnouncement {
        /// Dedup id.
        id: Uuid,
        /// The submitted stake.
        stake: Stake,
    },
    /// Evidence of PoS equivocation at a given chain position.
    #[serde(rename = "slash_announcement")]
    SlashAnnouncement {
        /// Dedup id.
        id: Uuid,
        /// The first conflicting block.
        evidence1: Block,
        /// The second conflicting block.
        evidence2: Block,
        /// Base64-encoded signature over `evidence1`.
        block1_sign: String,
        /// Base64-encoded signature over `evidence2`.
        block2_sign: String,
        /// The chain index the two blocks diverge at.
        pos: u64,
    },
    /// Admin-signed PoA roster update.
    #[serde(rename = "miners_list_update")]
    MinersListUpdate {
        /// Dedup id.
        id: Uuid,
        /// The new roster.
        miners_list: Vec<String>,
        /// Chain length at which the roster takes effect.
        activation_block: u64,
        /// Hex-encoded admin signature.
        signature: String,
    },
    /// Request the current PoA admin/roster.
    #[serde(rename = "network_details_request")]
    NetworkDetailsRequest {
        /// Dedup id.
        id: Uuid,
    },
    /// Reply carrying the current PoA admin/roster.
    #[serde(rename = "network_details")]
    NetworkDetails {
        /// Dedup id.
        id: Uuid,
        /// Admin public key in PEM.
        admin: String,
        /// Current roster.
        miners: Vec<String>,
    },
    /// Announces an externally stored file's content-ID.
    #[serde(rename = "file")]
    File {
        /// Dedup id.
        id: Uuid,
        /// Opaque content identifier.
        cid: String,
        /// Human-readable description.
        desc: String,
    },
}

impl WireMessage {
    /// The dedup id every message carries, regardless of variant.
    pub fn id(&self) -> Uuid {
        match self {
            WireMessage::Ping { id }
            | WireMessage::Pong { id }
            | WireMessage::AddPeer { id, .. }
            | WireMessage::NewPeer { id, .. }
            | WireMessage::PeerInfo { id, .. }
            | WireMessage::KnownPeers { id, .. }
            | WireMessage::ChangeName { id, .. }
            | WireMessage::ChainRequest { id }
            | WireMessage::Chain { id, .. }
            | WireMessage::NewTx { id, .. }
            | WireMessage::NewBlock { id, .. }
            | WireMessage::StakeAnnouncement { id, .. }
            | WireMessage::SlashAnnouncement { id, .. }
            | WireMessage::MinersListUpdate { id, .. }
            | WireMessage::NetworkDetailsRequest { id }
            | WireMessage::NetworkDetails { id, .. }
            | WireMessage::File { id, .. } => *id,
        }
    }
}
