//! Peer directory error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerDiscoveryError {
    #[error("outbound pool is full ({0} connections)")]
    PoolFull(usize),
    #[error("peer {0} is already connected")]
    AlreadyConnected(String),
    #[error("peer {0} is not known")]
    UnknownPeer(String),
}
