//! # Domain Layer - Peer Discovery
//!
//! - `errors`: `PeerDiscoveryError`
//! - `peer_directory`: known peers, the bounded outbound pool, name dedup
//! - `handshake`: outbound handshake sequencing

pub mod errors;
pub mod handshake;
pub mod peer_directory;

pub use errors::*;
pub use handshake::*;
pub use peer_directory::*;
