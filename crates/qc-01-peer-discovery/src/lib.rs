//! # Peer Discovery
//!
//! The gossip overlay's peer directory and bounded outbound pool: which
//! endpoints this node knows about, which `MAX_CONNECTIONS` of them it
//! currently holds a slot with, and the handshake sequence a fresh
//! outbound connection walks through before it is treated as a full
//! peer. The actual WebSocket transport lives in the node runtime; this
//! crate is the pure state behind it.

pub mod domain;

pub use domain::*;
