//! # Shared Types Crate
//!
//! The ledger's core entities (`Transaction`, `Stake`, `Block`, `Chain`)
//! and the peer wire protocol (`WireMessage`) that every subsystem
//! — mempool, validator, producers, gossip, replication — builds on.

pub mod entities;
pub mod errors;
pub mod poa_slot;
pub mod regime;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use poa_slot::*;
pub use regime::*;
pub use wire::*;
