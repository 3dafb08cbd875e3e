//! # Block Propagation
//!
//! Handles the `chain`/`chain_request` side of replication: validating a
//! remote chain, running fork choice against the local one
//! (`domain::replication`), pruning the mempool once a chain is adopted
//! (`domain::gc`), and gating gossip relay so a message is only
//! processed once (`domain::dedup`).

pub mod domain;

pub use domain::*;
