//! # Status API
//!
//! The node's HTTP/JSON control surface: identity, balance, chain,
//! mempool, peers, and the current miner set, plus transaction/stake/
//! miner-roster commands. A thin `axum` router over the `NodeControl`
//! port node-runtime implements.

pub mod domain;
pub mod router;

pub use domain::*;
pub use router::build_router;
