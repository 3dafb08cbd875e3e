//! # Signature Verification
//!
//! A thin, regime-dispatching wrapper over `shared-crypto`'s two signing
//! suites: which suite a transaction, stake, or block signature checks
//! against is picked once from the node's consensus regime, not
//! per-call, so callers never have to know the algorithm.

pub mod domain;

pub use domain::*;
