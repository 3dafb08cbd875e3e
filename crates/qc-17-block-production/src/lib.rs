//! # Block Production
//!
//! Produces candidate blocks for each consensus regime: PoW mining
//! (`domain::pow`), PoA roster/slot tracking (`domain::poa`), and PoS
//! epoch/VRF lottery (`domain::pos`). Blocks produced here are not
//! self-validating — `qc-08-consensus` re-checks everything before a
//! block is accepted onto the local chain.

pub mod domain;

pub use domain::*;
