//! # Consensus
//!
//! The regime-aware chain legitimacy predicates: `is_valid_block` and
//! `is_valid_chain` check parent linkage, per-transaction duplicate/
//! signature/admission rules, and each regime's own legitimacy predicate
//! (PoW hash prefix, PoA roster membership, PoS VRF threshold). Built on
//! top: fork choice between competing chains, and PoS equivocation
//! detection.

pub mod domain;

pub use domain::*;
