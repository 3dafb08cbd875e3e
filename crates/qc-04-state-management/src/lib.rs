//! # State Evaluator
//!
//! Interprets a chain prefix (plus in-flight mempool transactions and,
//! under PoS, the current epoch's stakes) into a public key's spendable
//! balance, and the admission rules built on top of it. Every subsystem
//! that needs to know "can this spend happen" — the mempool, the chain
//! validator, and the block producers — goes through this crate rather
//! than re-deriving the walk over the chain itself.

pub mod domain;

pub use domain::*;
