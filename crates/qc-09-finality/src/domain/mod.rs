//! # Domain Layer - Finality
//!
//! `finality`: `finality_cutoff` and `epoch_seed`, the two derived
//! quantities every other subsystem needs from the finality window.

pub mod finality;

pub use finality::*;
