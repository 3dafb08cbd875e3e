//! # Finality
//!
//! Derives the finality window from a chain's length (a per-regime step
//! function) and, for PoS, the epoch seed used as the VRF input — the
//! hash of the last block that window finalizes.

pub mod domain;

pub use domain::*;
