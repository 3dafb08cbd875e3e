//! Compute tasks built on top of [`crate::ComputeEngine`].

pub mod mining;

pub use mining::*;
