//! # Smart Contracts
//!
//! A minimal metered interpreter for the tiny expression language that
//! `deploy`/`invoke` transactions run. This is not a general-purpose VM:
//! it exists so contract transactions have somewhere to execute without
//! pulling in a real virtual machine.

pub mod domain;

pub use domain::*;
