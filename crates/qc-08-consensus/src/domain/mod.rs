//! # Domain Layer - Consensus
//!
//! - `errors`: `ConsensusError`
//! - `validator`: `is_valid_block`/`is_valid_chain`, `chain_weight`
//! - `fork_choice`: `ForkChoice`, `choose`, `divergence_point`
//! - `slashing`: PoS equivocation detection and marking

pub mod errors;
pub mod fork_choice;
pub mod slashing;
pub mod validator;

pub use errors::*;
pub use fork_choice::*;
pub use slashing::*;
pub use validator::*;
