//! # Domain Layer - State Evaluator
//!
//! - `balance`: the `balance(public_key)` evaluator and the transaction/
//!   stake admission rules built on top of it
//! - `errors`: `StateError`

pub mod balance;
pub mod errors;

pub use balance::*;
pub use errors::*;
