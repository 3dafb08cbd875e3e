//! # Domain Layer - Mempool
//!
//! - `errors`: `MempoolError`
//! - `pool`: `TransactionPool`, the ordered, id-deduplicated transaction queue

pub mod errors;
pub mod pool;

pub use errors::*;
pub use pool::*;
