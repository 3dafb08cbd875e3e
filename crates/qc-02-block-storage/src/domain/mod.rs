//! # Domain Layer - Block Storage
//!
//! - `errors`: `StorageError`
//! - `kv_store`: `KvStore` port and its filesystem-backed implementation

pub mod errors;
pub mod kv_store;

pub use errors::*;
pub use kv_store::*;
