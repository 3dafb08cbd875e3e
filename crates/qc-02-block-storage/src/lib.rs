//! # Block Storage
//!
//! The node's persistence collaborator: a filesystem-backed key-value
//! snapshot store used to save and reload the four logical records a
//! node needs across restarts (`node_id`, `keys`, `chain`, `peers`).
//! Encoding of those records into bytes is the caller's concern; this
//! crate only guarantees that whatever bytes are saved under a kind
//! come back unchanged on the next load.

pub mod domain;

pub use domain::*;
