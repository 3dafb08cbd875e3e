//! # Mempool
//!
//! The transaction pool: an insertion-ordered, id-deduplicated queue of
//! candidate transactions awaiting inclusion in a block. A [`handle::MempoolHandle`]
//! wraps the pool in a `tokio::sync::Mutex` so gossip ingestion, block
//! production, and block admission can all share it across `await` points.

pub mod domain;
pub mod handle;

pub use domain::*;
pub use handle::MempoolHandle;
