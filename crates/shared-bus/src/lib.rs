//! # Shared Bus - Gossip Dedup
//!
//! Every wire message carries an `id: Uuid`. A node relays a gossip
//! message to its peers at most once and must ignore re-deliveries of a
//! message it already processed — this crate is the shared cache that
//! backs that check.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod nonce_cache;

pub use nonce_cache::{NonceError, SeenMessageCache, TimeBoundedNonceCache};

/// Current protocol version for peer wire messages.
pub const PROTOCOL_VERSION: u16 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }
}
