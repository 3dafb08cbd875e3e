//! In-process counters surfaced by the status API.
//!
//! There is no metrics exporter here — no Prometheus, no OTel collector.
//! Counters exist so `qc-16-api-gateway`'s status endpoint has something to
//! report; node operators wanting a scrape endpoint put a sidecar in front.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing counters tracked by a running node.
#[derive(Debug, Default)]
pub struct Counters {
    blocks_produced: AtomicU64,
    blocks_validated: AtomicU64,
    blocks_rejected: AtomicU64,
    transactions_received: AtomicU64,
    peers_connected: AtomicU64,
    signature_failures: AtomicU64,
}

impl Counters {
    /// Create a fresh, zeroed counter set behind a shared handle.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a produced block.
    pub fn inc_blocks_produced(&self) {
        self.blocks_produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a block that passed validation.
    pub fn inc_blocks_validated(&self) {
        self.blocks_validated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a block that failed validation.
    pub fn inc_blocks_rejected(&self) {
        self.blocks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transaction accepted into the mempool.
    pub fn inc_transactions_received(&self) {
        self.transactions_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a signature verification failure.
    pub fn inc_signature_failures(&self) {
        self.signature_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Set the current connected peer count.
    pub fn set_peers_connected(&self, count: u64) {
        self.peers_connected.store(count, Ordering::Relaxed);
    }

    /// Snapshot all counters for the status API.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            blocks_produced: self.blocks_produced.load(Ordering::Relaxed),
            blocks_validated: self.blocks_validated.load(Ordering::Relaxed),
            blocks_rejected: self.blocks_rejected.load(Ordering::Relaxed),
            transactions_received: self.transactions_received.load(Ordering::Relaxed),
            peers_connected: self.peers_connected.load(Ordering::Relaxed),
            signature_failures: self.signature_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time read of every counter, serializable for the status API.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CounterSnapshot {
    /// Blocks this node has produced.
    pub blocks_produced: u64,
    /// Blocks accepted by validation.
    pub blocks_validated: u64,
    /// Blocks rejected by validation.
    pub blocks_rejected: u64,
    /// Transactions accepted into the mempool.
    pub transactions_received: u64,
    /// Currently connected peers.
    pub peers_connected: u64,
    /// Signature verification failures observed.
    pub signature_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = Counters::new();
        let snap = counters.snapshot();
        assert_eq!(snap.blocks_produced, 0);
        assert_eq!(snap.peers_connected, 0);
    }

    #[test]
    fn test_counter_increments() {
        let counters = Counters::new();
        counters.inc_blocks_produced();
        counters.inc_blocks_produced();
        counters.inc_transactions_received();
        counters.set_peers_connected(3);

        let snap = counters.snapshot();
        assert_eq!(snap.blocks_produced, 2);
        assert_eq!(snap.transactions_received, 1);
        assert_eq!(snap.peers_connected, 3);
    }
}
