//! Peer directory: every endpoint this node has ever learned about, and
//! which of them currently hold one of the bounded outbound slots.

use rand::seq::IteratorRandom;
use shared_types::wire::PeerRecord;
use std::collections::{HashMap, HashSet};

use super::errors::PeerDiscoveryError;

fn endpoint(record: &PeerRecord) -> String {
    format!("{}:{}", record.host, record.port)
}

/// The directory key for `record`, for callers outside this module that
/// need to tell "this peer" apart from "some other peer with the same
/// name".
#[must_use]
pub fn peer_key(record: &PeerRecord) -> String {
    endpoint(record)
}

/// All known peers plus the subset currently holding an outbound slot.
#[derive(Debug)]
pub struct PeerDirectory {
    known: HashMap<String, PeerRecord>,
    connected: HashSet<String>,
    max_connections: usize,
}

impl PeerDirectory {
    #[must_use]
    pub fn new(max_connections: usize) -> Self {
        Self { known: HashMap::new(), connected: HashSet::new(), max_connections }
    }

    /// Record `record` as known, updating it if the endpoint was
    /// already present. Returns `true` if this endpoint is new.
    pub fn learn(&mut self, record: PeerRecord) -> bool {
        let key = endpoint(&record);
        self.known.insert(key, record).is_none()
    }

    #[must_use]
    pub fn known_peers(&self) -> Vec<PeerRecord> {
        self.known.values().cloned().collect()
    }

    #[must_use]
    pub fn is_connected(&self, endpoint: &str) -> bool {
        self.connected.contains(endpoint)
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connected.len()
    }

    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.connected.len() < self.max_connections
    }

    pub fn mark_connected(&mut self, endpoint: &str) -> Result<(), PeerDiscoveryError> {
        if !self.has_free_slot() {
            return Err(PeerDiscoveryError::PoolFull(self.max_connections));
        }
        if !self.connected.insert(endpoint.to_string()) {
            return Err(PeerDiscoveryError::AlreadyConnected(endpoint.to_string()));
        }
        Ok(())
    }

    pub fn mark_disconnected(&mut self, endpoint: &str) {
        self.connected.remove(endpoint);
    }

    /// A known peer with a free slot and not already connected, chosen
    /// uniformly at random. Used by the 30s discovery tick to fill the
    /// pool toward `max_connections`.
    #[must_use]
    pub fn discovery_candidate(&self) -> Option<PeerRecord> {
        if !self.has_free_slot() {
            return None;
        }
        self.known
            .iter()
            .filter(|(key, _)| !self.connected.contains(*key))
            .choose(&mut rand::thread_rng())
            .map(|(_, record)| record.clone())
    }

    /// A random connected endpoint to drop and a random not-yet-connected
    /// known peer to replace it with, for the 60s sampler tick. `None` if
    /// there is nothing connected, or no replacement candidate exists.
    #[must_use]
    pub fn sampler_swap(&self) -> Option<(String, PeerRecord)> {
        let drop_endpoint = self.connected.iter().choose(&mut rand::thread_rng())?.clone();
        let candidate = self
            .known
            .iter()
            .filter(|(key, _)| !self.connected.contains(*key))
            .choose(&mut rand::thread_rng())
            .map(|(_, record)| record.clone())?;
        Some((drop_endpoint, candidate))
    }

    /// Whether `requested` is already the display name of some known
    /// peer other than `own_key` (as returned by [`peer_key`]).
    #[must_use]
    pub fn name_taken(&self, requested: &str, own_key: &str) -> bool {
        self.known.values().any(|p| p.name == requested && endpoint(p) != own_key)
    }

    /// De-duplicate `requested` against known display names by
    /// appending a numeric suffix, per `change_name`'s server-assigned
    /// uniquified name.
    #[must_use]
    pub fn uniquify_name(&self, requested: &str) -> String {
        if !self.known.values().any(|p| p.name == requested) {
            return requested.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{requested}-{suffix}");
            if !self.known.values().any(|p| p.name == candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(host: &str, port: u16, name: &str) -> PeerRecord {
        PeerRecord { host: host.to_string(), port, name: name.to_string(), public_key: "PK".to_string(), node_id: None }
    }

    #[test]
    fn learning_a_new_endpoint_returns_true_then_false() {
        let mut dir = PeerDirectory::new(8);
        assert!(dir.learn(record("1.2.3.4", 9000, "a")));
        assert!(!dir.learn(record("1.2.3.4", 9000, "a-renamed")));
        assert_eq!(dir.known_peers().len(), 1);
    }

    #[test]
    fn mark_connected_respects_the_cap() {
        let mut dir = PeerDirectory::new(1);
        dir.mark_connected("a:1").unwrap();
        assert_eq!(dir.mark_connected("b:1"), Err(PeerDiscoveryError::PoolFull(1)));
    }

    #[test]
    fn mark_connected_rejects_duplicates() {
        let mut dir = PeerDirectory::new(8);
        dir.mark_connected("a:1").unwrap();
        assert_eq!(dir.mark_connected("a:1"), Err(PeerDiscoveryError::AlreadyConnected("a:1".to_string())));
    }

    #[test]
    fn discovery_candidate_skips_already_connected_peers() {
        let mut dir = PeerDirectory::new(8);
        dir.learn(record("a", 1, "a"));
        dir.mark_connected("a:1").unwrap();
        assert!(dir.discovery_candidate().is_none());

        dir.learn(record("b", 1, "b"));
        assert_eq!(dir.discovery_candidate().unwrap().host, "b");
    }

    #[test]
    fn discovery_candidate_returns_none_when_pool_is_full() {
        let mut dir = PeerDirectory::new(1);
        dir.learn(record("a", 1, "a"));
        dir.learn(record("b", 1, "b"));
        dir.mark_connected("a:1").unwrap();
        assert!(dir.discovery_candidate().is_none());
    }

    #[test]
    fn sampler_swap_picks_a_connected_peer_to_drop_and_a_free_one_to_add() {
        let mut dir = PeerDirectory::new(8);
        dir.learn(record("a", 1, "a"));
        dir.learn(record("b", 1, "b"));
        dir.mark_connected("a:1").unwrap();
        let (drop_endpoint, candidate) = dir.sampler_swap().unwrap();
        assert_eq!(drop_endpoint, "a:1");
        assert_eq!(candidate.host, "b");
    }

    #[test]
    fn name_taken_ignores_the_peer_that_already_owns_the_name() {
        let mut dir = PeerDirectory::new(8);
        let mine = record("a", 1, "node");
        dir.learn(mine.clone());
        assert!(!dir.name_taken("node", &peer_key(&mine)));

        let other = record("b", 1, "node");
        dir.learn(other);
        assert!(dir.name_taken("node", &peer_key(&mine)));
    }

    #[test]
    fn uniquify_name_appends_a_numeric_suffix() {
        let mut dir = PeerDirectory::new(8);
        dir.learn(record("a", 1, "node"));
        assert_eq!(dir.uniquify_name("node"), "node-2");
        dir.learn(record("b", 1, "node-2"));
        assert_eq!(dir.uniquify_name("node"), "node-3");
        assert_eq!(dir.uniquify_name("other"), "other");
    }
}
